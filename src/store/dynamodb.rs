use crate::{
    Error, Result,
    admin::{
        create_table::CreateTable,
        describe_table::{DescribeTable, TableDescription},
    },
    common,
    read::{get_item::GetItemInput, query::QueryInput},
    store::Store,
    write::{delete_item::DeleteItemInput, put_item::PutItemInput, update_item::UpdateItemInput},
};

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    Client,
    error::ProvideErrorMetadata,
    operation::{
        create_table::CreateTableError, delete_item::DeleteItemError,
        describe_table::DescribeTableError, get_item::GetItemError, put_item::PutItemError,
        query::QueryError, update_item::UpdateItemError,
    },
    types,
};

const VALIDATION_EXCEPTION: &str = "ValidationException";

/// Map an SDK error, singling out the missing-table and validation conditions.
macro_rules! map_sdk_error {
    ($error:expr, $operation:literal, $service_error:ident, $table_name:expr) => {{
        let error = $error;
        if matches!(
            error.as_service_error(),
            Some($service_error::ResourceNotFoundException(_))
        ) {
            Error::TableNotFound {
                table_name: $table_name.to_string(),
            }
        } else if let Some(validation) = error.as_service_error().and_then(validation_error) {
            validation
        } else {
            Error::sdk($operation, error)
        }
    }};
}

/// The service rejects malformed requests with a `ValidationException` code.
fn validation_error<E: ProvideErrorMetadata>(error: &E) -> Option<Error> {
    (error.code() == Some(VALIDATION_EXCEPTION)).then(|| {
        Error::Validation(error.message().unwrap_or(VALIDATION_EXCEPTION).to_string())
    })
}

/// The store answers "no attributes" with either nothing or an empty map.
fn non_empty(item: Option<common::Item>) -> Option<common::Item> {
    item.filter(|item| !item.is_empty())
}

fn table_description(
    table: Option<&types::TableDescription>,
    table_name: &str,
) -> TableDescription {
    TableDescription {
        item_count: table
            .and_then(|table| table.item_count())
            .unwrap_or_default(),
        status: table
            .and_then(|table| table.table_status())
            .cloned()
            .unwrap_or(types::TableStatus::Creating),
        table_name: table
            .and_then(|table| table.table_name())
            .unwrap_or(table_name)
            .to_string(),
    }
}

fn key_schema(
    input: &CreateTable,
) -> Result<(Vec<types::AttributeDefinition>, Vec<types::KeySchemaElement>)> {
    let mut attribute_definitions = Vec::with_capacity(2);
    let mut key_schema = Vec::with_capacity(2);
    let key_types = [types::KeyType::Hash, types::KeyType::Range];
    for (definition, key_type) in input.key_definitions().zip(key_types) {
        attribute_definitions.push(
            types::AttributeDefinition::builder()
                .attribute_name(&definition.name)
                .attribute_type(definition.attribute_type.clone())
                .build()?,
        );
        key_schema.push(
            types::KeySchemaElement::builder()
                .attribute_name(&definition.name)
                .key_type(key_type)
                .build()?,
        );
    }
    Ok((attribute_definitions, key_schema))
}

#[async_trait]
impl Store for Client {
    async fn describe_table(&self, input: DescribeTable) -> Result<TableDescription> {
        let output = self
            .describe_table()
            .table_name(&input.table_name)
            .send()
            .await
            .map_err(|error| {
                map_sdk_error!(error, "DescribeTable", DescribeTableError, input.table_name)
            })?;
        Ok(table_description(output.table(), &input.table_name))
    }

    async fn create_table(&self, input: CreateTable) -> Result<TableDescription> {
        let (attribute_definitions, key_schema) = key_schema(&input)?;
        let builder = self
            .create_table()
            .table_name(&input.table_name)
            .set_attribute_definitions(Some(attribute_definitions))
            .set_key_schema(Some(key_schema));
        let builder = match input.throughput {
            Some(throughput) => builder
                .billing_mode(types::BillingMode::Provisioned)
                .provisioned_throughput(
                    types::ProvisionedThroughput::builder()
                        .read_capacity_units(throughput.read_capacity_units)
                        .write_capacity_units(throughput.write_capacity_units)
                        .build()?,
                ),
            None => builder.billing_mode(types::BillingMode::PayPerRequest),
        };
        let output = builder
            .send()
            .await
            .map_err(|error| {
                if matches!(
                    error.as_service_error(),
                    Some(CreateTableError::ResourceInUseException(_))
                ) {
                    Error::TableAlreadyExists {
                        table_name: input.table_name.clone(),
                    }
                } else if let Some(validation) =
                    error.as_service_error().and_then(validation_error)
                {
                    validation
                } else {
                    Error::sdk("CreateTable", error)
                }
            })?;
        Ok(table_description(
            output.table_description(),
            &input.table_name,
        ))
    }

    async fn get_item(&self, input: GetItemInput) -> Result<Option<common::Item>> {
        let output = self
            .get_item()
            .table_name(&input.table_name)
            .set_key(Some(input.key))
            .set_consistent_read(input.consistent_read)
            .send()
            .await
            .map_err(|error| map_sdk_error!(error, "GetItem", GetItemError, input.table_name))?;
        Ok(non_empty(output.item))
    }

    async fn put_item(&self, input: PutItemInput) -> Result<Option<common::Item>> {
        let output = self
            .put_item()
            .table_name(&input.table_name)
            .set_item(Some(input.item))
            .set_return_values(input.return_values)
            .send()
            .await
            .map_err(|error| map_sdk_error!(error, "PutItem", PutItemError, input.table_name))?;
        Ok(non_empty(output.attributes))
    }

    async fn query(&self, input: QueryInput) -> Result<Vec<common::Item>> {
        let (expression, names, values) = input.key_condition().into_parts();
        let mut paginator = self
            .query()
            .table_name(&input.table_name)
            .key_condition_expression(expression)
            .set_expression_attribute_names(names)
            .set_expression_attribute_values(values)
            .set_consistent_read(input.consistent_read)
            .set_limit(input.limit)
            .set_scan_index_forward(input.scan_index_forward)
            .into_paginator()
            .send();
        let mut items = Vec::new();
        while let Some(page) = paginator.next().await {
            let page =
                page.map_err(|error| map_sdk_error!(error, "Query", QueryError, input.table_name))?;
            items.extend(page.items.unwrap_or_default());
        }
        Ok(items)
    }

    async fn update_item(&self, input: UpdateItemInput) -> Result<Option<common::Item>> {
        let update_expression = input.update_expression();
        let mut builder = self
            .update_item()
            .table_name(&input.table_name)
            .set_key(Some(input.key))
            .set_return_values(input.return_values);
        if let Some(operation) = update_expression {
            let (expression, names, values) = operation.into_parts();
            builder = builder
                .update_expression(expression)
                .set_expression_attribute_names(names)
                .set_expression_attribute_values(values);
        }
        let output = builder.send().await.map_err(|error| {
            map_sdk_error!(error, "UpdateItem", UpdateItemError, input.table_name)
        })?;
        Ok(non_empty(output.attributes))
    }

    async fn delete_item(&self, input: DeleteItemInput) -> Result<Option<common::Item>> {
        let output = self
            .delete_item()
            .table_name(&input.table_name)
            .set_key(Some(input.key))
            .set_return_values(input.return_values)
            .send()
            .await
            .map_err(|error| {
                map_sdk_error!(error, "DeleteItem", DeleteItemError, input.table_name)
            })?;
        Ok(non_empty(output.attributes))
    }
}
