use crate::{
    Error, Result,
    admin::{
        create_table::CreateTable,
        describe_table::{DescribeTable, TableDescription},
    },
    common::{self, key::KeyDefinition},
    read::{get_item::GetItemInput, query::QueryInput},
    store::Store,
    write::{delete_item::DeleteItemInput, put_item::PutItemInput, update_item::UpdateItemInput},
};

use async_trait::async_trait;
use aws_sdk_dynamodb::types;
use bigdecimal::BigDecimal;
use std::{collections, sync};

#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
enum ScalarKey {
    B(Vec<u8>),
    /// Compared exactly, so keys differing past `f64` precision stay distinct.
    N(BigDecimal),
    S(String),
}

impl ScalarKey {
    fn parse(definition: &KeyDefinition, value: &types::AttributeValue) -> Result<Self> {
        let name = &definition.name;
        match (&definition.attribute_type, value) {
            (types::ScalarAttributeType::S, types::AttributeValue::S(value)) if !value.is_empty() => {
                Ok(Self::S(value.clone()))
            }
            (types::ScalarAttributeType::N, types::AttributeValue::N(value)) => value
                .parse::<BigDecimal>()
                .map(Self::N)
                .map_err(|_| {
                    Error::Validation(format!("key attribute '{name}' is not a valid number"))
                }),
            (types::ScalarAttributeType::B, types::AttributeValue::B(value))
                if !value.as_ref().is_empty() =>
            {
                Ok(Self::B(value.as_ref().to_vec()))
            }
            _ => Err(Error::Validation(format!(
                "key attribute '{name}' is empty or does not match the key schema type"
            ))),
        }
    }
}

type PrimaryKey = (ScalarKey, Option<ScalarKey>);

#[derive(Debug)]
struct MemoryTable {
    items: collections::BTreeMap<PrimaryKey, common::Item>,
    partition_key: KeyDefinition,
    sort_key: Option<KeyDefinition>,
}

impl MemoryTable {
    fn is_key_attribute(&self, name: &str) -> bool {
        self.partition_key.name == name
            || self
                .sort_key
                .as_ref()
                .is_some_and(|sort_key| sort_key.name == name)
    }

    fn key_attribute(definition: &KeyDefinition, item: &common::Item) -> Result<ScalarKey> {
        let value = item.get(&definition.name).ok_or_else(|| {
            Error::Validation(format!("missing key attribute '{}'", definition.name))
        })?;
        ScalarKey::parse(definition, value)
    }

    /// The primary key of a full item.
    fn item_key(&self, item: &common::Item) -> Result<PrimaryKey> {
        let partition = Self::key_attribute(&self.partition_key, item)?;
        let sort = self
            .sort_key
            .as_ref()
            .map(|sort_key| Self::key_attribute(sort_key, item))
            .transpose()?;
        Ok((partition, sort))
    }

    /// The primary key of a key map, which must hold nothing but key attributes.
    fn exact_key(&self, key: &common::Item) -> Result<PrimaryKey> {
        let expected = 1 + usize::from(self.sort_key.is_some());
        if key.len() != expected {
            return Err(Error::Validation(
                "the provided key does not match the key schema".to_string(),
            ));
        }
        self.item_key(key)
    }

    fn description(&self, table_name: &str) -> TableDescription {
        TableDescription {
            item_count: self.items.len() as i64,
            status: types::TableStatus::Active,
            table_name: table_name.to_string(),
        }
    }
}

fn only_none_or_all_old(return_values: Option<&types::ReturnValue>) -> Result<bool> {
    match return_values {
        None | Some(types::ReturnValue::None) => Ok(false),
        Some(types::ReturnValue::AllOld) => Ok(true),
        Some(other) => Err(Error::Validation(format!(
            "return values {other:?} is not supported here; use NONE or ALL_OLD"
        ))),
    }
}

fn select_attributes(item: &common::Item, names: &[&String]) -> common::Item {
    names
        .iter()
        .filter_map(|name| {
            item.get(*name)
                .map(|value| ((*name).clone(), value.clone()))
        })
        .collect()
}

/// An in-process [`Store`].
///
/// Behaves like the real service for every request this crate issues: missing
/// tables fail with [`Error::TableNotFound`], keys are validated against the key
/// schema, and items within a partition are kept in sort-key order. The item
/// count it reports is exact.
///
/// ```rust
/// use dynamodb_records::store::MemoryStore;
///
/// let store = MemoryStore::new();
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: sync::Mutex<collections::HashMap<String, MemoryTable>>,
}

impl MemoryStore {
    /// Create an empty store with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_table<T>(
        &self,
        table_name: &str,
        operation: impl FnOnce(&mut MemoryTable) -> Result<T>,
    ) -> Result<T> {
        let mut tables = self
            .tables
            .lock()
            .unwrap_or_else(sync::PoisonError::into_inner);
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| Error::TableNotFound {
                table_name: table_name.to_string(),
            })?;
        operation(table)
    }

    fn describe(&self, input: DescribeTable) -> Result<TableDescription> {
        self.with_table(&input.table_name, |table| {
            Ok(table.description(&input.table_name))
        })
    }

    fn create(&self, input: CreateTable) -> Result<TableDescription> {
        let mut tables = self
            .tables
            .lock()
            .unwrap_or_else(sync::PoisonError::into_inner);
        match tables.entry(input.table_name) {
            collections::hash_map::Entry::Occupied(entry) => Err(Error::TableAlreadyExists {
                table_name: entry.key().clone(),
            }),
            collections::hash_map::Entry::Vacant(entry) => {
                let table_name = entry.key().clone();
                let table = entry.insert(MemoryTable {
                    items: collections::BTreeMap::new(),
                    partition_key: input.partition_key,
                    sort_key: input.sort_key,
                });
                Ok(table.description(&table_name))
            }
        }
    }

    fn get(&self, input: GetItemInput) -> Result<Option<common::Item>> {
        self.with_table(&input.table_name, |table| {
            let key = table.exact_key(&input.key)?;
            Ok(table.items.get(&key).cloned())
        })
    }

    fn put(&self, input: PutItemInput) -> Result<Option<common::Item>> {
        let return_old = only_none_or_all_old(input.return_values.as_ref())?;
        self.with_table(&input.table_name, |table| {
            let key = table.item_key(&input.item)?;
            let old = table.items.insert(key, input.item);
            Ok(old.filter(|_| return_old))
        })
    }

    fn query_items(&self, input: QueryInput) -> Result<Vec<common::Item>> {
        self.with_table(&input.table_name, |table| {
            if input.partition_key.name != table.partition_key.name {
                return Err(Error::Validation(format!(
                    "query condition missed key schema element: {}",
                    table.partition_key.name
                )));
            }
            let partition = ScalarKey::parse(&table.partition_key, &input.partition_key.value)?;
            let mut items: Vec<_> = table
                .items
                .range((partition.clone(), None)..)
                .take_while(|((item_partition, _), _)| *item_partition == partition)
                .map(|(_, item)| item.clone())
                .collect();
            if input.scan_index_forward == Some(false) {
                items.reverse();
            }
            Ok(items)
        })
    }

    fn update(&self, input: UpdateItemInput) -> Result<Option<common::Item>> {
        self.with_table(&input.table_name, |table| {
            let key = table.exact_key(&input.key)?;
            if let Some(name) = input.set.keys().find(|name| table.is_key_attribute(name)) {
                return Err(Error::Validation(format!(
                    "cannot update attribute {name}; this attribute is part of the key"
                )));
            }
            let old = table.items.get(&key).cloned();
            let item = table
                .items
                .entry(key)
                .or_insert_with(|| input.key.clone());
            for (name, value) in &input.set {
                item.insert(name.clone(), value.clone());
            }
            let updated: Vec<_> = input.set.keys().collect();
            let attributes = match input.return_values {
                None | Some(types::ReturnValue::None) => None,
                Some(types::ReturnValue::AllOld) => old,
                Some(types::ReturnValue::AllNew) => Some(item.clone()),
                Some(types::ReturnValue::UpdatedOld) => old
                    .as_ref()
                    .map(|old| select_attributes(old, &updated)),
                Some(types::ReturnValue::UpdatedNew) => Some(select_attributes(item, &updated)),
                Some(other) => {
                    return Err(Error::Validation(format!(
                        "return values {other:?} is not supported"
                    )));
                }
            };
            Ok(attributes.filter(|attributes| !attributes.is_empty()))
        })
    }

    fn delete(&self, input: DeleteItemInput) -> Result<Option<common::Item>> {
        let return_old = only_none_or_all_old(input.return_values.as_ref())?;
        self.with_table(&input.table_name, |table| {
            let key = table.exact_key(&input.key)?;
            let old = table.items.remove(&key);
            Ok(old.filter(|_| return_old))
        })
    }

    /// Every item of a table, in key order.
    pub fn items(&self, table_name: &str) -> Result<Vec<common::Item>> {
        self.with_table(table_name, |table| Ok(table.items.values().cloned().collect()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn describe_table(&self, input: DescribeTable) -> Result<TableDescription> {
        self.describe(input)
    }

    async fn create_table(&self, input: CreateTable) -> Result<TableDescription> {
        self.create(input)
    }

    async fn get_item(&self, input: GetItemInput) -> Result<Option<common::Item>> {
        self.get(input)
    }

    async fn put_item(&self, input: PutItemInput) -> Result<Option<common::Item>> {
        self.put(input)
    }

    async fn query(&self, input: QueryInput) -> Result<Vec<common::Item>> {
        self.query_items(input)
    }

    async fn update_item(&self, input: UpdateItemInput) -> Result<Option<common::Item>> {
        self.update(input)
    }

    async fn delete_item(&self, input: DeleteItemInput) -> Result<Option<common::Item>> {
        self.delete(input)
    }
}
