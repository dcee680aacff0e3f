use crate::{Result, common, store::Store};

use aws_sdk_dynamodb::types;
use serde::Serialize;

/// Marshaled query request, as handed to a [`Store`].
#[derive(Clone, Debug, PartialEq)]
pub struct QueryInput {
    /// Whether to use a strongly consistent read.
    pub consistent_read: Option<bool>,
    /// The maximum number of items evaluated per page.
    pub limit: Option<i32>,
    /// The partition key every returned item must match.
    pub partition_key: common::key::Key<types::AttributeValue>,
    /// Whether to return items in ascending sort-key order.
    pub scan_index_forward: Option<bool>,
    /// The name of the table to query.
    pub table_name: String,
}

impl QueryInput {
    /// The `#name = :name_eq0` key condition for the partition key.
    pub(crate) fn key_condition(&self) -> common::ExpressionInput {
        let name = &self.partition_key.name;
        let value_placeholder = format!(":{name}_eq0");
        common::ExpressionInput::binary(
            name,
            "=",
            value_placeholder,
            self.partition_key.value.clone(),
        )
    }
}

/// Query operation.
///
/// ```rust,no_run
/// use dynamodb_records::{common, read, store::MemoryStore};
///
/// # async fn example(store: &MemoryStore) -> dynamodb_records::Result<()> {
/// let query = read::query::Query {
///     partition_key: common::key::Key {
///         name: "id".to_string(),
///         value: "1".to_string(),
///     },
///     table_name: "Test".to_string(),
///     ..Default::default()
/// };
/// let items = query.send(store).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query<T> {
    /// Whether to use a consistent read.
    pub consistent_read: Option<bool>,
    /// The maximum number of items to evaluate per page.
    ///
    /// Every page is still collected; this only bounds each round trip.
    pub limit: Option<i32>,
    /// The partition key value to query for.
    pub partition_key: common::key::Key<T>,
    /// Whether to scan the index forward (ascending) or backward (descending).
    pub scan_index_forward: Option<bool>,
    /// The name of the table to query.
    pub table_name: String,
}

impl<T: Serialize> TryFrom<Query<T>> for QueryInput {
    type Error = serde_dynamo::Error;

    fn try_from(query: Query<T>) -> serde_dynamo::Result<Self> {
        let partition_key = query.partition_key.into_attribute_value()?;
        let operation = Self {
            consistent_read: query.consistent_read,
            limit: query.limit,
            partition_key,
            scan_index_forward: query.scan_index_forward,
            table_name: query.table_name,
        };
        Ok(operation)
    }
}

impl<T: Serialize> Query<T> {
    /// Execute the query operation, collecting every page.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_records.query",
            skip_all,
            fields(table_name = %self.table_name),
            err
        )
    )]
    pub async fn send<S: Store + ?Sized>(self, store: &S) -> Result<Vec<common::Item>> {
        let query: QueryInput = self.try_into()?;
        store.query(query).await
    }
}
