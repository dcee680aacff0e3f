use crate::{Result, store::Store};

use aws_sdk_dynamodb::types;

/// What the store reports about a table.
#[derive(Clone, Debug, PartialEq)]
pub struct TableDescription {
    /// Number of items in the table.
    ///
    /// The store refreshes this figure asynchronously, so it is approximate and
    /// may lag recent writes and deletes.
    pub item_count: i64,
    /// The lifecycle status of the table.
    pub status: types::TableStatus,
    /// The name of the table.
    pub table_name: String,
}

impl TableDescription {
    /// Whether the table accepts reads and writes.
    pub fn is_active(&self) -> bool {
        self.status == types::TableStatus::Active
    }

    /// Whether the table is still being created and cannot serve requests yet.
    pub fn is_creating(&self) -> bool {
        self.status == types::TableStatus::Creating
    }
}

/// Describe table operation.
///
/// Fails with [`crate::Error::TableNotFound`] when the table does not exist.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct DescribeTable {
    /// The name of the table to describe.
    pub table_name: String,
}

impl DescribeTable {
    /// Execute the describe table operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_records.describe_table", skip(store), err)
    )]
    pub async fn send<S: Store + ?Sized>(self, store: &S) -> Result<TableDescription> {
        store.describe_table(self).await
    }
}
