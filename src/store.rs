//! The store collaborator.
//!
//! [`Store`] is the single seam between the record layer and the network. The
//! caller owns the implementation and hands it to every operation explicitly.
//! `aws_sdk_dynamodb::Client` implements it for the real service and
//! [`MemoryStore`] implements it in process.

/// `Store` implementation for the AWS SDK client.
mod dynamodb;

/// In-process store.
pub mod memory;

pub use memory::MemoryStore;

use crate::{
    Result,
    admin::{
        create_table::CreateTable,
        describe_table::{DescribeTable, TableDescription},
    },
    common,
    read::{get_item::GetItemInput, query::QueryInput},
    write::{delete_item::DeleteItemInput, put_item::PutItemInput, update_item::UpdateItemInput},
};

use async_trait::async_trait;
use std::sync::Arc;

/// A key-value store reachable through seven logical requests.
///
/// Every method is a single round trip. A missing table is reported as
/// [`crate::Error::TableNotFound`]; a missing item is not an error.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch the table's metadata.
    async fn describe_table(&self, input: DescribeTable) -> Result<TableDescription>;

    /// Provision a new table.
    async fn create_table(&self, input: CreateTable) -> Result<TableDescription>;

    /// Fetch one item by key; `None` when absent.
    async fn get_item(&self, input: GetItemInput) -> Result<Option<common::Item>>;

    /// Write an item, replacing any item with the same key.
    async fn put_item(&self, input: PutItemInput) -> Result<Option<common::Item>>;

    /// Fetch every item sharing a partition key, in sort-key order.
    async fn query(&self, input: QueryInput) -> Result<Vec<common::Item>>;

    /// Assign top-level attributes of an item, creating it when absent.
    async fn update_item(&self, input: UpdateItemInput) -> Result<Option<common::Item>>;

    /// Remove an item by key.
    async fn delete_item(&self, input: DeleteItemInput) -> Result<Option<common::Item>>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for Arc<S> {
    async fn describe_table(&self, input: DescribeTable) -> Result<TableDescription> {
        (**self).describe_table(input).await
    }

    async fn create_table(&self, input: CreateTable) -> Result<TableDescription> {
        (**self).create_table(input).await
    }

    async fn get_item(&self, input: GetItemInput) -> Result<Option<common::Item>> {
        (**self).get_item(input).await
    }

    async fn put_item(&self, input: PutItemInput) -> Result<Option<common::Item>> {
        (**self).put_item(input).await
    }

    async fn query(&self, input: QueryInput) -> Result<Vec<common::Item>> {
        (**self).query(input).await
    }

    async fn update_item(&self, input: UpdateItemInput) -> Result<Option<common::Item>> {
        (**self).update_item(input).await
    }

    async fn delete_item(&self, input: DeleteItemInput) -> Result<Option<common::Item>> {
        (**self).delete_item(input).await
    }
}
