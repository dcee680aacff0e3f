#![deny(missing_docs)]
#![deny(warnings)]

//! # DynamoDB Records
//!
//! A typed, single-table record access layer for Amazon DynamoDB.
//!
//! ## Overview
//!
//! A [`table::Table`] is bound to one table and one [`common::record::Record`] type. It:
//! - Creates the table on first use when the store reports it missing
//! - Marshals records to attribute maps with `serde_dynamo` and back
//! - Reports a missing record as `None`, never as an error
//! - Returns the previous record from a delete, so "nothing deleted" is observable
//!
//! Requests are plain structs that convert into marshaled `*Input` values handed to a
//! [`store::Store`]. The store is an injected collaborator: the AWS SDK client in
//! production, [`store::MemoryStore`] in tests.
//!
//! ## Quick Example
//!
//! ```rust
//! use dynamodb_records::{
//!     common::record::{Entry, EntryDetail, EntryKey},
//!     config::TableConfig,
//!     store::MemoryStore,
//!     table::Table,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> dynamodb_records::Result<()> {
//! let table: Table<_, Entry> = Table::new(MemoryStore::new(), TableConfig::new("Test"));
//! let key = EntryKey::new("t0");
//! let detail = EntryDetail {
//!     name: "First Last".to_string(),
//!     first: "First".to_string(),
//!     last: "Last".to_string(),
//!     value: "42".to_string(),
//! };
//! // Creates the record from the key and the detail.
//! let entry = table.update_merge(&key, &detail).await?;
//! assert_eq!(table.query_by_key(&key).await?, vec![entry.clone()]);
//! assert_eq!(table.delete(&key).await?, Some(entry));
//! assert_eq!(table.delete(&key).await?, None);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`mod@admin`] - Table management (CreateTable, DescribeTable)
//! - [`mod@common`] - Keys, records and expression placeholders
//! - [`mod@config`] - Client and table configuration
//! - [`mod@read`] - Read operations (GetItem, Query)
//! - [`mod@store`] - The store seam and its implementations
//! - [`mod@table`] - The typed table access layer
//! - [`mod@write`] - Write operations (PutItem, UpdateItem, DeleteItem)
//!
//! ## Features
//!
//! - `tracing` - instrument every operation with `tracing` spans
//! - `cli` - build the `dynamodb-records` demo binary

/// Table management operations.
pub mod admin;

/// Keys, records and expression placeholders shared by every operation.
pub mod common;

pub mod config;

mod error;

pub use error::{Error, Result};

/// Read operations for retrieving items.
///
/// This module provides operations for:
/// - Getting individual items by key
/// - Querying every item of a partition
pub mod read;

pub mod store;

pub mod table;

/// Write operations for modifying items.
///
/// This module provides operations for:
/// - Putting new items or replacing existing ones
/// - Setting top-level attributes of an item
/// - Deleting items by key
pub mod write;
