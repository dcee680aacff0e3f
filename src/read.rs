//! Read operations for retrieving items from a table.
//!
//! This module provides operations for reading data:
//! - Getting individual items by primary key
//! - Querying items sharing a partition key

/// Get item operation for retrieving a single item by primary key.
pub mod get_item;

/// Query operation for retrieving items by partition key.
pub mod query;
