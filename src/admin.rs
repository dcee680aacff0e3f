//! Table administration operations.
//!
//! This module provides operations for managing the table itself:
//! - Creating a table with its key schema and capacity
//! - Describing a table's status and approximate item count

/// Create table operation.
pub mod create_table;

/// Describe table operation.
pub mod describe_table;
