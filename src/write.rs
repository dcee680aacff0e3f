//! Write operations for modifying items in a table.
//!
//! Every write here is unconditional: the last request to arrive wins.
//! - `put_item` replaces a whole item
//! - `update_item` sets top-level attributes, creating the item if needed
//! - `delete_item` removes an item and can hand back what was there

/// Remove an item by primary key.
pub mod delete_item;

/// Create or replace a whole item.
pub mod put_item;

/// Set top-level attributes of an item.
pub mod update_item;
