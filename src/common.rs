//! Common utilities for record access.
//!
//! This module provides shared types used across read, write and admin operations,
//! including key handling, record shapes, and expression building.

/// Key types for identifying items in tables.
pub mod key;

/// Record shapes and the capability binding a record to its key and detail.
pub mod record;

use aws_sdk_dynamodb::types;
use std::collections;

/// A marshaled item: attribute names mapped to attribute values.
pub type Item = collections::HashMap<String, types::AttributeValue>;

pub(crate) fn name_placeholder(name: &str) -> String {
    format!("#{name}")
}

fn join_expression(left: String, separator: &str, right: String) -> String {
    if left.is_empty() {
        right
    } else if right.is_empty() {
        left
    } else {
        format!("{left}{separator}{right}")
    }
}

/// An expression with its name and value placeholders resolved.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ExpressionInput {
    pub(crate) expression: String,
    pub(crate) expression_attribute_names: collections::HashMap<String, String>,
    pub(crate) expression_attribute_values: Item,
}

impl ExpressionInput {
    /// `#name <operator> :value` with both placeholders registered.
    pub(crate) fn binary(
        name: &str,
        operator: &str,
        value_placeholder: String,
        value: types::AttributeValue,
    ) -> Self {
        let name_placeholder = name_placeholder(name);
        let expression = format!("{name_placeholder} {operator} {value_placeholder}");
        Self {
            expression,
            expression_attribute_names: collections::HashMap::from([(
                name_placeholder,
                name.to_string(),
            )]),
            expression_attribute_values: collections::HashMap::from([(value_placeholder, value)]),
        }
    }

    pub(crate) fn merge(separator: &str, items: Vec<Self>) -> Self {
        let mut operation = Self::default();
        for item in items {
            operation
                .expression_attribute_names
                .extend(item.expression_attribute_names);
            operation
                .expression_attribute_values
                .extend(item.expression_attribute_values);
            operation.expression =
                join_expression(operation.expression, separator, item.expression);
        }
        operation
    }

    /// Split into builder arguments. The store rejects empty placeholder maps.
    pub(crate) fn into_parts(
        self,
    ) -> (
        String,
        Option<collections::HashMap<String, String>>,
        Option<Item>,
    ) {
        let names = Some(self.expression_attribute_names).filter(|names| !names.is_empty());
        let values = Some(self.expression_attribute_values).filter(|values| !values.is_empty());
        (self.expression, names, values)
    }
}
