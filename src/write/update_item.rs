use crate::{Result, common, store::Store};

use aws_sdk_dynamodb::types;
use indexmap::IndexMap;
use serde::Serialize;
use serde_dynamo::{to_attribute_value, to_item};

/// Marshaled update item request, as handed to a [`Store`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateItemInput {
    /// The marshaled primary key.
    pub key: common::Item,
    /// Which attributes to return (`NONE`, `ALL_OLD` or `ALL_NEW`).
    pub return_values: Option<types::ReturnValue>,
    /// Top-level attributes to assign, in expression order.
    pub set: IndexMap<String, types::AttributeValue>,
    /// The name of the table to write to.
    pub table_name: String,
}

impl UpdateItemInput {
    /// The `SET #a = :set0, #b = :set1` expression, or `None` with no assignments.
    pub(crate) fn update_expression(&self) -> Option<common::ExpressionInput> {
        if self.set.is_empty() {
            return None;
        }
        let assignments = self
            .set
            .iter()
            .enumerate()
            .map(|(index, (name, value))| {
                common::ExpressionInput::binary(name, "=", format!(":set{index}"), value.clone())
            })
            .collect();
        let mut operation = common::ExpressionInput::merge(", ", assignments);
        operation.expression = format!("SET {}", operation.expression);
        Some(operation)
    }
}

/// Update item operation.
///
/// Assigns whole top-level attributes and leaves every other attribute untouched.
/// The item is created when the key does not exist yet.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::types::ReturnValue;
/// use dynamodb_records::{
///     common::record::{EntryDetail, EntryKey},
///     store::MemoryStore,
///     write,
/// };
/// use indexmap::IndexMap;
///
/// # async fn example(store: &MemoryStore) -> dynamodb_records::Result<()> {
/// let update_item = write::update_item::UpdateItem {
///     key: EntryKey::new("1"),
///     return_values: Some(ReturnValue::AllNew),
///     set: IndexMap::from([(
///         "i".to_string(),
///         EntryDetail {
///             value: "99".to_string(),
///             ..Default::default()
///         },
///     )]),
///     table_name: "Test".to_string(),
/// };
/// let updated = update_item.send(store).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateItem<K, T> {
    /// The primary key of the item to update.
    pub key: K,
    /// Which attributes to return in the response.
    pub return_values: Option<types::ReturnValue>,
    /// Top-level attributes to assign.
    pub set: IndexMap<String, T>,
    /// The name of the table to write to.
    pub table_name: String,
}

impl<K: Serialize, T: Serialize> TryFrom<UpdateItem<K, T>> for UpdateItemInput {
    type Error = serde_dynamo::Error;

    fn try_from(update_item: UpdateItem<K, T>) -> serde_dynamo::Result<Self> {
        let key = to_item(update_item.key)?;
        let mut set = IndexMap::with_capacity(update_item.set.len());
        for (name, value) in update_item.set {
            let value = to_attribute_value(value)?;
            set.insert(name, value);
        }
        let operation = Self {
            key,
            return_values: update_item.return_values,
            set,
            table_name: update_item.table_name,
        };
        Ok(operation)
    }
}

impl<K: Serialize, T: Serialize> UpdateItem<K, T> {
    /// Execute the update item operation.
    ///
    /// Returns the attributes selected by `return_values`, if any.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_records.update_item",
            skip_all,
            fields(table_name = %self.table_name),
            err
        )
    )]
    pub async fn send<S: Store + ?Sized>(self, store: &S) -> Result<Option<common::Item>> {
        let update_item: UpdateItemInput = self.try_into()?;
        store.update_item(update_item).await
    }
}
