use crate::{Result, common, store::Store};

use aws_sdk_dynamodb::types;
use serde::Serialize;
use serde_dynamo::to_item;

/// Marshaled put item request, as handed to a [`Store`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PutItemInput {
    /// The marshaled item, key attributes included.
    pub item: common::Item,
    /// Which previous attributes to return (`NONE` or `ALL_OLD`).
    pub return_values: Option<types::ReturnValue>,
    /// The name of the table to write to.
    pub table_name: String,
}

/// Put item operation.
///
/// The write is unconditional: an existing item with the same key is replaced.
///
/// ```rust,no_run
/// use dynamodb_records::{common::record::Entry, store::MemoryStore, write};
///
/// # async fn example(store: &MemoryStore) -> dynamodb_records::Result<()> {
/// let put_item = write::put_item::PutItem {
///     item: Entry {
///         id: "1".to_string(),
///         detail: None,
///     },
///     table_name: "Test".to_string(),
///     ..Default::default()
/// };
/// put_item.send(store).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PutItem<T> {
    /// The item to put into the table.
    pub item: T,
    /// Which previous attributes to return.
    ///
    /// `ReturnValue::AllOld` returns the replaced item, if any.
    pub return_values: Option<types::ReturnValue>,
    /// The name of the table to write to.
    pub table_name: String,
}

impl<T: Serialize> TryFrom<PutItem<T>> for PutItemInput {
    type Error = serde_dynamo::Error;

    fn try_from(put_item: PutItem<T>) -> serde_dynamo::Result<Self> {
        let item = to_item(put_item.item)?;
        let operation = Self {
            item,
            return_values: put_item.return_values,
            table_name: put_item.table_name,
        };
        Ok(operation)
    }
}

impl<T: Serialize> PutItem<T> {
    /// Execute the put item operation.
    ///
    /// Returns the replaced item when it was requested and existed.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_records.put_item",
            skip_all,
            fields(table_name = %self.table_name),
            err
        )
    )]
    pub async fn send<S: Store + ?Sized>(self, store: &S) -> Result<Option<common::Item>> {
        let put_item: PutItemInput = self.try_into()?;
        store.put_item(put_item).await
    }
}
