use crate::{Result, common, store::Store};

use serde::Serialize;
use serde_dynamo::to_item;

/// Marshaled get item request, as handed to a [`Store`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetItemInput {
    /// Whether to use a strongly consistent read.
    pub consistent_read: Option<bool>,
    /// The marshaled primary key.
    pub key: common::Item,
    /// The name of the table to read from.
    pub table_name: String,
}

/// Get item operation.
///
/// ```rust,no_run
/// use dynamodb_records::{common::record::EntryKey, read, store::MemoryStore};
///
/// # async fn example(store: &MemoryStore) -> dynamodb_records::Result<()> {
/// let get_item = read::get_item::GetItem {
///     key: EntryKey::new("1"),
///     table_name: "Test".to_string(),
///     ..Default::default()
/// };
/// let item = get_item.send(store).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetItem<K> {
    /// Whether to use a consistent read.
    ///
    /// `true` for strongly consistent reads, `false` or `None` for eventually consistent reads.
    pub consistent_read: Option<bool>,
    /// The primary key of the item to retrieve.
    pub key: K,
    /// The name of the table to read from.
    pub table_name: String,
}

impl<K: Serialize> TryFrom<GetItem<K>> for GetItemInput {
    type Error = serde_dynamo::Error;

    fn try_from(get_item: GetItem<K>) -> serde_dynamo::Result<Self> {
        let key = to_item(get_item.key)?;
        let operation = Self {
            consistent_read: get_item.consistent_read,
            key,
            table_name: get_item.table_name,
        };
        Ok(operation)
    }
}

impl<K: Serialize> GetItem<K> {
    /// Execute the get item operation.
    ///
    /// Returns `Ok(None)` when no item matches the key.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_records.get_item",
            skip_all,
            fields(table_name = %self.table_name),
            err
        )
    )]
    pub async fn send<S: Store + ?Sized>(self, store: &S) -> Result<Option<common::Item>> {
        let get_item: GetItemInput = self.try_into()?;
        store.get_item(get_item).await
    }
}
