use crate::{Result, common, store::Store};

use aws_sdk_dynamodb::types;
use serde::Serialize;
use serde_dynamo::to_item;

/// Marshaled delete item request, as handed to a [`Store`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeleteItemInput {
    /// The marshaled primary key.
    pub key: common::Item,
    /// Which previous attributes to return (`NONE` or `ALL_OLD`).
    pub return_values: Option<types::ReturnValue>,
    /// The name of the table to delete from.
    pub table_name: String,
}

/// Delete item operation.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::types::ReturnValue;
/// use dynamodb_records::{common::record::EntryKey, store::MemoryStore, write};
///
/// # async fn example(store: &MemoryStore) -> dynamodb_records::Result<()> {
/// let delete_item = write::delete_item::DeleteItem {
///     key: EntryKey::new("1"),
///     return_values: Some(ReturnValue::AllOld),
///     table_name: "Test".to_string(),
/// };
/// let deleted = delete_item.send(store).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeleteItem<K> {
    /// The primary key of the item to delete.
    pub key: K,
    /// Which previous attributes to return.
    ///
    /// With `ReturnValue::AllOld`, `None` in the result means nothing was deleted.
    pub return_values: Option<types::ReturnValue>,
    /// The name of the table to delete from.
    pub table_name: String,
}

impl<K: Serialize> TryFrom<DeleteItem<K>> for DeleteItemInput {
    type Error = serde_dynamo::Error;

    fn try_from(delete_item: DeleteItem<K>) -> serde_dynamo::Result<Self> {
        let key = to_item(delete_item.key)?;
        let operation = Self {
            key,
            return_values: delete_item.return_values,
            table_name: delete_item.table_name,
        };
        Ok(operation)
    }
}

impl<K: Serialize> DeleteItem<K> {
    /// Execute the delete item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_records.delete_item",
            skip_all,
            fields(table_name = %self.table_name),
            err
        )
    )]
    pub async fn send<S: Store + ?Sized>(self, store: &S) -> Result<Option<common::Item>> {
        let delete_item: DeleteItemInput = self.try_into()?;
        store.delete_item(delete_item).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::{Value, json};
    use std::collections;

    #[rstest]
    #[case::empty(
        DeleteItem {
            key: json!(
                {
                    "a": "b"
                }
            ),
            table_name: "c".to_string(),
            ..Default::default()
        },
        DeleteItemInput {
            key: collections::HashMap::from(
                [
                    (
                        "a".to_string(),
                        types::AttributeValue::S(
                            "b".to_string()
                        )
                    ),
                ]
            ),
            table_name: "c".to_string(),
            ..Default::default()
        }
    )]
    #[case::all_old(
        DeleteItem {
            key: json!(
                {
                    "a": 1
                }
            ),
            return_values: Some(
                types::ReturnValue::AllOld
            ),
            table_name: "b".to_string(),
        },
        DeleteItemInput {
            key: collections::HashMap::from(
                [
                    (
                        "a".to_string(),
                        types::AttributeValue::N(
                            "1".to_string()
                        )
                    ),
                ]
            ),
            return_values: Some(
                types::ReturnValue::AllOld
            ),
            table_name: "b".to_string(),
        }
    )]
    fn test_delete_item(#[case] args: DeleteItem<Value>, #[case] expected: DeleteItemInput) {
        let actual: DeleteItemInput = args.try_into().unwrap();
        assert_eq!(actual, expected);
    }
}
