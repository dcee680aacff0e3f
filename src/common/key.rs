use crate::{Error, Result, common};

use aws_sdk_dynamodb::types;
use serde::Serialize;
use serde_dynamo::to_attribute_value;
use std::collections;

/// A single key attribute and its value.
///
/// ```rust
/// use dynamodb_records::common::key;
///
/// let key = key::Key {
///     name: "id".to_string(),
///     value: "1".to_string(),
/// };
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Key<T> {
    /// The attribute name of the key.
    pub name: String,
    /// The value of the key.
    pub value: T,
}

impl<T: Serialize> TryFrom<Key<T>> for common::Item {
    type Error = serde_dynamo::Error;

    fn try_from(key: Key<T>) -> serde_dynamo::Result<Self> {
        let value = to_attribute_value(key.value)?;
        Ok(collections::HashMap::from([(key.name, value)]))
    }
}

impl<T: Serialize> Key<T> {
    /// Marshal the key value.
    pub fn into_attribute_value(self) -> serde_dynamo::Result<Key<types::AttributeValue>> {
        let value = to_attribute_value(self.value)?;
        Ok(Key {
            name: self.name,
            value,
        })
    }
}

impl Key<types::AttributeValue> {
    /// Pick the named attribute out of a marshaled key or item.
    pub fn from_item(item: &common::Item, name: &str) -> Result<Self> {
        let value = item
            .get(name)
            .cloned()
            .ok_or_else(|| Error::MissingKeyAttribute(name.to_string()))?;
        Ok(Self {
            name: name.to_string(),
            value,
        })
    }
}

/// Definition of a key attribute in a table's key schema.
///
/// ```rust
/// use dynamodb_records::common::key;
///
/// let partition_key = key::KeyDefinition::string("id");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct KeyDefinition {
    /// The attribute name.
    pub name: String,
    /// The scalar type of the attribute (S, N or B).
    pub attribute_type: types::ScalarAttributeType,
}

impl KeyDefinition {
    /// A string-typed key attribute.
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute_type: types::ScalarAttributeType::S,
        }
    }

    /// A number-typed key attribute.
    pub fn number(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute_type: types::ScalarAttributeType::N,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case::string(
        Key {
            name: "a".to_string(),
            value: Value::String(
                "b".to_string()
            ),
        },
        collections::HashMap::from(
            [(
                "a".to_string(),
                types::AttributeValue::S(
                    "b".to_string()
                ),
            )]
        )
    )]
    #[case::number(
        Key {
            name: "a".to_string(),
            value: Value::Number(
                42.into()
            ),
        },
        collections::HashMap::from(
            [(
                "a".to_string(),
                types::AttributeValue::N(
                    "42".to_string()
                ),
            )]
        )
    )]
    fn test_key_to_item(#[case] key: Key<Value>, #[case] expected: common::Item) {
        let actual: common::Item = key.try_into().unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_from_item() {
        let item = collections::HashMap::from([
            ("id".to_string(), types::AttributeValue::S("a".to_string())),
            ("seq".to_string(), types::AttributeValue::N("1".to_string())),
        ]);
        let key = Key::from_item(&item, "id").unwrap();
        assert_eq!(
            key,
            Key {
                name: "id".to_string(),
                value: types::AttributeValue::S("a".to_string()),
            }
        );
    }

    #[test]
    fn test_from_item_missing_attribute() {
        let item = collections::HashMap::from([(
            "seq".to_string(),
            types::AttributeValue::N("1".to_string()),
        )]);
        let error = Key::from_item(&item, "id").unwrap_err();
        assert!(matches!(error, Error::MissingKeyAttribute(name) if name == "id"));
    }
}
