use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// A record type that can be stored in a table.
///
/// The associated types replace untyped "any shape" arguments: a table of `R`
/// only accepts `R::Key` for lookups and `R::Detail` for merges.
pub trait Record: Serialize + DeserializeOwned {
    /// The key shape; marshals to a map holding the key attributes.
    type Key: Serialize;
    /// The nested detail shape merged by [`crate::table::Table::update_merge`].
    type Detail: Serialize;
    /// The top-level attribute holding the detail.
    const DETAIL_ATTRIBUTE: &'static str;
}

/// Key of an [`Entry`].
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct EntryKey {
    /// The partition key value.
    pub id: String,
}

impl EntryKey {
    /// Create a key from an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Detail fields of an [`Entry`], stored as a nested map.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EntryDetail {
    /// Display name.
    #[serde(rename = "n")]
    pub name: String,
    /// First name.
    #[serde(rename = "f")]
    pub first: String,
    /// Last name.
    #[serde(rename = "l")]
    pub last: String,
    /// Free-form value.
    #[serde(rename = "v")]
    pub value: String,
}

/// A record identified by `id` with an optional nested detail.
///
/// Marshals as `{"id": S, "i": M}`; an absent detail is omitted.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Entry {
    /// The partition key value.
    pub id: String,
    /// The nested detail.
    #[serde(rename = "i", default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<EntryDetail>,
}

impl Entry {
    /// The key identifying this entry.
    pub fn key(&self) -> EntryKey {
        EntryKey::new(self.id.clone())
    }
}

impl Record for Entry {
    type Key = EntryKey;
    type Detail = EntryDetail;
    const DETAIL_ATTRIBUTE: &'static str = "i";
}
