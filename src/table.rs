//! The typed table access layer.
//!
//! [`Table`] marshals records of one [`Record`] type into attribute values, issues
//! a single request per operation against its [`Store`], and unmarshals the
//! answer. It holds no record state between calls; the only thing it remembers
//! is whether the backing table has been checked.

use crate::{
    Error, Result,
    admin::{
        create_table::CreateTable,
        describe_table::{DescribeTable, TableDescription},
    },
    common::{self, key::Key, record::Record},
    config::TableConfig,
    read::{get_item::GetItem, query::QueryInput},
    store::Store,
    write::{delete_item::DeleteItem, put_item::PutItem, update_item::UpdateItem},
};

use aws_sdk_dynamodb::types;
use indexmap::IndexMap;
use serde_dynamo::{from_item, to_item};
use std::marker;
use tokio::{sync::OnceCell, time};

/// Outcome of [`Table::ensure_table`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TableState {
    /// The table was missing and has been created.
    Created,
    /// The table was already there.
    AlreadyExists,
}

/// A single table holding records of type `R`.
///
/// Every operation first makes sure the table exists, creating it on the first
/// call of this handle if the store reports it missing.
///
/// ```rust
/// use dynamodb_records::{
///     common::record::{Entry, EntryDetail},
///     config::TableConfig,
///     store::MemoryStore,
///     table::Table,
/// };
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> dynamodb_records::Result<()> {
/// let table: Table<_, Entry> = Table::new(MemoryStore::new(), TableConfig::default());
/// let entry = Entry {
///     id: "t0".to_string(),
///     detail: Some(EntryDetail {
///         name: "First Last".to_string(),
///         first: "First".to_string(),
///         last: "Last".to_string(),
///         value: "42".to_string(),
///     }),
/// };
/// table.put(&entry).await?;
/// assert_eq!(table.get(&entry.key()).await?, Some(entry));
/// # Ok(())
/// # }
/// ```
pub struct Table<S, R> {
    config: TableConfig,
    record: marker::PhantomData<fn() -> R>,
    state: OnceCell<TableState>,
    store: S,
}

impl<S: Store, R: Record> Table<S, R> {
    /// Create a handle. No request is issued until the first operation.
    pub fn new(store: S, config: TableConfig) -> Self {
        Self {
            config,
            record: marker::PhantomData,
            state: OnceCell::new(),
            store,
        }
    }

    /// The table configuration.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn table_name(&self) -> String {
        self.config.table_name.clone()
    }

    async fn describe(&self) -> Result<TableDescription> {
        DescribeTable {
            table_name: self.table_name(),
        }
        .send(&self.store)
        .await
    }

    /// Poll while the table is still being created.
    ///
    /// Any other status serves requests (`UPDATING` included), so it counts as ready.
    async fn wait_until_ready(&self, mut description: TableDescription) -> Result<()> {
        let deadline = time::Instant::now() + self.config.activation_timeout;
        while description.is_creating() {
            if time::Instant::now() >= deadline {
                return Err(Error::TableActivationTimeout {
                    table_name: self.table_name(),
                });
            }
            time::sleep(self.config.activation_poll_interval).await;
            description = self.describe().await?;
        }
        Ok(())
    }

    async fn check_table(&self) -> Result<TableState> {
        let (description, state) = match self.describe().await {
            Ok(description) => (description, TableState::AlreadyExists),
            Err(error) if error.is_table_not_found() => {
                match CreateTable::from(&self.config).send(&self.store).await {
                    Ok(description) => {
                        #[cfg(feature = "tracing")]
                        tracing::info!(table_name = %self.config.table_name, "table created");
                        (description, TableState::Created)
                    }
                    // Another writer created it between the describe and the create.
                    Err(Error::TableAlreadyExists { .. }) => {
                        (self.describe().await?, TableState::AlreadyExists)
                    }
                    Err(error) => return Err(error),
                }
            }
            Err(error) => return Err(error),
        };
        self.wait_until_ready(description).await?;
        Ok(state)
    }

    /// Make sure the table exists, creating it when the store reports it missing.
    ///
    /// The check runs once per handle; later calls return the first outcome.
    /// A failed check is retried on the next call. Failures other than the
    /// missing-table condition are returned unchanged.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_records.ensure_table",
            skip_all,
            fields(table_name = %self.config.table_name),
            err
        )
    )]
    pub async fn ensure_table(&self) -> Result<TableState> {
        self.state
            .get_or_try_init(|| self.check_table())
            .await
            .copied()
    }

    /// Write a record, replacing any record with the same key.
    pub async fn put(&self, record: &R) -> Result<()> {
        self.ensure_table().await?;
        PutItem {
            item: record,
            return_values: None,
            table_name: self.table_name(),
        }
        .send(&self.store)
        .await?;
        Ok(())
    }

    /// Read a record by key; `None` when no record has that key.
    pub async fn get(&self, key: &R::Key) -> Result<Option<R>> {
        self.ensure_table().await?;
        let item = GetItem {
            consistent_read: Some(self.config.consistent_read),
            key,
            table_name: self.table_name(),
        }
        .send(&self.store)
        .await?;
        match item {
            Some(item) => Ok(Some(from_item(item)?)),
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(table_name = %self.config.table_name, "record not found");
                Ok(None)
            }
        }
    }

    /// Every record sharing the key's partition value, in sort-key order.
    ///
    /// Only the partition attribute of `key` is used. An empty vector means no
    /// record matched.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_records.query_by_key",
            skip_all,
            fields(table_name = %self.config.table_name),
            err
        )
    )]
    pub async fn query_by_key(&self, key: &R::Key) -> Result<Vec<R>> {
        self.ensure_table().await?;
        let key: common::Item = to_item(key)?;
        let partition_key = Key::from_item(&key, &self.config.partition_key.name)?;
        let items = self
            .store
            .query(QueryInput {
                consistent_read: Some(self.config.consistent_read),
                limit: None,
                partition_key,
                scan_index_forward: None,
                table_name: self.table_name(),
            })
            .await?;
        items
            .into_iter()
            .map(|item| from_item(item).map_err(Error::from))
            .collect()
    }

    /// Replace the record's detail attribute and return the whole updated record.
    ///
    /// Other top-level attributes are left as they are. A record that does not
    /// exist yet is created from the key and the detail.
    pub async fn update_merge(&self, key: &R::Key, detail: &R::Detail) -> Result<R> {
        self.ensure_table().await?;
        let item = UpdateItem {
            key,
            return_values: Some(types::ReturnValue::AllNew),
            set: IndexMap::from([(R::DETAIL_ATTRIBUTE.to_string(), detail)]),
            table_name: self.table_name(),
        }
        .send(&self.store)
        .await?
        .ok_or_else(|| Error::service("UpdateItem", "the store returned no attributes"))?;
        Ok(from_item(item)?)
    }

    /// Delete a record by key, returning the record that was removed.
    ///
    /// `None` means no record had that key and nothing was deleted.
    pub async fn delete(&self, key: &R::Key) -> Result<Option<R>> {
        self.ensure_table().await?;
        let old = DeleteItem {
            key,
            return_values: Some(types::ReturnValue::AllOld),
            table_name: self.table_name(),
        }
        .send(&self.store)
        .await?;
        match old {
            Some(item) => Ok(Some(from_item(item)?)),
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(table_name = %self.config.table_name, "nothing deleted");
                Ok(None)
            }
        }
    }

    /// The store-reported number of records.
    ///
    /// This figure is approximate and eventually consistent: the service
    /// refreshes it periodically (about every six hours for DynamoDB), so it can
    /// lag recent puts and deletes. Do not use it for exact accounting.
    pub async fn count(&self) -> Result<i64> {
        self.ensure_table().await?;
        Ok(self.describe().await?.item_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::{
            key::KeyDefinition,
            record::{Entry, EntryDetail, EntryKey},
        },
        read::get_item::GetItemInput,
        store::MemoryStore,
        write::{
            delete_item::DeleteItemInput, put_item::PutItemInput, update_item::UpdateItemInput,
        },
    };

    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    /// Counts table creations and can misreport the table to its caller.
    #[derive(Default)]
    struct CountingStore {
        created: AtomicUsize,
        describes: AtomicUsize,
        inner: MemoryStore,
        /// The first describe creates the table and still answers "not found".
        lose_create_race: bool,
        /// Status reported in place of the real one.
        status: Option<types::TableStatus>,
    }

    impl CountingStore {
        fn with_status(status: types::TableStatus) -> Self {
            Self {
                status: Some(status),
                ..Default::default()
            }
        }

        fn report(&self, mut description: TableDescription) -> TableDescription {
            if let Some(status) = &self.status {
                description.status = status.clone();
            }
            description
        }
    }

    #[async_trait]
    impl Store for CountingStore {
        async fn describe_table(&self, input: DescribeTable) -> Result<TableDescription> {
            let first = self.describes.fetch_add(1, Ordering::SeqCst) == 0;
            if self.lose_create_race && first {
                let mut create = CreateTable::from(&TableConfig::default());
                create.table_name = input.table_name.clone();
                self.inner.create_table(create).await?;
                return Err(Error::TableNotFound {
                    table_name: input.table_name,
                });
            }
            let description = self.inner.describe_table(input).await?;
            Ok(self.report(description))
        }

        async fn create_table(&self, input: CreateTable) -> Result<TableDescription> {
            self.created.fetch_add(1, Ordering::SeqCst);
            let description = self.inner.create_table(input).await?;
            Ok(self.report(description))
        }

        async fn get_item(&self, input: GetItemInput) -> Result<Option<common::Item>> {
            self.inner.get_item(input).await
        }

        async fn put_item(&self, input: PutItemInput) -> Result<Option<common::Item>> {
            self.inner.put_item(input).await
        }

        async fn query(&self, input: QueryInput) -> Result<Vec<common::Item>> {
            self.inner.query(input).await
        }

        async fn update_item(&self, input: UpdateItemInput) -> Result<Option<common::Item>> {
            self.inner.update_item(input).await
        }

        async fn delete_item(&self, input: DeleteItemInput) -> Result<Option<common::Item>> {
            self.inner.delete_item(input).await
        }
    }

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    struct Event {
        id: String,
        seq: u32,
        #[serde(rename = "i", default, skip_serializing_if = "Option::is_none")]
        detail: Option<EntryDetail>,
    }

    #[derive(Serialize)]
    struct EventKey {
        id: String,
        seq: u32,
    }

    impl Record for Event {
        type Key = EventKey;
        type Detail = EntryDetail;
        const DETAIL_ATTRIBUTE: &'static str = "i";
    }

    fn entries() -> Table<MemoryStore, Entry> {
        Table::new(MemoryStore::new(), TableConfig::default())
    }

    fn detail(value: &str) -> EntryDetail {
        EntryDetail {
            name: "First Last".to_string(),
            first: "First".to_string(),
            last: "Last".to_string(),
            value: value.to_string(),
        }
    }

    fn entry(id: &str, value: &str) -> Entry {
        Entry {
            id: id.to_string(),
            detail: Some(detail(value)),
        }
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let table = entries();
        let record = entry("a", "1");
        table.put(&record).await.unwrap();
        assert_eq!(table.get(&record.key()).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_put_without_detail() {
        let table = entries();
        let record = Entry {
            id: "a".to_string(),
            detail: None,
        };
        table.put(&record).await.unwrap();
        assert_eq!(table.get(&record.key()).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let table = entries();
        table.put(&entry("a", "1")).await.unwrap();
        table.put(&entry("a", "2")).await.unwrap();
        assert_eq!(
            table.get(&EntryKey::new("a")).await.unwrap(),
            Some(entry("a", "2"))
        );
        assert_eq!(table.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_unknown_key() {
        let table = entries();
        assert_eq!(table.get(&EntryKey::new("missing")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_empty_key_is_an_error() {
        let table = entries();
        let error = table.get(&EntryKey::new("")).await.unwrap_err();
        assert!(matches!(error, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_merge_preserves_key() {
        let table = entries();
        table.put(&entry("a", "1")).await.unwrap();
        let updated = table
            .update_merge(&EntryKey::new("a"), &detail("2"))
            .await
            .unwrap();
        assert_eq!(updated, entry("a", "2"));
        assert_eq!(
            table.get(&EntryKey::new("a")).await.unwrap(),
            Some(entry("a", "2"))
        );
    }

    #[tokio::test]
    async fn test_update_merge_creates_missing_record() {
        let table = entries();
        let updated = table
            .update_merge(&EntryKey::new("a"), &detail("1"))
            .await
            .unwrap();
        assert_eq!(updated, entry("a", "1"));
        assert_eq!(table.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_merge_leaves_other_attributes() {
        let table: Table<MemoryStore, Event> = Table::new(
            MemoryStore::new(),
            TableConfig {
                sort_key: Some(KeyDefinition::number("seq")),
                ..Default::default()
            },
        );
        let key = EventKey {
            id: "a".to_string(),
            seq: 7,
        };
        table
            .put(&Event {
                id: "a".to_string(),
                seq: 7,
                detail: None,
            })
            .await
            .unwrap();
        let updated = table.update_merge(&key, &detail("1")).await.unwrap();
        assert_eq!(
            updated,
            Event {
                id: "a".to_string(),
                seq: 7,
                detail: Some(detail("1")),
            }
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let table = entries();
        let record = entry("a", "1");
        table.put(&record).await.unwrap();
        assert_eq!(table.delete(&record.key()).await.unwrap(), Some(record.clone()));
        assert_eq!(table.get(&record.key()).await.unwrap(), None);
        assert_eq!(table.delete(&record.key()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_query_by_key() {
        let table: Table<MemoryStore, Event> = Table::new(
            MemoryStore::new(),
            TableConfig {
                sort_key: Some(KeyDefinition::number("seq")),
                ..Default::default()
            },
        );
        for (id, seq) in [("A", 2), ("B", 1), ("A", 1)] {
            table
                .put(&Event {
                    id: id.to_string(),
                    seq,
                    detail: None,
                })
                .await
                .unwrap();
        }
        let key = |id: &str| EventKey {
            id: id.to_string(),
            seq: 0,
        };
        let a = table.query_by_key(&key("A")).await.unwrap();
        assert_eq!(
            a.iter().map(|event| event.seq).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(table.query_by_key(&key("B")).await.unwrap().len(), 1);
        assert!(table.query_by_key(&key("C")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_by_key_without_sort_key() {
        let table = entries();
        table.put(&entry("a", "1")).await.unwrap();
        table.put(&entry("b", "2")).await.unwrap();
        assert_eq!(
            table.query_by_key(&EntryKey::new("a")).await.unwrap(),
            vec![entry("a", "1")]
        );
    }

    #[tokio::test]
    async fn test_query_by_key_rejects_undecodable_items() {
        let table = entries();
        table.ensure_table().await.unwrap();
        table
            .store()
            .put_item(PutItemInput {
                item: common::Item::from([
                    ("id".to_string(), types::AttributeValue::S("a".to_string())),
                    ("i".to_string(), types::AttributeValue::N("1".to_string())),
                ]),
                table_name: table.config().table_name.clone(),
                ..Default::default()
            })
            .await
            .unwrap();
        let error = table.query_by_key(&EntryKey::new("a")).await.unwrap_err();
        assert!(matches!(error, Error::Marshal(_)));
    }

    #[tokio::test]
    async fn test_table_created_once() {
        let store = Arc::new(CountingStore::default());
        let table: Table<_, Entry> = Table::new(store.clone(), TableConfig::default());
        assert_eq!(table.count().await.unwrap(), 0);
        table.put(&entry("a", "1")).await.unwrap();
        assert_eq!(table.ensure_table().await.unwrap(), TableState::Created);
        assert_eq!(store.created.load(Ordering::SeqCst), 1);

        let again: Table<_, Entry> = Table::new(store.clone(), TableConfig::default());
        assert_eq!(again.ensure_table().await.unwrap(), TableState::AlreadyExists);
        assert_eq!(again.get(&EntryKey::new("a")).await.unwrap(), Some(entry("a", "1")));
        assert_eq!(store.created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_activation_timeout() {
        let table: Table<_, Entry> = Table::new(
            CountingStore::with_status(types::TableStatus::Creating),
            TableConfig {
                activation_poll_interval: Duration::from_millis(1),
                activation_timeout: Duration::from_millis(20),
                ..Default::default()
            },
        );
        let error = table.ensure_table().await.unwrap_err();
        assert!(matches!(error, Error::TableActivationTimeout { .. }));
        assert_eq!(table.store().created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_updating_table_is_ready() {
        let store = CountingStore::with_status(types::TableStatus::Updating);
        store
            .inner
            .create_table(CreateTable::from(&TableConfig::default()))
            .await
            .unwrap();
        let table: Table<_, Entry> = Table::new(
            store,
            TableConfig {
                activation_poll_interval: Duration::from_millis(1),
                activation_timeout: Duration::from_millis(20),
                ..Default::default()
            },
        );
        assert_eq!(table.get(&EntryKey::new("a")).await.unwrap(), None);
        assert_eq!(table.ensure_table().await.unwrap(), TableState::AlreadyExists);
        assert_eq!(table.store().created.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_existing_table_still_creating_is_awaited() {
        let store = CountingStore::with_status(types::TableStatus::Creating);
        store
            .inner
            .create_table(CreateTable::from(&TableConfig::default()))
            .await
            .unwrap();
        let table: Table<_, Entry> = Table::new(
            store,
            TableConfig {
                activation_poll_interval: Duration::from_millis(1),
                activation_timeout: Duration::from_millis(20),
                ..Default::default()
            },
        );
        let error = table.ensure_table().await.unwrap_err();
        assert!(matches!(error, Error::TableActivationTimeout { .. }));
    }

    #[tokio::test]
    async fn test_lost_create_race_is_already_exists() {
        let store = CountingStore {
            lose_create_race: true,
            ..Default::default()
        };
        let table: Table<_, Entry> = Table::new(store, TableConfig::default());
        assert_eq!(table.ensure_table().await.unwrap(), TableState::AlreadyExists);
        assert_eq!(table.store().created.load(Ordering::SeqCst), 1);
        table.put(&entry("a", "1")).await.unwrap();
        assert_eq!(table.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_scenario() {
        let table = entries();
        let key = EntryKey::new("t0");
        let record = entry("t0", "42");
        table.put(&record).await.unwrap();
        assert_eq!(table.get(&key).await.unwrap(), Some(record));
        let updated = table.update_merge(&key, &detail("99")).await.unwrap();
        assert_eq!(updated.id, "t0");
        assert_eq!(
            updated.detail.map(|detail| detail.value),
            Some("99".to_string())
        );
        table.delete(&key).await.unwrap();
        assert_eq!(table.get(&key).await.unwrap(), None);
    }
}
