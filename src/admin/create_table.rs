use crate::{
    Result,
    admin::describe_table::TableDescription,
    common::key::KeyDefinition,
    config::TableConfig,
    store::Store,
};

/// Provisioned read and write capacity.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Throughput {
    /// Read capacity units.
    pub read_capacity_units: i64,
    /// Write capacity units.
    pub write_capacity_units: i64,
}

impl Default for Throughput {
    fn default() -> Self {
        Self {
            read_capacity_units: 10,
            write_capacity_units: 10,
        }
    }
}

/// Create table operation.
///
/// ```rust,no_run
/// use dynamodb_records::{admin, common::key::KeyDefinition, store::MemoryStore};
///
/// # async fn example(store: &MemoryStore) -> dynamodb_records::Result<()> {
/// let create_table = admin::create_table::CreateTable {
///     partition_key: KeyDefinition::string("id"),
///     sort_key: None,
///     table_name: "Test".to_string(),
///     throughput: Some(admin::create_table::Throughput::default()),
/// };
/// create_table.send(store).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CreateTable {
    /// The partition (hash) key attribute.
    pub partition_key: KeyDefinition,
    /// The optional sort (range) key attribute.
    pub sort_key: Option<KeyDefinition>,
    /// The name of the table to create.
    pub table_name: String,
    /// Provisioned capacity; `None` selects on-demand billing.
    pub throughput: Option<Throughput>,
}

impl From<&TableConfig> for CreateTable {
    fn from(config: &TableConfig) -> Self {
        Self {
            partition_key: config.partition_key.clone(),
            sort_key: config.sort_key.clone(),
            table_name: config.table_name.clone(),
            throughput: config.throughput,
        }
    }
}

impl CreateTable {
    /// The key attributes, partition key first.
    pub fn key_definitions(&self) -> impl Iterator<Item = &KeyDefinition> {
        std::iter::once(&self.partition_key).chain(self.sort_key.as_ref())
    }

    /// Execute the create table operation.
    ///
    /// The returned description may still report the table as creating.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_records.create_table",
            skip_all,
            fields(table_name = %self.table_name),
            err
        )
    )]
    pub async fn send<S: Store + ?Sized>(self, store: &S) -> Result<TableDescription> {
        store.create_table(self).await
    }
}
