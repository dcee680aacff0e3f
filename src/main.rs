//! Walks a table through the record lifecycle and prints what it sees.

use anyhow::Result;
use clap::Parser;
use dynamodb_records::{
    common::record::{Entry, EntryDetail, EntryKey},
    config::{self, StoreConfig, TableConfig},
    store::{MemoryStore, Store},
    table::Table,
};
use rand::Rng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exercise a DynamoDB table with typed records
#[derive(Parser, Debug)]
#[command(name = "dynamodb-records")]
#[command(version, about, long_about = None)]
struct Cli {
    /// DynamoDB endpoint URL, e.g. http://localhost:8000 for DynamoDB Local
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// AWS region
    #[arg(long, default_value = config::DEFAULT_REGION, env = "AWS_REGION")]
    region: String,

    /// Table name
    #[arg(long, short, default_value = config::DEFAULT_TABLE_NAME, env = "TABLE_NAME")]
    table: String,

    /// Number of records to upsert
    #[arg(long, short, default_value = "2")]
    upserts: usize,

    /// Run against an in-process store instead of DynamoDB
    #[arg(long)]
    memory: bool,
}

fn print_entry(entry: &Entry) {
    let detail = entry.detail.clone().unwrap_or_default();
    println!(
        "Id: {} - Name: {} - First: {} - Last: {} - Value: {}",
        entry.id, detail.name, detail.first, detail.last, detail.value
    );
}

async fn print_count<S: Store>(table: &Table<S, Entry>) -> Result<()> {
    println!("row count: {}", table.count().await?);
    Ok(())
}

async fn run<S: Store>(table: Table<S, Entry>, upserts: usize) -> Result<()> {
    let state = table.ensure_table().await?;
    tracing::debug!(?state, "table ready");
    print_count(&table).await?;

    println!("upsert");
    let mut rng = rand::rng();
    for i in 0..upserts {
        let detail = EntryDetail {
            name: "First Last".to_string(),
            first: "First".to_string(),
            last: "Last".to_string(),
            value: rng.random_range(0..1000).to_string(),
        };
        table
            .update_merge(&EntryKey::new(format!("thisisatest{i}")), &detail)
            .await?;
    }
    print_count(&table).await?;

    println!("put");
    table
        .put(&Entry {
            id: "thisisatest0".to_string(),
            detail: Some(EntryDetail {
                name: "late entry".to_string(),
                first: "late".to_string(),
                last: "entry".to_string(),
                ..Default::default()
            }),
        })
        .await?;
    print_count(&table).await?;

    println!("items");
    for entry in table.query_by_key(&EntryKey::new("thisisatest0")).await? {
        print_entry(&entry);
    }
    print_count(&table).await?;

    println!("delete");
    match table.delete(&EntryKey::new("thisisatest0")).await? {
        Some(entry) => print_entry(&entry),
        None => println!("Nothing deleted"),
    }
    print_count(&table).await?;

    println!("item");
    match table.get(&EntryKey::new("thisisatest1")).await? {
        Some(entry) => print_entry(&entry),
        None => println!("Not found"),
    }
    print_count(&table).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dynamodb_records=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let table_config = TableConfig::new(cli.table);
    if cli.memory {
        tracing::info!("using the in-process store");
        return run(Table::new(MemoryStore::new(), table_config), cli.upserts).await;
    }

    let store_config = StoreConfig {
        endpoint_url: cli.endpoint_url,
        region: cli.region,
    };
    tracing::info!(store = %store_config.target_display(), "connecting");
    let client = config::create_client(&store_config).await;
    run(Table::new(client, table_config), cli.upserts).await
}
