use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use schema_reconciler::discovery::StaticSession;
use schema_reconciler::validator::{transform_query_to_discovered_tables, validate_query_tables};
use schema_reconciler::{
    find_field, identify_column, infer_column_category, match_field_to_column, reconcile_schema,
    MetadataApiClient, ReconcilerConfig, SchemaDiscovery, SynonymRegistry, TableInventory,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-reconcile")]
#[command(about = "Map canonical metadata fields and queries onto a live warehouse schema")]
struct Args {
    /// Database to discover (overrides MDLH_DATABASE)
    #[arg(long, global = true)]
    database: Option<String>,

    /// Schema to discover (overrides MDLH_SCHEMA)
    #[arg(long, global = true)]
    schema: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Match one canonical field against a list of column names
    Match {
        field: String,
        #[arg(required = true)]
        columns: Vec<String>,
    },
    /// Guess which canonical field a physical column holds
    Identify { column: String },
    /// List the tables discovered in the target schema
    Discover,
    /// Check a query's tables against the discovered schema
    Validate {
        /// File containing the SQL
        sql_file: PathBuf,
        /// Also rewrite table references onto discovered names
        #[arg(long)]
        rewrite: bool,
    },
    /// Reconcile the canonical field catalog against the target schema
    Reconcile,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_discovery(config: &ReconcilerConfig) -> Result<SchemaDiscovery> {
    let sessions = Arc::new(StaticSession(config.session_id.clone()));
    let client = MetadataApiClient::from_config(config, sessions)?;
    Ok(SchemaDiscovery::new(Arc::new(client), &config.cache))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = ReconcilerConfig::from_env()?;
    if let Some(database) = args.database {
        config.database = database;
    }
    if let Some(schema) = args.schema {
        config.schema = schema;
    }
    let registry = SynonymRegistry::with_defaults();

    match args.command {
        Command::Match { field, columns } => {
            let expected = find_field(&field).and_then(|f| f.expected_column());
            print_json(&match_field_to_column(&registry, &field, &columns, expected))?;
        }
        Command::Identify { column } => {
            print_json(&serde_json::json!({
                "column": column,
                "category": infer_column_category(&column),
                "identification": identify_column(&registry, &column),
            }))?;
        }
        Command::Discover => {
            let discovery = build_discovery(&config)?;
            let inventory = discovery.discover_tables(&config.database, &config.schema).await;
            info!("{} tables in {}.{}", inventory.len(), config.database, config.schema);
            print_json(&inventory.iter().collect::<Vec<_>>())?;
        }
        Command::Validate { sql_file, rewrite } => {
            let sql = std::fs::read_to_string(&sql_file)
                .with_context(|| format!("Failed to read {}", sql_file.display()))?;
            let discovery = build_discovery(&config)?;
            let inventory: TableInventory =
                discovery.discover_tables(&config.database, &config.schema).await;
            if rewrite {
                let result = transform_query_to_discovered_tables(
                    &sql,
                    &config.database,
                    &config.schema,
                    &inventory,
                )?;
                print_json(&result)?;
            } else {
                print_json(&validate_query_tables(&sql, &inventory)?)?;
            }
        }
        Command::Reconcile => {
            let discovery = build_discovery(&config)?;
            let reconciliation =
                reconcile_schema(&discovery, &registry, &config.database, &config.schema).await;
            print_json(&reconciliation)?;
        }
    }

    Ok(())
}
