//! SDX CLI: run GraphQL queries over RDF documents from the command line

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use sdx::schema::FieldRole;
use sdx::{Request, ResolverConfig, Response, Schema, SdxClient};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sdx", version, about = "GraphQL queries over RDF documents")]
struct Cli {
    /// Schema file (SDL with @is / @identifier / @property metadata)
    #[arg(long, short, global = true, env = "SDX_SCHEMA")]
    schema: Option<PathBuf>,

    /// Resolver configuration file (YAML)
    #[arg(long, global = true, env = "SDX_CONFIG")]
    config: Option<PathBuf>,

    /// Document location, overriding the configured default
    #[arg(long, short, global = true, env = "SDX_LOCATION")]
    location: Option<String>,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a GraphQL query
    Query {
        /// Query text, or @path to read it from a file
        query: String,

        /// Variables as a JSON object
        #[arg(long)]
        variables: Option<String>,

        /// Operation to run when the document has several
        #[arg(long)]
        operation: Option<String>,
    },
    /// Print the closed subgraph of a type's instances as N-Triples
    Extract {
        /// Schema type carrying @is(class: ...)
        type_name: String,

        /// Only the instance with this IRI
        #[arg(long)]
        id: Option<String>,
    },
    /// Print the schema's RDF metadata
    Schema,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = build_client(&cli)?;

    match cli.command {
        Commands::Query {
            query,
            variables,
            operation,
        } => run_query(&client, &query, variables, operation, &cli.format).await,
        Commands::Extract { type_name, id } => {
            let location = client
                .config()
                .location
                .clone()
                .context("No document location: pass --location or set SDX_LOCATION")?;
            run_extract(&client, &location, &type_name, id.as_deref()).await
        }
        Commands::Schema => run_schema(&client, &cli.format),
    }
}

fn build_client(cli: &Cli) -> Result<SdxClient> {
    let Some(schema_path) = &cli.schema else {
        bail!("No schema: pass --schema or set SDX_SCHEMA");
    };
    let sdl = std::fs::read_to_string(schema_path)
        .with_context(|| format!("Cannot read schema {}", schema_path.display()))?;
    let schema = Schema::parse(&sdl)?;

    let mut config = match &cli.config {
        Some(path) => ResolverConfig::from_file(path)?,
        None => ResolverConfig::default(),
    };
    if let Some(location) = &cli.location {
        config.location = Some(location.clone());
    }

    Ok(SdxClient::new(schema, config)?)
}

fn read_query(query: &str) -> Result<String> {
    match query.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("Cannot read query {}", path)),
        None => Ok(query.to_string()),
    }
}

async fn run_query(
    client: &SdxClient,
    query: &str,
    variables: Option<String>,
    operation: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    let mut request = Request::new(read_query(query)?);
    if let Some(variables) = variables {
        request.variables = serde_json::from_str(&variables).context("Variables must be a JSON object")?;
    }
    if let Some(operation) = operation {
        request = request.operation_name(operation);
    }

    let response = client.execute(request).await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Table => {
            println!("{}", serde_json::to_string_pretty(&response.data)?);
            print_errors(&response);
        }
    }

    Ok(())
}

fn print_errors(response: &Response) {
    if response.errors.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["path", "code", "message"]);
    for error in &response.errors {
        table.add_row(vec![error.path_string(), error.code().to_string(), error.message.clone()]);
    }

    eprintln!("{}", table);
    eprintln!("{} error(s)", response.errors.len());
}

async fn run_extract(
    client: &SdxClient,
    location: &str,
    type_name: &str,
    id: Option<&str>,
) -> Result<()> {
    let subgraph = client.extract(location, type_name, id).await?;
    for quad in subgraph.iter() {
        println!("{}", quad);
    }
    Ok(())
}

fn run_schema(client: &SdxClient, format: &OutputFormat) -> Result<()> {
    let index = client.index();

    let rows: Vec<[String; 5]> = index
        .fields()
        .map(|field| {
            let (role, iri) = match &field.role {
                FieldRole::Identifier => ("identifier", String::new()),
                FieldRole::Property(iri) => ("property", iri.as_str().to_string()),
                FieldRole::Unspecified => ("unspecified", String::new()),
            };
            let class = index
                .class_iri_of(&field.type_name)
                .map(|c| c.as_str().to_string())
                .unwrap_or_default();
            [
                field.type_name.clone(),
                class,
                field.field_name.clone(),
                role.to_string(),
                iri,
            ]
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = rows
                .iter()
                .map(|[ty, class, field, role, iri]| {
                    serde_json::json!({
                        "type": ty,
                        "class": class,
                        "field": field,
                        "role": role,
                        "iri": iri,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["type", "class", "field", "role", "iri"]);
            for row in &rows {
                table.add_row(row.to_vec());
            }
            println!("{}", table);
            println!("{} field(s)", rows.len());
        }
    }

    Ok(())
}
