use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use esfetch::{Elastic, ElasticConfig, Query, SearchQuery};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "esfetch")]
#[command(about = "Query an Elasticsearch-compatible index")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "ESFETCH_CONFIG")]
    config: Option<PathBuf>,

    /// Service base URL
    #[arg(long, env = "ELASTIC_URL")]
    url: Option<String>,

    /// Index name
    #[arg(short, long, env = "ELASTIC_INDEX")]
    index: Option<String>,

    /// Document type used when adding documents
    #[arg(long, env = "ELASTIC_TYPE")]
    doc_type: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search with a raw query string, e.g. `q=title:rust`
    Query {
        #[arg(long, default_value = "0")]
        offset: usize,

        #[arg(long, default_value = "10")]
        limit: usize,

        /// Extra query-string parameters appended to the request
        #[arg(default_value = "")]
        query: String,
    },

    /// Return every document, paged
    MatchAll {
        #[arg(long, default_value = "0")]
        from: usize,

        #[arg(long, default_value = "10")]
        size: usize,
    },

    /// Full-text match on one field
    Match {
        field: String,

        text: String,

        #[arg(long, default_value = "0")]
        from: usize,

        #[arg(long, default_value = "10")]
        size: usize,
    },

    /// Fetch documents by id
    Get {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Show the index mapping
    Mapping {
        /// Print the flattened field list instead of the raw mapping
        #[arg(long)]
        fields: bool,
    },

    /// Add a JSON document read from a file or stdin
    Add {
        /// Input file; stdin when omitted
        file: Option<PathBuf>,
    },
}

impl Cli {
    fn elastic_config(&self) -> Result<ElasticConfig> {
        let mut config = match &self.config {
            Some(path) => ElasticConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
                .with_env_credentials(),
            None => ElasticConfig::from_env()?,
        };

        if let Some(url) = &self.url {
            config.base_url = url.clone();
        }
        if let Some(index) = &self.index {
            config.index = index.clone();
        }
        if let Some(doc_type) = &self.doc_type {
            config.doc_type = doc_type.clone();
        }

        Ok(config)
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_document(file: Option<&PathBuf>) -> Result<String> {
    let body = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            body
        }
    };

    serde_json::from_str::<serde_json::Value>(&body).context("Document is not valid JSON")?;
    Ok(body)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.elastic_config()?;

    tracing::info!("Using index '{}' at {}", config.index, config.base_url);
    let es = Elastic::new(config)?;

    match cli.command {
        Commands::Query {
            offset,
            limit,
            query,
        } => {
            let hits = es.query(offset, limit, &query).await?;
            tracing::info!("{} total hits", hits.total.value());
            print_json(&hits)?;
        }
        Commands::MatchAll { from, size } => {
            let hits = es
                .query_struct(&SearchQuery::match_all().from(from).size(size))
                .await?;
            tracing::info!("{} total hits", hits.total.value());
            print_json(&hits)?;
        }
        Commands::Match {
            field,
            text,
            from,
            size,
        } => {
            let query = SearchQuery::new(Query::matching(field, text))
                .from(from)
                .size(size);
            let hits = es.query_struct(&query).await?;
            tracing::info!("{} total hits", hits.total.value());
            print_json(&hits)?;
        }
        Commands::Get { ids } => {
            let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
            let response = es.multi_get(&ids).await?;
            for id in response.missing() {
                tracing::warn!("Document not found: {}", id);
            }
            print_json(&response)?;
        }
        Commands::Mapping { fields } => {
            let mapping = es.mapping().await?;
            if fields {
                let schemas: Vec<_> = mapping
                    .indices
                    .iter()
                    .map(|(name, index)| index.fields(name))
                    .collect();
                print_json(&schemas)?;
            } else {
                print_json(&mapping)?;
            }
        }
        Commands::Add { file } => {
            let body = read_document(file.as_ref())?;
            let response = es.add(body).await?;
            tracing::info!("Stored document '{}'", response.id);
            print_json(&response)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "esfetch",
            "--url",
            "http://es.internal:9200",
            "--index",
            "posts",
            "--doc-type",
            "post",
            "match-all",
            "--size",
            "5",
        ]);

        let config = cli.elastic_config().unwrap();
        assert_eq!(config.base_url, "http://es.internal:9200");
        assert_eq!(config.index, "posts");
        assert_eq!(config.doc_type, "post");
        assert!(matches!(cli.command, Commands::MatchAll { from: 0, size: 5 }));
    }

    #[test]
    fn test_get_requires_ids() {
        assert!(Cli::try_parse_from(["esfetch", "--index", "posts", "get"]).is_err());
    }
}
