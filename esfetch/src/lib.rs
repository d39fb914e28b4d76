//! esfetch: a small client for Elasticsearch-compatible search services
//!
//! Builds `_search`, `_mget`, `_mapping` and add-document requests for a single
//! index and decodes the JSON answers into typed structures.
//!
//! ```no_run
//! use esfetch::{Elastic, ElasticConfig, SearchQuery};
//!
//! # async fn run() -> esfetch::Result<()> {
//! let config = ElasticConfig::new("http://localhost:9200", "articles").with_env_credentials();
//! let es = Elastic::new(config)?;
//!
//! let hits = es.query_struct(&SearchQuery::match_all().size(10)).await?;
//! println!("{} matches", hits.total.value());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod mapping;
pub mod query;
pub mod response;

pub use client::Elastic;
pub use config::{Credentials, ElasticConfig};
pub use error::{Error, Result};
pub use mapping::{convert_mapping, FieldType, IndexSchema, SchemaField};
pub use query::{BoolQuery, Query, RangeParams, SearchQuery, SortOrder};
pub use response::{
    DataEnvelope, ElasticHits, ElasticResponse, Hit, IndexResponse, MappingResponse,
    MultiGetResponse, TotalHits,
};
