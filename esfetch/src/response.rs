//! Response bodies returned by the search service
//!
//! Every document-carrying type is generic over the `_source` payload and
//! defaults to `serde_json::Value`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// `_search` response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ElasticResponse<T = Value> {
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(rename = "_shards", default)]
    pub shards: ShardStats,
    pub hits: ElasticHits<T>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardStats {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub successful: u32,
    #[serde(default)]
    pub skipped: u32,
    #[serde(default)]
    pub failed: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ElasticHits<T = Value> {
    #[serde(default)]
    pub total: TotalHits,
    /// `null` when nothing matched or results are sorted by a field
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default = "Vec::new")]
    pub hits: Vec<Hit<T>>,
}

impl<T> ElasticHits<T> {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Iterate over the decoded `_source` of every hit that carries one
    pub fn sources(&self) -> impl Iterator<Item = &T> {
        self.hits.iter().filter_map(|h| h.source.as_ref())
    }

    pub fn into_sources(self) -> Vec<T> {
        self.hits.into_iter().filter_map(|h| h.source).collect()
    }
}

impl<T> Default for ElasticHits<T> {
    fn default() -> Self {
        Self {
            total: TotalHits::default(),
            max_score: None,
            hits: Vec::new(),
        }
    }
}

/// Hit count; servers before 7.0 send a bare integer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Count(u64),
    Object { value: u64, relation: TotalRelation },
}

impl TotalHits {
    pub fn value(&self) -> u64 {
        match self {
            Self::Count(n) => *n,
            Self::Object { value, .. } => *value,
        }
    }

    /// `false` when the server stopped counting (`"relation": "gte"`)
    pub fn is_exact(&self) -> bool {
        !matches!(
            self,
            Self::Object {
                relation: TotalRelation::Gte,
                ..
            }
        )
    }
}

impl Default for TotalHits {
    fn default() -> Self {
        Self::Count(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalRelation {
    Eq,
    Gte,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Hit<T = Value> {
    #[serde(rename = "_index")]
    pub index: String,
    /// Mapping type; absent on 8.x servers
    #[serde(rename = "_type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    /// Absent when the query sets `"_source": false`, asks for stored fields
    /// only, or the index does not keep sources
    #[serde(rename = "_source", default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub source: Option<T>,
}

/// The `{"data": ...}` wrapper documents are stored under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEnvelope<T = Value> {
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }

    pub fn into_inner(self) -> T {
        self.data
    }
}

/// `_mget` response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct MultiGetResponse<T = Value> {
    #[serde(default = "Vec::new")]
    pub docs: Vec<MultiGetDoc<T>>,
}

impl<T> MultiGetResponse<T> {
    /// Documents that exist, in request order
    pub fn found(&self) -> impl Iterator<Item = (&str, &T)> {
        self.docs
            .iter()
            .filter(|d| d.found)
            .filter_map(|d| d.source.as_ref().map(|s| (d.id.as_str(), s)))
    }

    /// Ids the server reported as missing
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.docs.iter().filter(|d| !d.found).map(|d| d.id.as_str())
    }
}

impl<T> Default for MultiGetResponse<T> {
    fn default() -> Self {
        Self { docs: Vec::new() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct MultiGetDoc<T = Value> {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(default)]
    pub found: bool,
    #[serde(rename = "_source", default = "Option::default")]
    pub source: Option<T>,
}

/// Answer to an add-document call
///
/// Old servers reply with `created: true` instead of `result`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexResponse {
    #[serde(rename = "_index", default)]
    pub index: String,
    #[serde(rename = "_type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "_version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,
    #[serde(rename = "_shards", default)]
    pub shards: ShardStats,
}

impl IndexResponse {
    pub fn is_created(&self) -> bool {
        self.created.unwrap_or(false) || self.result.as_deref() == Some("created")
    }
}

/// `_mapping` response, keyed by concrete index name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingResponse {
    #[serde(flatten)]
    pub indices: HashMap<String, IndexMapping>,
}

impl MappingResponse {
    pub fn index(&self, name: &str) -> Option<&IndexMapping> {
        self.indices.get(name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexMapping {
    #[serde(default)]
    pub mappings: Mappings,
}

/// Field mappings of one index
///
/// Pre-7.0 servers nest properties under the mapping type name
/// (`mappings.<type>.properties`); those land in `types`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mappings {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, FieldMapping>,
    #[serde(flatten)]
    pub types: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, FieldMapping>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<HashMap<String, FieldMapping>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dims: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// The `index` setting of a field: a bool since 5.0, a mode string
/// (`"analyzed"`, `"not_analyzed"`, `"no"`) on 2.x
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexOption {
    Enabled(bool),
    Mode(String),
}

impl IndexOption {
    pub fn is_indexed(&self) -> bool {
        match self {
            Self::Enabled(enabled) => *enabled,
            Self::Mode(mode) => mode != "no",
        }
    }
}
