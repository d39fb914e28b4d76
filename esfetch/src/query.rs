//! Search request bodies
//!
//! Serializable subset of the Elasticsearch Query DSL. Shapes are sent as-is;
//! nothing here checks that a query makes sense for the target index.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Root `_search` request body
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SearchQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,

    /// Starting offset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<usize>,

    /// Maximum number of hits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortClause>,

    #[serde(default, rename = "_source", skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceFilter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_total_hits: Option<bool>,
}

impl SearchQuery {
    pub fn new(query: Query) -> Self {
        Self {
            query: Some(query),
            ..Self::default()
        }
    }

    pub fn match_all() -> Self {
        Self::new(Query::match_all())
    }

    pub fn from(mut self, from: usize) -> Self {
        self.from = Some(from);
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        let mut clause = HashMap::new();
        clause.insert(field.into(), SortSpec { order });
        self.sort.push(SortClause::Field(clause));
        self
    }

    pub fn source_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source = Some(SourceFilter::Fields(
            fields.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn track_total_hits(mut self, track: bool) -> Self {
        self.track_total_hits = Some(track);
        self
    }
}

/// Query clauses, serialized externally tagged: `{"match_all": {}}`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    MatchAll(MatchAllQuery),

    /// Analyzed full-text match
    Match(HashMap<String, MatchQuery>),

    MatchPhrase(HashMap<String, MatchQuery>),

    MultiMatch(MultiMatchQuery),

    /// Exact, not analyzed
    Term(HashMap<String, TermQuery>),

    Terms(HashMap<String, Vec<Value>>),

    Range(HashMap<String, RangeParams>),

    Bool(BoolQuery),

    Exists(ExistsQuery),

    Prefix(HashMap<String, PrefixQuery>),

    Wildcard(HashMap<String, WildcardQuery>),

    /// Lucene syntax
    QueryString(QueryStringQuery),

    Ids(IdsQuery),
}

fn single<V>(field: impl Into<String>, value: V) -> HashMap<String, V> {
    let mut map = HashMap::with_capacity(1);
    map.insert(field.into(), value);
    map
}

impl Query {
    pub fn match_all() -> Self {
        Self::MatchAll(MatchAllQuery::default())
    }

    pub fn matching(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Match(single(field, MatchQuery::new(text)))
    }

    pub fn match_phrase(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::MatchPhrase(single(field, MatchQuery::new(text)))
    }

    pub fn multi_match<I, S>(text: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MultiMatch(MultiMatchQuery {
            query: text.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            match_type: None,
            operator: None,
        })
    }

    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Term(single(
            field,
            TermQuery {
                value: value.into(),
                boost: None,
            },
        ))
    }

    pub fn terms<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Terms(single(field, values.into_iter().map(Into::into).collect()))
    }

    pub fn range(field: impl Into<String>, params: RangeParams) -> Self {
        Self::Range(single(field, params))
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Self::Exists(ExistsQuery {
            field: field.into(),
        })
    }

    pub fn prefix(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::Prefix(single(
            field,
            PrefixQuery {
                value: prefix.into(),
            },
        ))
    }

    pub fn wildcard(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Wildcard(single(
            field,
            WildcardQuery {
                value: pattern.into(),
            },
        ))
    }

    pub fn query_string(query: impl Into<String>) -> Self {
        Self::QueryString(QueryStringQuery {
            query: query.into(),
            default_field: None,
            default_operator: None,
        })
    }

    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Ids(IdsQuery {
            values: ids.into_iter().map(Into::into).collect(),
        })
    }
}

impl From<BoolQuery> for Query {
    fn from(query: BoolQuery) -> Self {
        Self::Bool(query)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MatchAllQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MatchQuery {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzziness: Option<String>,
}

impl MatchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            query: text.into(),
            operator: None,
            fuzziness: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MultiMatchQuery {
    pub query: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TermQuery {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

/// Bounds for a `range` clause. Values are passed through untouched, so dates
/// and date math (`now-1d/d`) work as well as numbers.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RangeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl RangeParams {
    pub fn gt(mut self, v: impl Into<Value>) -> Self {
        self.gt = Some(v.into());
        self
    }

    pub fn gte(mut self, v: impl Into<Value>) -> Self {
        self.gte = Some(v.into());
        self
    }

    pub fn lt(mut self, v: impl Into<Value>) -> Self {
        self.lt = Some(v.into());
        self
    }

    pub fn lte(mut self, v: impl Into<Value>) -> Self {
        self.lte = Some(v.into());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BoolQuery {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Query>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Query>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<Query>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<Query>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<Value>,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, query: Query) -> Self {
        self.must.push(query);
        self
    }

    pub fn should(mut self, query: Query) -> Self {
        self.should.push(query);
        self
    }

    pub fn must_not(mut self, query: Query) -> Self {
        self.must_not.push(query);
        self
    }

    pub fn filter(mut self, query: Query) -> Self {
        self.filter.push(query);
        self
    }

    pub fn minimum_should_match(mut self, value: impl Into<Value>) -> Self {
        self.minimum_should_match = Some(value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExistsQuery {
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PrefixQuery {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WildcardQuery {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QueryStringQuery {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_operator: Option<Operator>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IdsQuery {
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SortClause {
    /// Bare field name, ascending
    Name(String),
    Field(HashMap<String, SortSpec>),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SortSpec {
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SourceFilter {
    Enabled(bool),
    Fields(Vec<String>),
    Object {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        includes: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        excludes: Vec<String>,
    },
}

/// `_mget` request body
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MultiGetRequest {
    pub ids: Vec<String>,
}

impl MultiGetRequest {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_match_all_with_paging() {
        let query = SearchQuery::match_all().from(20).size(10);
        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(
            body,
            json!({
                "query": { "match_all": {} },
                "from": 20,
                "size": 10
            })
        );
    }

    #[test]
    fn test_unset_fields_are_omitted() {
        let body = serde_json::to_value(SearchQuery::default()).unwrap();
        assert_eq!(body, json!({}));
    }

    #[test]
    fn test_bool_query_shape() {
        let query = SearchQuery::new(
            BoolQuery::new()
                .must(Query::matching("title", "rust"))
                .filter(Query::term("status", "published"))
                .filter(Query::range("year", RangeParams::default().gte(2015).lt(2020)))
                .into(),
        );

        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(
            body,
            json!({
                "query": {
                    "bool": {
                        "must": [ { "match": { "title": { "query": "rust" } } } ],
                        "filter": [
                            { "term": { "status": { "value": "published" } } },
                            { "range": { "year": { "gte": 2015, "lt": 2020 } } }
                        ]
                    }
                }
            })
        );
    }

    #[test]
    fn test_sort_and_source() {
        let query = SearchQuery::match_all()
            .sort_by("created", SortOrder::Desc)
            .source_fields(["title", "created"]);

        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(body["sort"], json!([{ "created": { "order": "desc" } }]));
        assert_eq!(body["_source"], json!(["title", "created"]));
    }

    #[test]
    fn test_ids_and_terms() {
        let body = serde_json::to_value(Query::ids(["1", "2"])).unwrap();
        assert_eq!(body, json!({ "ids": { "values": ["1", "2"] } }));

        let body = serde_json::to_value(Query::terms("tag", ["a", "b"])).unwrap();
        assert_eq!(body, json!({ "terms": { "tag": ["a", "b"] } }));
    }

    #[test]
    fn test_query_string_parses_back() {
        let raw = json!({ "query_string": { "query": "title:rust AND year:2020" } });
        let parsed: Query = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed, Query::query_string("title:rust AND year:2020"));
    }
}
