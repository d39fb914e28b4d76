//! HTTP client for one index of an Elasticsearch-compatible service
//!
//! Every method is a single request/response round trip. The `reqwest::Client`
//! may be shared with the host application through [`Elastic::with_client`].

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use crate::config::{Credentials, ElasticConfig};
use crate::error::{Error, Result};
use crate::query::{MultiGetRequest, SearchQuery};
use crate::response::{ElasticHits, ElasticResponse, IndexResponse, MappingResponse, MultiGetResponse};

#[derive(Debug, Clone)]
pub struct Elastic {
    client: Client,
    base_url: Url,
    index: String,
    doc_type: String,
    credentials: Option<Credentials>,
}

impl Elastic {
    /// Create a client with its own connection pool and the configured timeout
    pub fn new(config: ElasticConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Self::with_client(config, client)
    }

    /// Create a client on top of an existing `reqwest::Client`
    pub fn with_client(config: ElasticConfig, client: Client) -> Result<Self> {
        if config.index.is_empty() {
            return Err(Error::Config("index name is required".to_string()));
        }

        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::CannotBeBase(config.base_url));
        }

        Ok(Self {
            client,
            base_url,
            index: config.index,
            doc_type: config.doc_type,
            credentials: config.credentials,
        })
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Search with a raw query-string fragment.
    ///
    /// Issues `GET <base>/<index>/_search?size=<limit>&from=<offset>&<search_query>`.
    /// `search_query` is appended as given (e.g. `q=title:rust&sort=created:desc`).
    pub async fn query(&self, offset: usize, limit: usize, search_query: &str) -> Result<ElasticHits> {
        let result = async {
            let url = self.search_url(offset, limit, search_query)?;
            let response = self.execute(self.request(Method::GET, url)).await?;
            let body: ElasticResponse = decode(response).await?;
            Ok::<_, Error>(body.hits)
        }
        .await;

        result.inspect_err(|e| error!("Query on '{}' failed: {}", self.index, e))
    }

    /// Search with a structured query, returning only the hits
    pub async fn query_struct(&self, query: &SearchQuery) -> Result<ElasticHits> {
        self.search(query).await.map(|response| response.hits)
    }

    /// Search with a structured query, decoding `_source` into `T`
    pub async fn search<T: DeserializeOwned>(&self, query: &SearchQuery) -> Result<ElasticResponse<T>> {
        let result = async {
            let url = self.endpoint(&["_search"])?;
            let request = self.request(Method::POST, url).json(query);
            let response = self.execute(request).await?;
            decode(response).await
        }
        .await;

        result.inspect_err(|e| error!("Search on '{}' failed: {}", self.index, e))
    }

    /// Fetch documents by id
    pub async fn multi_get(&self, ids: &[&str]) -> Result<MultiGetResponse> {
        self.multi_get_as::<Value>(ids).await
    }

    /// Fetch documents by id, decoding `_source` into `T`.
    ///
    /// An empty id list returns an empty response without contacting the server.
    pub async fn multi_get_as<T: DeserializeOwned>(&self, ids: &[&str]) -> Result<MultiGetResponse<T>> {
        if ids.is_empty() {
            return Ok(MultiGetResponse::default());
        }

        let result = async {
            let url = self.endpoint(&["_mget"])?;
            let body = MultiGetRequest::new(ids.iter().copied());
            let response = self.execute(self.request(Method::POST, url).json(&body)).await?;
            decode(response).await
        }
        .await;

        result.inspect_err(|e| error!("Multi-get on '{}' failed: {}", self.index, e))
    }

    /// Fetch the index field mappings
    pub async fn mapping(&self) -> Result<MappingResponse> {
        let result = async {
            let url = self.endpoint(&["_mapping"])?;
            let response = self.execute(self.request(Method::GET, url)).await?;
            decode(response).await
        }
        .await;

        result.inspect_err(|e| error!("Mapping of '{}' failed: {}", self.index, e))
    }

    /// Add a raw JSON document under `<base>/<index>/<type>/`, letting the
    /// server pick the id.
    pub async fn add(&self, body: impl Into<String>) -> Result<IndexResponse> {
        let body = body.into();

        let result = async {
            let url = self.endpoint(&[self.doc_type.as_str(), ""])?;
            let request = self
                .request(Method::POST, url)
                .header(CONTENT_TYPE, "application/json")
                .body(body);
            let response = self.execute(request).await?;

            let bytes = response.bytes().await?;
            if bytes.is_empty() {
                return Ok::<_, Error>(IndexResponse::default());
            }
            Ok(serde_json::from_slice(&bytes)?)
        }
        .await;

        result.inspect_err(|e| error!("Adding document to '{}' failed: {}", self.index, e))
    }

    /// Serialize `document` and add it
    pub async fn add_document<T: Serialize + ?Sized>(&self, document: &T) -> Result<IndexResponse> {
        let body = serde_json::to_string(document)
            .inspect_err(|e| error!("Serializing document for '{}' failed: {}", self.index, e))?;
        self.add(body).await
    }

    /// `<base>/<index>/<segments...>`, each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::CannotBeBase(self.base_url.to_string()))?
            .pop_if_empty()
            .push(&self.index)
            .extend(segments);
        Ok(url)
    }

    fn search_url(&self, offset: usize, limit: usize, search_query: &str) -> Result<Url> {
        let mut url = self.endpoint(&["_search"])?;
        url.query_pairs_mut()
            .append_pair("size", &limit.to_string())
            .append_pair("from", &offset.to_string());

        let extra = search_query.trim_start_matches(['?', '&']);
        if !extra.is_empty() {
            let combined = format!("{}&{}", url.query().unwrap_or_default(), extra);
            url.set_query(Some(&combined));
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);
        let request = self.client.request(method, url);
        match &self.credentials {
            Some(creds) => request.basic_auth(&creds.user, Some(&creds.password)),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Auth {
                status: status.as_u16(),
            }),
            StatusCode::NOT_FOUND if body.contains("index_not_found_exception") => {
                Err(Error::IndexNotFound(self.index.clone()))
            }
            _ => Err(Error::Rejected {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> Elastic {
        Elastic::with_client(ElasticConfig::new(base_url, "posts"), Client::new()).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let es = client("http://localhost:9200");
        assert_eq!(
            es.endpoint(&["_search"]).unwrap().as_str(),
            "http://localhost:9200/posts/_search"
        );

        let es = client("https://example.com/es/");
        assert_eq!(
            es.endpoint(&["_mapping"]).unwrap().as_str(),
            "https://example.com/es/posts/_mapping"
        );
    }

    #[test]
    fn test_add_endpoint_has_trailing_slash() {
        let es = Elastic::with_client(
            ElasticConfig::new("http://localhost:9200", "posts").with_doc_type("post"),
            Client::new(),
        )
        .unwrap();
        assert_eq!(
            es.endpoint(&[es.doc_type(), ""]).unwrap().as_str(),
            "http://localhost:9200/posts/post/"
        );
    }

    #[test]
    fn test_search_url_appends_raw_query() {
        let es = client("http://localhost:9200");

        let url = es.search_url(20, 10, "q=title:rust").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9200/posts/_search?size=10&from=20&q=title:rust");

        let url = es.search_url(0, 5, "").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9200/posts/_search?size=5&from=0");

        let url = es.search_url(0, 5, "&sort=created:desc").unwrap();
        assert_eq!(url.query(), Some("size=5&from=0&sort=created:desc"));
    }

    #[test]
    fn test_index_is_encoded() {
        let es = Elastic::with_client(ElasticConfig::new("http://localhost:9200", "a b"), Client::new())
            .unwrap();
        assert_eq!(
            es.endpoint(&["_search"]).unwrap().as_str(),
            "http://localhost:9200/a%20b/_search"
        );
    }

    #[test]
    fn test_rejects_bad_config() {
        let err = Elastic::with_client(ElasticConfig::new("http://localhost:9200", ""), Client::new())
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Elastic::with_client(ElasticConfig::new("not a url", "posts"), Client::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));

        let err = Elastic::with_client(ElasticConfig::new("mailto:ops@example.com", "posts"), Client::new())
            .unwrap_err();
        assert!(matches!(err, Error::CannotBeBase(_)));
    }
}
