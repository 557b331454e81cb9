//! Thin HTTP client for the back-office REST API
//!
//! Every call attaches the bearer token from the session, unwraps the
//! `{status, data, message}` envelope and maps failures onto [`ClientError`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    cache::ResponseCache,
    config::ClientConfig,
    error::{ClientError, ClientResult},
    session::TokenProvider,
};

/// Header carrying the device fingerprint of the session
pub const DEVICE_FINGERPRINT_HEADER: &str = "X-Device-Fingerprint";

/// Query parameter appended to reads that must bypass intermediate caches
pub const CACHE_BUST_PARAM: &str = "_t";

/// How a read interacts with caches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPolicy {
    /// Serve from the local cache when possible
    Cached,
    /// Skip the local cache and add a cache-busting parameter
    Fresh,
}

/// Response envelope used by every endpoint
#[derive(Debug, Deserialize)]
struct Envelope {
    status: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    message: Option<String>,
}

/// Body of a non-success response, when it is JSON at all
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Sort direction for grid queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Offset/limit query of the server-side paginated grid contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridQuery {
    pub start: u64,
    pub length: u64,
    /// Correlation token echoed back by the server
    pub draw: u64,
    pub search: String,
    pub order_column: usize,
    pub order_dir: SortDirection,
}

impl GridQuery {
    /// Query for a 1-based page
    pub fn for_page(page: u32, per_page: u32) -> Self {
        let page = page.max(1) as u64;
        let per_page = per_page.max(1) as u64;
        Self {
            start: (page - 1) * per_page,
            length: per_page,
            draw: 1,
            search: String::new(),
            order_column: 0,
            order_dir: SortDirection::Asc,
        }
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("start".to_string(), self.start.to_string()),
            ("length".to_string(), self.length.to_string()),
            ("draw".to_string(), self.draw.to_string()),
            ("search[value]".to_string(), self.search.clone()),
            ("order[0][column]".to_string(), self.order_column.to_string()),
            ("order[0][dir]".to_string(), self.order_dir.as_str().to_string()),
        ]
    }
}

/// Grid envelope: `{draw, recordsTotal, recordsFiltered, data}`
#[derive(Debug, Clone, Deserialize)]
pub struct GridPage<T> {
    #[serde(default)]
    pub draw: Option<Value>,
    #[serde(rename = "recordsTotal", default)]
    pub records_total: u64,
    #[serde(rename = "recordsFiltered", default)]
    pub records_filtered: Option<u64>,
    pub data: Vec<T>,
}

/// List payload in either of the two envelopes the API has used
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Grid(GridPage<T>),
    Plain(Vec<T>),
}

impl<T> ListPayload<T> {
    /// Number of records matching the query on the server
    pub fn total(&self) -> u64 {
        match self {
            ListPayload::Grid(page) => page.records_filtered.unwrap_or(page.records_total),
            ListPayload::Plain(items) => items.len() as u64,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            ListPayload::Grid(page) => page.data,
            ListPayload::Plain(items) => items,
        }
    }
}

/// Authenticated JSON client
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<dyn TokenProvider>,
    cache: ResponseCache,
    cache_ttl: Duration,
}

impl ApiClient {
    /// Build a client from configuration and a session
    pub fn new(config: &ClientConfig, session: Arc<dyn TokenProvider>) -> ClientResult<Self> {
        config.validate()?;
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            cache: ResponseCache::new(),
            cache_ttl: config.cache_ttl(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// GET `path` and decode the envelope's `data`
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
        policy: ReadPolicy,
    ) -> ClientResult<T> {
        let token = self.token()?;
        let key = cache_key(path, query);

        if policy == ReadPolicy::Cached {
            if let Some(value) = self.cache.get(&key).await {
                debug!(path, "Serving cached response");
                return decode(value);
            }
        }

        let mut pairs = query.to_vec();
        if policy == ReadPolicy::Fresh {
            pairs.push((
                CACHE_BUST_PARAM.to_string(),
                chrono::Utc::now().timestamp_millis().to_string(),
            ));
        }

        let resource = resource_of(path);
        let epoch = self.cache.epoch(resource).await;

        debug!(path, "GET");
        let request = self.http.get(self.url(path)).query(&pairs);
        let data = self.send(request, &token, path).await?;

        if policy == ReadPolicy::Cached {
            // a mutation that finished meanwhile makes this body stale
            self.cache
                .set_if_current(&key, data.clone(), Some(self.cache_ttl), resource, epoch)
                .await;
        }

        decode(data)
    }

    /// POST a JSON body to `path` and decode the envelope's `data`
    ///
    /// Cached reads of the same resource are invalidated on success.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self.token()?;

        debug!(path, "POST");
        let request = self.http.post(self.url(path)).json(body);
        let data = self.send(request, &token, path).await?;

        self.cache.invalidate_resource(resource_of(path)).await;
        decode(data)
    }

    fn token(&self) -> ClientResult<String> {
        self.session
            .bearer_token()
            .filter(|token| !token.trim().is_empty())
            .ok_or(ClientError::MissingToken)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder, token: &str, path: &str) -> ClientResult<Value> {
        let mut request = request.bearer_auth(token);
        if let Some(fingerprint) = self.session.device_fingerprint() {
            request = request.header(DEVICE_FINGERPRINT_HEADER, fingerprint);
        }

        let response = request.send().await.map_err(|e| {
            warn!(path, error = %e, "Request failed");
            ClientError::Transport(e)
        })?;

        read_envelope(response).await.inspect_err(|e| {
            warn!(path, error = %e, "API call failed");
        })
    }
}

async fn read_envelope(response: Response) -> ClientResult<Value> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(|body| body.message.or(body.error));
        return Err(ClientError::Http { status, message });
    }

    let envelope: Envelope = serde_json::from_slice(&bytes)
        .map_err(|e| ClientError::UnexpectedResponse(format!("invalid envelope: {e}")))?;

    match envelope.status.as_deref() {
        Some("ok") => Ok(envelope.data.unwrap_or(Value::Null)),
        Some(_) => Err(ClientError::Api(envelope.message.unwrap_or_default())),
        None => Err(ClientError::UnexpectedResponse(
            "missing status field".to_string(),
        )),
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> ClientResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ClientError::UnexpectedResponse(format!("unexpected data shape: {e}")))
}

fn cache_key(path: &str, query: &[(String, String)]) -> String {
    let path = path.trim_start_matches('/');
    if query.is_empty() {
        return path.to_string();
    }
    let query = query
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{query}")
}

/// First path segment, used as the cache invalidation unit
fn resource_of(path: &str) -> &str {
    path.trim_start_matches('/')
        .split(['/', '?'])
        .next()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionHandle;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, session: SessionHandle) -> ApiClient {
        let config = ClientConfig {
            base_url: server.uri(),
            ..ClientConfig::default()
        };
        ApiClient::new(&config, Arc::new(session)).expect("client")
    }

    #[test]
    fn test_grid_query_pairs() {
        let mut query = GridQuery::for_page(3, 25);
        query.search = "dash".to_string();
        query.order_dir = SortDirection::Desc;

        let pairs = query.to_pairs();
        assert!(pairs.contains(&("start".to_string(), "50".to_string())));
        assert!(pairs.contains(&("length".to_string(), "25".to_string())));
        assert!(pairs.contains(&("search[value]".to_string(), "dash".to_string())));
        assert!(pairs.contains(&("order[0][dir]".to_string(), "desc".to_string())));
    }

    #[test]
    fn test_list_payload_accepts_both_envelopes() {
        let grid: ListPayload<i64> = serde_json::from_value(json!({
            "draw": 2, "recordsTotal": 40, "recordsFiltered": 12, "data": [1, 2]
        }))
        .unwrap();
        assert_eq!(grid.total(), 12);
        assert_eq!(grid.into_items(), vec![1, 2]);

        let plain: ListPayload<i64> = serde_json::from_value(json!([4, 5, 6])).unwrap();
        assert_eq!(plain.total(), 3);
    }

    #[test]
    fn test_resource_of() {
        assert_eq!(resource_of("menu/access-info"), "menu");
        assert_eq!(resource_of("/role/data"), "role");
        assert_eq!(resource_of("menu"), "menu");
    }

    #[tokio::test]
    async fn test_missing_token_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, SessionHandle::new());
        let result: ClientResult<Value> = client.get("menu/options", &[], ReadPolicy::Cached).await;

        assert!(matches!(result, Err(ClientError::MissingToken)));
    }

    #[tokio::test]
    async fn test_bearer_and_fingerprint_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/menu/options"))
            .and(header("authorization", "Bearer secret"))
            .and(header("x-device-fingerprint", "fp-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "data": [1]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = SessionHandle::new();
        session.login("secret", Some("fp-1".to_string()));
        let client = client_for(&server, session);

        let data: Vec<i64> = client
            .get("menu/options", &[], ReadPolicy::Cached)
            .await
            .unwrap();
        assert_eq!(data, vec![1]);

        // second read is served from the cache
        let data: Vec<i64> = client
            .get("menu/options", &[], ReadPolicy::Cached)
            .await
            .unwrap();
        assert_eq!(data, vec![1]);
    }

    #[tokio::test]
    async fn test_fresh_read_adds_cache_bust_param() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/menu/access-info"))
            .and(query_param("pid", "abc"))
            .and(|req: &wiremock::Request| {
                req.url.query_pairs().any(|(k, _)| k == CACHE_BUST_PARAM)
            })
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "data": {}})),
            )
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server, SessionHandle::with_token("t"));
        let query = vec![("pid".to_string(), "abc".to_string())];
        for _ in 0..2 {
            let _: Value = client
                .get("menu/access-info", &query, ReadPolicy::Fresh)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_error_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/menu/store"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({"message": "Nama sudah ada"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/menu/hapus"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "error", "message": "Menu dipakai"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/menu/statistics"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, SessionHandle::with_token("t"));

        let err = client
            .post::<_, Value>("menu/store", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Http { status, .. } if status.as_u16() == 422));
        assert_eq!(err.user_message(), "Nama sudah ada");

        let err = client
            .post::<_, Value>("menu/hapus", &json!({"pid": "x"}))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Menu dipakai");

        let err = client
            .get::<Value>("menu/statistics", &[], ReadPolicy::Cached)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedResponse(_)));
    }
}
