// HTTP client for the draft backend.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, EXPIRES, PRAGMA};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ServerConfig;
use crate::draft::pick::Pick;
use crate::remote::payload::{
    DraftIdRequest, InflationPayload, LookupEnvelope, PicksEnvelope, PlayerLookupRequest,
    RawValuation, ScatterPayload, TeamBreakdownPayload,
};
use crate::valuation::table::ValuationEntry;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("malformed response from {endpoint}: {message}")]
    Malformed { endpoint: String, message: String },
}

// ---------------------------------------------------------------------------
// DraftApi
// ---------------------------------------------------------------------------

/// Everything the dashboard needs from the backend.
///
/// Picks and the player lookup are required for a snapshot; the remaining
/// feeds are optional extras.
#[async_trait::async_trait]
pub trait DraftApi: Send + Sync {
    async fn picks(&self, draft_id: &str) -> Result<Vec<Pick>, ApiError>;

    async fn player_lookup(&self, players: &[String]) -> Result<Vec<ValuationEntry>, ApiError>;

    async fn inflation(&self, draft_id: &str) -> Result<InflationPayload, ApiError>;

    async fn team_breakdown(
        &self,
        draft_id: &str,
        is_live: bool,
    ) -> Result<TeamBreakdownPayload, ApiError>;

    async fn scatter_data(&self, draft_id: &str, is_live: bool)
        -> Result<ScatterPayload, ApiError>;
}

// ---------------------------------------------------------------------------
// HttpDraftApi
// ---------------------------------------------------------------------------

/// reqwest-backed [`DraftApi`].
pub struct HttpDraftApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpDraftApi {
    /// Build a client against `base_url`. Every request disables caching and
    /// times out after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(EXPIRES, HeaderValue::from_static("0"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(server: &ServerConfig) -> Result<Self, ApiError> {
        Self::new(
            &server.base_url,
            Duration::from_secs(server.request_timeout_secs),
        )
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Send a request and decode its JSON body.
    ///
    /// The body is read as text first so an empty body can be reported as
    /// malformed rather than as a generic decode error.
    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let transport = |source| ApiError::Transport {
            endpoint: endpoint.to_string(),
            source,
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        if body.trim().is_empty() {
            return Err(ApiError::Malformed {
                endpoint: endpoint.to_string(),
                message: "empty body".to_string(),
            });
        }
        debug!("{} returned {} bytes", endpoint, body.len());

        serde_json::from_str(&body).map_err(|e| ApiError::Malformed {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl DraftApi for HttpDraftApi {
    async fn picks(&self, draft_id: &str) -> Result<Vec<Pick>, ApiError> {
        let request = self
            .http
            .get(self.url("picks"))
            .query(&[("draft_id", draft_id)]);
        let envelope: PicksEnvelope = self.send_json("picks", request).await?;
        Ok(envelope.into_picks().into_iter().map(Pick::from).collect())
    }

    async fn player_lookup(&self, players: &[String]) -> Result<Vec<ValuationEntry>, ApiError> {
        let request = self
            .http
            .post(self.url("player_lookup"))
            .json(&PlayerLookupRequest { players });
        let envelope: LookupEnvelope = self.send_json("player_lookup", request).await?;
        Ok(envelope
            .into_rows()
            .into_iter()
            .filter_map(RawValuation::into_entry)
            .collect())
    }

    async fn inflation(&self, draft_id: &str) -> Result<InflationPayload, ApiError> {
        let request = self
            .http
            .post(self.url("inflation"))
            .json(&DraftIdRequest { draft_id });
        self.send_json("inflation", request).await
    }

    async fn team_breakdown(
        &self,
        draft_id: &str,
        is_live: bool,
    ) -> Result<TeamBreakdownPayload, ApiError> {
        let request = self
            .http
            .get(self.url("team_breakdown"))
            .query(&[("draft_id", draft_id), ("is_live", bool_param(is_live))]);
        self.send_json("team_breakdown", request).await
    }

    async fn scatter_data(
        &self,
        draft_id: &str,
        is_live: bool,
    ) -> Result<ScatterPayload, ApiError> {
        let request = self
            .http
            .get(self.url("scatter_data"))
            .query(&[("draft_id", draft_id), ("is_live", bool_param(is_live))]);
        self.send_json("scatter_data", request).await
    }
}

fn bool_param(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::pick::Position;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the raw request text.
    async fn serve_once(status_line: &str, body: &str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
            request
        });

        (format!("http://{addr}"), handle)
    }

    /// Read until the headers and any Content-Length body have arrived.
    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&data).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).to_string()
    }

    fn api(base: &str) -> HttpDraftApi {
        HttpDraftApi::new(base, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn picks_request_and_decode() {
        let body = r#"[{"pick_no":1,"draft_slot":2,"metadata":{"first_name":"Bijan","last_name":"Robinson","position":"RB","amount":"61"}}]"#;
        let (base, server) = serve_once("HTTP/1.1 200 OK", body).await;

        let picks = api(&base).picks("abc123").await.unwrap();
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].player_name, "Bijan Robinson");
        assert_eq!(picks[0].position, Position::RB);
        assert_eq!(picks[0].price, 61);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /picks?draft_id=abc123 "));
        let lower = request.to_lowercase();
        assert!(lower.contains("cache-control: no-cache"));
        assert!(lower.contains("pragma: no-cache"));
    }

    #[tokio::test]
    async fn inflation_posts_draft_id() {
        let (base, server) =
            serve_once("HTTP/1.1 200 OK", r#"{"overall_inflation":"0.05"}"#).await;

        let payload = api(&base).inflation("d-9").await.unwrap();
        assert_eq!(payload.overall_percent(), Some(5.0));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /inflation "));
        assert!(request.contains(r#"{"draft_id":"d-9"}"#));
    }

    #[tokio::test]
    async fn player_lookup_drops_unpriced_rows() {
        let body = r#"[{"name":"A","expected_price":"$10","tier":1},{"name":"B","expected_price":"N/A"}]"#;
        let (base, server) = serve_once("HTTP/1.1 200 OK", body).await;

        let entries = api(&base)
            .player_lookup(&["A".to_string(), "B".to_string()])
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].expected_price, 10.0);

        let request = server.await.unwrap();
        assert!(request.contains(r#"{"players":["A","B"]}"#));
    }

    #[tokio::test]
    async fn team_breakdown_passes_live_flag() {
        let (base, server) = serve_once("HTTP/1.1 200 OK", "{}").await;
        let payload = api(&base).team_breakdown("d1", true).await.unwrap();
        assert!(payload.is_empty());
        let request = server.await.unwrap();
        assert!(request.starts_with("GET /team_breakdown?draft_id=d1&is_live=true "));
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let (base, _server) = serve_once("HTTP/1.1 500 Internal Server Error", "{}").await;
        let err = api(&base).picks("d1").await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }), "{err}");
    }

    #[tokio::test]
    async fn empty_body_is_malformed() {
        let (base, _server) = serve_once("HTTP/1.1 200 OK", "").await;
        let err = api(&base).scatter_data("d1", false).await.unwrap_err();
        assert!(matches!(err, ApiError::Malformed { .. }), "{err}");
    }

    #[tokio::test]
    async fn invalid_json_is_malformed() {
        let (base, _server) = serve_once("HTTP/1.1 200 OK", "<html>oops</html>").await;
        let err = api(&base).picks("d1").await.unwrap_err();
        assert!(matches!(err, ApiError::Malformed { .. }), "{err}");
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = api(&format!("http://{addr}")).picks("d1").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }), "{err}");
    }
}
