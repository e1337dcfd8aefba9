// API client module: a small blocking HTTP client for the Radarr v3 API.
// Every call goes through `ApiClient::request`, which owns the timeout,
// the bounded retry loop and the translation of failures into `ApiError`.
// The network and the clock sit behind the `Transport` and `Sleeper`
// traits so the retry behaviour can be exercised without a server.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::Method;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Total attempts for a retryable failure (5xx or connection/timeout).
pub const MAX_ATTEMPTS: usize = 3;

/// Delay before attempt 2 and attempt 3.
pub const RETRY_DELAYS: [Duration; MAX_ATTEMPTS - 1] =
    [Duration::from_secs(1), Duration::from_secs(2)];

const STATUS_ENDPOINT: &str = "/api/v3/system/status";
const MOVIE_ENDPOINT: &str = "/api/v3/movie";
const EXCLUSIONS_ENDPOINT: &str = "/api/v3/exclusions";

/// Failure talking to the server. `status_code` is 0 when no HTTP
/// response was received.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("API error {status_code} at {endpoint}: {message}")]
pub struct ApiError {
    pub status_code: u16,
    pub message: String,
    pub endpoint: String,
}

impl ApiError {
    pub fn new(status_code: u16, message: impl Into<String>, endpoint: impl Into<String>) -> Self {
        ApiError {
            status_code,
            message: message.into(),
            endpoint: endpoint.into(),
        }
    }
}

/// The fixed API surface the rest of the crate depends on.
pub trait MovieApi {
    /// Fetch server status; used as a connectivity and auth check.
    fn test_connection(&self) -> Result<Value, ApiError>;

    /// Fetch every movie in the library as raw JSON records.
    fn get_movies(&self) -> Result<Vec<Value>, ApiError>;

    /// Delete a movie, optionally removing its files and adding an
    /// import exclusion.
    fn delete_movie(&self, movie_id: i64, delete_files: bool, add_exclusion: bool)
        -> Result<(), ApiError>;

    /// Fetch the server-side import exclusions.
    fn get_exclusions(&self) -> Result<Vec<Value>, ApiError>;
}

#[cfg(test)]
mockall::mock! {
    pub MovieApi {}

    impl MovieApi for MovieApi {
        fn test_connection(&self) -> Result<Value, ApiError>;
        fn get_movies(&self) -> Result<Vec<Value>, ApiError>;
        fn delete_movie(&self, movie_id: i64, delete_files: bool, add_exclusion: bool)
            -> Result<(), ApiError>;
        fn get_exclusions(&self) -> Result<Vec<Value>, ApiError>;
    }
}

/// A fully described outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub api_key: String,
    pub query: Vec<(String, String)>,
}

/// Status and body of a received HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        RawResponse {
            status,
            body: body.into(),
        }
    }
}

/// Failure before a complete response was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Could not connect to the server.
    Connect(String),
    /// The request timed out.
    Timeout(String),
    /// Anything else (bad URL, body decode failure, ...). Not retried.
    Other(String),
}

impl TransportError {
    fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Connect(_) | TransportError::Timeout(_))
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Connect(msg) => write!(f, "connection failed: {}", msg),
            TransportError::Timeout(msg) => write!(f, "request timed out: {}", msg),
            TransportError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

/// Sends a single request, without any retry.
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<RawResponse, TransportError>;
}

/// Blocks the current thread between retry attempts.
pub trait Sleeper {
    fn sleep(&self, delay: Duration);
}

/// `Transport` backed by a reqwest blocking client.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ReqwestTransport { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        let res = self
            .client
            .request(request.method.clone(), &request.url)
            .header("X-Api-Key", &request.api_key)
            .query(&request.query)
            .send()
            .map_err(classify)?;
        let status = res.status().as_u16();
        let body = res.text().map_err(classify)?;
        Ok(RawResponse { status, body })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

/// `Sleeper` that really sleeps.
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Radarr API client. Holds the base URL, the API key sent in the
/// `X-Api-Key` header, and the transport/sleeper used by the retry loop.
pub struct ApiClient {
    base_url: String,
    api_key: String,
    transport: Box<dyn Transport>,
    sleeper: Box<dyn Sleeper>,
}

impl ApiClient {
    /// Create a client talking to a real server.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(
            base_url,
            api_key,
            Box::new(transport),
            Box::new(ThreadSleeper),
        ))
    }

    /// Create a client over an arbitrary transport and sleeper.
    pub fn with_transport(
        base_url: &str,
        api_key: &str,
        transport: Box<dyn Transport>,
        sleeper: Box<dyn Sleeper>,
    ) -> Self {
        ApiClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            transport,
            sleeper,
        }
    }

    /// Perform one logical call. 4xx fails at once; 5xx and
    /// connection/timeout failures are retried up to `MAX_ATTEMPTS`
    /// with `RETRY_DELAYS` between attempts. Returns `Value::Null` for
    /// 204 or an empty body.
    pub fn request(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, ApiError> {
        let request = ApiRequest {
            method,
            url: format!("{}{}", self.base_url, endpoint),
            api_key: self.api_key.clone(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            let last_attempt = attempt >= MAX_ATTEMPTS;

            match self.transport.send(&request) {
                Ok(res) if res.status < 400 => return parse_success(res, endpoint),
                Ok(res) if res.status < 500 => {
                    return Err(ApiError::new(res.status, client_error_message(&res.body), endpoint));
                }
                Ok(res) => {
                    if last_attempt {
                        return Err(ApiError::new(
                            res.status,
                            format!("Server error after {} retries: {}", MAX_ATTEMPTS, res.body),
                            endpoint,
                        ));
                    }
                    log::debug!(
                        "{} {} returned {} (attempt {}/{}), retrying",
                        request.method,
                        endpoint,
                        res.status,
                        attempt,
                        MAX_ATTEMPTS
                    );
                }
                Err(e) if e.is_retryable() => {
                    if last_attempt {
                        return Err(ApiError::new(
                            0,
                            format!("Connection error after {} retries: {}", MAX_ATTEMPTS, e),
                            endpoint,
                        ));
                    }
                    log::debug!(
                        "{} {} failed (attempt {}/{}): {}, retrying",
                        request.method,
                        endpoint,
                        attempt,
                        MAX_ATTEMPTS,
                        e
                    );
                }
                Err(e) => return Err(ApiError::new(0, e.to_string(), endpoint)),
            }

            self.sleeper.sleep(RETRY_DELAYS[attempt - 1]);
        }
    }
}

fn parse_success(res: RawResponse, endpoint: &str) -> Result<Value, ApiError> {
    if res.status == 204 || res.body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&res.body).map_err(|e| {
        ApiError::new(res.status, format!("Invalid JSON in response: {}", e), endpoint)
    })
}

/// Prefer the server's `message` field; fall back to the raw body.
fn client_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn into_list(value: Value, endpoint: &str) -> Result<Vec<Value>, ApiError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(ApiError::new(
            0,
            format!("Expected a JSON array, got: {}", other),
            endpoint,
        )),
    }
}

impl MovieApi for ApiClient {
    fn test_connection(&self) -> Result<Value, ApiError> {
        self.request(Method::GET, STATUS_ENDPOINT, &[])
    }

    fn get_movies(&self) -> Result<Vec<Value>, ApiError> {
        let value = self.request(Method::GET, MOVIE_ENDPOINT, &[])?;
        into_list(value, MOVIE_ENDPOINT)
    }

    fn delete_movie(
        &self,
        movie_id: i64,
        delete_files: bool,
        add_exclusion: bool,
    ) -> Result<(), ApiError> {
        let endpoint = format!("{}/{}", MOVIE_ENDPOINT, movie_id);
        let delete_files = delete_files.to_string();
        let add_exclusion = add_exclusion.to_string();
        self.request(
            Method::DELETE,
            &endpoint,
            &[
                ("deleteFiles", delete_files.as_str()),
                ("addImportExclusion", add_exclusion.as_str()),
            ],
        )?;
        Ok(())
    }

    fn get_exclusions(&self) -> Result<Vec<Value>, ApiError> {
        let value = self.request(Method::GET, EXCLUSIONS_ENDPOINT, &[])?;
        into_list(value, EXCLUSIONS_ENDPOINT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use mockall::{mock, Sequence};
    use serde_json::json;

    mock! {
        Transport {}

        impl Transport for Transport {
            fn send(&self, request: &ApiRequest) -> Result<RawResponse, TransportError>;
        }
    }

    mock! {
        Sleeper {}

        impl Sleeper for Sleeper {
            fn sleep(&self, delay: Duration);
        }
    }

    fn client(transport: MockTransport, sleeper: MockSleeper) -> ApiClient {
        ApiClient::with_transport(
            "http://radarr.local:7878/",
            "secret",
            Box::new(transport),
            Box::new(sleeper),
        )
    }

    fn no_sleep() -> MockSleeper {
        let mut sleeper = MockSleeper::new();
        sleeper.expect_sleep().never();
        sleeper
    }

    #[test]
    fn test_get_movies_parses_array() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.method == Method::GET
                    && req.url == "http://radarr.local:7878/api/v3/movie"
                    && req.api_key == "secret"
            })
            .times(1)
            .returning(|_| Ok(RawResponse::new(200, r#"[{"id": 1, "title": "Alien"}]"#)));

        let movies = client(transport, no_sleep()).get_movies().unwrap();
        assert_eq!(movies, vec![json!({"id": 1, "title": "Alien"})]);
    }

    #[test]
    fn test_empty_body_is_success_without_payload() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(RawResponse::new(200, "")));

        let value = client(transport, no_sleep())
            .request(Method::GET, "/api/v3/movie", &[])
            .unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_delete_sends_string_flags() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.method == Method::DELETE
                    && req.url.ends_with("/api/v3/movie/42")
                    && req.query
                        == vec![
                            ("deleteFiles".to_string(), "false".to_string()),
                            ("addImportExclusion".to_string(), "true".to_string()),
                        ]
            })
            .times(1)
            .returning(|_| Ok(RawResponse::new(204, "")));

        client(transport, no_sleep()).delete_movie(42, false, true).unwrap();
    }

    #[test]
    fn test_server_errors_exhaust_retries_with_backoff() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(3)
            .returning(|_| Ok(RawResponse::new(503, "unavailable")));

        let mut seq = Sequence::new();
        let mut sleeper = MockSleeper::new();
        sleeper
            .expect_sleep()
            .with(eq(Duration::from_secs(1)))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        sleeper
            .expect_sleep()
            .with(eq(Duration::from_secs(2)))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let err = client(transport, sleeper).get_movies().unwrap_err();
        assert_eq!(err.status_code, 503);
        assert_eq!(err.endpoint, "/api/v3/movie");
        assert!(err.message.contains("Server error after 3 retries"));
    }

    #[test]
    fn test_client_error_is_not_retried() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(RawResponse::new(401, r#"{"message": "Unauthorized"}"#)));

        let err = client(transport, no_sleep()).test_connection().unwrap_err();
        assert_eq!(err.status_code, 401);
        assert_eq!(err.message, "Unauthorized");
        assert_eq!(err.endpoint, "/api/v3/system/status");
    }

    #[test]
    fn test_client_error_with_plain_body_keeps_raw_text() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(RawResponse::new(404, "Not Found")));

        let err = client(transport, no_sleep())
            .delete_movie(7, true, true)
            .unwrap_err();
        assert_eq!(err.status_code, 404);
        assert_eq!(err.message, "Not Found");
        assert_eq!(err.endpoint, "/api/v3/movie/7");
    }

    #[test]
    fn test_connection_errors_exhaust_retries() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(3)
            .returning(|_| Err(TransportError::Connect("refused".into())));

        let mut sleeper = MockSleeper::new();
        sleeper.expect_sleep().times(2).return_const(());

        let err = client(transport, sleeper).test_connection().unwrap_err();
        assert_eq!(err.status_code, 0);
        assert!(err.message.starts_with("Connection error after 3 retries"));
    }

    #[test]
    fn test_recovers_after_transient_failure() {
        let mut seq = Sequence::new();
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(TransportError::Timeout("slow".into())));
        transport
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(RawResponse::new(200, r#"{"version": "5.2.6"}"#)));

        let mut sleeper = MockSleeper::new();
        sleeper
            .expect_sleep()
            .with(eq(Duration::from_secs(1)))
            .times(1)
            .return_const(());

        let status = client(transport, sleeper).test_connection().unwrap();
        assert_eq!(status["version"], "5.2.6");
    }

    #[test]
    fn test_non_retryable_transport_error_fails_immediately() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Err(TransportError::Other("builder error".into())));

        let err = client(transport, no_sleep()).get_exclusions().unwrap_err();
        assert_eq!(err.status_code, 0);
        assert_eq!(err.endpoint, "/api/v3/exclusions");
    }
}
