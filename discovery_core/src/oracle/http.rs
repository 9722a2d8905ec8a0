//! HTTP oracle client.

use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::{Oracle, OracleError, ResolutionOutcome};

/// Default pairing endpoint.
pub const DEFAULT_ORACLE_URL: &str = "https://neal.fun/api/infinite-craft/pair";

/// Default pause before every request.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(500);

/// Headers the oracle expects from its own front end.
pub const ORACLE_HEADERS: [(&str, &str); 14] = [
    ("authority", "neal.fun"),
    ("accept", "*/*"),
    ("accept-language", "en-US,en;q=0.9"),
    ("cache-control", "no-cache"),
    ("dnt", "1"),
    ("pragma", "no-cache"),
    ("referer", "https://neal.fun/infinite-craft/"),
    ("sec-ch-ua", r#""Chromium";v="121", "Not A(Brand";v="99""#),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", r#""macOS""#),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-origin"),
    (
        "user-agent",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    ),
];

/// Response body of the pairing endpoint.
#[derive(Debug, Deserialize)]
struct PairResponse {
    result: String,
    #[serde(default)]
    emoji: String,
}

/// Blocking HTTP client for the pairing endpoint.
pub struct HttpOracle {
    client: Client,
    base_url: Url,
    request_delay: Duration,
}

impl HttpOracle {
    /// Build a client for `base_url` that waits `request_delay` before each call.
    pub fn new(base_url: &str, request_delay: Duration) -> Result<Self, HttpOracleError> {
        Self::with_builder(base_url, request_delay, Client::builder())
    }

    fn with_builder(
        base_url: &str,
        request_delay: Duration,
        builder: ClientBuilder,
    ) -> Result<Self, HttpOracleError> {
        let base_url = Url::parse(base_url).map_err(|e| HttpOracleError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let client = builder
            .default_headers(oracle_headers())
            .build()
            .map_err(HttpOracleError::Client)?;

        Ok(Self {
            client,
            base_url,
            request_delay,
        })
    }

    /// URL for one pair, with both names query-encoded.
    pub fn pair_url(&self, first: &str, second: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("first", first)
            .append_pair("second", second);
        url
    }

    fn fetch(&self, first: &str, second: &str) -> Result<(StatusCode, String), OracleError> {
        thread::sleep(self.request_delay);

        let url = self.pair_url(first, second);
        debug!(%url, "querying oracle");
        let response = self.client.get(url).send().map_err(OracleError::Transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Ok((status, String::new()));
        }
        let body = response.text().map_err(OracleError::Transport)?;
        Ok((status, body))
    }
}

impl Oracle for HttpOracle {
    fn resolve(&mut self, first: &str, second: &str) -> ResolutionOutcome {
        match self.fetch(first, second) {
            Ok((status, body)) => interpret_response(status, &body),
            Err(err) => ResolutionOutcome::Failed(err),
        }
    }
}

/// Errors building an [`HttpOracle`].
#[derive(Debug, Error)]
pub enum HttpOracleError {
    #[error("invalid oracle url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Turn a status code and body into an outcome.
///
/// Anything but `200 OK` fails without looking at the body.
pub fn interpret_response(status: StatusCode, body: &str) -> ResolutionOutcome {
    if status != StatusCode::OK {
        return ResolutionOutcome::Failed(OracleError::Protocol {
            status: status.as_u16(),
        });
    }

    match serde_json::from_str::<PairResponse>(body) {
        Ok(pair) if pair.result.is_empty() => ResolutionOutcome::Empty,
        Ok(pair) => ResolutionOutcome::found(pair.result, pair.emoji),
        Err(err) => ResolutionOutcome::Failed(OracleError::Decode(err)),
    }
}

fn oracle_headers() -> HeaderMap {
    ORACLE_HEADERS
        .into_iter()
        .map(|(name, value)| {
            (
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;
    use std::time::Instant;

    /// Answer a single request on a local port with `status` and `body`.
    /// The handle yields the request head that was received.
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/pair", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&head).into_owned()
        });

        (url, handle)
    }

    fn local_oracle(url: &str, delay: Duration) -> HttpOracle {
        HttpOracle::with_builder(url, delay, Client::builder().no_proxy()).unwrap()
    }

    #[test]
    fn test_resolve_waits_and_fails_on_server_error() {
        let (url, server) = serve_once("500 Internal Server Error", "{}");
        let delay = Duration::from_millis(200);
        let mut oracle = local_oracle(&url, delay);

        let started = Instant::now();
        let outcome = oracle.resolve("C++", "Water");

        assert!(started.elapsed() >= delay);
        assert!(matches!(
            outcome,
            ResolutionOutcome::Failed(OracleError::Protocol { status: 500 })
        ));

        let head = server.join().unwrap();
        assert!(head.starts_with("GET /pair?first=C%2B%2B&second=Water HTTP/1.1"));
        assert!(head.to_lowercase().contains("referer: https://neal.fun/infinite-craft/"));
    }

    #[test]
    fn test_resolve_found() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"result":"Plant","emoji":"🌱","isNew":false}"#,
        );
        let mut oracle = local_oracle(&url, Duration::ZERO);

        match oracle.resolve("Earth", "Water") {
            ResolutionOutcome::Found { result, glyph } => {
                assert_eq!(result, "Plant");
                assert_eq!(glyph, "🌱");
            }
            other => panic!("expected Found, got {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_resolve_empty() {
        let (url, server) = serve_once("200 OK", r#"{"result":"","emoji":"","isNew":false}"#);
        let mut oracle = local_oracle(&url, Duration::ZERO);

        assert!(matches!(
            oracle.resolve("Fire", "Fire"),
            ResolutionOutcome::Empty
        ));
        server.join().unwrap();
    }

    #[test]
    fn test_resolve_closed_port_is_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/pair", listener.local_addr().unwrap());
        drop(listener);

        let mut oracle = local_oracle(&url, Duration::ZERO);
        assert!(matches!(
            oracle.resolve("Earth", "Water"),
            ResolutionOutcome::Failed(OracleError::Transport(_))
        ));
    }

    #[test]
    fn test_interpret_found() {
        let body = r#"{"result":"Plant","emoji":"🌱","isNew":false}"#;
        match interpret_response(StatusCode::OK, body) {
            ResolutionOutcome::Found { result, glyph } => {
                assert_eq!(result, "Plant");
                assert_eq!(glyph, "🌱");
            }
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn test_interpret_empty_result() {
        let body = r#"{"result":"","emoji":"","isNew":false}"#;
        assert!(matches!(
            interpret_response(StatusCode::OK, body),
            ResolutionOutcome::Empty
        ));
    }

    #[test]
    fn test_interpret_non_success_status() {
        let body = r#"{"result":"Plant","emoji":"🌱","isNew":false}"#;
        assert!(matches!(
            interpret_response(StatusCode::FORBIDDEN, body),
            ResolutionOutcome::Failed(OracleError::Protocol { status: 403 })
        ));
    }

    #[test]
    fn test_interpret_malformed_body() {
        assert!(matches!(
            interpret_response(StatusCode::OK, "<html>blocked</html>"),
            ResolutionOutcome::Failed(OracleError::Decode(_))
        ));
    }

    #[test]
    fn test_pair_url_encodes_names() {
        let oracle = HttpOracle::new(DEFAULT_ORACLE_URL, Duration::ZERO).unwrap();
        let url = oracle.pair_url("Hot Air", "Salt & Pepper");
        assert_eq!(
            url.as_str(),
            "https://neal.fun/api/infinite-craft/pair?first=Hot+Air&second=Salt+%26+Pepper"
        );
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            HttpOracle::new("not a url", Duration::ZERO),
            Err(HttpOracleError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_headers_are_valid() {
        let headers = oracle_headers();
        assert_eq!(headers.len(), ORACLE_HEADERS.len());
        assert_eq!(headers["referer"], "https://neal.fun/infinite-craft/");
    }
}
