//! Session transport: the session cookie plus the retry policy.
//!
//! Two retry loops sit on top of a [`Transport`]:
//!
//! - **Network**: an exchange that fails before a response arrives is
//!   retried immediately, up to [`SessionConfig::network_attempts`] times in
//!   total. The last failure is surfaced.
//! - **Body read**: a response whose body fails to read is fetched again.
//!   If the partial content is the maintenance page the session waits
//!   [`SessionConfig::maintenance_delay`] and tries again with no ceiling;
//!   any other read failure counts against
//!   [`SessionConfig::read_attempts`]. A POST is never re-sent after such
//!   a failure, since the server may already have applied it.
//!
//! Every response is checked for a rotated session cookie, which replaces
//! the held token.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::pages::is_maintenance_page;
use crate::transport::{Method, RawResponse, Request, Transport};

pub const DEFAULT_BASE_URL: &str = "http://www.theninja-rpg.com";
pub const SESSION_COOKIE: &str = "PHPSESSID";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 6.1; rv:8.0.1) Gecko/20100101 Firefox/8.0.1";

const DEFAULT_NETWORK_ATTEMPTS: u32 = 5;
const DEFAULT_READ_ATTEMPTS: u32 = 5;
const DEFAULT_MAINTENANCE_DELAY: Duration = Duration::from_secs(10);

/// Where and how the session talks to the site.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Origin every request path is appended to.
    pub base_url: String,
    pub user_agent: String,
    /// Total attempts for one exchange before a network error is surfaced.
    pub network_attempts: u32,
    /// Total non-maintenance body-read failures tolerated per request.
    pub read_attempts: u32,
    /// Pause between reads while the site is under maintenance.
    pub maintenance_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            network_attempts: DEFAULT_NETWORK_ATTEMPTS,
            read_attempts: DEFAULT_READ_ATTEMPTS,
            maintenance_delay: DEFAULT_MAINTENANCE_DELAY,
        }
    }
}

impl SessionConfig {
    /// Default policy against a different origin.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// A response whose body was read completely.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Response {
    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Redirect target, if the server sent one.
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    /// `Content-Length` header, or the body size when the header is absent.
    pub fn content_length(&self) -> u64 {
        self.header("content-length")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(self.body.len() as u64)
    }
}

/// Sends requests on behalf of one logged-in (or logging-in) session.
pub struct SessionTransport<T> {
    transport: T,
    config: SessionConfig,
    token: Option<String>,
}

impl<T: Transport> SessionTransport<T> {
    pub fn new(transport: T, config: SessionConfig) -> Self {
        Self {
            transport,
            config,
            token: None,
        }
    }

    /// The session token currently held.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Install a token obtained outside this session.
    pub(crate) fn resume(&mut self, token: String) {
        self.token = Some(token);
    }

    pub async fn get(&mut self, path: &str) -> Result<Response> {
        self.send(Method::Get, path, &[]).await
    }

    pub async fn post(&mut self, path: &str, form: &[(&str, &str)]) -> Result<Response> {
        self.send(Method::Post, path, form).await
    }

    /// Send one request and return the fully read response.
    pub async fn send(
        &mut self,
        method: Method,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<Response> {
        let mut read_failures = 0u32;
        loop {
            // Rebuilt per read attempt so a token rotated by a failed read is used.
            let request = self.build_request(method, path, form);
            let raw = self.execute_with_retry(&request).await?;
            self.rotate_token(&raw);

            let RawResponse {
                status,
                headers,
                body,
            } = raw;
            match body {
                Ok(body) => {
                    return Ok(Response {
                        status,
                        headers,
                        body,
                    })
                }
                Err(e) if is_maintenance_page(&e.partial) => {
                    tracing::debug!(
                        "Site is under maintenance, retrying {} in {:?}",
                        path,
                        self.config.maintenance_delay
                    );
                    tokio::time::sleep(self.config.maintenance_delay).await;
                }
                Err(e) => {
                    read_failures += 1;
                    // A POST that got a response may already have been applied.
                    if method == Method::Post
                        || read_failures >= self.config.read_attempts.max(1)
                    {
                        return Err(Error::BodyRead {
                            attempts: read_failures,
                            source: e,
                        });
                    }
                    tracing::debug!(
                        "Body read of {} {} failed ({read_failures}): {e}",
                        method,
                        path
                    );
                }
            }
        }
    }

    fn build_request(&self, method: Method, path: &str, form: &[(&str, &str)]) -> Request {
        let mut headers = vec![
            ("User-Agent".to_string(), self.config.user_agent.clone()),
            (
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            ),
        ];
        if let Some(token) = &self.token {
            headers.push(("Cookie".to_string(), format!("{SESSION_COOKIE}={token}")));
        }

        Request {
            method,
            url: format!("{}{}", self.config.base_url, path),
            form: form
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            headers,
        }
    }

    async fn execute_with_retry(&self, request: &Request) -> Result<RawResponse> {
        let max_attempts = self.config.network_attempts.max(1);
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            tracing::trace!("{} {} (attempt {attempts})", request.method, request.url);
            match self.transport.execute(request).await {
                Ok(raw) => return Ok(raw),
                Err(e) if attempts >= max_attempts => {
                    return Err(Error::Network {
                        attempts,
                        source: e,
                    })
                }
                Err(e) => {
                    tracing::debug!(
                        "{} {} failed (attempt {attempts}/{max_attempts}): {e}",
                        request.method,
                        request.url
                    );
                }
            }
        }
    }

    fn rotate_token(&mut self, raw: &RawResponse) {
        for value in raw.header_values("set-cookie") {
            if let Some(token) = session_cookie_value(value) {
                tracing::debug!("Session token rotated");
                self.token = if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                };
            }
        }
    }
}

/// Value of the session cookie in a `Set-Cookie` header, if that is the
/// cookie being set.
fn session_cookie_value(set_cookie: &str) -> Option<&str> {
    let pair = set_cookie.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    (name.trim() == SESSION_COOKIE).then(|| value.trim())
}
