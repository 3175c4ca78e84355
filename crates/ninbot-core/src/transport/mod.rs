//! The I/O seam between the session layer and the network.
//!
//! A [`Transport`] performs exactly one HTTP exchange per call and reports
//! the two failure points separately: the exchange itself
//! ([`NetworkError`]) and reading the body ([`BodyError`], carried inside
//! [`RawResponse`] with whatever was read before the failure). Retry policy
//! lives one layer up in [`crate::session`].

pub mod http_client;

pub use http_client::HttpTransport;

use async_trait::async_trait;

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built request: absolute URL, form fields and every header to send.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: String,
    /// Form fields, sent url-encoded in the body of POST requests.
    pub form: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// The exchange failed before a response was obtained
/// (connection refused, timeout, reset).
#[derive(thiserror::Error, Debug, Clone)]
#[error("{message}")]
pub struct NetworkError {
    pub message: String,
}

impl NetworkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        Self::new(e.to_string())
    }
}

/// Reading the body failed part-way through.
#[derive(thiserror::Error, Debug, Clone)]
#[error("{message}")]
pub struct BodyError {
    /// Content read before the failure, lossily decoded.
    pub partial: String,
    pub message: String,
}

/// Response as seen by the session layer.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// All response headers, in the order received.
    pub headers: Vec<(String, String)>,
    pub body: Result<String, BodyError>,
}

impl RawResponse {
    /// A successfully read response with no headers.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: Ok(body.into()),
        }
    }

    /// Add a header (builder style).
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// All values of a header, matched case-insensitively.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Performs one HTTP exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &Request) -> Result<RawResponse, NetworkError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn execute(&self, request: &Request) -> Result<RawResponse, NetworkError> {
        (**self).execute(request).await
    }
}
