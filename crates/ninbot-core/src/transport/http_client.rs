//! [`Transport`] over reqwest.
//!
//! No cookie store and no retries here: the session layer owns both. GET
//! requests follow redirects, POST requests do not, so a login redirect
//! target stays visible in the response headers.

use std::time::Duration;

use async_trait::async_trait;

use super::{BodyError, Method, NetworkError, RawResponse, Request, Transport};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 10;

/// Reqwest-backed transport.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    /// Used for POST requests; never follows redirects.
    no_redirect_client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the given request-level timeout.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .unwrap_or_default();

        let no_redirect_client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_default();

        Self {
            client,
            no_redirect_client,
        }
    }

    fn client_for(&self, method: Method) -> &reqwest::Client {
        match method {
            Method::Get => &self.client,
            Method::Post => &self.no_redirect_client,
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &Request) -> Result<RawResponse, NetworkError> {
        let client = self.client_for(request.method);
        let mut builder = match request.method {
            Method::Get => client.get(&request.url),
            Method::Post => client.post(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if request.method == Method::Post {
            builder = builder.form(&request.form);
        }

        let mut resp = builder.send().await?;
        let status = resp.status().as_u16();
        let headers: Vec<(String, String)> = resp
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        // Read chunk by chunk so a failed read still yields what arrived.
        let mut buf: Vec<u8> = Vec::new();
        let body = loop {
            match resp.chunk().await {
                Ok(Some(chunk)) => buf.extend_from_slice(&chunk),
                Ok(None) => break Ok(String::from_utf8_lossy(&buf).into_owned()),
                Err(e) => {
                    break Err(BodyError {
                        partial: String::from_utf8_lossy(&buf).into_owned(),
                        message: e.to_string(),
                    })
                }
            }
        };

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
