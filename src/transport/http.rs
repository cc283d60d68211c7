use crate::{Error, Result};
use reqwest::blocking::{multipart::Form, Client, RequestBuilder, Response};
use reqwest::Proxy;
use std::env;
use std::time::Duration;
use tracing::debug;

/// How a provider expects its credential.
#[derive(Clone)]
pub enum Auth {
    None,
    Bearer(String),
    Header { name: &'static str, value: String },
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::None => f.write_str("None"),
            Auth::Bearer(_) => f.write_str("Bearer(***)"),
            Auth::Header { name, .. } => write!(f, "Header({name}: ***)"),
        }
    }
}

/// Blocking HTTP transport shared by the provider clients.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl HttpTransport {
    pub fn new(base_url: &str, auth: Auth, timeout_secs: u64) -> Result<Self> {
        let mut builder = Client::builder().timeout(Duration::from_secs(timeout_secs));

        if let Ok(proxy_url) = env::var("AI_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        self.send(self.client.get(self.url(path)).query(query))
    }

    pub fn post_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<Response> {
        self.send(self.client.post(self.url(path)).query(query).json(body))
    }

    pub fn post_multipart(&self, path: &str, form: Form) -> Result<Response> {
        self.send(self.client.post(self.url(path)).multipart(form))
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = match &self.auth {
            Auth::None => request,
            Auth::Bearer(key) => request.bearer_auth(key),
            Auth::Header { name, value } => request.header(*name, value),
        };
        let response = request
            .send()
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;

        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "http response");
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().unwrap_or_default();
        Err(Error::Remote {
            status: status.as_u16(),
            message,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(TransportError::Http(e))
    }
}
