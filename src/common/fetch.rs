use std::{collections::HashMap, sync::Mutex};

use crate::error::{Error, Result};

/// A successful (2xx) upstream response body.
#[derive(Debug, Clone, Default)]
pub struct Fetched {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl Fetched {
    pub fn json(body: impl Into<Vec<u8>>) -> Self {
        Self { bytes: body.into(), content_type: Some("application/json".into()) }
    }
}

/// Read-only access to upstream documents by URL.
/// Implementations must map non-2xx statuses and transport failures
/// (including timeouts) to `Error::Fetch`.
pub trait Fetch: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Fetched>;
}

impl<F: Fetch + ?Sized> Fetch for &F {
    fn fetch(&self, url: &str) -> Result<Fetched> { (**self).fetch(url) }
}

/// Blocking HTTP fetcher with a per-request timeout.
#[cfg(feature = "download")]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "download")]
impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Fetch { url: String::new(), status: None, reason: e.to_string() })?;
        Ok(Self { client })
    }
}

#[cfg(feature = "download")]
impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Fetched> {
        tracing::debug!(url, "GET");
        let transport = |e: reqwest::Error| Error::Fetch {
            url: url.to_string(),
            status: e.status().map(|s| s.as_u16()),
            reason: if e.is_timeout() { format!("timed out: {e}") } else { e.to_string() },
        };

        let resp = self.client.get(url).send().map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Fetch {
                url: url.to_string(),
                status: Some(status.as_u16()),
                reason: format!("HTTP {status}"),
            });
        }

        let content_type = resp.headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = resp.bytes().map_err(transport)?.to_vec();

        Ok(Fetched { bytes, content_type })
    }
}

/// Simple in-memory fetcher.
/// Keys are full URLs; unknown URLs answer 404. Counts calls per URL.
#[derive(Default)]
pub struct MemFetcher {
    responses: HashMap<String, std::result::Result<Fetched, u16>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl MemFetcher {
    pub fn new() -> Self { Self::default() }

    /// Serve `body` as JSON at `url`.
    pub fn with_json(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.into(), Ok(Fetched::json(body)));
        self
    }

    /// Serve an arbitrary response at `url`.
    pub fn with_response(mut self, url: impl Into<String>, fetched: Fetched) -> Self {
        self.responses.insert(url.into(), Ok(fetched));
        self
    }

    /// Answer `url` with a non-2xx status.
    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.responses.insert(url.into(), Err(status));
        self
    }

    /// Number of times `url` was requested.
    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().map(|c| c.get(url).copied().unwrap_or(0)).unwrap_or(0)
    }

    /// Total number of requests across all URLs.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().map(|c| c.values().sum()).unwrap_or(0)
    }
}

impl Fetch for MemFetcher {
    fn fetch(&self, url: &str) -> Result<Fetched> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(url.to_string()).or_default() += 1;
        }
        match self.responses.get(url) {
            Some(Ok(fetched)) => Ok(fetched.clone()),
            Some(Err(status)) => Err(Error::Fetch {
                url: url.to_string(),
                status: Some(*status),
                reason: format!("HTTP {status}"),
            }),
            None => Err(Error::Fetch {
                url: url.to_string(),
                status: Some(404),
                reason: "HTTP 404 Not Found".into(),
            }),
        }
    }
}
