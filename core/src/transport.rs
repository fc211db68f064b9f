//! The collaborator that actually puts an `HttpRequest` on the wire.
//!
//! # Design
//! `Transport` is the only I/O seam in the crate. `UreqTransport` never
//! follows redirects: a 3xx answer with a `Location` header comes back as
//! `TransportError::RedirectRefused` carrying the response, which callers
//! treat as an ordinary observed response. Non-2xx statuses are data, not
//! errors, and bodies are read in full regardless of size.

use tracing::debug;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let sent = match &request.body {
            Some(body) => builder.body(body.clone()).map(|req| self.agent.run(req)),
            None => builder.body(()).map(|req| self.agent.run(req)),
        };
        let mut response = sent
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?
            .map_err(|e| TransportError::Fault(e.to_string()))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| TransportError::Fault(e.to_string()))?;

        let observed = HttpResponse {
            status: status.as_u16(),
            headers,
            body,
        };
        debug!(status = observed.status, bytes = observed.body.len(), "response received");

        if status.is_redirection() {
            if let Some(location) = observed.header("location") {
                return Err(TransportError::RedirectRefused {
                    location: location.to_string(),
                    response: observed,
                });
            }
        }
        Ok(observed)
    }
}
