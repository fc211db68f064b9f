//! One HTTP exchange: encode the body, send, compare.
//!
//! # Design
//! `Request::execute` walks a fixed sequence of stages. Encoding the body
//! comes first, and an encode failure ends the exchange before anything is
//! sent. The outbound request then carries the body's content type and
//! every caller-declared header value. A refused redirect is still an
//! observed response. Finally the observed response is compared against
//! the expectation.
//!
//! Outcomes split into two channels: `Outcome::Failed` for encode errors and
//! mismatches (report and carry on) and `FatalError` for transport faults
//! (stop the run).

use tracing::{debug, error, warn};

use crate::body::Body;
use crate::config::Config;
use crate::error::{FatalError, Failure, TransportError};
use crate::header::Header;
use crate::http::{HttpMethod, HttpRequest};
use crate::response::Response;
use crate::transport::Transport;

/// Result of an exchange that did not hit a fatal error.
#[derive(Debug)]
pub enum Outcome {
    Passed,
    Failed(Failure),
}

impl Outcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    pub fn into_failure(self) -> Option<Failure> {
        match self {
            Outcome::Passed => None,
            Outcome::Failed(failure) => Some(failure),
        }
    }
}

/// Headers and body to send, plus the response expected back.
#[derive(Debug)]
pub struct Request {
    pub header: Header,
    pub body: Option<Box<dyn Body>>,
    pub want: Response,
}

impl Request {
    pub fn new(want: Response) -> Self {
        Self {
            header: Header::new(),
            body: None,
            want,
        }
    }

    pub fn with_header(mut self, header: Header) -> Self {
        self.header = header;
        self
    }

    pub fn with_body(mut self, body: impl Body + 'static) -> Self {
        self.body = Some(Box::new(body));
        self
    }

    /// Leading line of a failure message: what was sent, and where.
    fn context(&self, method: HttpMethod, path: &str) -> String {
        let mut context = format!(" {method} {path} Header: {}", self.header);
        if let Some(body) = &self.body {
            context.push_str(&format!(" Body: {body}"));
        }
        context
    }

    /// Build the outbound request without sending it.
    pub fn prepare(
        &self,
        method: HttpMethod,
        path: &str,
        config: &Config,
    ) -> Result<HttpRequest, Failure> {
        let mut headers = Vec::new();
        let body = match &self.body {
            Some(body) => {
                let encoded = body.encode().map_err(|source| Failure::Encode {
                    context: self.context(method, path),
                    source,
                })?;
                if self.header.values("content-type").is_empty() {
                    headers.push(("Content-Type".to_string(), body.content_type().to_string()));
                }
                Some(encoded)
            }
            None => None,
        };
        headers.extend(self.header.to_pairs());

        Ok(HttpRequest {
            method,
            url: config.url(path),
            headers,
            body,
        })
    }

    pub fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        config: &Config,
        transport: &dyn Transport,
    ) -> Result<Outcome, FatalError> {
        let request = match self.prepare(method, path, config) {
            Ok(request) => request,
            Err(failure) => {
                warn!(%method, path, "request body failed to encode");
                return Ok(Outcome::Failed(failure));
            }
        };
        debug!(
            %method,
            url = %request.url,
            headers = request.headers.len(),
            body = request.body.as_ref().map_or(0, Vec::len),
            "sending request"
        );

        let observed = match transport.send(&request) {
            Ok(response) => response,
            Err(TransportError::RedirectRefused { location, response }) => {
                debug!(%location, status = response.status, "redirect not followed");
                response
            }
            Err(TransportError::InvalidRequest(reason)) => {
                error!(%method, url = %request.url, %reason, "invalid request");
                return Err(FatalError::InvalidRequest {
                    method: method.to_string(),
                    url: request.url,
                    reason,
                });
            }
            Err(TransportError::Fault(reason)) => {
                error!(%method, url = %request.url, %reason, "transport failure");
                return Err(FatalError::Transport {
                    method: method.to_string(),
                    url: request.url,
                    reason,
                });
            }
        };

        match self.want.compare(&observed) {
            Ok(()) => Ok(Outcome::Passed),
            Err(report) => {
                warn!(%method, path, checks = report.checks().len(), "response mismatch");
                Ok(Outcome::Failed(Failure::Mismatch {
                    context: self.context(method, path),
                    report,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{FormBody, JsonBody};
    use crate::error::Check;
    use crate::http::HttpResponse;
    use crate::multipart::MultipartBody;
    use serde_json::json;
    use std::cell::RefCell;

    /// Answers every request with a canned result and records what it saw.
    struct FakeTransport {
        reply: RefCell<Option<Result<HttpResponse, TransportError>>>,
        sent: RefCell<Vec<HttpRequest>>,
    }

    impl FakeTransport {
        fn replying(reply: Result<HttpResponse, TransportError>) -> Self {
            Self {
                reply: RefCell::new(Some(reply)),
                sent: RefCell::new(Vec::new()),
            }
        }

        fn ok(status: u16, body: &str) -> Self {
            Self::replying(Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.as_bytes().to_vec(),
            }))
        }
    }

    impl Transport for FakeTransport {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.sent.borrow_mut().push(request.clone());
            self.reply
                .borrow_mut()
                .take()
                .unwrap_or_else(|| Err(TransportError::Fault("no reply queued".to_string())))
        }
    }

    fn config() -> Config {
        Config::new("127.0.0.1:9999")
    }

    #[test]
    fn passes_when_expectation_holds() {
        let transport = FakeTransport::ok(200, "");
        let outcome = Request::new(Response::status(200))
            .execute(HttpMethod::Get, "/foo/bar", &config(), &transport)
            .unwrap();
        assert!(outcome.is_passed());

        let sent = transport.sent.borrow();
        assert_eq!(sent[0].url, "http://127.0.0.1:9999/foo/bar");
        assert!(sent[0].body.is_none());
        assert!(sent[0].headers.is_empty());
    }

    #[test]
    fn every_header_value_is_attached() {
        let transport = FakeTransport::ok(200, "");
        let header = Header::new()
            .with("Accept", ["text/html", "application/json"])
            .with("Auth", ["6tygfd4"]);
        Request::new(Response::status(200))
            .with_header(header.clone())
            .execute(HttpMethod::Get, "/", &config(), &transport)
            .unwrap();

        let sent = transport.sent.borrow();
        for (name, values) in header.iter() {
            let attached: Vec<&str> = sent[0].header_values(name).collect();
            assert_eq!(attached, values, "{name}");
        }
    }

    #[test]
    fn body_sets_content_type_and_bytes() {
        let transport = FakeTransport::ok(200, "");
        Request::new(Response::status(200))
            .with_body(FormBody::new().with("user", ["gopher"]))
            .execute(HttpMethod::Post, "/signin", &config(), &transport)
            .unwrap();

        let sent = transport.sent.borrow();
        assert_eq!(
            sent[0].header_values("content-type").collect::<Vec<_>>(),
            ["application/x-www-form-urlencoded"]
        );
        assert_eq!(sent[0].body.as_deref(), Some(&b"user=gopher"[..]));
    }

    #[test]
    fn declared_content_type_wins() {
        let transport = FakeTransport::ok(200, "");
        Request::new(Response::status(200))
            .with_header(Header::new().with("Content-Type", ["application/vnd.api+json"]))
            .with_body(JsonBody::new(json!({})))
            .execute(HttpMethod::Post, "/", &config(), &transport)
            .unwrap();

        let sent = transport.sent.borrow();
        assert_eq!(
            sent[0].header_values("content-type").collect::<Vec<_>>(),
            ["application/vnd.api+json"]
        );
    }

    #[test]
    fn mismatch_is_wrapped_with_context() {
        let transport = FakeTransport::ok(200, r#"{"foo":"bar"}"#);
        let outcome = Request::new(
            Response::status(201).with_body(json!({"Hello": "World"})),
        )
        .with_header(Header::new().with("Auth", ["6tygfd4"]))
        .execute(HttpMethod::Get, "/foo/bar", &config(), &transport)
        .unwrap();

        let failure = outcome.into_failure().unwrap();
        assert_eq!(
            failure.to_string(),
            " GET /foo/bar Header: {\"Auth\": [\"6tygfd4\"]}\n\
             StatusCode got = 200, want 201\n\
             Body got {\"foo\":\"bar\"}, want {\"Hello\":\"World\"}\n"
        );
    }

    #[test]
    fn context_names_the_body() {
        let transport = FakeTransport::ok(500, "");
        let failure = Request::new(Response::status(200))
            .with_body(JsonBody::new(json!({"user": "gopher"})))
            .execute(HttpMethod::Post, "/users", &config(), &transport)
            .unwrap()
            .into_failure()
            .unwrap();
        assert_eq!(
            failure.context(),
            " POST /users Header: {} Body: {\"user\":\"gopher\"}"
        );
    }

    #[test]
    fn refused_redirect_is_compared() {
        let response = HttpResponse {
            status: 303,
            headers: vec![("Location".to_string(), "/home".to_string())],
            body: Vec::new(),
        };
        let transport = FakeTransport::replying(Err(TransportError::RedirectRefused {
            location: "/home".to_string(),
            response,
        }));
        let want = Response::status(303).with_header(Header::new().with("Location", ["/home"]));
        let outcome = Request::new(want)
            .execute(HttpMethod::Post, "/signin", &config(), &transport)
            .unwrap();
        assert!(outcome.is_passed());
    }

    #[test]
    fn transport_fault_is_fatal() {
        let transport =
            FakeTransport::replying(Err(TransportError::Fault("connection refused".to_string())));
        let err = Request::new(Response::status(200))
            .execute(HttpMethod::Delete, "/items/1", &config(), &transport)
            .unwrap_err();
        assert!(matches!(err, FatalError::Transport { ref method, .. } if method == "DELETE"));
    }

    #[test]
    fn invalid_request_is_fatal() {
        let transport =
            FakeTransport::replying(Err(TransportError::InvalidRequest("bad uri".to_string())));
        let err = Request::new(Response::status(200))
            .execute(HttpMethod::Get, "/ bad", &config(), &transport)
            .unwrap_err();
        assert!(matches!(err, FatalError::InvalidRequest { .. }));
    }

    #[test]
    fn multipart_body_is_sent_with_boundary() {
        let transport = FakeTransport::ok(200, "");
        Request::new(Response::status(200))
            .with_body(MultipartBody::new().with("A", ["foo"]))
            .execute(HttpMethod::Post, "/upload", &config(), &transport)
            .unwrap();

        let sent = transport.sent.borrow();
        assert_eq!(
            sent[0].header_values("Content-Type").collect::<Vec<_>>(),
            ["multipart/form-data; boundary=testboundary"]
        );
        assert_eq!(
            sent[0].body.as_deref(),
            Some(&b"--testboundary\r\nContent-Disposition: form-data; name=\"A\"\r\n\r\nfoo\r\n--testboundary--\r\n"[..])
        );
    }

    #[test]
    fn decode_fault_does_not_hide_status() {
        let transport = FakeTransport::ok(502, "Bad Gateway");
        let failure = Request::new(Response::status(200).with_body(json!({"ok": true})))
            .execute(HttpMethod::Get, "/", &config(), &transport)
            .unwrap()
            .into_failure()
            .unwrap();
        let checks = failure.report().unwrap().checks();
        assert_eq!(checks[0], Check::Status { got: 502, want: 200 });
        assert!(matches!(checks[1], Check::Decode { .. }));
    }
}
