//! Expected response of one exchange.

use crate::body::JsonBody;
use crate::error::{Check, Report};
use crate::header::Header;
use crate::http::HttpResponse;

/// What the caller expects back: a status, optionally a header subset, and
/// optionally a JSON body. `None` means "not checked", never "must be
/// empty".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub header: Option<Header>,
    pub body: Option<JsonBody>,
}

impl Response {
    /// Expect only a status code.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            header: None,
            body: None,
        }
    }

    pub fn with_header(mut self, header: Header) -> Self {
        self.header = Some(header);
        self
    }

    pub fn with_body(mut self, body: impl Into<JsonBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Run the status, header and body checks independently and collect
    /// every failure, so one bad exchange shows all of its mismatches.
    pub fn compare(&self, observed: &HttpResponse) -> Result<(), Report> {
        let mut report = Report::new();
        if let Some(check) = self.compare_status(observed.status) {
            report.push(check);
        }
        if let Some(header) = &self.header {
            report.extend(header.compare(observed));
        }
        if let Some(body) = &self.body {
            if let Some(check) = body.compare(&observed.body) {
                report.push(check);
            }
        }
        report.into_result()
    }

    pub fn compare_status(&self, status: u16) -> Option<Check> {
        (status != self.status).then_some(Check::Status {
            got: status,
            want: self.status,
        })
    }
}
