//! Error types for the assertion engine.
//!
//! # Design
//! Failures travel on two separate channels. `Failure` is the recoverable
//! one: a body that would not encode, or a response that did not match its
//! expectation. It is reported and the run moves on. `FatalError` means the
//! test environment itself is broken (the target is unreachable, or a
//! request could not even be built) and aborts the whole run.
//!
//! Mismatches are kept as structured `Check` values until they are printed,
//! so callers can inspect which of status/header/body failed.

use std::fmt;

use thiserror::Error;

use crate::http::HttpResponse;

/// A body payload could not be serialized.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The serializer itself failed on the payload.
    #[error("hit: {variant}.encode() ({payload}) failed. {reason}")]
    Serialize {
        variant: &'static str,
        payload: String,
        reason: String,
    },

    /// A multipart value built from dynamic data was neither a string nor a
    /// file attachment.
    #[error("hit: {key:?} contains unsupported type {kind}. Use only strings or files inside MultipartBody.")]
    UnsupportedPart { key: String, kind: &'static str },
}

/// Which side of a body comparison failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Observed,
    Expected,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Observed => f.write_str("response body"),
            Side::Expected => f.write_str("expected body"),
        }
    }
}

/// One failed check out of an exchange's independent comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    Status { got: u16, want: u16 },
    Header { key: String, got: String, want: String },
    Body { got: String, want: String },
    /// A body was not valid for its declared format. Distinct from `Body`,
    /// which means both sides decoded but differ.
    Decode { side: Side, reason: String },
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Status { got, want } => write!(f, "StatusCode got = {got}, want {want}"),
            Check::Header { key, got, want } => {
                write!(f, "Header[{key:?}] got = {got:?}, want = {want:?}")
            }
            Check::Body { got, want } => write!(f, "Body got {got}, want {want}"),
            Check::Decode { side, reason } => write!(f, "hit: error decoding {side}. {reason}"),
        }
    }
}

/// The aggregated outcome of comparing one response against its
/// expectation. Empty means every check passed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    checks: Vec<Check>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, check: Check) {
        self.checks.push(check);
    }

    pub fn extend(&mut self, checks: impl IntoIterator<Item = Check>) {
        self.checks.extend(checks);
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// `Ok` when nothing failed, otherwise the report itself as the error.
    pub fn into_result(self) -> Result<(), Report> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for check in &self.checks {
            writeln!(f, "{check}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Report {}

/// A recoverable failure of one exchange.
///
/// `context` is the leading line naming method, path, and what the caller
/// sent, e.g. ` GET /foo/bar Header: {"Auth": ["6tygfd4"]}`.
#[derive(Debug, Error)]
pub enum Failure {
    #[error("{context}\n{source}")]
    Encode {
        context: String,
        #[source]
        source: EncodeError,
    },

    #[error("{context}\n{report}")]
    Mismatch { context: String, report: Report },
}

impl Failure {
    pub fn context(&self) -> &str {
        match self {
            Failure::Encode { context, .. } | Failure::Mismatch { context, .. } => context,
        }
    }

    /// The mismatch report, if this failure came from a comparison.
    pub fn report(&self) -> Option<&Report> {
        match self {
            Failure::Mismatch { report, .. } => Some(report),
            Failure::Encode { .. } => None,
        }
    }
}

/// The test environment is broken; the run cannot continue.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("hit: failed executing {method} {url}. {reason}")]
    Transport {
        method: String,
        url: String,
        reason: String,
    },

    #[error("hit: cannot build request {method} {url}. {reason}")]
    InvalidRequest {
        method: String,
        url: String,
        reason: String,
    },
}

/// Outcome of a transport dispatch that did not yield a plain response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server answered with a redirect that the transport declined to
    /// follow. The un-followed response is carried so it can be compared.
    #[error("redirect to {location:?} refused")]
    RedirectRefused {
        location: String,
        response: HttpResponse,
    },

    /// The request could not be turned into a valid wire request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Connection-level failure: refused, reset, timed out, and so on.
    #[error("{0}")]
    Fault(String),
}
