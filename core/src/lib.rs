//! Declarative assertions against live HTTP endpoints.
//!
//! # Overview
//! A test describes, as plain data, the requests to send to an endpoint and
//! the responses it expects back. The engine sends each request, captures
//! the real response, and produces a field-scoped diff when status, headers
//! or body do not match.
//!
//! ```no_run
//! use hit_core::{Config, FormBody, Header, Hit, HttpMethod, Request, Response};
//! use serde_json::json;
//!
//! Hit::new("/signin")
//!     .with(
//!         HttpMethod::Post,
//!         [
//!             Request::new(Response::status(401))
//!                 .with_body(FormBody::new().with("password", ["wrong"])),
//!             Request::new(
//!                 Response::status(200)
//!                     .with_header(Header::new().with("Content-Type", ["application/json"]))
//!                     .with_body(json!({"user": "gopher"})),
//!             )
//!             .with_body(FormBody::new().with("password", ["secret"])),
//!         ],
//!     )
//!     .assert_passes(&Config::from_env());
//! ```
//!
//! # Design
//! - Request bodies implement `Body`; JSON, form and multipart encodings are
//!   deterministic so expected payloads can be written as literals.
//! - `Response::compare` runs status, header and body checks independently
//!   and returns every mismatch at once.
//! - Recoverable failures (`Failure`) and environment breakage
//!   (`FatalError`) are separate channels.
//! - All network I/O goes through the `Transport` trait.

pub mod body;
pub mod config;
pub mod error;
pub mod header;
pub mod hit;
pub mod http;
pub mod multipart;
pub mod request;
pub mod response;
pub mod transport;

pub use body::{Body, FormBody, JsonBody};
pub use config::Config;
pub use error::{Check, EncodeError, FatalError, Failure, Report, Side, TransportError};
pub use header::Header;
pub use hit::{Hit, LogReporter, MethodRequests, Reporter};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use multipart::{File, MultipartBody, Part};
pub use request::{Outcome, Request};
pub use response::Response;
pub use transport::{Transport, UreqTransport};
