//! Test groups: every request to run against one endpoint path.
//!
//! # Design
//! Requests under one method run strictly in the order they were declared,
//! because later cases often rely on what earlier ones did (sign in, then
//! act as the signed-in user). The order across methods is whatever the
//! method map yields and tests must not depend on it.
//!
//! A failed exchange is handed to a `Reporter` and the run continues. Only a
//! `FatalError` stops it.

use std::collections::BTreeMap;

use tracing::{error, info};

use crate::config::Config;
use crate::error::{FatalError, Failure};
use crate::http::HttpMethod;
use crate::request::{Outcome, Request};
use crate::transport::{Transport, UreqTransport};

/// Ordered requests per HTTP method.
pub type MethodRequests = BTreeMap<HttpMethod, Vec<Request>>;

/// Receives one `Failure` per failed request. Must not halt the run.
pub trait Reporter {
    fn report(&mut self, failure: Failure);
}

impl Reporter for Vec<Failure> {
    fn report(&mut self, failure: Failure) {
        self.push(failure);
    }
}

/// Logs each failure at error level and counts them.
#[derive(Debug, Default)]
pub struct LogReporter {
    pub failures: usize,
}

impl Reporter for LogReporter {
    fn report(&mut self, failure: Failure) {
        self.failures += 1;
        error!("{failure}");
    }
}

#[derive(Debug)]
pub struct Hit {
    pub path: String,
    pub requests: MethodRequests,
}

impl Hit {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            requests: MethodRequests::new(),
        }
    }

    /// Append requests under `method`, after any already declared.
    pub fn with(mut self, method: HttpMethod, requests: impl IntoIterator<Item = Request>) -> Self {
        self.requests.entry(method).or_default().extend(requests);
        self
    }

    /// Execute every request, reporting failures as they happen.
    pub fn test(
        &self,
        config: &Config,
        transport: &dyn Transport,
        reporter: &mut dyn Reporter,
    ) -> Result<(), FatalError> {
        for (method, requests) in &self.requests {
            for request in requests {
                if let Outcome::Failed(failure) =
                    request.execute(*method, &self.path, config, transport)?
                {
                    reporter.report(failure);
                }
            }
        }
        Ok(())
    }

    /// Execute every request and collect the failures.
    pub fn run(&self, config: &Config, transport: &dyn Transport) -> Result<Vec<Failure>, FatalError> {
        let mut failures = Vec::new();
        self.test(config, transport, &mut failures)?;
        info!(path = %self.path, failures = failures.len(), "endpoint checked");
        Ok(failures)
    }

    /// Run over HTTP and panic if anything failed. Meant to be called from
    /// a `#[test]` function.
    ///
    /// # Panics
    /// On a fatal error, or with every failure message joined when at least
    /// one exchange failed.
    pub fn assert_passes(&self, config: &Config) {
        let transport = UreqTransport::new();
        match self.run(config, &transport) {
            Err(fatal) => panic!("{fatal}"),
            Ok(failures) if !failures.is_empty() => {
                let messages: Vec<String> = failures.iter().map(ToString::to_string).collect();
                panic!("{} request(s) failed:\n{}", failures.len(), messages.join("\n"));
            }
            Ok(_) => {}
        }
    }
}
