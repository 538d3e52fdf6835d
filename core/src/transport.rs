//! Default `Transport` backed by `ureq`.

use std::time::Duration;

use ureq::http;

use crate::error::BoxError;
use crate::http::{HttpRequest, HttpResponse, Transport};

/// Blocking HTTP/1.1 transport over a shared `ureq::Agent`.
///
/// The agent is configured to return 4xx/5xx responses as data; status
/// interpretation belongs to the client's status validator.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// `timeout` bounds every exchange made through this transport.
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Wrap an existing agent. It must have `http_status_as_error(false)`,
    /// otherwise error statuses surface as transport errors.
    pub fn from_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }

    fn run<S: ureq::AsSendBody>(
        &self,
        request: http::Request<S>,
        timeout: Option<Duration>,
    ) -> Result<http::Response<ureq::Body>, ureq::Error> {
        let request = match timeout {
            Some(timeout) => self
                .agent
                .configure_request(request)
                .timeout_global(Some(timeout))
                .build(),
            None => request,
        };
        self.agent.run(request)
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(Some(crate::client::DEFAULT_TIMEOUT))
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        let mut builder = http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = match request.body {
            Some(body) => self.run(builder.body(body)?, request.timeout)?,
            None => self.run(builder.body(())?, request.timeout)?,
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.into_body().into_reader();

        Ok(HttpResponse::new(status, headers, body))
    }
}
