//! The wire collaborator.
//!
//! # Design
//! A `Transport` turns an `HttpRequest` into an `HttpResponse` and nothing
//! else: it does not know about callbacks or expectations. It never fails at
//! the type level. A connection that could not be made, or an exchange that
//! timed out, still yields a response with status `0` and a non-`Ok`
//! `ReturnCode`, so the executor always has an outcome to dispatch. Once a
//! status line has arrived it is kept: bodies are decoded lossily and a
//! failed body read only sets the `ReturnCode`.

use crate::http::{HttpRequest, HttpResponse};

pub trait Transport {
    fn perform(&self, request: &HttpRequest) -> HttpResponse;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> HttpResponse,
{
    fn perform(&self, request: &HttpRequest) -> HttpResponse {
        self(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::ureq_transport::UreqTransport;

#[cfg(feature = "ureq")]
mod ureq_transport {
    use std::io;

    use log::debug;
    use ureq::{Agent, RequestBuilder};

    use super::Transport;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse, ReturnCode};

    /// Blocking transport backed by `ureq`.
    ///
    /// Status-code-as-error is disabled so 4xx/5xx responses come back as
    /// data and are classified by `HttpResponse::is_success`.
    #[derive(Clone)]
    pub struct UreqTransport {
        agent: Agent,
    }

    impl UreqTransport {
        pub fn new() -> Self {
            let agent = Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Self { agent }
        }

        pub fn with_agent(agent: Agent) -> Self {
            Self { agent }
        }

        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ureq::Error> {
            let url = request.url.as_str();
            let body = request.body.as_deref();
            let headers = request.headers.as_slice();

            let mut response = match request.method {
                HttpMethod::Get => with_headers(self.agent.get(url), headers).call(),
                HttpMethod::Head => with_headers(self.agent.head(url), headers).call(),
                HttpMethod::Delete => with_headers(self.agent.delete(url), headers).call(),
                HttpMethod::Options => with_headers(self.agent.options(url), headers).call(),
                HttpMethod::Post => send_body(with_headers(self.agent.post(url), headers), body),
                HttpMethod::Put => send_body(with_headers(self.agent.put(url), headers), body),
                HttpMethod::Patch => send_body(with_headers(self.agent.patch(url), headers), body),
            }?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_string(), value.to_string()))
                })
                .collect();
            let mut received = HttpResponse {
                status,
                headers,
                ..HttpResponse::default()
            };
            if request.method == HttpMethod::Head {
                return Ok(received);
            }

            // The status line already arrived; a failed body read keeps it.
            match response.body_mut().read_to_vec() {
                Ok(bytes) => received.body = String::from_utf8_lossy(&bytes).into_owned(),
                Err(err) => {
                    debug!("{} {} body read failed: {err}", request.method, request.url);
                    received.return_code = return_code(&err);
                }
            }
            Ok(received)
        }
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Transport for UreqTransport {
        fn perform(&self, request: &HttpRequest) -> HttpResponse {
            self.send(request).unwrap_or_else(|err| {
                debug!("{} {} failed: {err}", request.method, request.url);
                HttpResponse::transport_failure(return_code(&err))
            })
        }
    }

    fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    fn send_body(
        builder: RequestBuilder<ureq::typestate::WithBody>,
        body: Option<&str>,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        match body {
            Some(body) => builder.send(body.as_bytes()),
            None => builder.send_empty(),
        }
    }

    fn return_code(err: &ureq::Error) -> ReturnCode {
        match err {
            ureq::Error::HostNotFound => ReturnCode::CouldntResolveHost,
            ureq::Error::ConnectionFailed => ReturnCode::CouldntConnect,
            ureq::Error::Timeout(_) => ReturnCode::OperationTimedOut,
            ureq::Error::Io(io) => match io.kind() {
                io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset => ReturnCode::CouldntConnect,
                io::ErrorKind::TimedOut => ReturnCode::OperationTimedOut,
                _ => ReturnCode::Other(io.to_string()),
            },
            other => ReturnCode::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_transports() {
        let transport = |request: &HttpRequest| HttpResponse::new(200, request.url.clone());
        let response = transport.perform(&HttpRequest::get("http://x"));
        assert_eq!(response.body, "http://x");
    }
}
