//! Executing requests, for real or against declared expectations.
//!
//! # Design
//! Interception is composition rather than an override: an
//! [`InterceptingExecutor`] wraps another [`Executor`] (normally a
//! [`DirectExecutor`]) and only delegates when no expectation matches. Both
//! paths assign the response and dispatch the same way, so a fabricated
//! response fires exactly the callbacks a real one would.
//!
//! ```
//! use hookshot_core::{
//!     Context, DirectExecutor, Executor, Expectation, HttpRequest, HttpResponse,
//!     InterceptingExecutor, Matcher, Request,
//! };
//!
//! let mut ctx = Context::default();
//! ctx.stub(Expectation::new(Matcher::url("http://x"), HttpResponse::new(204, "")));
//!
//! let network = |_: &HttpRequest| -> HttpResponse { unreachable!("stubbed") };
//! let executor = InterceptingExecutor::new(DirectExecutor::new(network));
//!
//! let mut request = Request::new(HttpRequest::get("http://x"));
//! let response = executor.execute(&ctx, &mut request).unwrap();
//! assert_eq!(response.status, 204);
//! ```

use log::{debug, warn};

use crate::context::Context;
use crate::error::Error;
use crate::http::HttpResponse;
use crate::request::{Request, RequestState};
use crate::transport::Transport;

pub trait Executor {
    /// Run one execution attempt of `request`. On return the request's
    /// response is set and every applicable callback has fired.
    fn execute<'r>(&self, ctx: &Context, request: &'r mut Request) -> Result<&'r HttpResponse, Error>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute<'r>(&self, ctx: &Context, request: &'r mut Request) -> Result<&'r HttpResponse, Error> {
        (**self).execute(ctx, request)
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn execute<'r>(&self, ctx: &Context, request: &'r mut Request) -> Result<&'r HttpResponse, Error> {
        (**self).execute(ctx, request)
    }
}

/// Always performs the request through its transport.
#[derive(Debug, Clone, Default)]
pub struct DirectExecutor<T> {
    transport: T,
}

impl<T: Transport> DirectExecutor<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Executor for DirectExecutor<T> {
    fn execute<'r>(&self, ctx: &Context, request: &'r mut Request) -> Result<&'r HttpResponse, Error> {
        let response = self.transport.perform(request.options());
        debug!(
            "request {}: {} {} -> {}",
            request.id(),
            request.options().method,
            request.options().url,
            response.status
        );
        request.finish(ctx, response, RequestState::Delegated)
    }
}

/// Answers from the context's expectations when one matches, otherwise
/// hands the request to the wrapped executor.
#[derive(Debug, Clone, Default)]
pub struct InterceptingExecutor<E> {
    inner: E,
}

impl<E: Executor> InterceptingExecutor<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: Executor> Executor for InterceptingExecutor<E> {
    fn execute<'r>(&self, ctx: &Context, request: &'r mut Request) -> Result<&'r HttpResponse, Error> {
        let Some(expectation) = ctx.expectations().find_by(request.options()) else {
            if ctx.config().block_connection {
                warn!(
                    "request {}: blocked real connection to {} {}",
                    request.id(),
                    request.options().method,
                    request.options().url
                );
                return Err(Error::BlockedConnection {
                    method: request.options().method,
                    url: request.options().url.clone(),
                });
            }
            return self.inner.execute(ctx, request);
        };

        let response = expectation.respond(request.options());
        debug!(
            "request {}: intercepted {} {} -> {}",
            request.id(),
            request.options().method,
            request.options().url,
            response.status
        );
        request.finish(ctx, response, RequestState::Intercepted)
    }
}
