//! Response callbacks and request stubbing for an HTTP request abstraction.
//!
//! # Overview
//! A [`Request`] carries plain-data options, a response slot and its own
//! `on_complete` / `on_success` / `on_failure` callbacks. A [`Context`]
//! carries the process-wide callbacks and the [`ExpectationStore`]. An
//! [`Executor`] runs the request: [`InterceptingExecutor`] answers from a
//! matching [`Expectation`] without touching the network, otherwise it falls
//! through to a [`DirectExecutor`] and its [`Transport`].
//!
//! # Design
//! - Whichever path produced the response, dispatch is identical: process
//!   callbacks before request callbacks, `on_complete` first, then exactly one
//!   of `on_success` / `on_failure`.
//! - No global state. Callers own the `Context` and pass it explicitly.
//! - Transports never fail at the type level; network errors become
//!   responses with a non-`Ok` [`ReturnCode`].

pub mod callbacks;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod expectation;
pub mod fixtures;
pub mod http;
pub mod request;
pub mod transport;

pub use callbacks::{Callback, CallbackRegistry, Scope, Slot};
pub use config::Config;
pub use context::Context;
pub use error::Error;
pub use executor::{DirectExecutor, Executor, InterceptingExecutor};
pub use expectation::{Expectation, ExpectationStore, Matcher, Responder, UrlPattern};
pub use http::{HttpMethod, HttpRequest, HttpResponse, ReturnCode};
pub use request::{Request, RequestState};
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
