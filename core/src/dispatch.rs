//! Callback dispatch for a request whose execution has finished.
//!
//! The plan is a plain concatenation, process scope before request scope:
//!
//! ```text
//! process.on_complete ++ request.on_complete
//!   ++ (process.on_success ++ request.on_success)   if the response succeeded
//!   ++ (process.on_failure ++ request.on_failure)   if it did not
//! ```
//!
//! Without a response only the complete lists run. Dispatch does not catch
//! anything: the first callback error stops the plan and is returned, and a
//! panicking callback unwinds through the caller.

use log::trace;

use crate::callbacks::{Callback, CallbackRegistry, Scope, Slot};
use crate::error::Error;
use crate::http::HttpResponse;
use crate::request::Request;

/// One entry of a dispatch plan.
pub struct Planned<'a> {
    pub scope: Scope,
    pub slot: Slot,
    /// Index within `scope`'s `slot` list.
    pub position: usize,
    pub callback: &'a Callback,
}

/// Compute, without running anything, the callbacks that dispatch would
/// invoke for `request` and their order.
pub fn plan<'a>(process: &'a CallbackRegistry, request: &'a Request) -> Vec<Planned<'a>> {
    plan_for(process, request.callbacks(), request.response())
}

/// Invoke the plan for `request` left to right with its response. Returns
/// the number of callbacks that ran.
pub fn dispatch(process: &CallbackRegistry, request: &Request) -> Result<usize, Error> {
    run(process, request.callbacks(), request.response())
}

pub(crate) fn plan_for<'a>(
    process: &'a CallbackRegistry,
    instance: &'a CallbackRegistry,
    response: Option<&HttpResponse>,
) -> Vec<Planned<'a>> {
    let outcome = response.map(|response| {
        if response.is_success() {
            Slot::Success
        } else {
            Slot::Failure
        }
    });

    let mut planned = Vec::new();
    for slot in std::iter::once(Slot::Complete).chain(outcome) {
        for (scope, registry) in [(Scope::Process, process), (Scope::Request, instance)] {
            planned.extend(registry.list(slot).iter().enumerate().map(|(position, callback)| Planned {
                scope,
                slot,
                position,
                callback,
            }));
        }
    }
    planned
}

pub(crate) fn run(
    process: &CallbackRegistry,
    instance: &CallbackRegistry,
    response: Option<&HttpResponse>,
) -> Result<usize, Error> {
    let planned = plan_for(process, instance, response);
    trace!("dispatching {} callbacks", planned.len());

    for entry in &planned {
        (entry.callback)(response).map_err(|source| Error::Callback {
            scope: entry.scope,
            slot: entry.slot,
            position: entry.position,
            source,
        })?;
    }
    Ok(planned.len())
}
