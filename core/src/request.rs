//! One logical HTTP call: options, response slot and instance callbacks.

use uuid::Uuid;

use crate::callbacks::{CallbackRegistry, Slot};
use crate::context::Context;
use crate::dispatch;
use crate::error::Error;
use crate::http::{HttpRequest, HttpResponse};

/// Where a request is in its execution.
///
/// `Intercepted` and `Delegated` are both completed states and record which
/// path produced the current response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Unexecuted,
    Intercepted,
    Delegated,
}

/// A request plus everything that happens to it once executed.
///
/// Callbacks may be registered any time before dispatch. Executing again
/// starts a fresh attempt that replaces the previous response.
#[derive(Debug)]
pub struct Request {
    id: Uuid,
    options: HttpRequest,
    response: Option<HttpResponse>,
    state: RequestState,
    callbacks: CallbackRegistry,
}

impl Request {
    pub fn new(options: HttpRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            options,
            response: None,
            state: RequestState::Unexecuted,
            callbacks: CallbackRegistry::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn options(&self) -> &HttpRequest {
        &self.options
    }

    pub fn response(&self) -> Option<&HttpResponse> {
        self.response.as_ref()
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    pub fn callbacks_mut(&mut self) -> &mut CallbackRegistry {
        &mut self.callbacks
    }

    pub fn on_complete<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(Option<&HttpResponse>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.callbacks.register(Slot::Complete, callback);
        self
    }

    pub fn on_success<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(Option<&HttpResponse>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.callbacks.register(Slot::Success, callback);
        self
    }

    pub fn on_failure<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(Option<&HttpResponse>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.callbacks.register(Slot::Failure, callback);
        self
    }

    /// Run the process-scope and instance-scope callbacks that apply to the
    /// current response. Returns how many ran.
    pub fn execute_callbacks(&self, ctx: &Context) -> Result<usize, Error> {
        dispatch::dispatch(ctx.callbacks(), self)
    }

    /// Store `response` as the outcome of the current attempt, point its
    /// back-reference at this request and dispatch.
    pub(crate) fn finish(
        &mut self,
        ctx: &Context,
        mut response: HttpResponse,
        state: RequestState,
    ) -> Result<&HttpResponse, Error> {
        response.request = Some(self.options.clone());
        self.state = state;
        let response: &HttpResponse = self.response.insert(response);
        dispatch::run(ctx.callbacks(), &self.callbacks, Some(response))?;
        Ok(response)
    }

    #[cfg(test)]
    pub(crate) fn assign(&mut self, mut response: HttpResponse, state: RequestState) {
        response.request = Some(self.options.clone());
        self.state = state;
        self.response = Some(response);
    }
}

impl From<HttpRequest> for Request {
    fn from(options: HttpRequest) -> Self {
        Self::new(options)
    }
}
