//! Process-wide state, passed explicitly instead of living in statics.
//!
//! Construct one `Context` when a process or test suite starts, register
//! process callbacks and expectations on it, and hand `&Context` to an
//! executor for every request. Nothing here is ever cleared implicitly;
//! call [`Context::reset`] between test cases.

use crate::callbacks::CallbackRegistry;
use crate::config::Config;
use crate::error::Error;
use crate::expectation::{Expectation, ExpectationStore};
use crate::fixtures;

#[derive(Debug, Default)]
pub struct Context {
    config: Config,
    callbacks: CallbackRegistry,
    expectations: ExpectationStore,
}

impl Context {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        Self::new(Config::from_env())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Process-scope callbacks; they run before any request's own.
    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    pub fn callbacks_mut(&mut self) -> &mut CallbackRegistry {
        &mut self.callbacks
    }

    pub fn expectations(&self) -> &ExpectationStore {
        &self.expectations
    }

    pub fn expectations_mut(&mut self) -> &mut ExpectationStore {
        &mut self.expectations
    }

    pub fn stub(&mut self, expectation: Expectation) -> &Expectation {
        self.expectations.register(expectation)
    }

    /// Register the expectations declared in a JSON fixture document.
    pub fn load_fixtures(&mut self, json: &str) -> Result<usize, Error> {
        fixtures::load(&mut self.expectations, json)
    }

    /// Drop all process callbacks and expectations. Config is kept.
    pub fn reset(&mut self) {
        self.callbacks.clear_all();
        self.expectations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::Slot;
    use crate::expectation::Matcher;
    use crate::http::HttpResponse;

    #[test]
    fn reset_clears_callbacks_and_expectations_but_keeps_config() {
        let mut ctx = Context::new(Config::blocking());
        ctx.callbacks_mut().on_complete(|_| Ok(()));
        ctx.stub(Expectation::new(Matcher::any(), HttpResponse::new(200, "")));

        ctx.reset();

        assert!(ctx.callbacks().list(Slot::Complete).is_empty());
        assert!(ctx.expectations().is_empty());
        assert!(ctx.config().block_connection);
    }
}
