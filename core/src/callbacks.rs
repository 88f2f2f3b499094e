//! Ordered callback lists keyed by slot.
//!
//! The same registry type backs both scopes: the process scope lives in
//! [`crate::Context`], the instance scope inside each [`crate::Request`].
//!
//! ```
//! use hookshot_core::{CallbackRegistry, Slot};
//!
//! let mut callbacks = CallbackRegistry::new();
//! callbacks.on_complete(|_| Ok(())).on_complete(|_| Ok(()));
//! assert_eq!(callbacks.list(Slot::Complete).len(), 2);
//!
//! callbacks.clear(Slot::Complete);
//! assert!(callbacks.list(Slot::Complete).is_empty());
//! ```

use std::fmt;

use crate::http::HttpResponse;

/// A response observer. The argument is `None` only when dispatch runs on a
/// request that has no response yet.
pub type Callback = Box<dyn Fn(Option<&HttpResponse>) -> anyhow::Result<()> + Send + Sync>;

/// Which of the three callback kinds a list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Runs for every dispatch, whatever the outcome.
    Complete,
    Success,
    Failure,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Slot::Complete => "on_complete",
            Slot::Success => "on_success",
            Slot::Failure => "on_failure",
        })
    }
}

/// Whether a list belongs to the whole process or to one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Process,
    Request,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scope::Process => "process",
            Scope::Request => "request",
        })
    }
}

/// Three insertion-ordered callback lists. Registration never deduplicates
/// or reorders.
#[derive(Default)]
pub struct CallbackRegistry {
    on_complete: Vec<Callback>,
    on_success: Vec<Callback>,
    on_failure: Vec<Callback>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `callback` to `slot` and return the slot's current list.
    pub fn register<F>(&mut self, slot: Slot, callback: F) -> &[Callback]
    where
        F: Fn(Option<&HttpResponse>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let list = self.slot_mut(slot);
        list.push(Box::new(callback));
        list
    }

    pub fn list(&self, slot: Slot) -> &[Callback] {
        match slot {
            Slot::Complete => &self.on_complete,
            Slot::Success => &self.on_success,
            Slot::Failure => &self.on_failure,
        }
    }

    pub fn clear(&mut self, slot: Slot) {
        self.slot_mut(slot).clear();
    }

    pub fn clear_all(&mut self) {
        self.on_complete.clear();
        self.on_success.clear();
        self.on_failure.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.on_complete.is_empty() && self.on_success.is_empty() && self.on_failure.is_empty()
    }

    #[inline]
    pub fn on_complete<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(Option<&HttpResponse>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register(Slot::Complete, callback);
        self
    }

    #[inline]
    pub fn on_success<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(Option<&HttpResponse>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register(Slot::Success, callback);
        self
    }

    #[inline]
    pub fn on_failure<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(Option<&HttpResponse>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register(Slot::Failure, callback);
        self
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Vec<Callback> {
        match slot {
            Slot::Complete => &mut self.on_complete,
            Slot::Success => &mut self.on_success,
            Slot::Failure => &mut self.on_failure,
        }
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("on_complete", &self.on_complete.len())
            .field("on_success", &self.on_success.len())
            .field("on_failure", &self.on_failure.len())
            .finish()
    }
}
