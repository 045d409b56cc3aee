//! Element events and the handlers bound to them.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::page::Page;

/// Events the page reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Submit,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Submit => "submit",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event being delivered to the listeners of one element.
#[derive(Debug, Clone)]
pub struct DomEvent {
    target: String,
    kind: EventKind,
    default_prevented: bool,
}

impl DomEvent {
    pub fn new(target: impl Into<String>, kind: EventKind) -> Self {
        Self {
            target: target.into(),
            kind,
            default_prevented: false,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Suppress the browser default (link navigation, full-page form post).
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// What a handler did with a user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Local UI change only (modal toggled).
    Done,
    /// The user declined the confirmation prompt.
    Cancelled,
    /// Precondition missing; nothing was sent.
    Aborted,
    /// Request succeeded.
    Succeeded,
    /// Transport, status or parse failure.
    Failed,
}

impl ActionOutcome {
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Aborted | Self::Failed)
    }
}

/// A listener attached to an element.
///
/// Handlers receive the [`Page`] on every call instead of holding it, so
/// the document never owns a reference back to itself.
#[async_trait]
pub trait EventHandler: Send + Sync + fmt::Debug {
    async fn handle(&self, page: &Page, event: &mut DomEvent) -> ActionOutcome;
}

#[derive(Debug, Clone)]
pub(crate) struct Listener {
    pub(crate) kind: EventKind,
    pub(crate) handler: Arc<dyn EventHandler>,
}
