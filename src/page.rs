//! The page: document, window and HTTP client, shared by every handler.
//!
//! All work runs on the async runtime. Several requests may be in flight at
//! once; the document is only touched in short critical sections, never
//! across an `.await`.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::client::Client;
use crate::dom::{ActionOutcome, Document, DomEvent, EventKind};
use crate::error::Result;
use crate::window::Window;

/// Page-wide lifecycle events, not tied to any element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// History navigation (`popstate`).
    PopState,
    /// The tab was hidden or shown (`visibilitychange`).
    VisibilityChanged { hidden: bool },
}

/// A subscriber to [`PageEvent`]s. Lives as long as the page.
#[async_trait]
pub trait PageEventHandler: Send + Sync + fmt::Debug {
    async fn on_page_event(&self, page: &Page, event: PageEvent);
}

/// Result of delivering one event to an element's listeners.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatch {
    pub default_prevented: bool,
    /// One entry per listener, in registration order.
    pub outcomes: Vec<ActionOutcome>,
}

impl Dispatch {
    /// Outcome of the last listener that ran.
    pub fn outcome(&self) -> Option<ActionOutcome> {
        self.outcomes.last().copied()
    }
}

#[derive(Debug, Default)]
struct Subscribers {
    handlers: Vec<Arc<dyn PageEventHandler>>,
    /// Keys of subscriptions registered with [`Page::subscribe_once`].
    keys: HashSet<&'static str>,
}

/// Shared handle to the page. Clones refer to the same page.
#[derive(Debug, Clone)]
pub struct Page {
    document: Arc<RwLock<Document>>,
    window: Arc<dyn Window>,
    client: Client,
    subscribers: Arc<RwLock<Subscribers>>,
}

impl Page {
    /// A page with an empty document.
    pub fn new(client: Client, window: Arc<dyn Window>) -> Self {
        Self {
            document: Arc::new(RwLock::new(Document::new())),
            window,
            client,
            subscribers: Arc::default(),
        }
    }

    /// Start from an existing document.
    #[must_use]
    pub fn with_document(self, document: Document) -> Self {
        self.replace_document(document);
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn window(&self) -> &dyn Window {
        self.window.as_ref()
    }

    /// Swap in a freshly loaded document. Listeners bound to the old one go
    /// with it; page subscribers stay.
    pub fn replace_document(&self, document: Document) {
        *self.document.write().unwrap_or_else(PoisonError::into_inner) = document;
    }

    /// `GET path` and make the rendered page the current document.
    ///
    /// On failure the current document is kept.
    pub async fn load(&self, path: &str) -> Result<()> {
        let html = self.client.get_text(path).await?;
        let document = Document::from_html(&html);
        debug!(name: "page.loaded", path = %path, elements = document.len(), "Page loaded");
        self.replace_document(document);
        Ok(())
    }

    /// Read the document.
    pub fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.document.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Mutate the document.
    pub fn write<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut self.document.write().unwrap_or_else(PoisonError::into_inner))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Element events
    // ─────────────────────────────────────────────────────────────────────────

    /// Deliver `kind` to every listener on `target`, in registration order.
    pub async fn dispatch(&self, target: &str, kind: EventKind) -> Dispatch {
        let listeners = self.read(|doc| doc.listeners_for(target, kind));
        debug!(
            name: "page.dispatch",
            target = %target,
            event = %kind,
            listeners = listeners.len(),
            "Dispatching event"
        );

        let mut event = DomEvent::new(target, kind);
        let mut outcomes = Vec::with_capacity(listeners.len());
        for handler in listeners {
            outcomes.push(handler.handle(self, &mut event).await);
        }
        Dispatch {
            default_prevented: event.default_prevented(),
            outcomes,
        }
    }

    pub async fn click(&self, target: &str) -> Dispatch {
        self.dispatch(target, EventKind::Click).await
    }

    pub async fn submit(&self, target: &str) -> Dispatch {
        self.dispatch(target, EventKind::Submit).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Page events
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a page-lifetime subscriber. There is no unsubscribe.
    pub fn subscribe(&self, handler: Arc<dyn PageEventHandler>) {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .handlers
            .push(handler);
    }

    /// Register `handler` unless this page already has a subscription
    /// under `key`. Returns whether it was registered.
    pub fn subscribe_once(&self, key: &'static str, handler: Arc<dyn PageEventHandler>) -> bool {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if !subscribers.keys.insert(key) {
            return false;
        }
        subscribers.handlers.push(handler);
        true
    }

    /// Fan `event` out to every subscriber, each on its own task.
    ///
    /// Tasks are independent: nothing orders or cancels them, so when two
    /// overlap the one that finishes last wins.
    pub fn emit(&self, event: PageEvent) -> Vec<JoinHandle<()>> {
        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .handlers
            .clone();
        subscribers
            .into_iter()
            .map(|handler| {
                let page = self.clone();
                tokio::spawn(async move { handler.on_page_event(&page, event).await })
            })
            .collect()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .handlers
            .len()
    }
}
