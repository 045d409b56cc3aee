//! In-memory model of the page's document.
//!
//! Elements are addressed by id, the way the page scripts address them.
//! Each element tracks its nearest id'd ancestor so that replacing a
//! container's inner HTML drops everything that was mounted under it,
//! listeners and markers included.
//!
//! # Example
//!
//! ```rust
//! use qna_board_client::dom::Document;
//!
//! let mut doc = Document::from_html(r#"<div id="topbar"></div>"#);
//! doc.set_inner_html("topbar", r#"<span id="alertBadge">3</span>"#).unwrap();
//! assert_eq!(doc.get("alertBadge").unwrap().parent(), Some("topbar"));
//! ```

mod event;
mod form;
mod fragment;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

pub use event::{ActionOutcome, DomEvent, EventHandler, EventKind};
pub(crate) use event::Listener;
pub use form::{FieldKind, Form, FormField};

use crate::error::{Error, Result};

const DATA_PREFIX: &str = "data-";

/// One id-addressable element.
#[derive(Debug, Clone)]
pub struct Element {
    id: String,
    tag: String,
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
    display: Option<String>,
    pub(crate) text: String,
    inner_html: String,
    pub(crate) parent: Option<String>,
    pub(crate) form: Option<Form>,
    listeners: Vec<Listener>,
}

impl Element {
    pub fn new(id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into().to_ascii_lowercase(),
            classes: BTreeSet::new(),
            attributes: BTreeMap::new(),
            display: None,
            text: String::new(),
            inner_html: String::new(),
            parent: None,
            form: None,
            listeners: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Classes and attributes
    // ─────────────────────────────────────────────────────────────────────────

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Set an attribute. `class` and `style` also update the class list and
    /// the inline `display`.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match name {
            "class" => {
                self.classes = value.split_whitespace().map(str::to_string).collect();
            }
            "style" => {
                self.display = parse_display(value);
            }
            _ => {}
        }
        self.attributes.insert(name.to_string(), value.to_string());
    }

    /// `dataset` lookup: `data("qna-id")` reads `data-qna-id`.
    pub fn data(&self, key: &str) -> Option<&str> {
        self.attribute(&format!("{DATA_PREFIX}{key}"))
    }

    pub fn set_data(&mut self, key: &str, value: &str) {
        self.set_attribute(&format!("{DATA_PREFIX}{key}"), value);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Content and style
    // ─────────────────────────────────────────────────────────────────────────

    pub fn text_content(&self) -> &str {
        &self.text
    }

    pub fn set_text_content(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }

    /// Inline `style.display`, if set.
    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    pub fn set_display(&mut self, display: &str) {
        self.display = Some(display.to_string());
    }

    pub fn is_hidden(&self) -> bool {
        self.display.as_deref() == Some("none")
    }

    pub fn form(&self) -> Option<&Form> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut Form> {
        self.form.as_mut()
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.iter().filter(|l| l.kind == kind).count()
    }
}

fn parse_display(style: &str) -> Option<String> {
    style.split(';').find_map(|decl| {
        let (property, value) = decl.split_once(':')?;
        (property.trim().eq_ignore_ascii_case("display")).then(|| value.trim().to_string())
    })
}

/// The page's elements, keyed by id.
#[derive(Debug, Default)]
pub struct Document {
    elements: HashMap<String, Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from a full server-rendered page.
    pub fn from_html(html: &str) -> Self {
        let mut doc = Self::new();
        for element in fragment::parse(html, None) {
            doc.insert(element);
        }
        doc
    }

    /// Add or replace an element.
    pub fn insert(&mut self, element: Element) {
        self.elements.insert(element.id.clone(), element);
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Replace the contents of `container_id` with `html`.
    ///
    /// Everything previously mounted under the container is removed before
    /// the fragment's elements are mounted.
    pub fn set_inner_html(&mut self, container_id: &str, html: &str) -> Result<()> {
        if !self.contains(container_id) {
            return Err(Error::MissingElement(container_id.to_string()));
        }

        let stale: Vec<String> = self
            .elements
            .keys()
            .filter(|id| self.is_descendant(id, container_id))
            .cloned()
            .collect();
        for id in stale {
            self.elements.remove(&id);
        }

        for element in fragment::parse(html, Some(container_id)) {
            self.insert(element);
        }
        if let Some(container) = self.elements.get_mut(container_id) {
            container.inner_html = html.to_string();
        }
        Ok(())
    }

    fn is_descendant(&self, id: &str, ancestor: &str) -> bool {
        // Bounded walk: duplicate ids in a fragment can make a parent chain loop.
        let mut current = self.elements.get(id).and_then(Element::parent);
        for _ in 0..self.elements.len() {
            let Some(parent) = current else {
                return false;
            };
            if parent == ancestor {
                return true;
            }
            current = self.elements.get(parent).and_then(Element::parent);
        }
        false
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Listeners
    // ─────────────────────────────────────────────────────────────────────────

    /// Attach `handler` to `id` for `kind` when the element exists.
    ///
    /// Returns whether a listener was attached.
    pub fn bind_if_present(
        &mut self,
        id: &str,
        kind: EventKind,
        handler: Arc<dyn EventHandler>,
    ) -> bool {
        match self.elements.get_mut(id) {
            Some(element) => {
                element.listeners.push(Listener { kind, handler });
                true
            }
            None => false,
        }
    }

    pub(crate) fn listeners_for(&self, id: &str, kind: EventKind) -> Vec<Arc<dyn EventHandler>> {
        self.elements
            .get(id)
            .map(|element| {
                element
                    .listeners
                    .iter()
                    .filter(|l| l.kind == kind)
                    .map(|l| Arc::clone(&l.handler))
                    .collect()
            })
            .unwrap_or_default()
    }
}
