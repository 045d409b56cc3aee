//! HTML fragment parsing.
//!
//! Only what the page logic addresses is kept: elements with an `id`, their
//! attributes and text, and the named controls of `<form id=...>` elements.
//! Runs the `html5ever` tokenizer without a tree builder, so malformed
//! nesting is closed at the next matching end tag. The sink switches the
//! tokenizer into raw text for `<script>`, `<style>` and `<textarea>`, so
//! markup inside them stays text.

use std::collections::BTreeMap;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

use super::Element;
use super::form::{FieldKind, FormField};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Tokenizer state for the content of `tag`, when it is not markup.
fn raw_kind(tag: &str) -> Option<RawKind> {
    match tag {
        "script" => Some(RawKind::ScriptData),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" => Some(RawKind::Rawtext),
        "textarea" | "title" => Some(RawKind::Rcdata),
        _ => None,
    }
}

/// Parse `html` into its id'd elements, in document order.
///
/// Top-level elements get `parent` as their parent id; nested ones point at
/// their nearest id'd ancestor.
pub(crate) fn parse(html: &str, parent: Option<&str>) -> Vec<Element> {
    let mut queue = BufferQueue::default();
    queue.push_back(StrTendril::from_slice(html));

    let collector = Collector {
        root: parent.map(str::to_string),
        ..Collector::default()
    };
    let mut tokenizer = Tokenizer::new(collector, TokenizerOpts::default());
    let _ = tokenizer.feed(&mut queue);
    tokenizer.end();
    tokenizer.sink.close_select();
    tokenizer.sink.elements
}

#[derive(Debug)]
struct Open {
    tag: String,
    element: Option<usize>,
    /// Set while inside a `<textarea>` whose text is its default value.
    textarea: Option<usize>,
}

/// An open `<select>` collecting its options.
#[derive(Debug)]
struct SelectState {
    /// Element index of the enclosing form.
    form: usize,
    /// Last `selected` option, else the first option.
    chosen: Option<String>,
    option: Option<PendingOption>,
}

#[derive(Debug)]
struct PendingOption {
    value: Option<String>,
    label: String,
    selected: bool,
}

impl SelectState {
    fn new(form: usize) -> Self {
        Self {
            form,
            chosen: None,
            option: None,
        }
    }

    fn start_option(&mut self, value: Option<String>, selected: bool) {
        self.finish_option();
        self.option = Some(PendingOption {
            value,
            label: String::new(),
            selected,
        });
    }

    fn finish_option(&mut self) {
        let Some(option) = self.option.take() else {
            return;
        };
        // An option without `value` submits its label.
        let value = option
            .value
            .unwrap_or_else(|| option.label.trim().to_string());
        if option.selected || self.chosen.is_none() {
            self.chosen = Some(value);
        }
    }
}

#[derive(Debug, Default)]
struct Collector {
    root: Option<String>,
    elements: Vec<Element>,
    stack: Vec<Open>,
    select: Option<SelectState>,
}

impl Collector {
    fn nearest_element(&self) -> Option<usize> {
        self.stack.iter().rev().find_map(|open| open.element)
    }

    fn enclosing_form(&self) -> Option<usize> {
        self.stack
            .iter()
            .rev()
            .filter(|open| open.tag == "form")
            .find_map(|open| open.element)
    }

    fn start_tag(&mut self, tag: &Tag) -> TokenSinkResult<()> {
        let name = tag.name.to_string();
        let attributes: BTreeMap<String, String> = tag
            .attrs
            .iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect();

        let element = attributes.get("id").filter(|id| !id.is_empty()).map(|id| {
            let parent = self
                .nearest_element()
                .map(|idx| self.elements[idx].id().to_string())
                .or_else(|| self.root.clone());
            let mut element = Element::new(id.clone(), name.clone());
            for (key, value) in &attributes {
                if key != "id" {
                    element.set_attribute(key, value);
                }
            }
            element.parent = parent;
            if name == "form" {
                element.form = Some(super::Form::new());
            }
            self.elements.push(element);
            self.elements.len() - 1
        });

        let field = self.collect_field(&name, &attributes);
        let textarea = match field {
            Some((form_idx, FieldKind::TextArea)) => Some(form_idx),
            Some((form_idx, FieldKind::Select)) => {
                self.select = Some(SelectState::new(form_idx));
                None
            }
            _ => None,
        };
        if name == "option" {
            if let Some(select) = self.select.as_mut() {
                select.start_option(
                    attributes.get("value").cloned(),
                    attributes.contains_key("selected"),
                );
            }
        }

        let is_void = VOID_ELEMENTS.contains(&name.as_str());
        if is_void || tag.self_closing {
            return TokenSinkResult::Continue;
        }
        let raw = raw_kind(&name);
        self.stack.push(Open {
            tag: name,
            element,
            textarea,
        });
        match raw {
            Some(kind) => TokenSinkResult::RawData(kind),
            None => TokenSinkResult::Continue,
        }
    }

    /// Register a named control with its form. Returns the form's element
    /// index and the control's kind.
    fn collect_field(
        &mut self,
        tag: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Option<(usize, FieldKind)> {
        let kind = match tag {
            "input" => FieldKind::from_input_type(attributes.get("type").map(String::as_str)),
            "textarea" => FieldKind::TextArea,
            "select" => FieldKind::Select,
            "button" => FieldKind::Button,
            _ => return None,
        };
        let name = attributes.get("name").filter(|n| !n.is_empty())?;
        let form_idx = self.enclosing_form()?;

        let mut field = FormField::new(name.clone(), kind);
        match kind {
            FieldKind::Checkable => {
                let value = attributes.get("value").map_or("on", String::as_str);
                field = field
                    .with_default(value)
                    .with_default_checked(attributes.contains_key("checked"));
            }
            FieldKind::Text | FieldKind::Button => {
                if let Some(value) = attributes.get("value") {
                    field = field.with_default(value.clone());
                }
            }
            FieldKind::TextArea | FieldKind::Select | FieldKind::File => {}
        }

        self.elements[form_idx].form.as_mut()?.push(field);
        Some((form_idx, kind))
    }

    /// Give the open `<select>` its chosen option as default value.
    fn close_select(&mut self) {
        let Some(mut select) = self.select.take() else {
            return;
        };
        select.finish_option();
        let Some(value) = select.chosen else {
            return;
        };
        if let Some(field) = self.elements[select.form]
            .form
            .as_mut()
            .and_then(super::Form::last_field_mut)
        {
            field.set_default(value);
        }
    }

    fn end_tag(&mut self, tag: &Tag) {
        let name = tag.name.to_string();
        match name.as_str() {
            "option" => {
                if let Some(select) = self.select.as_mut() {
                    select.finish_option();
                }
            }
            "select" => self.close_select(),
            _ => {}
        }
        if let Some(pos) = self.stack.iter().rposition(|open| open.tag == name) {
            self.stack.truncate(pos);
        }
    }

    fn characters(&mut self, text: &str) {
        if let Some(option) = self.select.as_mut().and_then(|s| s.option.as_mut()) {
            option.label.push_str(text);
        }
        for open in &self.stack {
            if let Some(idx) = open.element {
                self.elements[idx].text.push_str(text);
            }
            if let Some(form_idx) = open.textarea {
                if let Some(field) = self.elements[form_idx]
                    .form
                    .as_mut()
                    .and_then(super::Form::last_field_mut)
                {
                    field.push_default_text(text);
                }
            }
        }
    }
}

impl TokenSink for Collector {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => return self.start_tag(&tag),
                TagKind::EndTag => self.end_tag(&tag),
            },
            Token::CharacterTokens(text) => self.characters(&text),
            _ => {}
        }
        TokenSinkResult::Continue
    }
}
