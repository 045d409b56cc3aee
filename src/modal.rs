//! Modal dialogs and their open/closed state.

use crate::dom::{Document, Element};

/// Class marking an open dialog.
pub const ACTIVE_CLASS: &str = "active";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    Open,
}

/// A dialog element paired with the form it hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modal {
    pub dialog: &'static str,
    pub form: &'static str,
}

impl Modal {
    /// Author's edit dialog.
    pub const EDIT: Modal = Modal {
        dialog: "qnaEditModal",
        form: "qnaEditForm",
    };

    /// Admin reply dialog.
    pub const REPLY: Modal = Modal {
        dialog: "replyModal",
        form: "replyForm",
    };

    pub fn state(self, doc: &Document) -> ModalState {
        if doc.get(self.dialog).is_some_and(|d| d.has_class(ACTIVE_CLASS)) {
            ModalState::Open
        } else {
            ModalState::Closed
        }
    }

    /// Returns `false` when the dialog is not in the document.
    pub fn open(self, doc: &mut Document) -> bool {
        doc.get_mut(self.dialog)
            .map(|dialog| dialog.add_class(ACTIVE_CLASS))
            .is_some()
    }

    /// Close the dialog and reset its form.
    pub fn close(self, doc: &mut Document) -> bool {
        let closed = doc
            .get_mut(self.dialog)
            .map(|dialog| dialog.remove_class(ACTIVE_CLASS))
            .is_some();
        if let Some(form) = doc.get_mut(self.form).and_then(Element::form_mut) {
            form.reset();
        }
        closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div id="qnaEditModal" class="modal">
          <form id="qnaEditForm">
            <input name="title" value="">
            <textarea name="content"></textarea>
          </form>
        </div>
    "#;

    #[test]
    fn open_then_close_resets_form() {
        let mut doc = Document::from_html(PAGE);
        assert_eq!(Modal::EDIT.state(&doc), ModalState::Closed);

        assert!(Modal::EDIT.open(&mut doc));
        assert_eq!(Modal::EDIT.state(&doc), ModalState::Open);
        assert!(doc.get("qnaEditModal").unwrap().has_class("modal"));

        let form = doc.get_mut("qnaEditForm").unwrap().form_mut().unwrap();
        form.set_value("title", "draft");
        form.set_value("content", "half written");

        assert!(Modal::EDIT.close(&mut doc));
        assert_eq!(Modal::EDIT.state(&doc), ModalState::Closed);
        let form = doc.get("qnaEditForm").unwrap().form().unwrap();
        assert!(form.is_pristine());
        assert_eq!(form.field("content").unwrap().value(), "");
    }

    #[test]
    fn missing_dialog_is_tolerated() {
        let mut doc = Document::new();
        assert!(!Modal::REPLY.open(&mut doc));
        assert!(!Modal::REPLY.close(&mut doc));
        assert_eq!(Modal::REPLY.state(&doc), ModalState::Closed);
    }
}
