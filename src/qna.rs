//! Q&A post page: author edit/delete and admin reply.
//!
//! Every action is one request. Transport errors, error statuses and
//! unparseable bodies all end the same way: the error is logged, the user
//! gets one fixed notice, and the page stays as it was so nothing typed is
//! lost.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::dom::{ActionOutcome, DomEvent, Element, EventHandler, EventKind};
use crate::modal::Modal;
use crate::page::Page;
use crate::types::{FormData, PostId};

/// Element ids the controller binds to.
pub mod ids {
    pub const EDIT_BUTTON: &str = "editQnaBtn";
    pub const DELETE_BUTTON: &str = "deleteQnaBtn";
    pub const CLOSE_EDIT: &str = "closeQnaEditModal";
    pub const EDIT_FORM: &str = "qnaEditForm";
    pub const REPLY_BUTTON: &str = "replyBtn";
    pub const CLOSE_REPLY: &str = "closeReplyModal";
    pub const REPLY_FORM: &str = "replyForm";
}

/// `data-qna-id` on the reply button names the post being answered.
pub const REPLY_TARGET_KEY: &str = "qna-id";

pub mod notices {
    pub const EDITED: &str = "Your post has been updated.";
    pub const EDIT_FAILED: &str = "Something went wrong while editing the post.";
    pub const CONFIRM_DELETE: &str = "Are you sure you want to delete this post?";
    pub const DELETED: &str = "The post has been deleted.";
    pub const DELETE_FAILED: &str = "Something went wrong while deleting the post.";
    pub const MISSING_POST_ID: &str = "Could not find the post ID.";
    pub const REPLIED: &str = "Your reply has been posted.";
    pub const REPLY_FAILED: &str = "Something went wrong while processing the reply.";
}

/// A user action on the post page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QnaAction {
    OpenEdit,
    CloseEdit,
    SubmitEdit,
    Delete,
    OpenReply,
    CloseReply,
    SubmitReply,
}

impl QnaAction {
    pub const ALL: [QnaAction; 7] = [
        Self::OpenEdit,
        Self::CloseEdit,
        Self::SubmitEdit,
        Self::Delete,
        Self::OpenReply,
        Self::CloseReply,
        Self::SubmitReply,
    ];

    /// The element and event that trigger this action.
    pub fn trigger(self) -> (&'static str, EventKind) {
        match self {
            Self::OpenEdit => (ids::EDIT_BUTTON, EventKind::Click),
            Self::CloseEdit => (ids::CLOSE_EDIT, EventKind::Click),
            Self::SubmitEdit => (ids::EDIT_FORM, EventKind::Submit),
            Self::Delete => (ids::DELETE_BUTTON, EventKind::Click),
            Self::OpenReply => (ids::REPLY_BUTTON, EventKind::Click),
            Self::CloseReply => (ids::CLOSE_REPLY, EventKind::Click),
            Self::SubmitReply => (ids::REPLY_FORM, EventKind::Submit),
        }
    }
}

/// Controller for one post page.
#[derive(Debug)]
pub struct QnaController {
    post_id: PostId,
    listing_path: String,
}

impl QnaController {
    /// `post_id` is the page-level post; `listing_path` is where the user
    /// lands after deleting it.
    pub fn new(post_id: PostId, listing_path: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            post_id,
            listing_path: listing_path.into(),
        })
    }

    pub fn post_id(&self) -> &PostId {
        &self.post_id
    }

    /// Bind every action whose trigger element exists. Returns how many
    /// were bound.
    pub fn attach(self: &Arc<Self>, page: &Page) -> usize {
        page.write(|doc| {
            QnaAction::ALL
                .into_iter()
                .filter(|&action| {
                    let (id, kind) = action.trigger();
                    let handler = Arc::new(QnaHandler {
                        controller: Arc::clone(self),
                        action,
                    });
                    doc.bind_if_present(id, kind, handler)
                })
                .count()
        })
    }

    pub fn open_modal(&self, page: &Page, modal: Modal) -> ActionOutcome {
        page.write(|doc| modal.open(doc));
        ActionOutcome::Done
    }

    pub fn close_modal(&self, page: &Page, modal: Modal) -> ActionOutcome {
        page.write(|doc| modal.close(doc));
        ActionOutcome::Done
    }

    /// `PUT /board/qna/content/{id}/edit` with the edit form.
    pub async fn submit_edit(&self, page: &Page) -> ActionOutcome {
        let form = form_data(page, ids::EDIT_FORM);
        match page.client().qna().edit(&self.post_id, form).await {
            Ok(_) => {
                info!(name: "qna.edit.succeeded", post_id = %self.post_id, "Post edited");
                page.window().alert(notices::EDITED);
                page.window().reload();
                ActionOutcome::Succeeded
            }
            Err(err) => {
                error!(name: "qna.edit.failed", post_id = %self.post_id, error = %err, "Failed to edit post");
                page.window().alert(notices::EDIT_FAILED);
                ActionOutcome::Failed
            }
        }
    }

    /// `DELETE /board/qna/content/{id}/delete` after the user confirms.
    pub async fn submit_delete(&self, page: &Page) -> ActionOutcome {
        if !page.window().confirm(notices::CONFIRM_DELETE) {
            return ActionOutcome::Cancelled;
        }
        match page.client().qna().delete(&self.post_id).await {
            Ok(_) => {
                info!(name: "qna.delete.succeeded", post_id = %self.post_id, "Post deleted");
                page.window().alert(notices::DELETED);
                page.window().navigate(&self.listing_path);
                ActionOutcome::Succeeded
            }
            Err(err) => {
                error!(name: "qna.delete.failed", post_id = %self.post_id, error = %err, "Failed to delete post");
                page.window().alert(notices::DELETE_FAILED);
                ActionOutcome::Failed
            }
        }
    }

    /// `PUT /board/qna/content/{id}/reply` for the post named by the reply
    /// button, which may differ from the page-level post.
    pub async fn submit_reply(&self, page: &Page) -> ActionOutcome {
        let target = page.read(|doc| {
            doc.get(ids::REPLY_BUTTON)
                .and_then(|button| button.data(REPLY_TARGET_KEY))
                .and_then(PostId::new)
        });
        let Some(target) = target else {
            page.window().alert(notices::MISSING_POST_ID);
            return ActionOutcome::Aborted;
        };

        let form = form_data(page, ids::REPLY_FORM);
        match page.client().qna().reply(&target, form).await {
            Ok(_) => {
                info!(name: "qna.reply.succeeded", post_id = %target, "Reply submitted");
                page.window().alert(notices::REPLIED);
                page.window().reload();
                ActionOutcome::Succeeded
            }
            Err(err) => {
                error!(name: "qna.reply.failed", post_id = %target, error = %err, "Failed to submit reply");
                page.window().alert(notices::REPLY_FAILED);
                ActionOutcome::Failed
            }
        }
    }
}

fn form_data(page: &Page, form_id: &str) -> FormData {
    page.read(|doc| {
        doc.get(form_id)
            .and_then(Element::form)
            .map(crate::dom::Form::form_data)
            .unwrap_or_default()
    })
}

#[derive(Debug)]
struct QnaHandler {
    controller: Arc<QnaController>,
    action: QnaAction,
}

#[async_trait]
impl EventHandler for QnaHandler {
    async fn handle(&self, page: &Page, event: &mut DomEvent) -> ActionOutcome {
        let controller = &self.controller;
        match self.action {
            QnaAction::OpenEdit => {
                event.prevent_default();
                controller.open_modal(page, Modal::EDIT)
            }
            QnaAction::OpenReply => {
                event.prevent_default();
                controller.open_modal(page, Modal::REPLY)
            }
            QnaAction::CloseEdit => controller.close_modal(page, Modal::EDIT),
            QnaAction::CloseReply => controller.close_modal(page, Modal::REPLY),
            QnaAction::SubmitEdit => {
                event.prevent_default();
                controller.submit_edit(page).await
            }
            QnaAction::Delete => {
                event.prevent_default();
                controller.submit_delete(page).await
            }
            QnaAction::SubmitReply => {
                event.prevent_default();
                controller.submit_reply(page).await
            }
        }
    }
}
