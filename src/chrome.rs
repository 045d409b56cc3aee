//! Shared page chrome: sidebar and topbar fragments, unread badges, logout.
//!
//! Chrome failures never interrupt the page. Fragment and badge errors are
//! logged and leave the document as it was.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::badge;
use crate::dom::{ActionOutcome, DomEvent, EventHandler, EventKind};
use crate::error::Error;
use crate::page::{Page, PageEvent, PageEventHandler};
use crate::types::LogoutResponse;

pub const SIDEBAR_PATH: &str = "/sidebar";
pub const TOPBAR_PATH: &str = "/topbar";
/// Container the sidebar fragment is mounted into.
pub const MENU_CONTAINER: &str = "menu";
pub const TOPBAR_CONTAINER: &str = "topbar";
pub const LOGOUT_BUTTON: &str = "logoutBtn";

/// `data-bound` marker set on the logout button once its handler is bound.
pub const BOUND_MARKER: &str = "bound";

/// Page subscription key of the badge refresher.
const BADGE_SYNC: &str = "chrome.badge-sync";

pub mod notices {
    pub const CONFIRM_LOGOUT: &str = "Do you want to log out?";
    pub const LOGGED_OUT: &str = "You have been logged out.";
    pub const LOGOUT_FAILED: &str = "Logout failed";
    pub const UNKNOWN_ERROR: &str = "unknown error";
    pub const COMMUNICATION_FAILED: &str = "Could not communicate with the server.";
}

/// Loads the chrome and keeps the badges current.
#[derive(Debug)]
pub struct ChromeLoader {
    home_path: String,
}

impl ChromeLoader {
    /// `home_path` is where the user lands after logging out.
    pub fn new(home_path: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            home_path: home_path.into(),
        })
    }

    /// Load the chrome and wire it up.
    ///
    /// The badge subscription is registered on the first call per page.
    /// Sidebar and topbar load concurrently, once each; badges and logout
    /// are set up only after the topbar is in the document. Returns whether
    /// the topbar loaded.
    pub async fn start(self: &Arc<Self>, page: &Page) -> bool {
        self.subscribe_once(page);

        let sidebar = Self::load_fragment(page, SIDEBAR_PATH, MENU_CONTAINER);
        let topbar = async {
            let loaded = Self::load_fragment(page, TOPBAR_PATH, TOPBAR_CONTAINER).await;
            if loaded {
                self.initialize_user_state(page).await;
                self.bind_logout(page);
            }
            loaded
        };
        let (_, topbar_loaded) = futures::join!(sidebar, topbar);
        topbar_loaded
    }

    /// Register the page-lifetime badge refresher, once per page.
    pub fn subscribe_once(&self, page: &Page) -> bool {
        page.subscribe_once(BADGE_SYNC, Arc::new(BadgeSync))
    }

    /// `GET path` and mount the body into `container_id` as trusted HTML.
    ///
    /// Returns whether the container was updated.
    pub async fn load_fragment(page: &Page, path: &str, container_id: &str) -> bool {
        let html = match page.client().chrome().fragment(path).await {
            Ok(html) => html,
            Err(err) => {
                error!(name: "chrome.fragment.failed", path = %path, error = %err, "Error loading fragment");
                return false;
            }
        };
        match page.write(|doc| doc.set_inner_html(container_id, &html)) {
            Ok(()) => {
                debug!(name: "chrome.fragment.loaded", path = %path, container = %container_id, "Fragment loaded");
                true
            }
            Err(err) => {
                error!(name: "chrome.fragment.failed", path = %path, error = %err, "Error loading fragment");
                false
            }
        }
    }

    /// First badge refresh once the topbar exists.
    pub async fn initialize_user_state(&self, page: &Page) -> bool {
        Self::refresh_badges(page).await
    }

    /// Bind the logout handler unless the button already carries the bound
    /// marker. Returns whether a handler was attached.
    pub fn bind_logout(self: &Arc<Self>, page: &Page) -> bool {
        let bound = page.write(|doc| {
            let Some(button) = doc.get_mut(LOGOUT_BUTTON) else {
                return false;
            };
            if button.data(BOUND_MARKER).is_some() {
                return false;
            }
            button.set_data(BOUND_MARKER, "true");
            doc.bind_if_present(
                LOGOUT_BUTTON,
                EventKind::Click,
                Arc::new(LogoutHandler {
                    loader: Arc::clone(self),
                }),
            )
        });
        debug!(name: "chrome.logout.bind", bound, "Topbar events bound");
        bound
    }

    /// Confirm, then `POST /auth/logout`.
    pub async fn handle_logout(&self, page: &Page) -> ActionOutcome {
        if !page.window().confirm(notices::CONFIRM_LOGOUT) {
            return ActionOutcome::Cancelled;
        }

        match page.client().chrome().logout().await {
            Ok(()) => {
                info!(name: "chrome.logout.succeeded", "Logged out");
                page.window().alert(notices::LOGGED_OUT);
                page.window().navigate(&self.home_path);
                ActionOutcome::Succeeded
            }
            Err(Error::Api { status, message }) => {
                match serde_json::from_str::<LogoutResponse>(&message) {
                    Ok(body) => {
                        let reason = body
                            .message
                            .filter(|m| !m.is_empty())
                            .unwrap_or_else(|| notices::UNKNOWN_ERROR.to_string());
                        warn!(name: "chrome.logout.rejected", status, reason = %reason, "Logout rejected");
                        page.window()
                            .alert(&format!("{}: {reason}", notices::LOGOUT_FAILED));
                    }
                    Err(err) => {
                        error!(name: "chrome.logout.failed", status, error = %err, "Error during logout");
                        page.window().alert(notices::COMMUNICATION_FAILED);
                    }
                }
                ActionOutcome::Failed
            }
            Err(err) => {
                error!(name: "chrome.logout.failed", error = %err, "Error during logout");
                page.window().alert(notices::COMMUNICATION_FAILED);
                ActionOutcome::Failed
            }
        }
    }

    /// `GET /users/message_count` and update both badges.
    ///
    /// On failure the badges keep whatever they showed before.
    pub async fn refresh_badges(page: &Page) -> bool {
        match page.client().chrome().message_count().await {
            Ok(counts) => {
                page.write(|doc| badge::apply_counts(doc, counts));
                debug!(
                    name: "chrome.badges.updated",
                    messages = counts.message_count,
                    alerts = counts.alert_count,
                    "Badges updated"
                );
                true
            }
            Err(err) => {
                error!(name: "chrome.badges.failed", error = %err, "Error updating user message and alerts");
                false
            }
        }
    }
}

#[derive(Debug)]
struct LogoutHandler {
    loader: Arc<ChromeLoader>,
}

#[async_trait]
impl EventHandler for LogoutHandler {
    async fn handle(&self, page: &Page, _event: &mut DomEvent) -> ActionOutcome {
        self.loader.handle_logout(page).await
    }
}

/// Refreshes the badges on history navigation and when the tab is shown.
#[derive(Debug)]
struct BadgeSync;

#[async_trait]
impl PageEventHandler for BadgeSync {
    async fn on_page_event(&self, page: &Page, event: PageEvent) {
        match event {
            PageEvent::PopState | PageEvent::VisibilityChanged { hidden: false } => {
                ChromeLoader::refresh_badges(page).await;
            }
            PageEvent::VisibilityChanged { hidden: true } => {}
        }
    }
}
