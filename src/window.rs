//! Blocking browser primitives: notices, confirmations and navigation.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use console::style;
use inquire::Confirm;
use tracing::{info, warn};

/// A navigation the page asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Reload the current location.
    Reload,
    /// Go to another location.
    Assign(String),
}

/// The user-facing side of the page.
///
/// `alert` and `confirm` block the caller until the user answers, like
/// their browser counterparts.
pub trait Window: Send + Sync + fmt::Debug {
    fn alert(&self, message: &str);
    fn confirm(&self, message: &str) -> bool;
    fn reload(&self);
    fn navigate(&self, location: &str);
}

// =============================================================================
// Console
// =============================================================================

/// Terminal window: prints notices and asks confirmations interactively.
#[derive(Debug, Default)]
pub struct ConsoleWindow {
    assume_yes: bool,
    navigations: Mutex<Vec<Navigation>>,
}

impl ConsoleWindow {
    /// With `assume_yes`, every confirmation is accepted without a prompt.
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            navigations: Mutex::default(),
        }
    }

    /// Navigations requested so far.
    pub fn navigations(&self) -> Vec<Navigation> {
        self.navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, navigation: Navigation) {
        self.navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(navigation);
    }
}

impl Window for ConsoleWindow {
    fn alert(&self, message: &str) {
        println!("{} {message}", style("!").yellow().bold());
    }

    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            println!("{} {message} {}", style("?").cyan().bold(), style("yes").dim());
            return true;
        }
        match Confirm::new(message).with_default(false).prompt() {
            Ok(answer) => answer,
            Err(err) => {
                warn!(name: "window.confirm.failed", error = %err, "Confirmation prompt failed; treating as declined");
                false
            }
        }
    }

    fn reload(&self) {
        info!(name: "window.reload", "Page reload requested");
        self.record(Navigation::Reload);
    }

    fn navigate(&self, location: &str) {
        info!(name: "window.navigate", location = %location, "Navigation requested");
        self.record(Navigation::Assign(location.to_string()));
    }
}

// =============================================================================
// Scripted
// =============================================================================

#[derive(Debug, Default)]
struct ScriptLog {
    answers: VecDeque<bool>,
    alerts: Vec<String>,
    prompts: Vec<String>,
    navigations: Vec<Navigation>,
}

/// Non-interactive window with scripted answers. Records everything shown
/// to the user.
#[derive(Debug)]
pub struct ScriptedWindow {
    default_answer: bool,
    log: Mutex<ScriptLog>,
}

impl ScriptedWindow {
    /// Answers every confirmation with `yes`.
    pub fn accepting() -> Self {
        Self::with_default(true)
    }

    /// Declines every confirmation.
    pub fn declining() -> Self {
        Self::with_default(false)
    }

    fn with_default(default_answer: bool) -> Self {
        Self {
            default_answer,
            log: Mutex::default(),
        }
    }

    /// Queue answers for the next confirmations; the default applies after.
    #[must_use]
    pub fn with_answers(self, answers: impl IntoIterator<Item = bool>) -> Self {
        self.lock().answers.extend(answers);
        self
    }

    pub fn alerts(&self) -> Vec<String> {
        self.lock().alerts.clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.lock().prompts.clone()
    }

    pub fn navigations(&self) -> Vec<Navigation> {
        self.lock().navigations.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Window for ScriptedWindow {
    fn alert(&self, message: &str) {
        self.lock().alerts.push(message.to_string());
    }

    fn confirm(&self, message: &str) -> bool {
        let mut log = self.lock();
        log.prompts.push(message.to_string());
        log.answers.pop_front().unwrap_or(self.default_answer)
    }

    fn reload(&self) {
        self.lock().navigations.push(Navigation::Reload);
    }

    fn navigate(&self, location: &str) {
        self.lock()
            .navigations
            .push(Navigation::Assign(location.to_string()));
    }
}
