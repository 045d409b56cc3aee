//! Q&A board page client
//!
//! Entry point for the `qna-board` command line client.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use clap::Parser;
use dotenvy::dotenv;
use tracing::{Subscriber, info, warn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use qna_board_client::badge::{self, ALERT_BADGE, MESSAGE_BADGE};
use qna_board_client::chrome::{LOGOUT_BUTTON, MENU_CONTAINER, TOPBAR_CONTAINER};
use qna_board_client::client::content_path;
use qna_board_client::config::{AppConfig, Cli, Command, FieldArgs, LoggingSettings};
use qna_board_client::dom::{ActionOutcome, Document, Element};
use qna_board_client::modal::Modal;
use qna_board_client::qna::ids;
use qna_board_client::{ChromeLoader, Client, ConsoleWindow, Page, PostId, QnaController};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let cli = Cli::parse();
    let config = AppConfig::resolve(&cli).context("Configuration error")?;
    init_tracing(&config.logging);

    info!(
        name: "client.config.loaded",
        base_url = %config.client.base_url,
        assume_yes = config.client.assume_yes,
        "Client configuration loaded"
    );

    let client = Client::new(&config.client.base_url)?;
    let window = Arc::new(ConsoleWindow::new(config.client.assume_yes));
    let page = Page::new(client, window);

    let outcome = match cli.command.unwrap_or(Command::Chrome) {
        Command::Chrome => run_chrome(&page, &config).await,
        Command::Logout => run_logout(&page, &config).await,
        Command::Delete { post_id } => {
            open_post(&page, &config, &post_id).await?;
            click(&page, ids::DELETE_BUTTON).await?
        }
        Command::Edit { post_id, fields } => {
            open_post(&page, &config, &post_id).await?;
            submit_dialog(&page, ids::EDIT_BUTTON, Modal::EDIT, &fields).await?
        }
        Command::Reply { post_id, fields } => {
            open_post(&page, &config, &post_id).await?;
            submit_dialog(&page, ids::REPLY_BUTTON, Modal::REPLY, &fields).await?
        }
    };

    info!(name: "client.action.finished", outcome = ?outcome, "Action finished");
    if outcome.is_failure() {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(log_layer(settings.json, std::io::stderr))
        .init();
}

/// Human or JSON log lines, both written to `writer`. Stdout is left to
/// command output.
fn log_layer<S, W>(json: bool, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    if json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer().with_target(true).with_writer(writer).boxed()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Chrome
// ─────────────────────────────────────────────────────────────────────────────

/// Empty shell holding the two chrome containers.
fn chrome_shell() -> Document {
    Document::from_html(&format!(
        r#"<nav id="{MENU_CONTAINER}"></nav><header id="{TOPBAR_CONTAINER}"></header>"#
    ))
}

async fn load_chrome(page: &Page, config: &AppConfig) -> bool {
    page.replace_document(chrome_shell());
    ChromeLoader::new(&config.client.home_path).start(page).await
}

async fn run_chrome(page: &Page, config: &AppConfig) -> ActionOutcome {
    if !load_chrome(page, config).await {
        return ActionOutcome::Failed;
    }
    let (messages, alerts) = page.read(|doc| {
        (
            badge::shown(doc, MESSAGE_BADGE),
            badge::shown(doc, ALERT_BADGE),
        )
    });
    println!("messages: {}", messages.as_deref().unwrap_or("-"));
    println!("alerts:   {}", alerts.as_deref().unwrap_or("-"));
    ActionOutcome::Succeeded
}

async fn run_logout(page: &Page, config: &AppConfig) -> ActionOutcome {
    if !load_chrome(page, config).await {
        return ActionOutcome::Failed;
    }
    match page.click(LOGOUT_BUTTON).await.outcome() {
        Some(outcome) => outcome,
        None => {
            warn!(name: "client.logout.missing", "Topbar has no logout button; not logged in?");
            ActionOutcome::Aborted
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Post page
// ─────────────────────────────────────────────────────────────────────────────

async fn open_post(page: &Page, config: &AppConfig, raw_id: &str) -> anyhow::Result<()> {
    let post_id = PostId::new(raw_id).ok_or_else(|| anyhow!("post id must not be empty"))?;
    page.load(&content_path(&post_id))
        .await
        .with_context(|| format!("Failed to load post {post_id}"))?;

    let controller = QnaController::new(post_id, &config.client.listing_path);
    let bound = controller.attach(page);
    info!(name: "client.post.opened", post_id = %controller.post_id(), bound, "Post page loaded");
    Ok(())
}

async fn click(page: &Page, target: &str) -> anyhow::Result<ActionOutcome> {
    page.click(target)
        .await
        .outcome()
        .ok_or_else(|| anyhow!("The page has no #{target}; is this action available to you?"))
}

/// Open a dialog, type into its form and submit it.
async fn submit_dialog(
    page: &Page,
    trigger: &str,
    modal: Modal,
    fields: &FieldArgs,
) -> anyhow::Result<ActionOutcome> {
    click(page, trigger).await?;
    page.write(|doc| fill_form(doc, modal.form, fields))?;
    page.submit(modal.form)
        .await
        .outcome()
        .ok_or_else(|| anyhow!("The page has no #{}", modal.form))
}

fn fill_form(doc: &mut Document, form_id: &str, fields: &FieldArgs) -> anyhow::Result<()> {
    let form = doc
        .get_mut(form_id)
        .and_then(Element::form_mut)
        .ok_or_else(|| anyhow!("The page has no form #{form_id}"))?;
    for (name, value) in &fields.set {
        if !form.set_value(name, value.as_str()) {
            bail!("#{form_id} has no field named `{name}`");
        }
    }
    for (name, path) in &fields.attach {
        if !form.attach(name, path) {
            bail!("#{form_id} has no file input named `{name}`");
        }
    }
    Ok(())
}
