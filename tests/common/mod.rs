#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use qna_board_client::dom::Document;
use qna_board_client::{Client, Page, ScriptedWindow};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;
use wiremock::MockServer;

/// Post page as the server renders it for an admin viewing their own post.
pub const POST_PAGE: &str = r#"
<nav id="menu"></nav>
<header id="topbar"></header>
<main>
  <h1>Sensor readings look off</h1>
  <button id="editQnaBtn">Edit</button>
  <a id="deleteQnaBtn" href="">Delete</a>
  <button id="replyBtn" data-qna-id="7">Reply</button>

  <div id="qnaEditModal" class="modal">
    <button id="closeQnaEditModal">&times;</button>
    <form id="qnaEditForm">
      <input type="text" name="title" value="">
      <textarea name="content"></textarea>
      <input type="file" name="file">
      <button type="submit">Save</button>
    </form>
  </div>

  <div id="replyModal" class="modal">
    <button id="closeReplyModal">&times;</button>
    <form id="replyForm">
      <input type="hidden" name="reply_id" value="1">
      <input type="text" name="reply_title">
      <textarea name="reply_content"></textarea>
      <button type="submit">Send</button>
    </form>
  </div>
</main>
"#;

/// Topbar fragment served by `/topbar`.
pub const TOPBAR: &str = r#"
<div class="topbar-inner">
  <a href="/messages">Messages <span id="messageBadge" class="badge" style="display:none"></span></a>
  <a href="/alerts">Alerts <span id="alertBadge" class="badge" style="display:none"></span></a>
  <button id="logoutBtn">Log out</button>
</div>
"#;

pub const SIDEBAR: &str = r#"<ul id="sideMenu"><li><a href="/qna">Q&amp;A</a></li></ul>"#;

/// Page backed by `server`, built from `html`, reporting to `window`.
pub fn page_at(server: &MockServer, html: &str, window: &Arc<ScriptedWindow>) -> Page {
    page_for(&server.uri(), html, window)
}

pub fn page_for(base_url: &str, html: &str, window: &Arc<ScriptedWindow>) -> Page {
    let client = Client::new(base_url).expect("valid base URL");
    let window: Arc<ScriptedWindow> = Arc::clone(window);
    Page::new(client, window).with_document(Document::from_html(html))
}

/// Shared buffer collecting formatted log lines.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        let buf = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

pub struct LogWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter(Arc::clone(&self.0))
    }
}

/// Capture logs emitted on this thread until the guard drops.
///
/// `#[tokio::test]` runs on a current-thread runtime, so handler logs land
/// here too.
pub fn capture_logs() -> (LogCapture, DefaultGuard) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}
