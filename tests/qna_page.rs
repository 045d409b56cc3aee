mod common;

use std::sync::Arc;

use common::{POST_PAGE, capture_logs, page_at, page_for};
use qna_board_client::client::content_path;
use qna_board_client::dom::{ActionOutcome, Element};
use qna_board_client::modal::{Modal, ModalState};
use qna_board_client::qna::{ids, notices};
use qna_board_client::{Navigation, Page, PostId, QnaController, ScriptedWindow};
use serde_json::json;
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn attach(page: &Page) -> Arc<QnaController> {
    let controller = QnaController::new(PostId::new("5").unwrap(), "/qna");
    controller.attach(page);
    controller
}

fn type_into(page: &Page, form_id: &str, name: &str, value: &str) {
    page.write(|doc| {
        let form = doc.get_mut(form_id).and_then(Element::form_mut).unwrap();
        assert!(form.set_value(name, value));
    });
}

#[tokio::test]
async fn test_edit_success_alerts_and_reloads() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/board/qna/content/5/edit"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let window = Arc::new(ScriptedWindow::accepting());
    let page = page_at(&server, POST_PAGE, &window);
    attach(&page);

    page.click(ids::EDIT_BUTTON).await;
    type_into(&page, ids::EDIT_FORM, "title", "Readings fixed");
    type_into(&page, ids::EDIT_FORM, "content", "It was a loose cable.");

    let dispatch = page.submit(ids::EDIT_FORM).await;
    assert!(dispatch.default_prevented);
    assert_eq!(dispatch.outcome(), Some(ActionOutcome::Succeeded));
    assert_eq!(window.alerts(), [notices::EDITED]);
    assert_eq!(window.navigations(), [Navigation::Reload]);

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"title\""));
    assert!(body.contains("Readings fixed"));
    assert!(body.contains("It was a loose cable."));
}

#[tokio::test]
async fn test_edit_uploads_attachment() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/board/qna/content/5/edit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("reading.csv");
    std::fs::write(&file, "t,v\n1,20.5\n").unwrap();

    let window = Arc::new(ScriptedWindow::accepting());
    let page = page_at(&server, POST_PAGE, &window);
    attach(&page);
    page.write(|doc| {
        let form = doc
            .get_mut(ids::EDIT_FORM)
            .and_then(Element::form_mut)
            .unwrap();
        assert!(form.attach("file", &file));
    });

    let dispatch = page.submit(ids::EDIT_FORM).await;
    assert_eq!(dispatch.outcome(), Some(ActionOutcome::Succeeded));

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("filename=\"reading.csv\""));
    assert!(body.contains("text/csv"));
    assert!(body.contains("1,20.5"));
}

#[tokio::test]
async fn test_edit_failure_keeps_modal_and_form() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/board/qna/content/5/edit"))
        .respond_with(ResponseTemplate::new(422).set_body_string("title required"))
        .expect(1)
        .mount(&server)
        .await;

    let window = Arc::new(ScriptedWindow::accepting());
    let page = page_at(&server, POST_PAGE, &window);
    attach(&page);

    page.click(ids::EDIT_BUTTON).await;
    type_into(&page, ids::EDIT_FORM, "content", "draft I do not want to lose");

    let dispatch = page.submit(ids::EDIT_FORM).await;
    assert_eq!(dispatch.outcome(), Some(ActionOutcome::Failed));
    assert_eq!(window.alerts(), [notices::EDIT_FAILED]);
    assert!(window.navigations().is_empty());
    assert_eq!(page.read(|doc| Modal::EDIT.state(doc)), ModalState::Open);
    let content = page.read(|doc| {
        doc.get(ids::EDIT_FORM)
            .and_then(Element::form)
            .and_then(|form| form.field("content"))
            .map(|field| field.value().to_string())
    });
    assert_eq!(content.as_deref(), Some("draft I do not want to lose"));
}

#[tokio::test]
async fn test_edit_unparseable_body_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/board/qna/content/5/edit"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let window = Arc::new(ScriptedWindow::accepting());
    let page = page_at(&server, POST_PAGE, &window);
    attach(&page);

    let dispatch = page.submit(ids::EDIT_FORM).await;
    assert_eq!(dispatch.outcome(), Some(ActionOutcome::Failed));
    assert_eq!(window.alerts(), [notices::EDIT_FAILED]);
    assert!(window.navigations().is_empty());
}

#[tokio::test]
async fn test_delete_declined_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let window = Arc::new(ScriptedWindow::declining());
    let page = page_at(&server, POST_PAGE, &window);
    attach(&page);

    let dispatch = page.click(ids::DELETE_BUTTON).await;
    assert_eq!(dispatch.outcome(), Some(ActionOutcome::Cancelled));
    assert_eq!(window.prompts(), [notices::CONFIRM_DELETE]);
    assert!(window.alerts().is_empty());
    assert!(window.navigations().is_empty());
    assert!(page.read(|doc| doc.contains(ids::DELETE_BUTTON)));
}

#[tokio::test]
async fn test_delete_success_navigates_to_listing() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/board/qna/content/5/delete"))
        .respond_with(ResponseTemplate::new(200).set_body_string("deleted"))
        .expect(1)
        .mount(&server)
        .await;

    let window = Arc::new(ScriptedWindow::accepting());
    let page = page_at(&server, POST_PAGE, &window);
    attach(&page);

    let dispatch = page.click(ids::DELETE_BUTTON).await;
    assert!(dispatch.default_prevented);
    assert_eq!(dispatch.outcome(), Some(ActionOutcome::Succeeded));
    assert_eq!(window.alerts(), [notices::DELETED]);
    assert_eq!(window.navigations(), [Navigation::Assign("/qna".into())]);
}

#[tokio::test]
async fn test_delete_server_error_alerts_once_and_logs() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/board/qna/content/5/delete"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let window = Arc::new(ScriptedWindow::accepting());
    let page = page_at(&server, POST_PAGE, &window);
    attach(&page);

    let (logs, _guard) = capture_logs();
    let dispatch = page.click(ids::DELETE_BUTTON).await;

    assert_eq!(dispatch.outcome(), Some(ActionOutcome::Failed));
    assert_eq!(window.alerts(), [notices::DELETE_FAILED]);
    assert!(window.navigations().is_empty());
    let logs = logs.contents();
    assert!(logs.contains("ERROR"), "logs: {logs}");
    assert!(logs.contains("Failed to delete post"), "logs: {logs}");
    assert!(logs.contains("500"), "logs: {logs}");
}

#[tokio::test]
async fn test_delete_unreachable_server_is_a_failure() {
    // Nothing listens on port 1, so the connection is refused.
    let window = Arc::new(ScriptedWindow::accepting());
    let page = page_for("http://127.0.0.1:1", POST_PAGE, &window);
    attach(&page);

    let dispatch = page.click(ids::DELETE_BUTTON).await;
    assert_eq!(dispatch.outcome(), Some(ActionOutcome::Failed));
    assert_eq!(window.alerts(), [notices::DELETE_FAILED]);
}

#[tokio::test]
async fn test_reply_uses_reply_button_post_id() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/board/qna/content/7/reply"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "reply_content": "Recalibrated."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let window = Arc::new(ScriptedWindow::accepting());
    let page = page_at(&server, POST_PAGE, &window);
    attach(&page);

    page.click(ids::REPLY_BUTTON).await;
    assert_eq!(page.read(|doc| Modal::REPLY.state(doc)), ModalState::Open);
    type_into(&page, ids::REPLY_FORM, "reply_title", "Re: readings");
    type_into(&page, ids::REPLY_FORM, "reply_content", "Recalibrated.");

    let dispatch = page.submit(ids::REPLY_FORM).await;
    assert_eq!(dispatch.outcome(), Some(ActionOutcome::Succeeded));
    assert_eq!(window.alerts(), [notices::REPLIED]);
    assert_eq!(window.navigations(), [Navigation::Reload]);

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"reply_id\""));
    assert!(body.contains("Recalibrated."));
}

#[tokio::test]
async fn test_reply_without_post_id_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let html = POST_PAGE.replace(r#" data-qna-id="7""#, "");
    let window = Arc::new(ScriptedWindow::accepting());
    let page = page_at(&server, &html, &window);
    attach(&page);

    let dispatch = page.submit(ids::REPLY_FORM).await;
    assert!(dispatch.default_prevented);
    assert_eq!(dispatch.outcome(), Some(ActionOutcome::Aborted));
    assert_eq!(window.alerts(), [notices::MISSING_POST_ID]);
    assert!(window.navigations().is_empty());
}

#[tokio::test]
async fn test_reply_without_reply_button_or_with_blank_id_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let pages = [
        POST_PAGE.replace(r#"<button id="replyBtn" data-qna-id="7">Reply</button>"#, ""),
        POST_PAGE.replace(r#"data-qna-id="7""#, r#"data-qna-id="  ""#),
    ];
    for html in pages {
        assert_ne!(html, POST_PAGE);
        let window = Arc::new(ScriptedWindow::accepting());
        let page = page_at(&server, &html, &window);
        attach(&page);

        let dispatch = page.submit(ids::REPLY_FORM).await;
        assert_eq!(dispatch.outcome(), Some(ActionOutcome::Aborted));
        assert_eq!(window.alerts(), [notices::MISSING_POST_ID]);
        assert!(window.navigations().is_empty());
    }
}

#[tokio::test]
async fn test_reply_failure_keeps_form() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/board/qna/content/7/reply"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "QnA content not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let window = Arc::new(ScriptedWindow::accepting());
    let page = page_at(&server, POST_PAGE, &window);
    attach(&page);
    type_into(&page, ids::REPLY_FORM, "reply_content", "typed answer");

    let dispatch = page.submit(ids::REPLY_FORM).await;
    assert_eq!(dispatch.outcome(), Some(ActionOutcome::Failed));
    assert_eq!(window.alerts(), [notices::REPLY_FAILED]);
    let pristine = page.read(|doc| {
        doc.get(ids::REPLY_FORM)
            .and_then(Element::form)
            .is_some_and(|form| form.is_pristine())
    });
    assert!(!pristine);
}

#[tokio::test]
async fn test_closing_modals_resets_forms() {
    let server = MockServer::start().await;
    let window = Arc::new(ScriptedWindow::accepting());
    let page = page_at(&server, POST_PAGE, &window);
    attach(&page);

    for (open, close, modal, field) in [
        (ids::EDIT_BUTTON, ids::CLOSE_EDIT, Modal::EDIT, "title"),
        (ids::REPLY_BUTTON, ids::CLOSE_REPLY, Modal::REPLY, "reply_title"),
    ] {
        page.click(open).await;
        type_into(&page, modal.form, field, "something");
        page.click(close).await;

        assert_eq!(page.read(|doc| modal.state(doc)), ModalState::Closed);
        let pristine = page.read(|doc| {
            doc.get(modal.form)
                .and_then(Element::form)
                .is_some_and(|form| form.is_pristine())
        });
        assert!(pristine, "{} was not reset", modal.form);
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_page_without_author_controls_binds_nothing() {
    let server = MockServer::start().await;
    let window = Arc::new(ScriptedWindow::accepting());
    let page = page_at(&server, "<main><h1>Read only</h1></main>", &window);

    let controller = QnaController::new(PostId::new("5").unwrap(), "/qna");
    assert_eq!(controller.attach(&page), 0);
    assert!(page.click(ids::DELETE_BUTTON).await.outcomes.is_empty());
    assert!(window.prompts().is_empty());
}

#[tokio::test]
async fn test_loaded_post_page_can_be_driven() {
    let server = MockServer::start().await;
    let post_id = PostId::new("5").unwrap();
    Mock::given(method("GET"))
        .and(path(content_path(&post_id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(POST_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/board/qna/content/5/delete"))
        .respond_with(ResponseTemplate::new(200).set_body_string("deleted"))
        .expect(1)
        .mount(&server)
        .await;

    let window = Arc::new(ScriptedWindow::accepting());
    let page = page_at(&server, "", &window);
    assert!(page.read(|doc| doc.is_empty()));

    page.load(&content_path(&post_id)).await.unwrap();
    assert_eq!(QnaController::new(post_id, "/qna").attach(&page), 7);

    let dispatch = page.click(ids::DELETE_BUTTON).await;
    assert_eq!(dispatch.outcome(), Some(ActionOutcome::Succeeded));
}

#[tokio::test]
async fn test_failed_page_load_keeps_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/board/qna/content/404"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such post"))
        .mount(&server)
        .await;

    let window = Arc::new(ScriptedWindow::accepting());
    let page = page_at(&server, POST_PAGE, &window);
    let post_id = PostId::new("404").unwrap();

    let err = page.load(&content_path(&post_id)).await.unwrap_err();
    assert!(matches!(err, qna_board_client::Error::Api { status: 404, .. }));
    assert!(page.read(|doc| doc.contains(ids::EDIT_BUTTON)));

    let client = page.client().qna();
    assert!(client.page(&post_id).await.is_err());
}
