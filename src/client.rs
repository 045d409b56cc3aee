//! HTTP client for the board's endpoints.

use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::{
    error::{Error, Result},
    types::{BadgeCounts, FormData, PostId},
};

/// HTTP client for the board application.
///
/// # Example
///
/// ```rust,no_run
/// use qna_board_client::Client;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new("http://localhost:8000")?;
///
/// let counts = client.chrome().message_count().await?;
/// println!("{} unread messages", counts.message_count);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the server (e.g., "http://localhost:8000")
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a new client with a custom reqwest client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self { base_url, http })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the Q&A post endpoints.
    pub fn qna(&self) -> QnaApi<'_> {
        QnaApi { client: self }
    }

    /// Access the shared chrome endpoints.
    pub fn chrome(&self) -> ChromeApi<'_> {
        ChromeApi { client: self }
    }

    /// `GET path` and return the body as text.
    pub async fn get_text(&self, path: &str) -> Result<String> {
        let response = self.http.get(self.url(path)?).send().await?;
        Self::handle_text(response).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            Err(Error::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let response = Self::error_for_status(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn handle_text(response: reqwest::Response) -> Result<String> {
        let response = Self::error_for_status(response).await?;
        Ok(response.text().await?)
    }
}

// =============================================================================
// Q&A API
// =============================================================================

/// Path of the server-rendered page for `id`.
pub fn content_path(id: &PostId) -> String {
    format!("/board/qna/content/{id}")
}

/// Q&A post endpoints under `/board/qna/content/{id}`.
#[derive(Debug)]
pub struct QnaApi<'a> {
    client: &'a Client,
}

impl QnaApi<'_> {
    /// Fetch the server-rendered post page.
    pub async fn page(&self, id: &PostId) -> Result<String> {
        self.client.get_text(&content_path(id)).await
    }

    /// Submit an edit of the post. The JSON body is returned but callers
    /// only need it to parse.
    pub async fn edit(&self, id: &PostId, form: FormData) -> Result<serde_json::Value> {
        let response = self
            .client
            .http
            .put(self.client.url(&format!("/board/qna/content/{id}/edit"))?)
            .multipart(form.into_multipart().await?)
            .send()
            .await?;
        Client::handle_response(response).await
    }

    /// Delete the post.
    pub async fn delete(&self, id: &PostId) -> Result<String> {
        let response = self
            .client
            .http
            .delete(self.client.url(&format!("/board/qna/content/{id}/delete"))?)
            .send()
            .await?;
        Client::handle_text(response).await
    }

    /// Submit or update the admin reply on a post.
    pub async fn reply(&self, id: &PostId, form: FormData) -> Result<serde_json::Value> {
        let response = self
            .client
            .http
            .put(self.client.url(&format!("/board/qna/content/{id}/reply"))?)
            .multipart(form.into_multipart().await?)
            .send()
            .await?;
        Client::handle_response(response).await
    }
}

// =============================================================================
// Chrome API
// =============================================================================

/// Endpoints behind the sidebar, topbar and user badges.
#[derive(Debug)]
pub struct ChromeApi<'a> {
    client: &'a Client,
}

impl ChromeApi<'_> {
    /// Fetch an HTML fragment such as `/sidebar` or `/topbar`.
    pub async fn fragment(&self, path: &str) -> Result<String> {
        self.client.get_text(path).await
    }

    /// End the session. A failed logout comes back as [`Error::Api`] with the
    /// raw body, which usually holds a JSON `message`.
    pub async fn logout(&self) -> Result<()> {
        let response = self
            .client
            .http
            .post(self.client.url("/auth/logout")?)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        Client::error_for_status(response).await?;
        Ok(())
    }

    /// Fetch the unread message and alert counts.
    pub async fn message_count(&self) -> Result<BadgeCounts> {
        let response = self
            .client
            .http
            .get(self.client.url("/users/message_count")?)
            .send()
            .await?;
        Client::handle_response(response).await
    }
}
