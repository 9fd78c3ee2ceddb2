// API client module: a small blocking HTTP client that talks to the image
// API. Requests are built and sent exactly once; responses are returned as
// raw bytes and never inspected beyond the status line.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::{Client, Request};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::path::Path;
use url::Url;

/// Form body for `POST /image`.
///
/// Field order is the order the server sees on the wire. Exactly one of
/// `image_id` (resize an image the server already has) or `image` (base64
/// payload of a new image) must be set.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateImage {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub height: u32,
    pub width: u32,
}

impl CreateImage {
    /// Resize request for an image already stored under `image_id`.
    pub fn from_image_id(user_id: &str, image_id: &str, height: u32, width: u32) -> Self {
        CreateImage {
            user_id: user_id.to_string(),
            image_id: Some(image_id.to_string()),
            image: None,
            height,
            width,
        }
    }

    /// Upload request carrying the raw image bytes, base64-encoded.
    pub fn from_image_bytes(user_id: &str, bytes: &[u8], height: u32, width: u32) -> Self {
        use base64::Engine;
        CreateImage {
            user_id: user_id.to_string(),
            image_id: None,
            image: Some(base64::engine::general_purpose::STANDARD.encode(bytes)),
            height,
            width,
        }
    }

    /// Upload request for the image file at `path`.
    pub fn from_file(user_id: &str, path: &Path, height: u32, width: u32) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::from_image_bytes(user_id, &bytes, height, width))
    }

    fn check(&self) -> Result<()> {
        match (&self.image_id, &self.image) {
            (None, None) => bail!("create needs either an image id or an image payload"),
            (Some(_), Some(_)) => bail!("create takes an image id or an image payload, not both"),
            _ => Ok(()),
        }
    }
}

/// Form body for `DELETE /image`.
///
/// Without `image_id` the whole user is targeted; `subimage_id` narrows a
/// delete to one resize and requires `image_id`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DeleteImage {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subimage_id: Option<String>,
}

impl DeleteImage {
    pub fn image(user_id: &str, image_id: &str) -> Self {
        DeleteImage {
            user_id: user_id.to_string(),
            image_id: Some(image_id.to_string()),
            subimage_id: None,
        }
    }

    fn check(&self) -> Result<()> {
        if self.image_id.is_none() && self.subimage_id.is_some() {
            bail!("subimage id requires an image id");
        }
        Ok(())
    }
}

/// Target of a `GET /image/...` request. Each identifier becomes exactly one
/// path segment (`/`, `?`, `#` and `%` are percent-encoded) and the trailing
/// slash is always kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePath {
    User(String),
    Image(String, String),
    Subimage(String, String, String),
}

impl ImagePath {
    /// Pick the narrowest target the given identifiers allow.
    pub fn from_parts(
        user_id: &str,
        image_id: Option<&str>,
        subimage_id: Option<&str>,
    ) -> Result<Self> {
        match (image_id, subimage_id) {
            (None, None) => Ok(ImagePath::User(user_id.to_string())),
            (Some(image), None) => Ok(ImagePath::Image(user_id.to_string(), image.to_string())),
            (Some(image), Some(sub)) => Ok(ImagePath::Subimage(
                user_id.to_string(),
                image.to_string(),
                sub.to_string(),
            )),
            (None, Some(_)) => bail!("subimage id requires an image id"),
        }
    }

    /// Path segments below the base URL, starting with `image`.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            ImagePath::User(user) => vec!["image", user],
            ImagePath::Image(user, image) => vec!["image", user, image],
            ImagePath::Subimage(user, image, sub) => vec!["image", user, image, sub],
        }
    }
}

/// Status and raw body of a completed request.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Body rendered as text; invalid UTF-8 is replaced rather than rejected.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Write the raw body to `path`, byte for byte.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.body)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Blocking client bound to one base URL. No timeout is configured and
/// nothing is ever retried.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:3000`).
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(None)
            .build()
            .context("Failed to build HTTP client")?;
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid base URL '{}'", base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("Base URL '{}' cannot carry a path", base_url);
        }
        Ok(ApiClient { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Append `segments` to the base path. Query and fragment of the base
    /// stay where they are.
    fn endpoint(&self, segments: &[&str], trailing_slash: bool) -> Result<Url> {
        // dot segments are dropped or collapsed by URL parsing, empty ones
        // would merge with their neighbours
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            bail!("'{}' cannot be sent as a path segment", bad);
        }
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| anyhow!("Base URL '{}' cannot carry a path", self.base_url))?;
            path.pop_if_empty().extend(segments);
            if trailing_slash {
                path.push("");
            }
        }
        Ok(url)
    }

    /// Build the `POST /image` request without sending it.
    pub fn build_create(&self, req: &CreateImage) -> Result<Request> {
        req.check()?;
        self.client
            .post(self.endpoint(&["image"], false)?)
            .form(req)
            .build()
            .context("Failed to build create request")
    }

    /// Build the `DELETE /image` request without sending it.
    pub fn build_delete(&self, req: &DeleteImage) -> Result<Request> {
        req.check()?;
        self.client
            .request(Method::DELETE, self.endpoint(&["image"], false)?)
            .form(req)
            .build()
            .context("Failed to build delete request")
    }

    /// Build the `GET /image/...` request without sending it.
    pub fn build_get(&self, target: &ImagePath) -> Result<Request> {
        self.client
            .get(self.endpoint(&target.segments(), true)?)
            .build()
            .context("Failed to build get request")
    }

    pub fn create(&self, req: &CreateImage) -> Result<ApiResponse> {
        let request = self.build_create(req)?;
        self.execute("Create", request)
    }

    pub fn delete(&self, req: &DeleteImage) -> Result<ApiResponse> {
        let request = self.build_delete(req)?;
        self.execute("Delete", request)
    }

    pub fn get(&self, target: &ImagePath) -> Result<ApiResponse> {
        let request = self.build_get(target)?;
        self.execute("Get", request)
    }

    /// Send once and read the whole body. A non-success status becomes an
    /// error carrying the body text.
    fn execute(&self, op: &str, request: Request) -> Result<ApiResponse> {
        tracing::info!(
            method = %request.method(),
            url = %request.url(),
            "sending {} request",
            op.to_lowercase()
        );
        let res = self
            .client
            .execute(request)
            .with_context(|| format!("Failed to send {} request", op.to_lowercase()))?;
        let status = res.status();
        let body = res
            .bytes()
            .with_context(|| format!("Failed to read {} response body", op.to_lowercase()))?
            .to_vec();
        tracing::debug!(
            status = status.as_u16(),
            bytes = body.len(),
            "{} response received",
            op.to_lowercase()
        );

        let response = ApiResponse { status, body };
        if !status.is_success() {
            bail!("{} failed: {} - {}", op, status, response.text());
        }
        Ok(response)
    }
}
