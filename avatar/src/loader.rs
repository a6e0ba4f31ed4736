use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

use base64::Engine as _;
use image::{ImageFormat, RgbaImage};
use tokio::sync::mpsc::UnboundedSender;

use crate::config::CachePolicy;

/// Identifies one `set_avatar` call on one view. Tokens only ever grow, so a
/// completion whose token isn't the view's latest belongs to a superseded
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Geometric transform the loader applies to the decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    CircleCrop,
    RoundedCorners { radius: u32, margin: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub url: String,
    pub cache_policy: CachePolicy,
    pub transform: Option<Transform>,
}

/// A decoded (and already shaped) image ready for the image surface
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarImage {
    url: String,
    pixels: Arc<RgbaImage>,
}

impl AvatarImage {
    pub fn new(url: impl Into<String>, pixels: RgbaImage) -> Self {
        Self {
            url: url.into(),
            pixels: Arc::new(pixels),
        }
    }

    /// URL the image was fetched from
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut buffer = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
        Ok(buffer)
    }

    pub fn to_data_url(&self) -> Result<String, image::ImageError> {
        let png = self.to_png()?;
        Ok(format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(png)
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("no image url")]
    EmptyUrl,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("loader dropped the request without answering")]
    Abandoned,
}

pub type LoadOutcome = Result<AvatarImage, LoadError>;

/// A loader's answer to one request, posted back to the owning view
#[derive(Debug)]
pub struct Completion {
    pub token: RequestToken,
    pub outcome: LoadOutcome,
}

/// One-shot reply handle for a load request.
///
/// Answering consumes the responder, and dropping it unanswered reports
/// [`LoadError::Abandoned`], so every request gets exactly one outcome.
#[derive(Debug)]
pub struct Responder {
    token: RequestToken,
    tx: Option<UnboundedSender<Completion>>,
}

impl Responder {
    pub fn new(token: RequestToken, tx: UnboundedSender<Completion>) -> Self {
        Self { token, tx: Some(tx) }
    }

    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn succeed(mut self, image: AvatarImage) {
        self.send(Ok(image));
    }

    pub fn fail(mut self, error: LoadError) {
        self.send(Err(error));
    }

    pub fn respond(mut self, outcome: LoadOutcome) {
        self.send(outcome);
    }

    fn send(&mut self, outcome: LoadOutcome) {
        if let Some(tx) = self.tx.take() {
            // The view is gone; nobody is left to show the outcome
            let _ = tx.send(Completion {
                token: self.token,
                outcome,
            });
        }
    }
}

impl Drop for Responder {
    fn drop(&mut self) {
        self.send(Err(LoadError::Abandoned));
    }
}

/// The host image loader.
///
/// Implementations fetch, decode and shape the image however they like (on
/// background threads if they want) and answer through the [`Responder`].
pub trait ImageLoader {
    fn load(&self, request: LoadRequest, responder: Responder);
}

impl<L: ImageLoader + ?Sized> ImageLoader for Arc<L> {
    fn load(&self, request: LoadRequest, responder: Responder) {
        (**self).load(request, responder)
    }
}

impl<L: ImageLoader + ?Sized> ImageLoader for Box<L> {
    fn load(&self, request: LoadRequest, responder: Responder) {
        (**self).load(request, responder)
    }
}
