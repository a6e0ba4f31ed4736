use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::attributes::AttributeSet;
use crate::color::ColorPicker;
use crate::config::{AvatarConfig, BadgeShape, ImageShape};
use crate::initials;
use crate::loader::{
    AvatarImage, Completion, ImageLoader, LoadError, LoadRequest, RequestToken, Responder,
    Transform,
};
use crate::surface::{
    Background, BackgroundShape, HeadlessImageSurface, HeadlessTextSurface, ImageSurface,
    TextStyle, TextSurface,
};

/// Where the view is in its load cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No `set_avatar` yet: empty image surface visible, text hidden
    Idle,
    /// Waiting for the outcome of the request with this token
    Loading(RequestToken),
    ImageShown,
    FallbackShown,
}

impl LoadState {
    pub fn is_loading(self) -> bool {
        matches!(self, Self::Loading(_))
    }
}

/// Avatar widget: an image surface with an initials badge stacked on top.
///
/// All mutation goes through `&mut self`, so the thread that owns the view
/// plays the role of the UI thread. Loaders post their outcomes into the
/// view's completion queue, and the owner applies them with
/// [`AvatarView::process_pending`] or [`AvatarView::wait_for_outcome`].
#[derive(Debug)]
pub struct AvatarView<L, I = HeadlessImageSurface, T = HeadlessTextSurface> {
    config: AvatarConfig,
    loader: L,
    image: I,
    text: T,
    colors: ColorPicker,
    url: Option<String>,
    name: Option<String>,
    state: LoadState,
    token: RequestToken,
    completions_tx: UnboundedSender<Completion>,
    completions_rx: UnboundedReceiver<Completion>,
}

impl<L: ImageLoader> AvatarView<L> {
    /// View backed by in-memory surfaces
    pub fn headless(config: AvatarConfig, loader: L) -> Self {
        Self::new(
            config,
            loader,
            HeadlessImageSurface::default(),
            HeadlessTextSurface::default(),
        )
    }
}

impl<L, I, T> AvatarView<L, I, T> {
    pub fn config(&self) -> &AvatarConfig {
        &self.config
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Token of the most recent `set_avatar` call
    pub fn current_token(&self) -> RequestToken {
        self.token
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn image_surface(&self) -> &I {
        &self.image
    }

    pub fn text_surface(&self) -> &T {
        &self.text
    }
}

impl<L, I, T> AvatarView<L, I, T>
where
    L: ImageLoader,
    I: ImageSurface,
    T: TextSurface,
{
    pub fn new(config: AvatarConfig, loader: L, mut image: I, mut text: T) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        text.set_style(&TextStyle {
            size: config.text_size,
            color: config.text_color,
            font: config.font.clone(),
        });
        text.set_visible(false);
        image.set_content(None);
        image.set_visible(true);

        Self {
            colors: ColorPicker::new(config.color_mode),
            config,
            loader,
            image,
            text,
            url: None,
            name: None,
            state: LoadState::Idle,
            token: RequestToken::default(),
            completions_tx,
            completions_rx,
        }
    }

    pub fn from_attributes(attributes: &AttributeSet, loader: L, image: I, text: T) -> Self {
        Self::new(attributes.to_config(), loader, image, text)
    }

    /// Replace the badge color source
    pub fn with_color_picker(mut self, colors: ColorPicker) -> Self {
        self.colors = colors;
        self
    }

    /// Show the avatar at `url`, or the initials of `name` if it can't be
    /// loaded. Supersedes any request still in flight.
    pub fn set_avatar(&mut self, url: Option<&str>, name: Option<&str>) -> RequestToken {
        let token = self.token.next();
        self.token = token;
        self.url = url.map(str::to_string);
        self.name = name.map(str::to_string);
        self.state = LoadState::Loading(token);

        self.text.set_visible(false);
        self.image.set_content(None);
        self.image.set_visible(true);

        match url.map(str::trim).filter(|url| !url.is_empty()) {
            Some(url) => {
                let request = LoadRequest {
                    url: url.to_string(),
                    cache_policy: self.config.cache_policy,
                    transform: self.transform(),
                };
                debug!(%token, url = %request.url, transform = ?request.transform, "Loading avatar");
                self.loader
                    .load(request, Responder::new(token, self.completions_tx.clone()));
            }
            None => {
                self.apply(Completion {
                    token,
                    outcome: Err(LoadError::EmptyUrl),
                });
            }
        }

        token
    }

    /// Apply one loader outcome. Returns false if it belonged to a
    /// superseded request and was dropped.
    pub fn apply(&mut self, completion: Completion) -> bool {
        if self.state != LoadState::Loading(completion.token) {
            debug!(
                token = %completion.token,
                current = %self.token,
                "Discarding outcome of superseded request"
            );
            return false;
        }

        match completion.outcome {
            Ok(image) => self.show_image(image),
            Err(error) => {
                debug!(token = %completion.token, %error, "Avatar image unavailable, showing initials");
                self.show_fallback();
            }
        }

        true
    }

    /// Apply every outcome that has been posted so far without waiting.
    /// Returns how many changed the view.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            if self.apply(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait until the current request has settled and return the new state.
    /// Returns right away when nothing is loading.
    pub async fn wait_for_outcome(&mut self) -> LoadState {
        while self.state.is_loading() {
            // The view keeps a sender, so the channel never closes under us
            let Some(completion) = self.completions_rx.recv().await else {
                break;
            };
            self.apply(completion);
        }
        self.state
    }

    fn transform(&self) -> Option<Transform> {
        match self.config.shape {
            ImageShape::Rect => None,
            ImageShape::Circle => Some(Transform::CircleCrop),
            ImageShape::Rounded => Some(Transform::RoundedCorners {
                radius: self.config.corner_radius,
                margin: self.config.corner_margin,
            }),
        }
    }

    fn badge_background_shape(&self) -> BackgroundShape {
        match (self.config.badge_shape, self.config.shape) {
            (BadgeShape::Circle, _) | (BadgeShape::MatchImage, ImageShape::Circle) => {
                BackgroundShape::Oval
            }
            (BadgeShape::MatchImage, ImageShape::Rect) => BackgroundShape::Rectangle,
            (BadgeShape::MatchImage, ImageShape::Rounded) => BackgroundShape::RoundedRectangle {
                radius: self.config.corner_radius,
            },
        }
    }

    fn show_image(&mut self, image: AvatarImage) {
        self.image.set_content(Some(image));
        self.image.set_visible(true);
        self.text.set_visible(false);
        self.state = LoadState::ImageShown;
    }

    fn show_fallback(&mut self) {
        let name = self.name.as_deref().unwrap_or("");
        let label = initials::derive(name);
        let background = Background {
            color: self.colors.pick(self.name.as_deref()),
            shape: self.badge_background_shape(),
        };

        self.image.set_visible(false);
        self.text.set_text(&label);
        self.text.set_background(background);
        self.text.set_visible(true);
        self.state = LoadState::FallbackShown;
    }
}
