use serde::{Deserialize, Serialize};

use crate::color::Rgb;

pub const DEFAULT_CORNER_RADIUS: u32 = 40;
pub const DEFAULT_CORNER_MARGIN: u32 = 0;
pub const DEFAULT_TEXT_SIZE: f32 = 20.0;

/// How the loaded image is drawn on the image surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ImageShape {
    #[default]
    Rect,
    Circle,
    Rounded,
}

impl ImageShape {
    /// Maps the integer used by the `image_shape` attribute
    pub fn from_attribute(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Rect),
            1 => Some(Self::Circle),
            2 => Some(Self::Rounded),
            _ => None,
        }
    }
}

/// Shape of the initials badge background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BadgeShape {
    /// Always an oval, regardless of the image shape
    #[default]
    Circle,
    /// Follow the configured [`ImageShape`]
    MatchImage,
}

impl BadgeShape {
    pub fn from_attribute(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Circle),
            1 => Some(Self::MatchImage),
            _ => None,
        }
    }
}

/// Whether the loader may serve the image from its memory or disk caches.
///
/// Avatars can change server side without the URL changing, so the default
/// is a fresh fetch for every `set_avatar`. Callers that want caching should
/// put a content hash in the URL and opt in with [`CachePolicy::Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CachePolicy {
    #[default]
    Bypass,
    Default,
}

impl CachePolicy {
    pub fn from_attribute(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Bypass),
            1 => Some(Self::Default),
            _ => None,
        }
    }

    pub fn bypasses_cache(self) -> bool {
        matches!(self, Self::Bypass)
    }
}

/// How the badge background color is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorMode {
    /// Same name, same color
    #[default]
    Deterministic,
    /// A fresh palette color every time the badge is shown
    Random,
}

impl ColorMode {
    pub fn from_attribute(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Deterministic),
            1 => Some(Self::Random),
            _ => None,
        }
    }
}

/// Late-bound font resource. The widget only passes it through to the text
/// surface, which is responsible for resolving it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontHandle(String);

impl FontHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Construction-time configuration, read-only once the view exists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarConfig {
    pub shape: ImageShape,
    /// Corner radius in device-independent pixels, used only for [`ImageShape::Rounded`]
    pub corner_radius: u32,
    /// Inset applied by the rounded-corner transform
    pub corner_margin: u32,
    /// Initials font size in scaled pixels
    pub text_size: f32,
    pub font: Option<FontHandle>,
    pub text_color: Rgb,
    pub badge_shape: BadgeShape,
    pub cache_policy: CachePolicy,
    pub color_mode: ColorMode,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            shape: ImageShape::default(),
            corner_radius: DEFAULT_CORNER_RADIUS,
            corner_margin: DEFAULT_CORNER_MARGIN,
            text_size: DEFAULT_TEXT_SIZE,
            font: None,
            text_color: Rgb::WHITE,
            badge_shape: BadgeShape::default(),
            cache_policy: CachePolicy::default(),
            color_mode: ColorMode::default(),
        }
    }
}

impl AvatarConfig {
    pub fn shape(mut self, shape: ImageShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn rounded(mut self, radius: u32, margin: u32) -> Self {
        self.shape = ImageShape::Rounded;
        self.corner_radius = radius;
        self.corner_margin = margin;
        self
    }

    pub fn text_size(mut self, size: f32) -> Self {
        if size.is_finite() && size > 0.0 {
            self.text_size = size;
        }
        self
    }

    pub fn font(mut self, font: FontHandle) -> Self {
        self.font = Some(font);
        self
    }

    pub fn badge_shape(mut self, badge_shape: BadgeShape) -> Self {
        self.badge_shape = badge_shape;
        self
    }

    pub fn cache_policy(mut self, cache_policy: CachePolicy) -> Self {
        self.cache_policy = cache_policy;
        self
    }

    pub fn color_mode(mut self, color_mode: ColorMode) -> Self {
        self.color_mode = color_mode;
        self
    }
}
