use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::{
    AvatarConfig, BadgeShape, CachePolicy, ColorMode, FontHandle, ImageShape,
    DEFAULT_CORNER_MARGIN, DEFAULT_CORNER_RADIUS, DEFAULT_TEXT_SIZE,
};

pub const IMAGE_SHAPE: &str = "image_shape";
pub const IMAGE_RADIUS: &str = "image_radius";
pub const IMAGE_MARGIN: &str = "image_margin";
pub const TEXT_SIZE: &str = "text_size";
pub const FONT_FAMILY: &str = "font_family";
pub const BADGE_SHAPE: &str = "badge_shape";
pub const CACHE_POLICY: &str = "cache_policy";
pub const COLOR_MODE: &str = "color_mode";

#[derive(Debug, thiserror::Error)]
pub enum AttributeError {
    #[error("attribute document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("attribute document must be a JSON object")]
    NotAnObject,
    #[error("failed to read attribute file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Declarative attributes the host hands over when it inflates an avatar.
///
/// Reading never fails: unknown keys are ignored and values of the wrong
/// type or outside their domain fall back to the default for that key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet(BTreeMap<String, Value>);

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn from_json(json: &str) -> Result<Self, AttributeError> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(map) => Ok(Self(map.into_iter().collect())),
            _ => Err(AttributeError::NotAnObject),
        }
    }

    pub fn load(path: &Path) -> Result<Self, AttributeError> {
        let json = std::fs::read_to_string(path).map_err(|source| AttributeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Build the widget configuration these attributes describe
    pub fn to_config(&self) -> AvatarConfig {
        let defaults = AvatarConfig::default();

        AvatarConfig {
            shape: self.enumerated(IMAGE_SHAPE, ImageShape::from_attribute, defaults.shape),
            corner_radius: self.non_negative(IMAGE_RADIUS, DEFAULT_CORNER_RADIUS),
            corner_margin: self.non_negative(IMAGE_MARGIN, DEFAULT_CORNER_MARGIN),
            text_size: self.positive_float(TEXT_SIZE, DEFAULT_TEXT_SIZE),
            font: self.font(),
            text_color: defaults.text_color,
            badge_shape: self.enumerated(
                BADGE_SHAPE,
                BadgeShape::from_attribute,
                defaults.badge_shape,
            ),
            cache_policy: self.enumerated(
                CACHE_POLICY,
                CachePolicy::from_attribute,
                defaults.cache_policy,
            ),
            color_mode: self.enumerated(COLOR_MODE, ColorMode::from_attribute, defaults.color_mode),
        }
    }

    fn enumerated<T>(&self, key: &str, parse: fn(i64) -> Option<T>, default: T) -> T {
        let Some(value) = self.0.get(key) else {
            return default;
        };

        match integer(value).and_then(parse) {
            Some(parsed) => parsed,
            None => {
                debug!(attribute = key, %value, "Unsupported attribute value, using default");
                default
            }
        }
    }

    fn non_negative(&self, key: &str, default: u32) -> u32 {
        let Some(value) = self.0.get(key) else {
            return default;
        };

        match integer(value).and_then(|n| u32::try_from(n).ok()) {
            Some(n) => n,
            None => {
                debug!(attribute = key, %value, "Attribute out of range, using default");
                default
            }
        }
    }

    fn positive_float(&self, key: &str, default: f32) -> f32 {
        let Some(value) = self.0.get(key) else {
            return default;
        };

        match value.as_f64().map(|n| n as f32) {
            Some(n) if n.is_finite() && n > 0.0 => n,
            _ => {
                debug!(attribute = key, %value, "Attribute out of range, using default");
                default
            }
        }
    }

    fn font(&self) -> Option<FontHandle> {
        let value = self.0.get(FONT_FAMILY)?;

        match value.as_str().map(str::trim) {
            Some(name) if !name.is_empty() => Some(FontHandle::new(name)),
            _ => {
                debug!(attribute = FONT_FAMILY, %value, "Ignoring font attribute");
                None
            }
        }
    }
}

/// Integers, also when written as a float with no fractional part (`16.0`)
fn integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let n = value.as_f64()?;
    let whole = n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64;
    whole.then_some(n as i64)
}

impl From<&AttributeSet> for AvatarConfig {
    fn from(attributes: &AttributeSet) -> Self {
        attributes.to_config()
    }
}
