//! An avatar widget that shows a remote image in one of three shapes and
//! falls back to a colored initials badge when the image can't be loaded.
//!
//! The widget itself never touches the network. It talks to an
//! [`ImageLoader`] and mutates two surfaces, one for the image and one for the
//! badge text.

pub mod attributes;
pub mod color;
pub mod config;
pub mod http;
pub mod initials;
pub mod loader;
pub mod render;
pub mod surface;
pub mod telemetry;
pub mod transform;
pub mod view;

pub use attributes::{AttributeError, AttributeSet};
pub use color::{ColorPicker, Rgb, PALETTE};
pub use config::{AvatarConfig, BadgeShape, CachePolicy, ColorMode, FontHandle, ImageShape};
pub use http::HttpLoader;
pub use loader::{
    AvatarImage, Completion, ImageLoader, LoadError, LoadOutcome, LoadRequest, RequestToken,
    Responder, Transform,
};
pub use surface::{
    Background, BackgroundShape, HeadlessImageSurface, HeadlessTextSurface, ImageSurface,
    TextStyle, TextSurface,
};
pub use view::{AvatarView, LoadState};
