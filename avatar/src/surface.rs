use crate::color::Rgb;
use crate::config::FontHandle;
use crate::loader::AvatarImage;

/// Geometry of the badge background
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundShape {
    Oval,
    Rectangle,
    RoundedRectangle { radius: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background {
    pub color: Rgb,
    pub shape: BackgroundShape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Rgb,
    pub font: Option<FontHandle>,
}

/// The surface that shows the loaded image
pub trait ImageSurface {
    fn set_visible(&mut self, visible: bool);
    fn set_content(&mut self, image: Option<AvatarImage>);
}

/// The surface that shows the initials badge
pub trait TextSurface {
    fn set_visible(&mut self, visible: bool);
    fn set_text(&mut self, text: &str);
    fn set_style(&mut self, style: &TextStyle);
    fn set_background(&mut self, background: Background);
}

/// In-memory image surface. Keeps whatever the view last told it.
#[derive(Debug, Clone, Default)]
pub struct HeadlessImageSurface {
    visible: bool,
    content: Option<AvatarImage>,
}

impl HeadlessImageSurface {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn content(&self) -> Option<&AvatarImage> {
        self.content.as_ref()
    }
}

impl ImageSurface for HeadlessImageSurface {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_content(&mut self, image: Option<AvatarImage>) {
        self.content = image;
    }
}

/// In-memory text surface
#[derive(Debug, Clone, Default)]
pub struct HeadlessTextSurface {
    visible: bool,
    text: String,
    style: Option<TextStyle>,
    background: Option<Background>,
}

impl HeadlessTextSurface {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> Option<&TextStyle> {
        self.style.as_ref()
    }

    pub fn background(&self) -> Option<Background> {
        self.background
    }
}

impl TextSurface for HeadlessTextSurface {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }

    fn set_style(&mut self, style: &TextStyle) {
        self.style = Some(style.clone());
    }

    fn set_background(&mut self, background: Background) {
        self.background = Some(background);
    }
}
