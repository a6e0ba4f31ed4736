use maud::{html, Markup, Render};

use crate::surface::{BackgroundShape, HeadlessImageSurface, HeadlessTextSurface};
use crate::view::AvatarView;

fn border_radius(shape: BackgroundShape) -> String {
    match shape {
        BackgroundShape::Oval => "50%".to_string(),
        BackgroundShape::Rectangle => "0".to_string(),
        BackgroundShape::RoundedRectangle { radius } => format!("{radius}px"),
    }
}

/// Single-quoted CSS string; quotes and backslashes are escaped and control
/// characters dropped so the value can't end the declaration early
fn css_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars().filter(|c| !c.is_control()) {
        if matches!(c, '\'' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

impl<L> Render for AvatarView<L, HeadlessImageSurface, HeadlessTextSurface> {
    fn render(&self) -> Markup {
        let image = self.image_surface();
        let text = self.text_surface();
        let alt = self.name().unwrap_or("avatar");

        let badge_style = {
            let mut style = String::from(
                "display:flex;align-items:center;justify-content:center;width:100%;height:100%;",
            );
            if let Some(background) = text.background() {
                style.push_str(&format!(
                    "background-color:{};border-radius:{};",
                    background.color,
                    border_radius(background.shape)
                ));
            }
            if let Some(text_style) = text.style() {
                style.push_str(&format!(
                    "color:{};font-size:{}px;",
                    text_style.color, text_style.size
                ));
                if let Some(font) = &text_style.font {
                    style.push_str(&format!("font-family:{};", css_string(font.name())));
                }
            }
            style
        };

        html! {
            div class="avatar" {
                @if image.is_visible() {
                    @match image.content().map(|content| content.to_data_url()) {
                        Some(Ok(src)) => {
                            img class="avatar-image" src=(src) alt=(alt) {}
                        },
                        _ => {
                            div class="avatar-image avatar-empty" {}
                        },
                    }
                }
                @if text.is_visible() {
                    div class="avatar-badge" style=(badge_style) { (text.text()) }
                }
            }
        }
    }
}
