use std::cell::RefCell;
use std::rc::Rc;

use avatar_view::color::PALETTE;
use avatar_view::initials::derive;
use avatar_view::{
    AttributeSet, AvatarConfig, AvatarImage, AvatarView, BackgroundShape, CachePolicy,
    ImageLoader, ImageShape, LoadError, LoadRequest, LoadState, Responder, Transform,
};
use image::RgbaImage;

/// Succeeds right away for `https://ok/...`, fails right away for
/// `https://bad...`, and parks everything else until the test resolves it.
#[derive(Clone, Default)]
struct ScriptedLoader {
    seen: Rc<RefCell<Vec<LoadRequest>>>,
    parked: Rc<RefCell<Vec<(String, Responder)>>>,
}

impl ScriptedLoader {
    fn seen(&self) -> Vec<LoadRequest> {
        self.seen.borrow().clone()
    }

    fn resolve(&self, url: &str, succeed: bool) {
        let responder = {
            let mut parked = self.parked.borrow_mut();
            let index = parked
                .iter()
                .position(|(parked_url, _)| parked_url == url)
                .expect("request was not parked");
            parked.remove(index).1
        };

        if succeed {
            responder.succeed(decoded(url));
        } else {
            responder.fail(LoadError::Transport("connection reset".to_string()));
        }
    }
}

impl ImageLoader for ScriptedLoader {
    fn load(&self, request: LoadRequest, responder: Responder) {
        self.seen.borrow_mut().push(request.clone());

        if request.url.starts_with("https://ok/") {
            responder.succeed(decoded(&request.url));
        } else if request.url.starts_with("https://bad") {
            responder.fail(LoadError::Status(404));
        } else {
            self.parked.borrow_mut().push((request.url, responder));
        }
    }
}

fn decoded(url: &str) -> AvatarImage {
    AvatarImage::new(url, RgbaImage::new(8, 8))
}

fn view_with(attributes: AttributeSet) -> (AvatarView<ScriptedLoader>, ScriptedLoader) {
    let loader = ScriptedLoader::default();
    let view = AvatarView::from_attributes(
        &attributes,
        loader.clone(),
        Default::default(),
        Default::default(),
    );
    (view, loader)
}

fn assert_settled(view: &AvatarView<ScriptedLoader>) {
    let image = view.image_surface().is_visible();
    let text = view.text_surface().is_visible();
    assert!(image != text, "image visible: {image}, text visible: {text}");

    if text {
        assert_eq!(
            view.text_surface().text(),
            derive(view.name().unwrap_or(""))
        );
    }
}

#[test]
fn test_rect_success_shows_image() {
    let (mut view, loader) = view_with(AttributeSet::new().with("image_shape", 0));

    view.set_avatar(Some("https://ok/a.png"), Some("Ada"));
    view.process_pending();

    assert_eq!(view.state(), LoadState::ImageShown);
    assert_eq!(
        view.image_surface().content(),
        Some(&decoded("https://ok/a.png"))
    );
    assert!(!view.text_surface().is_visible());
    assert_eq!(loader.seen()[0].transform, None);
    assert_settled(&view);
}

#[test]
fn test_circle_failure_shows_initials() {
    let (mut view, loader) = view_with(AttributeSet::new().with("image_shape", 1));

    view.set_avatar(Some("https://bad/x.png"), Some("Jane Doe"));
    view.process_pending();

    assert_eq!(loader.seen()[0].transform, Some(Transform::CircleCrop));
    assert_eq!(view.state(), LoadState::FallbackShown);
    assert!(!view.image_surface().is_visible());
    assert_eq!(view.text_surface().text(), "JD");

    let background = view.text_surface().background().unwrap();
    assert!(PALETTE.contains(&background.color));
    assert_eq!(background.shape, BackgroundShape::Oval);
    assert_settled(&view);
}

#[test]
fn test_rounded_passes_radius_and_margin() {
    let (mut view, loader) = view_with(
        AttributeSet::new()
            .with("image_shape", 2)
            .with("image_radius", 16)
            .with("image_margin", 4),
    );

    assert_eq!(view.config().shape, ImageShape::Rounded);
    assert_eq!(view.config().corner_radius, 16);
    assert_eq!(view.config().corner_margin, 4);

    view.set_avatar(Some("https://ok/b.png"), Some("Bea"));
    view.process_pending();

    let request = &loader.seen()[0];
    assert_eq!(
        request.transform,
        Some(Transform::RoundedCorners {
            radius: 16,
            margin: 4
        })
    );
    assert_eq!(request.cache_policy, CachePolicy::Bypass);
    assert_eq!(view.state(), LoadState::ImageShown);
    assert_settled(&view);
}

#[test]
fn test_missing_url_shows_initials() {
    let (mut view, loader) = view_with(AttributeSet::new());

    view.set_avatar(None, Some("kip"));

    assert!(loader.seen().is_empty());
    assert_eq!(view.state(), LoadState::FallbackShown);
    assert_eq!(view.text_surface().text(), "K");
    assert!(!view.image_surface().is_visible());
    assert_settled(&view);
}

#[test]
fn test_last_call_wins() {
    let (mut view, loader) = view_with(AttributeSet::new());

    view.set_avatar(Some("slow"), Some("Alpha"));
    view.set_avatar(Some("fast"), Some("Beta"));

    loader.resolve("fast", true);
    view.process_pending();
    loader.resolve("slow", false);
    view.process_pending();

    assert_eq!(view.state(), LoadState::ImageShown);
    assert_eq!(
        view.image_surface().content().map(AvatarImage::url),
        Some("fast")
    );
    assert!(!view.text_surface().is_visible());
    assert_eq!(view.name(), Some("Beta"));
    assert_settled(&view);
}

#[test]
fn test_failure_without_name_shows_empty_badge() {
    let (mut view, _) = view_with(AttributeSet::new());

    view.set_avatar(Some("https://bad"), Some(""));
    view.process_pending();

    assert_eq!(view.state(), LoadState::FallbackShown);
    assert!(view.text_surface().is_visible());
    assert_eq!(view.text_surface().text(), "");
    assert!(view.text_surface().background().is_some());
    assert_settled(&view);
}

#[test]
fn test_same_name_keeps_its_color_across_views() {
    let (mut first, _) = view_with(AttributeSet::new());
    let (mut second, _) = view_with(AttributeSet::new());

    first.set_avatar(None, Some("Grace Hopper"));
    second.set_avatar(Some("https://bad/g.png"), Some("Grace Hopper"));
    second.process_pending();

    assert_eq!(
        first.text_surface().background(),
        second.text_surface().background()
    );
}

#[test]
fn test_configured_values_are_reported() {
    let (view, _) = view_with(
        AttributeSet::new()
            .with("image_shape", 1)
            .with("text_size", 28.0)
            .with("font_family", "serif_display"),
    );

    let config: &AvatarConfig = view.config();
    assert_eq!(config.shape, ImageShape::Circle);
    assert_eq!(config.corner_radius, 40);
    assert_eq!(config.text_size, 28.0);
    assert_eq!(view.text_surface().style().unwrap().size, 28.0);
}
