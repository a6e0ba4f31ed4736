use std::time::Duration;

use avatar_view::{
    AttributeSet, AvatarConfig, AvatarImage, AvatarView, CachePolicy, HttpLoader, ImageShape,
    LoadState,
};
use fixtures::image_host::IMAGE_SIDE;
use fixtures::ImageHost;
use maud::Render;
use tokio::runtime::Handle;
use tokio::time::timeout;

fn view(config: AvatarConfig) -> AvatarView<HttpLoader> {
    AvatarView::headless(config, HttpLoader::new(Handle::current()))
}

async fn settle(view: &mut AvatarView<HttpLoader>) -> LoadState {
    timeout(Duration::from_secs(10), view.wait_for_outcome())
        .await
        .expect("loader never answered")
}

fn alpha_at(image: &AvatarImage, x: u32, y: u32) -> u8 {
    image.pixels().get_pixel(x, y)[3]
}

#[tokio::test]
async fn test_loads_and_circle_crops() {
    let host = ImageHost::spawn().await.unwrap();
    let mut view = view(AvatarConfig::default().shape(ImageShape::Circle));

    view.set_avatar(Some(host.url("ok/ada.png").as_str()), Some("Ada"));
    assert_eq!(settle(&mut view).await, LoadState::ImageShown);

    let image = view.image_surface().content().unwrap();
    assert_eq!(image.dimensions(), (IMAGE_SIDE, IMAGE_SIDE));
    assert_eq!(alpha_at(image, 0, 0), 0);
    assert_eq!(alpha_at(image, IMAGE_SIDE / 2, IMAGE_SIDE / 2), 255);
    assert!(!view.text_surface().is_visible());
}

#[tokio::test]
async fn test_rounded_corners_with_margin() {
    let host = ImageHost::spawn().await.unwrap();
    let mut view = view(AvatarConfig::default().rounded(16, 4));

    view.set_avatar(Some(host.url("ok/bea.png").as_str()), Some("Bea"));
    assert_eq!(settle(&mut view).await, LoadState::ImageShown);

    let image = view.image_surface().content().unwrap();
    assert_eq!(alpha_at(image, 1, 32), 0);
    assert_eq!(alpha_at(image, 4, 4), 0);
    assert_eq!(alpha_at(image, 32, 32), 255);
}

#[tokio::test]
async fn test_bypass_sends_no_cache_and_refetches() {
    let host = ImageHost::spawn().await.unwrap();
    let mut view = view(AvatarConfig::default());
    let url = host.url("ok/fresh.png");

    view.set_avatar(Some(url.as_str()), Some("Fresh"));
    settle(&mut view).await;
    view.set_avatar(Some(url.as_str()), Some("Fresh"));
    settle(&mut view).await;

    assert_eq!(host.hits("/ok/fresh.png"), 2);
    assert!(host
        .requests()
        .iter()
        .all(|request| request.cache_control.as_deref() == Some("no-cache, no-store")));
    assert_eq!(view.loader().cached_images(), 0);
}

#[tokio::test]
async fn test_default_cache_policy_reuses_images() {
    let host = ImageHost::spawn().await.unwrap();
    let mut view = view(AvatarConfig::default().cache_policy(CachePolicy::Default));
    let url = host.url("ok/cached.png");

    view.set_avatar(Some(url.as_str()), Some("Cached"));
    assert_eq!(settle(&mut view).await, LoadState::ImageShown);
    view.set_avatar(Some(url.as_str()), Some("Cached"));
    assert_eq!(settle(&mut view).await, LoadState::ImageShown);

    assert_eq!(host.hits("/ok/cached.png"), 1);
    assert_eq!(host.requests()[0].cache_control, None);
    assert_eq!(view.loader().cached_images(), 1);
}

#[tokio::test]
async fn test_http_errors_fall_back_to_initials() {
    let host = ImageHost::spawn().await.unwrap();

    for (path, name, expected) in [
        ("missing/jane.png", "Jane Doe", "JD"),
        ("garbage/kip.png", "kip", "K"),
    ] {
        let mut view = view(AvatarConfig::default());
        view.set_avatar(Some(host.url(path).as_str()), Some(name));

        assert_eq!(settle(&mut view).await, LoadState::FallbackShown);
        assert_eq!(view.text_surface().text(), expected);
        assert!(!view.image_surface().is_visible());
    }
}

#[tokio::test]
async fn test_unreachable_host_falls_back() {
    let host = ImageHost::spawn().await.unwrap();
    let url = host.url("ok/gone.png");
    drop(host);

    let mut view = view(AvatarConfig::default());
    view.set_avatar(Some(url.as_str()), Some("Gone Away"));

    assert_eq!(settle(&mut view).await, LoadState::FallbackShown);
    assert_eq!(view.text_surface().text(), "GA");
}

#[tokio::test]
async fn test_slow_response_is_superseded() {
    let host = ImageHost::spawn().await.unwrap();
    let mut view = view(AvatarConfig::default());

    view.set_avatar(Some(host.url("slow/300/alpha.png").as_str()), Some("Alpha"));
    view.set_avatar(Some(host.url("ok/beta.png").as_str()), Some("Beta"));
    assert_eq!(settle(&mut view).await, LoadState::ImageShown);

    // Let the slow response land, then make sure it changes nothing
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(view.process_pending(), 0);

    assert_eq!(view.state(), LoadState::ImageShown);
    assert_eq!(
        view.image_surface().content().map(AvatarImage::url),
        Some(host.url("ok/beta.png").as_str())
    );
    assert_eq!(host.hits("/slow/300/alpha.png"), 1);
}

#[tokio::test]
async fn test_renders_loaded_avatar_from_attributes() {
    let host = ImageHost::spawn().await.unwrap();
    let attributes = AttributeSet::from_json(r#"{"image_shape": 1, "text_size": 24}"#).unwrap();
    let mut view: AvatarView<HttpLoader> = AvatarView::from_attributes(
        &attributes,
        HttpLoader::new(Handle::current()),
        Default::default(),
        Default::default(),
    );

    view.set_avatar(Some(host.url("ok/render.png").as_str()), Some("Render Me"));
    settle(&mut view).await;

    let html = view.render().into_string();
    assert!(html.contains("data:image/png;base64,"));
    assert!(html.contains(r#"alt="Render Me""#));
}

#[tokio::test]
async fn test_stalled_server_times_out_to_fallback() {
    let host = ImageHost::spawn().await.unwrap();
    let loader = HttpLoader::new(Handle::current()).timeout(Duration::from_millis(200));
    let mut view: AvatarView<HttpLoader> = AvatarView::headless(AvatarConfig::default(), loader);

    view.set_avatar(Some(host.url("slow/2000/stall.png").as_str()), Some("Stall Ed"));

    assert_eq!(settle(&mut view).await, LoadState::FallbackShown);
    assert_eq!(view.text_surface().text(), "SE");
    assert!(!view.image_surface().is_visible());
}

#[tokio::test]
async fn test_memory_cache_is_bounded() {
    let host = ImageHost::spawn().await.unwrap();
    let loader = HttpLoader::new(Handle::current()).cache_capacity(4);
    let mut view: AvatarView<HttpLoader> = AvatarView::headless(
        AvatarConfig::default().cache_policy(CachePolicy::Default),
        loader,
    );

    for i in 0..10 {
        view.set_avatar(Some(host.url(&format!("ok/u{i}.png")).as_str()), Some("User"));
        assert_eq!(settle(&mut view).await, LoadState::ImageShown);
    }
    assert_eq!(view.loader().cached_images(), 4);

    // Most recent stays cached, the oldest was evicted
    view.set_avatar(Some(host.url("ok/u9.png").as_str()), Some("User"));
    settle(&mut view).await;
    assert_eq!(host.hits("/ok/u9.png"), 1);

    view.set_avatar(Some(host.url("ok/u0.png").as_str()), Some("User"));
    settle(&mut view).await;
    assert_eq!(host.hits("/ok/u0.png"), 2);
    assert_eq!(view.loader().cached_images(), 4);

    view.loader().clear_cache();
    assert_eq!(view.loader().cached_images(), 0);
}
