use std::path::PathBuf;
use std::time::Duration;

use avatar_view::telemetry::setup_tracing;
use avatar_view::{AttributeSet, AvatarView, HttpLoader, LoadState};
use clap::Parser;
use color_eyre::eyre::{eyre, WrapErr};
use maud::Render;
use tokio::runtime::Handle;
use tracing::info;

/// Render one avatar to an HTML file
#[derive(Parser, Debug)]
#[clap(name = "avatar-preview")]
struct Cli {
    /// Image URL; leave out to render the initials badge
    #[arg(long)]
    url: Option<String>,

    /// Display name used for the initials badge
    #[arg(long)]
    name: Option<String>,

    /// JSON file with widget attributes (image_shape, image_radius, ...)
    #[arg(long)]
    attributes: Option<PathBuf>,

    /// Where to write the rendered HTML
    #[arg(long, default_value = "avatar.html")]
    out: PathBuf,

    /// Fall back to the initials badge if the image takes longer than this
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    setup_tracing("info")?;

    let cli = Cli::parse();

    let attributes = match &cli.attributes {
        Some(path) => AttributeSet::load(path)?,
        None => AttributeSet::default(),
    };

    let loader =
        HttpLoader::new(Handle::current()).timeout(Duration::from_secs(cli.timeout_secs));
    let mut view: AvatarView<HttpLoader> = AvatarView::from_attributes(
        &attributes,
        loader,
        Default::default(),
        Default::default(),
    );

    view.set_avatar(cli.url.as_deref(), cli.name.as_deref());

    let state = view.wait_for_outcome().await;

    match state {
        LoadState::ImageShown => info!("Rendering loaded image"),
        LoadState::FallbackShown => info!(
            initials = view.text_surface().text(),
            "Rendering initials badge"
        ),
        LoadState::Idle | LoadState::Loading(_) => {
            return Err(eyre!("Avatar never settled: {state:?}"))
        }
    }

    std::fs::write(&cli.out, view.render().into_string())
        .wrap_err_with(|| format!("Failed to write {}", cli.out.display()))?;

    println!("Wrote {}", cli.out.display());

    Ok(())
}
