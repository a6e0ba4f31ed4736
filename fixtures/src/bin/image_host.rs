use clap::Parser;
use fixtures::image_host::{router, HostState};
use fixtures::{run_server, FixtureArgs};

/// Fake avatar CDN fixture server
#[derive(Parser, Debug)]
#[clap(name = "image-host-fixture")]
struct Cli {
    #[clap(flatten)]
    common: FixtureArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    run_server(args.common, router(HostState::default())).await
}
