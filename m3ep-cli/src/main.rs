//! M3EP CLI - statistical classification of extreme daily precipitation events.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "m3ep",
    version,
    about = "Extreme daily precipitation event classification"
)]
struct Cli {
    #[command(subcommand)]
    command: m3ep_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    log::debug!("m3ep {}", env!("CARGO_PKG_VERSION"));
    m3ep_cmd::run(cli.command)
}
