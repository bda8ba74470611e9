use anyhow::Result;
use clap::Parser;
use snake_arcade::app::App;
use snake_arcade::game::GameConfig;
use snake_arcade::score::DEFAULT_HIGH_SCORE_FILE;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "snake_arcade")]
#[command(version, about = "Terminal snake arcade with special food and a persistent high score")]
struct Cli {
    /// Grid width in cells
    #[arg(long, default_value = "20")]
    width: usize,

    /// Grid height in cells
    #[arg(long, default_value = "20")]
    height: usize,

    /// Milliseconds between game ticks
    #[arg(long, default_value = "100")]
    tick_ms: u64,

    /// Path of the high score file
    #[arg(long, default_value = DEFAULT_HIGH_SCORE_FILE)]
    high_score_file: PathBuf,

    /// Disable all sound output
    #[arg(long)]
    muted: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = GameConfig::new(cli.width, cli.height);
    config.tick_interval_ms = cli.tick_ms;

    let mut app = App::new(config, cli.high_score_file, cli.muted);
    app.run().await
}
