mod config;
mod error;
mod play;
mod render;
mod trivia;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use jigsaw_core::catalog::DEFAULT_ARTWORK_ID;
use jigsaw_core::{ARTWORKS, Artwork, Session, artwork_by_id};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{load_config, resolve_api_key, resolve_grid};
use crate::error::CliError;
use crate::play::Game;
use crate::trivia::FactClient;

#[derive(Parser)]
#[command(name = "jigsaw")]
#[command(about = "Cut irregular jigsaw boards and restore masterpieces", long_about = None)]
struct Cli {
    /// Board rows (config file, then 4)
    #[arg(long, global = true)]
    rows: Option<u32>,

    /// Board columns (config file, then 3)
    #[arg(long, global = true)]
    cols: Option<u32>,

    /// Seed for the cut and the tray shuffle; random when omitted
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Artwork to cut
    #[arg(long, global = true, default_value = DEFAULT_ARTWORK_ID)]
    artwork: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Cut a board and write it as .svg, .png or a .json piece manifest
    Cut {
        /// Output file; the extension picks the format
        out: PathBuf,

        #[arg(long, default_value_t = 600)]
        width: u32,

        #[arg(long, default_value_t = 800)]
        height: u32,
    },
    /// Restore an artwork piece by piece from the terminal
    Play {
        /// Model for the curator's note
        #[arg(short, long)]
        model: Option<String>,
    },
    /// List the artworks on display
    Artworks,
}

fn find_artwork(id: &str) -> Result<&'static Artwork, CliError> {
    artwork_by_id(id).ok_or_else(|| CliError::UnknownArtwork(id.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config();

    match cli.command {
        Command::Artworks => {
            for art in ARTWORKS {
                println!("{:<12} {} ({}, {})", art.id, art.title, art.artist, art.year);
            }
        }
        Command::Cut { out, width, height } => {
            let artwork = find_artwork(&cli.artwork)?;
            let grid = resolve_grid(cli.rows, cli.cols, &config)?;
            let seed = cli.seed.unwrap_or_else(rand::random::<u64>);
            info!(seed, rows = grid.rows(), cols = grid.cols(), "cutting board");

            let pieces = jigsaw_core::generate(grid, &mut StdRng::seed_from_u64(seed));
            let bytes = render::render_cut(&pieces, artwork, &out, width, height)?;
            std::fs::write(&out, bytes)?;
            println!("{} pieces written to {} (seed {seed})", pieces.len(), out.display());
        }
        Command::Play { model } => {
            let artwork = find_artwork(&cli.artwork)?;
            let grid = resolve_grid(cli.rows, cli.cols, &config)?;
            let seed = cli.seed.unwrap_or_else(rand::random::<u64>);
            info!(seed, rows = grid.rows(), cols = grid.cols(), "starting session");

            let session = Session::new(grid, &mut StdRng::seed_from_u64(seed));

            let mut facts = FactClient::new(resolve_api_key(|var| std::env::var(var).ok(), &config));
            if let Some(base) = config.api_base.clone() {
                facts = facts.with_base_url(base);
            }
            if let Some(model) = model.or(config.model.clone()) {
                facts = facts.with_model(model);
            }

            play::run(Game::new(session, artwork), facts).await?;
        }
    }

    Ok(())
}
