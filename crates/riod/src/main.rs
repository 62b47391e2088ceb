//! # riod
//! Serves the gallery asset store over HTTP and keeps it synchronized with the
//! remote listing. Also packs images into `.rio` containers offline.

mod api;

use anyhow::{Context, Result};
use api::{build_app, ApiState};
use clap::{Parser, Subcommand};
use colored::*;
use log::{error, info};
use rio_core::config::GalleryConfig;
use rio_gallery::encoder::encode_directory;
use rio_gallery::Gallery;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the gallery over HTTP
    Serve {
        /// HTTP server address
        #[arg(long, default_value = "localhost:5675")]
        addr: String,
        /// Skip the sync pass at startup and serve what is cached
        #[arg(long)]
        no_sync: bool,
    },
    /// Run one sync pass against the remote listing
    Sync,
    /// List cached gallery images, newest first
    List,
    /// Pack images into .rio containers
    Encode {
        /// Directory holding the source images
        images: PathBuf,
        /// JSON array of {filename, title, description, date}
        metadata: PathBuf,
        /// Output directory for encoded files
        #[arg(short, long, default_value = "./")]
        output: PathBuf,
    },
}

#[async_std::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { addr, no_sync } => {
            let config = GalleryConfig::from_env()?;
            let gallery = Arc::new(
                Gallery::open(&config)
                    .await
                    .context("Failed to open gallery cache")?,
            );
            let state = ApiState::new(gallery);

            if !no_sync {
                if let Err(e) = state.sync().await {
                    error!("failed to populate gallery on startup: {}", e);
                }
            }

            info!("serving {} on http://{}", config.cache_dir.display(), addr);
            println!("🚀 Starting server at {}", addr.cyan());
            build_app(state).listen(addr).await?;
        }
        Commands::Sync => {
            let config = GalleryConfig::from_env()?;
            println!("🔄 Syncing from {}", config.listing_url.cyan());
            let gallery = Gallery::open(&config).await?;
            let report = gallery.sync().await.context("Sync failed")?;

            for name in &report.downloaded {
                println!("  {} {}", "+".green(), name);
            }
            for name in &report.removed {
                println!("  {} {}", "-".red(), name);
            }
            for name in &report.failed {
                println!("  {} {}", "!".yellow(), name);
            }
            println!(
                "✅ {} downloaded, {} removed, {} failed, {} unchanged",
                report.downloaded.len(),
                report.removed.len(),
                report.failed.len(),
                report.unchanged
            );
        }
        Commands::List => {
            let config = GalleryConfig::from_env()?;
            let gallery = Gallery::open(&config).await?;
            for entry in gallery.list_all().await.iter() {
                println!(
                    "{}  {}  {}",
                    entry.metadata.date.dimmed(),
                    entry.container.cyan(),
                    entry.metadata.title
                );
            }
        }
        Commands::Encode {
            images,
            metadata,
            output,
        } => {
            let written = encode_directory(&images, &metadata, &output)?;
            for path in &written {
                println!("Encoded: {}", path.display());
            }
            println!("✅ All {} images encoded.", written.len());
        }
    }

    Ok(())
}
