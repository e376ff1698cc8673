use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config;
use crate::projection;
use crate::storage::operations::Catalog;

#[derive(Parser)]
#[command(name = "tracksite")]
#[command(version = "0.1")]
#[command(about = "Music release pages with streaming links and an admin dashboard")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show track document status
    Status,
    /// Run http server hosting the site
    Serve,
    /// List tracks as shown on the home page
    List {
        /// Include every track in document order, with its enabled flag
        #[arg(short, long)]
        all: bool,
    },
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let cfg = config::Config::load(&cli.config.to_string_lossy())?;
    let catalog = Catalog::new(&cfg.storage);

    match &cli.command {
        Commands::Status {} => {
            let doc = catalog
                .document()
                .context("Failed to read track document")?;
            let rows = projection::dashboard_view(&doc, catalog.covers());

            println!("Document: {}", cfg.storage.document.to_string_lossy());
            println!("Covers: {}", catalog.covers().dir().to_string_lossy());
            println!("Platform policy: {:?}", cfg.site.platform_policy);
            println!(
                "Tracks: {} ({} enabled)",
                rows.len(),
                rows.iter().filter(|r| r.enabled).count()
            );

            let without_cover = rows.iter().filter(|r| !r.has_cover).collect::<Vec<_>>();
            if !without_cover.is_empty() {
                println!("Tracks without a cover ({}):", without_cover.len());
                for row in without_cover {
                    println!("    - {}", row.id);
                }
            }
        }

        Commands::Serve {} => {
            let http_server = crate::http::server::HttpServer::new(
                catalog,
                cfg.site,
                cfg.storage.assets_dir,
                cfg.http,
            );

            log::info!(
                "HTTP server running at http://{}:{}",
                http_server.config.bind_addr,
                http_server.config.port
            );
            http_server.run();
        }

        Commands::List { all } => {
            let doc = catalog
                .document()
                .context("Failed to read track document")?;

            if *all {
                for row in projection::dashboard_view(&doc, catalog.covers()) {
                    println!(
                        "[{}] {}: {}{}",
                        if row.enabled { "x" } else { " " },
                        row.id,
                        row.title,
                        if row.has_cover { "" } else { " (no cover)" }
                    );
                }
            } else {
                for card in projection::list_view(&doc, catalog.covers(), &cfg.site) {
                    println!("{}: {} - {}", card.id, card.artist, card.title);
                    if card.has_cover {
                        println!("    cover: {}", card.cover_url);
                    }
                }
            }
        }
    }

    Ok(())
}
