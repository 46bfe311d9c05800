//! CLI entry point for the pangolin service.
//!
//! Provides commands for serving the REST API, writing and inspecting the
//! configuration, and listing embedding models.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use pangolin::{AppContext, EmbeddingClient, Settings};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Paginated metadata records and vector search over REST
#[derive(Parser)]
#[command(
    name = "pangolin",
    version = env!("CARGO_PKG_VERSION"),
    about = "Paginated metadata records and vector search over REST",
    next_line_help = true,
    styles = clap_cargo_style(),
    after_help = "Quick Start:\n  $ pangolin init                  # Write pangolin.toml\n  $ pangolin serve                 # Serve on 127.0.0.1:8080\n  $ pangolin serve --bind 0.0.0.0:9000"
)]
struct Cli {
    /// Path to custom pangolin.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    #[command(about = "Write pangolin.toml with default settings")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,

        /// Where to write the file (defaults to --config or ./pangolin.toml)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Show current configuration settings
    #[command(about = "Display effective settings after all overrides")]
    Config,

    /// Start the HTTP server
    #[command(
        about = "Start the HTTP server",
        after_help = "Examples:\n  pangolin serve\n  pangolin serve --bind 0.0.0.0:3000\n  PANGOLIN_SERVER__BIND=0.0.0.0:3000 pangolin serve"
    )]
    Serve {
        /// Bind address, overriding server.bind
        #[arg(long, help = "Address to bind the HTTP server to")]
        bind: Option<String>,
    },

    /// List embedding models
    #[command(about = "List embedding models the local backend can serve")]
    Models,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Commands::Init { force, path } = &cli.command {
        let target = path.as_deref().or(cli.config.as_deref());
        match Settings::init_config_file(target, *force) {
            Ok(path) => {
                println!("Created configuration file at: {}", path.display());
                println!("Edit this file to customize your settings.");
            }
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    // A configuration that fails to load is fatal
    let mut config = Settings::load(cli.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });
    if cli.debug {
        config.debug = true;
    }

    pangolin::logging::init(&config.logging, config.debug);

    let result = match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Config => show_config(&config),
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            serve(config).await
        }
        Commands::Models => list_models(&config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn show_config(config: &Settings) -> anyhow::Result<()> {
    println!("Current Configuration:");
    println!("{}", "=".repeat(50));
    println!("{}", config.to_toml()?);
    Ok(())
}

async fn serve(config: Settings) -> anyhow::Result<()> {
    let bind = config.server.bind.clone();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        metric = %config.search.metric,
        embeddings = config.embedding.enabled,
        "starting pangolin"
    );

    let ctx = Arc::new(AppContext::from_settings(config));
    let ct = CancellationToken::new();
    tokio::spawn(pangolin::http::shutdown_signal(ct.clone()));

    pangolin::http::serve_http(ctx, &bind, ct).await
}

async fn list_models(config: &Settings) -> anyhow::Result<()> {
    let client = EmbeddingClient::local(&config.embedding)
        .ok_or_else(|| anyhow::anyhow!("built without the local-embeddings feature"))?;
    for model in client.model_list().await? {
        if model == client.default_model() {
            println!("{model} (default)");
        } else {
            println!("{model}");
        }
    }
    Ok(())
}
