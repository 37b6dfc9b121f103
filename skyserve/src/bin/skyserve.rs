//! Night-sky analysis server binary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use skyserve::AppState;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Night-sky image validation and star field rendering server")]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// TTF/OTF font used for star and constellation labels; without it,
    /// rendered images omit text
    #[arg(long)]
    font: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let font = match &args.font {
        Some(path) => Some(
            std::fs::read(path)
                .with_context(|| format!("failed to read font {}", path.display()))?,
        ),
        None => None,
    };
    if font.is_none() {
        info!("no font configured; rendered images will omit labels");
    }

    let app = skyserve::router(AppState::new(font));
    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;

    info!("listening on {}", args.bind);
    axum::serve(listener, app).await.context("server exited")?;
    Ok(())
}
