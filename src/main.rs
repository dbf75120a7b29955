//! Main entry point for the anime portrait service

use anime_portrait::{
    api,
    backend::GeminiClient,
    codec::FileHandle,
    config::Settings,
    download::DownloadHandler,
    session::{SessionController, SessionHandle, SessionPhase},
    AppState,
};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "anime-portrait", version, about = "Turn a photo into an anime-style portrait")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the session over HTTP (default)
    Serve,
    /// Convert a single photo and save the portrait
    Convert {
        /// Photo to transform
        photo: PathBuf,
        /// Directory for the generated portrait
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from_path(path)?,
        None => Settings::load()?,
    };

    init_logging(&settings);

    settings.validate()?;

    let client = Arc::new(GeminiClient::new(&settings.gemini)?);
    let controller = SessionController::new(client);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings, controller).await,
        Command::Convert { photo, output_dir } => {
            let output_dir =
                output_dir.unwrap_or_else(|| PathBuf::from(&settings.download.output_dir));
            convert(controller, photo, output_dir).await
        }
    }
}

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if settings.logging.format == "pretty" {
        registry.with(fmt::layer().pretty()).init();
    } else {
        registry.with(fmt::layer().json()).init();
    }
}

async fn serve(settings: Settings, controller: SessionController) -> anyhow::Result<()> {
    info!("Starting anime portrait service");

    let addr = format!("{}:{}", settings.server.host, settings.server.port);

    let app_state = Arc::new(AppState {
        settings: Arc::new(settings),
        session: SessionHandle::spawn(controller),
    });

    let app = api::create_router(app_state);

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn convert(
    mut controller: SessionController,
    photo: PathBuf,
    output_dir: PathBuf,
) -> anyhow::Result<()> {
    let file = FileHandle::open(&photo)
        .await
        .with_context(|| format!("failed to read {}", photo.display()))?;

    if let Err(e) = controller.select_file(file) {
        bail!("{}: {}", controller.notice().unwrap_or("rejected"), e);
    }

    controller.generate().await;

    match (controller.phase(), controller.generated_result()) {
        (SessionPhase::Success, Some(result)) => {
            let path = DownloadHandler::new(output_dir).save(result).await?;
            println!("{}", path.display());
            Ok(())
        }
        _ => bail!(
            "{}",
            controller
                .error_message()
                .unwrap_or("generation did not complete")
        ),
    }
}
