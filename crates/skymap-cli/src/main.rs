//! SkyMap CLI: command-line client for the SkyMap API.
//!
//! Set SKYMAP_API_URL (or API_URL); defaults to http://localhost:4000.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use skymap_api_client::ApiClient;
use skymap_cli::{init_tracing, print_json, read_image, stage_image};
use skymap_core::constants::DIALOG_CLOSE_DELAY;
use skymap_processing::{schedule_close, GeoExtractor, UploadSession};
use tokio::sync::Mutex;

#[derive(Parser)]
#[command(name = "skymap", about = "SkyMap API CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the location embedded in a local image (no network)
    Locate {
        /// Path to the image
        file: PathBuf,
    },
    /// Ask the server for the location embedded in an image, without storing it
    Preview {
        /// Path to the image
        file: PathBuf,
    },
    /// Upload a located image
    Upload {
        /// Path to the image
        file: PathBuf,
        /// Session key for duplicate-submission protection (random when omitted)
        #[arg(long)]
        session: Option<String>,
    },
    /// List all stored images
    List,
    /// Get a single image by ID
    Get {
        /// Image ID
        id: i64,
    },
    /// Get the map view (defaults plus every marker)
    Map,
}

async fn upload(client: &ApiClient, file: PathBuf, session_key: String) -> anyhow::Result<()> {
    let session = Arc::new(Mutex::new(UploadSession::new()));

    let image = {
        let mut dialog = session.lock().await;
        dialog.open();
        stage_image(&mut dialog, &file)?;

        match dialog.pending() {
            (Some(image), Some(location)) => {
                tracing::info!(
                    filename = %image.filename,
                    latitude = location.latitude,
                    longitude = location.longitude,
                    "Uploading image"
                );
                image
            }
            _ => {
                let message = dialog.status().map(|s| s.message()).unwrap_or_default();
                anyhow::bail!("{}", message);
            }
        }
    };

    let result = client
        .upload_bytes(
            &image.filename,
            &image.content_type,
            image.data,
            Some(&session_key),
        )
        .await;

    let status = session.lock().await.complete(&result);
    eprintln!("{}", status.message());

    // The status stays visible until the dialog closes.
    schedule_close(session, DIALOG_CLOSE_DELAY)
        .await
        .context("Dialog close task failed")?;

    print_json(&result?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Locate { file } => {
            let image = read_image(&file)?;
            match GeoExtractor::extract(&image.data)? {
                Some(location) => print_json(&location)?,
                None => anyhow::bail!("{}", skymap_core::constants::NO_LOCATION_MESSAGE),
            }
        }
        Commands::Preview { file } => {
            let client = ApiClient::from_env().context("Failed to create API client")?;
            let location = client.preview_location(&file).await?;
            print_json(&location)?;
        }
        Commands::Upload { file, session } => {
            let client = ApiClient::from_env().context("Failed to create API client")?;
            let session = session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            upload(&client, file, session).await?;
        }
        Commands::List => {
            let client = ApiClient::from_env().context("Failed to create API client")?;
            print_json(&client.list_images().await?)?;
        }
        Commands::Get { id } => {
            let client = ApiClient::from_env().context("Failed to create API client")?;
            print_json(&client.get_image(id).await?)?;
        }
        Commands::Map => {
            let client = ApiClient::from_env().context("Failed to create API client")?;
            print_json(&client.get_map().await?)?;
        }
    }

    Ok(())
}
