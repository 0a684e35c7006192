use serde::{Deserialize, Serialize};

use crate::prelude::{println, *};

pub mod store;
pub mod upload;

pub use store::{FileStore, SharePointClient};

/// Root of the document library below the site URL.
pub const DOCUMENT_ROOT: &str = "Shared Documents";

/// SharePoint module app - root command
#[derive(Debug, clap::Parser)]
#[command(name = "sp")]
#[command(about = "SharePoint document library operations")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Upload a local file to the document library
    #[clap(name = "upload")]
    Upload(upload::UploadOptions),
}

/// Connection settings shared by the document-library commands
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct SharePointArgs {
    /// SharePoint server, e.g. "https://example.sharepoint.com"
    #[arg(long, env = "SP_SERVER")]
    pub server: String,

    /// Server-relative site URL, e.g. "/sites/netops"
    #[arg(long, env = "SP_SITE_URL")]
    pub site_url: String,

    /// SharePoint user
    #[arg(long, env = "SP_USER")]
    pub user: String,

    /// SharePoint password
    #[arg(long, env = "SP_PASS")]
    pub pass: String,
}

/// Run SharePoint commands
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("Running SharePoint command...");
    }

    match app.command {
        Commands::Upload(options) => upload::upload_handler(options).await,
    }
}
