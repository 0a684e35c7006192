use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{FileStore, SharePointArgs, SharePointClient, DOCUMENT_ROOT};
use crate::error::Error;
use crate::outcome::{emit_failure, emit_outcome, TaskOutcome};
use crate::prelude::*;

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct UploadOptions {
    /// Path to the local file to upload
    #[arg(long, env = "FLATNET_UPLOAD_FILE")]
    pub file_path: PathBuf,

    /// Document library folder below "Shared Documents"
    #[arg(long, env = "SP_FOLDER")]
    pub folder: String,

    /// Optional subfolder below the folder
    #[arg(long, env = "SP_SUBFOLDER")]
    pub subfolder: Option<String>,

    #[clap(flatten)]
    pub connection: SharePointArgs,
}

/// Upload a local file into the document library, creating the destination
/// folder (and subfolder, when given) first. Folder creation is idempotent.
/// Returns the remote API response for the upload.
pub async fn upload_file_data<S: FileStore + ?Sized>(
    store: &S,
    site_url: &str,
    file_path: &Path,
    folder: &str,
    subfolder: Option<&str>,
) -> Result<serde_json::Value, Error> {
    let content = std::fs::read(file_path)
        .map_err(|e| Error::Io(f!("failed to read {}: {e}", file_path.display())))?;
    let filename = file_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::Io(f!("invalid file path: {}", file_path.display())))?;

    let site_folder = f!("{site_url}/{DOCUMENT_ROOT}/{folder}");
    store.create_folder(&site_folder).await?;

    let destination = match subfolder {
        Some(sub) if !sub.is_empty() => {
            let site_subfolder = f!("{site_folder}/{sub}");
            store.create_folder(&site_subfolder).await?;
            site_subfolder
        }
        _ => site_folder,
    };

    store.upload_file(&content, filename, &destination).await
}

async fn upload_data(options: &UploadOptions) -> Result<TaskOutcome, Error> {
    let store = SharePointClient::new(&options.connection)?;
    let return_json = upload_file_data(
        &store,
        &options.connection.site_url,
        &options.file_path,
        &options.folder,
        options.subfolder.as_deref(),
    )
    .await?;
    Ok(TaskOutcome::changed().with_return_json(return_json))
}

/// Handle the upload command
pub async fn upload_handler(options: UploadOptions) -> Result<()> {
    match upload_data(&options).await {
        Ok(outcome) => emit_outcome(&outcome),
        Err(error) => {
            emit_failure(&error);
            Err(error.into())
        }
    }
}
