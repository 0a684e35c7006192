//! The remote file-store collaborator
//!
//! The pipelines only ever list folders, list files, read a file, write a
//! file, and create a folder, so that is the whole capability surface.
//! [`SharePointClient`] implements it over the SharePoint REST API; tests
//! drive the pipelines with an in-memory implementation instead.

use async_trait::async_trait;
use serde::Deserialize;

use super::SharePointArgs;
use crate::error::Error;
use crate::prelude::f;

/// Narrow capability interface over the remote document library.
#[async_trait]
pub trait FileStore {
    /// Names of the folders directly below `path`.
    async fn list_folders(&self, path: &str) -> Result<Vec<String>, Error>;

    /// Names of the files directly inside `path`.
    async fn list_files(&self, path: &str) -> Result<Vec<String>, Error>;

    /// Content of the file `name` inside `path`.
    async fn get_file(&self, name: &str, path: &str) -> Result<Vec<u8>, Error>;

    /// Write `content` as the file `name` inside `path`, overwriting any
    /// existing object of the same name. Returns the remote API response.
    async fn upload_file(
        &self,
        content: &[u8],
        name: &str,
        path: &str,
    ) -> Result<serde_json::Value, Error>;

    /// Create a folder at the server-relative `path`. Idempotent: an
    /// already-existing folder is fine.
    async fn create_folder(&self, path: &str) -> Result<(), Error>;
}

// --- REST response shapes (odata=verbose) ---

#[derive(Debug, Deserialize)]
struct ListResponse {
    d: ListResults,
}

#[derive(Debug, Deserialize)]
struct ListResults {
    results: Vec<NamedEntry>,
}

#[derive(Debug, Deserialize)]
struct NamedEntry {
    #[serde(rename = "Name")]
    name: String,
}

/// Check that an HTTP response was successful, returning a store error otherwise.
async fn check_response(response: reqwest::Response, context: &str) -> Result<reqwest::Response, Error> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(Error::Store(f!("{context} [{status}]: {body}")))
}

/// Create an authenticated HTTP client for the document library
fn create_store_client(user: &str, pass: &str) -> Result<reqwest::Client, Error> {
    use base64::Engine;
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

    let auth_string = f!("{user}:{pass}");
    let auth_encoded = base64::engine::general_purpose::STANDARD.encode(&auth_string);

    let mut headers = HeaderMap::new();
    let mut auth_value = HeaderValue::from_str(&f!("Basic {auth_encoded}"))
        .map_err(|e| Error::Store(f!("invalid header value: {e}")))?;
    auth_value.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth_value);
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json;odata=verbose"),
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| Error::Store(f!("failed to build HTTP client: {e}")))
}

/// Document-library client over the SharePoint REST API.
pub struct SharePointClient {
    client: reqwest::Client,
    server: String,
    site_url: String,
}

impl SharePointClient {
    pub fn new(args: &SharePointArgs) -> Result<Self, Error> {
        let client = create_store_client(&args.user, &args.pass)?;
        Ok(Self {
            client,
            server: args.server.trim_end_matches('/').to_string(),
            site_url: args.site_url.clone(),
        })
    }

    /// Build a `GetFolderByServerRelativeUrl` API URL for `path` with the
    /// given resource suffix.
    fn folder_api_url(&self, path: &str, suffix: &str) -> String {
        f!(
            "{}{}/_api/web/GetFolderByServerRelativeUrl('{}'){}",
            self.server,
            self.site_url,
            urlencoding::encode(path),
            suffix
        )
    }

    async fn list_names(&self, url: &str, context: &str) -> Result<Vec<String>, Error> {
        log::debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Store(f!("{context}: {e}")))?;
        let response = check_response(response, context).await?;

        let listing: ListResponse = response
            .json()
            .await
            .map_err(|e| Error::Store(f!("{context}: unexpected response: {e}")))?;
        Ok(listing.d.results.into_iter().map(|entry| entry.name).collect())
    }
}

#[async_trait]
impl FileStore for SharePointClient {
    async fn list_folders(&self, path: &str) -> Result<Vec<String>, Error> {
        let url = self.folder_api_url(path, "/Folders");
        self.list_names(&url, &f!("failed to list folders in {path}")).await
    }

    async fn list_files(&self, path: &str) -> Result<Vec<String>, Error> {
        let url = self.folder_api_url(path, "/Files");
        self.list_names(&url, &f!("failed to list files in {path}")).await
    }

    async fn get_file(&self, name: &str, path: &str) -> Result<Vec<u8>, Error> {
        let url = self.folder_api_url(
            path,
            &f!("/Files('{}')/$value", urlencoding::encode(name)),
        );
        log::debug!("GET {url}");
        let context = f!("failed to download {name} from {path}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Store(f!("{context}: {e}")))?;
        let response = check_response(response, &context).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Store(f!("{context}: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn upload_file(
        &self,
        content: &[u8],
        name: &str,
        path: &str,
    ) -> Result<serde_json::Value, Error> {
        let url = self.folder_api_url(
            path,
            &f!("/Files/add(url='{}',overwrite=true)", urlencoding::encode(name)),
        );
        log::debug!("POST {url} ({} bytes)", content.len());
        let context = f!("failed to upload {name} to {path}");

        let response = self
            .client
            .post(&url)
            .body(content.to_vec())
            .send()
            .await
            .map_err(|e| Error::Store(f!("{context}: {e}")))?;
        let response = check_response(response, &context).await?;

        response
            .json()
            .await
            .map_err(|e| Error::Store(f!("{context}: unexpected response: {e}")))
    }

    async fn create_folder(&self, path: &str) -> Result<(), Error> {
        let url = f!("{}{}/_api/web/folders", self.server, self.site_url);
        log::debug!("POST {url} (folder {path})");
        let context = f!("failed to create folder {path}");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "ServerRelativeUrl": path }))
            .send()
            .await
            .map_err(|e| Error::Store(f!("{context}: {e}")))?;
        check_response(response, &context).await?;
        Ok(())
    }
}

/// In-memory file store used by the pipeline tests.
#[cfg(test)]
pub mod fake {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use super::*;
    use crate::prelude::f;

    #[derive(Debug, Default)]
    pub struct InMemoryStore {
        folders: BTreeMap<String, Vec<String>>,
        files: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
        pub uploads: Mutex<Vec<(String, String, Vec<u8>)>>,
        pub created_folders: Mutex<Vec<String>>,
    }

    impl InMemoryStore {
        pub fn add_folder(&mut self, parent: &str, name: &str) {
            self.folders
                .entry(parent.to_string())
                .or_default()
                .push(name.to_string());
        }

        pub fn add_file(&mut self, path: &str, name: &str, content: &[u8]) {
            self.files
                .entry(path.to_string())
                .or_default()
                .insert(name.to_string(), content.to_vec());
        }
    }

    #[async_trait]
    impl FileStore for InMemoryStore {
        async fn list_folders(&self, path: &str) -> Result<Vec<String>, Error> {
            Ok(self.folders.get(path).cloned().unwrap_or_default())
        }

        async fn list_files(&self, path: &str) -> Result<Vec<String>, Error> {
            Ok(self
                .files
                .get(path)
                .map(|entries| entries.keys().cloned().collect())
                .unwrap_or_default())
        }

        async fn get_file(&self, name: &str, path: &str) -> Result<Vec<u8>, Error> {
            self.files
                .get(path)
                .and_then(|entries| entries.get(name))
                .cloned()
                .ok_or_else(|| Error::Store(f!("no file {name} in {path}")))
        }

        async fn upload_file(
            &self,
            content: &[u8],
            name: &str,
            path: &str,
        ) -> Result<serde_json::Value, Error> {
            self.uploads.lock().unwrap().push((
                path.to_string(),
                name.to_string(),
                content.to_vec(),
            ));
            Ok(serde_json::json!({ "Name": name }))
        }

        async fn create_folder(&self, path: &str) -> Result<(), Error> {
            self.created_folders.lock().unwrap().push(path.to_string());
            Ok(())
        }
    }
}
