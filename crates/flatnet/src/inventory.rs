use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::prelude::{println, *};
use flatnet_core::inventory::{build_inventory, Inventory};

/// Name of the seed file inside the source-control folder.
pub const SEED_FILE_NAME: &str = "inventory_seed.csv";

/// Inventory module app - root command
#[derive(Debug, clap::Parser)]
#[command(name = "inventory")]
#[command(about = "Dynamic host inventory built from the seed CSV in source control")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Fetch the seed CSV and print the grouped inventory
    #[clap(name = "list")]
    List(ListOptions),
}

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct ListOptions {
    /// Path to the inventory plugin configuration file
    #[clap(long, env = "FLATNET_INVENTORY_CONFIG")]
    pub config: PathBuf,

    /// Output the dynamic-inventory JSON document
    #[arg(long)]
    pub json: bool,
}

/// Recognized keys of the inventory configuration file.
#[derive(Debug, Default, Deserialize)]
pub struct InventoryConfig {
    #[serde(default)]
    pub plugin: Option<String>,
    #[serde(default)]
    pub csv_url_prefix: Option<String>,
    #[serde(default)]
    pub github_token: Option<String>,
}

fn load_inventory_config(path: &Path) -> Result<InventoryConfig, Error> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::Configuration(f!("failed to read {}: {e}", path.display())))?;
    serde_yaml::from_str(&text)
        .map_err(|e| Error::Configuration(f!("invalid configuration file {}: {e}", path.display())))
}

/// Create an HTTP client that sends the bearer credential on every request
fn create_github_client(token: &str) -> Result<reqwest::Client, Error> {
    use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

    let mut headers = HeaderMap::new();
    let mut auth_value = HeaderValue::from_str(&f!("Bearer {token}"))
        .map_err(|e| Error::Configuration(f!("invalid github_token: {e}")))?;
    auth_value.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth_value);

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| Error::Fetch(f!("failed to build HTTP client: {e}")))
}

/// Public data function - fetches the seed CSV and builds the inventory.
///
/// Required settings: `csv_url_prefix` from the configuration file, the
/// `github_token` (configuration file or environment), and the `GH_FOLDER`
/// environment variable. A single failed request aborts the whole run; there
/// are no retries.
pub async fn list_inventory_data(config_path: &Path) -> Result<Inventory, Error> {
    let config = load_inventory_config(config_path)?;
    log::debug!("configuration declares plugin {:?}", config.plugin);

    let csv_url_prefix = config
        .csv_url_prefix
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            Error::Configuration("csv_url_prefix is not defined in the configuration file".into())
        })?;
    let github_token = config
        .github_token
        .filter(|value| !value.is_empty())
        .or_else(|| std::env::var("github_token").ok())
        .ok_or_else(|| {
            Error::Configuration("github_token is not available in the environment".into())
        })?;
    let github_folder = std::env::var("GH_FOLDER")
        .map_err(|_| Error::Configuration("GH_FOLDER is not available in the environment".into()))?;

    let url = f!("{csv_url_prefix}/{github_folder}/{SEED_FILE_NAME}");
    log::debug!("fetching seed CSV from {url}");

    let client = create_github_client(&github_token)?;
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| Error::Fetch(f!("failed to fetch CSV file from {url}: {e}")))?;

    let status = response.status();
    log::debug!("seed CSV fetch returned status {status}");
    if status != reqwest::StatusCode::OK {
        return Err(Error::Fetch(f!(
            "failed to fetch CSV file from {url} (status {})",
            status.as_u16()
        )));
    }

    let text = response
        .text()
        .await
        .map_err(|e| Error::Fetch(f!("failed to read response from {url}: {e}")))?;

    build_inventory(&text).map_err(|e| Error::Parse(e.to_string()))
}

/// Handle the list command
async fn list_handler(options: ListOptions) -> Result<()> {
    let inventory = list_inventory_data(&options.config).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&inventory.to_value())?);
    } else {
        let mut table = crate::prelude::new_table();
        table.add_row(prettytable::row!["Group", "Host", "Address", "Do not config"]);

        for (group, hosts) in inventory.groups() {
            for host in hosts {
                let Some(vars) = inventory.host_vars(host) else {
                    continue;
                };
                table.add_row(prettytable::row![
                    group,
                    host,
                    vars.ansible_host,
                    vars.do_not_config_flag
                ]);
            }
        }

        table.printstd();
    }

    Ok(())
}

/// Run inventory commands
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("Running inventory command...");
    }

    match app.command {
        Commands::List(options) => list_handler(options).await,
    }
}
