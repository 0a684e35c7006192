use crate::prelude::*;
use clap::Parser;

mod convert;
mod error;
mod inventory;
mod outcome;
mod prelude;
mod reports;
mod sharepoint;
mod text;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Automation glue for the flat-networks switch migration"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "FLATNET_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Dynamic host inventory built from the seed CSV in source control
    Inventory(crate::inventory::App),

    /// Site report operations against the document library
    Reports(crate::reports::App),

    /// SharePoint document library operations
    Sp(crate::sharepoint::App),

    /// File format conversions
    Convert(crate::convert::App),

    /// Free-text post-processing helpers
    Text(crate::text::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Inventory(sub_app) => crate::inventory::run(sub_app, app.global).await,
        SubCommands::Reports(sub_app) => crate::reports::run(sub_app, app.global).await,
        SubCommands::Sp(sub_app) => crate::sharepoint::run(sub_app, app.global).await,
        SubCommands::Convert(sub_app) => crate::convert::run(sub_app, app.global).await,
        SubCommands::Text(sub_app) => crate::text::run(sub_app, app.global).await,
    }
}
