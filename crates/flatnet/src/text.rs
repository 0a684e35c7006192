use std::io::Read;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::prelude::{println, *};
use flatnet_core::text::split_on_empty_lines;

/// Text module app - root command
#[derive(Debug, clap::Parser)]
#[command(name = "text")]
#[command(about = "Free-text post-processing helpers")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Split text into trimmed sections on blank-line boundaries
    #[clap(name = "split")]
    Split(SplitOptions),
}

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct SplitOptions {
    /// File to read; stdin when omitted
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .wrap_err_with(|| f!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .wrap_err("failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Handle the split command
fn split_handler(options: SplitOptions) -> Result<()> {
    let text = read_input(options.file.as_ref())?;
    let sections = split_on_empty_lines(&text);

    if options.json {
        println!("{}", serde_json::to_string_pretty(&sections)?);
    } else {
        for (index, section) in sections.iter().enumerate() {
            if index > 0 {
                println!();
            }
            println!("{section}");
        }
    }

    Ok(())
}

/// Run text commands
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("Running text command...");
    }

    match app.command {
        Commands::Split(options) => split_handler(options),
    }
}
