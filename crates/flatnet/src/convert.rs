use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::outcome::{emit_failure, emit_outcome, TaskOutcome};
use crate::prelude::{println, *};
use flatnet_core::convert::{yaml_to_table, NO_DATA};

/// Convert module app - root command
#[derive(Debug, clap::Parser)]
#[command(name = "convert")]
#[command(about = "File format conversions")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Convert a YAML report document to a CSV table
    #[clap(name = "yaml-to-csv")]
    YamlToCsv(YamlToCsvOptions),
}

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct YamlToCsvOptions {
    /// Path to the source YAML document
    #[arg(long, env = "FLATNET_YAML_FILE")]
    pub yaml_file_path: PathBuf,

    /// Destination path for the CSV table
    #[arg(long, env = "FLATNET_CSV_FILE")]
    pub csv_file_path: PathBuf,

    /// Top-level key to unwrap before conversion
    #[arg(long, default_value = "")]
    pub outer_key: String,
}

/// Convert the YAML document and write the CSV table. Cells the document
/// never set are written as the placeholder value.
fn yaml_to_csv_data(options: &YamlToCsvOptions) -> Result<TaskOutcome, Error> {
    let text = std::fs::read_to_string(&options.yaml_file_path).map_err(|e| {
        Error::Io(f!(
            "failed to read {}: {e}",
            options.yaml_file_path.display()
        ))
    })?;
    let data: serde_yaml::Value = serde_yaml::from_str(&text).map_err(|e| {
        Error::Parse(f!(
            "invalid YAML in {}: {e}",
            options.yaml_file_path.display()
        ))
    })?;

    let outer_key = (!options.outer_key.is_empty()).then_some(options.outer_key.as_str());
    let table = yaml_to_table(&data, outer_key).map_err(|e| Error::Parse(e.to_string()))?;
    let csv_text = table
        .to_csv_string_filled(NO_DATA)
        .map_err(|e| Error::Parse(e.to_string()))?;

    std::fs::write(&options.csv_file_path, csv_text).map_err(|e| {
        Error::Io(f!(
            "failed to write {}: {e}",
            options.csv_file_path.display()
        ))
    })?;

    Ok(TaskOutcome::changed())
}

/// Handle the yaml-to-csv command
fn yaml_to_csv_handler(options: YamlToCsvOptions) -> Result<()> {
    match yaml_to_csv_data(&options) {
        Ok(outcome) => emit_outcome(&outcome),
        Err(error) => {
            emit_failure(&error);
            Err(error.into())
        }
    }
}

/// Run convert commands
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("Running convert command...");
    }

    match app.command {
        Commands::YamlToCsv(options) => yaml_to_csv_handler(options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options(dir: &TempDir, outer_key: &str) -> YamlToCsvOptions {
        YamlToCsvOptions {
            yaml_file_path: dir.path().join("report.yml"),
            csv_file_path: dir.path().join("report.csv"),
            outer_key: outer_key.to_string(),
        }
    }

    #[test]
    fn test_converts_document_with_outer_key() {
        let dir = TempDir::new().unwrap();
        let options = options(&dir, "results");
        std::fs::write(
            &options.yaml_file_path,
            "results:\n  - date: '2024-01-01'\n    project: alpha\n",
        )
        .unwrap();

        let outcome = yaml_to_csv_data(&options).unwrap();
        assert!(outcome.changed);

        let csv_text = std::fs::read_to_string(&options.csv_file_path).unwrap();
        assert!(csv_text.starts_with("date,project,"));
        assert!(csv_text.contains("2024-01-01,alpha,no_data"));
    }

    #[test]
    fn test_missing_outer_key_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let options = options(&dir, "rows");
        std::fs::write(&options.yaml_file_path, "results:\n  - project: alpha\n").unwrap();

        let err = yaml_to_csv_data(&options).unwrap_err();
        assert!(err.to_string().starts_with("ParseError:"));
        assert!(!options.csv_file_path.exists());
    }

    #[test]
    fn test_malformed_yaml_carries_the_parser_diagnostic() {
        let dir = TempDir::new().unwrap();
        let options = options(&dir, "");
        std::fs::write(&options.yaml_file_path, "- project: [unclosed\n").unwrap();

        let err = yaml_to_csv_data(&options).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("ParseError: invalid YAML"));
    }
}
