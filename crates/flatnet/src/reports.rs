use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::outcome::{emit_failure, emit_outcome, TaskOutcome};
use crate::prelude::{println, *};
use crate::sharepoint::{FileStore, SharePointArgs, SharePointClient, DOCUMENT_ROOT};
use flatnet_core::report::{parse_report_csv, route_project, ReportTable, Route};

/// Per-site report file the walk looks for.
pub const GROUP_REPORT_FILE: &str = "group_report.csv";

/// Fixed project root below the document library.
pub const PROJECT_ROOT_FOLDER: &str = "flat_networks_project";

const MERGED_REPORT_FILE: &str = "all_reports.csv";
const MERGED_TEST_REPORT_FILE: &str = "all_reports_test.csv";

/// Reports module app - root command
#[derive(Debug, clap::Parser)]
#[command(name = "reports")]
#[command(about = "Site report operations against the document library")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Merge every site report into the two merged CSV artifacts
    #[clap(name = "merge")]
    Merge(MergeOptions),
}

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct MergeOptions {
    /// Local directory for per-site report copies and merged output
    #[arg(long, env = "FLATNET_REPORT_DIR", default_value = "files/reports")]
    pub local_dir: PathBuf,

    #[clap(flatten)]
    pub connection: SharePointArgs,
}

/// Walk the two-level project/site hierarchy under `root`, merge every
/// `group_report.csv` into the production and test accumulators, and upload
/// the non-empty merged tables back to `root`.
///
/// Strictly sequential: one remote call in flight at a time, and the first
/// failure aborts the run. Per-site local copies already written stay on
/// disk; there is no rollback across the walk.
pub async fn merge_reports<S: FileStore + ?Sized>(
    store: &S,
    root: &str,
    local_dir: &Path,
) -> Result<TaskOutcome, Error> {
    std::fs::create_dir_all(local_dir)
        .map_err(|e| Error::Io(f!("failed to create {}: {e}", local_dir.display())))?;

    let mut all_data = ReportTable::new();
    let mut test_data = ReportTable::new();

    let projects = store.list_folders(root).await?;
    log::debug!("projects: {projects:?}");

    for project in &projects {
        let project_folder = f!("{root}{project}");
        let site_folders = store.list_folders(&project_folder).await?;
        log::debug!("site folders under {project}: {site_folders:?}");

        for site_folder in &site_folders {
            let site_path = f!("{project_folder}/{site_folder}");
            let site_files = store.list_files(&site_path).await?;
            if !site_files.iter().any(|file| file == GROUP_REPORT_FILE) {
                continue;
            }

            let content = store.get_file(GROUP_REPORT_FILE, &site_path).await?;
            let local_copy = local_dir.join(f!("{project}_{site_folder}.csv"));
            std::fs::write(&local_copy, &content)
                .map_err(|e| Error::Io(f!("failed to write {}: {e}", local_copy.display())))?;

            let text = String::from_utf8(content)
                .map_err(|_| Error::Parse(f!("{site_path}/{GROUP_REPORT_FILE} is not valid UTF-8")))?;
            let rows = parse_report_csv(&text)
                .map_err(|e| Error::Parse(f!("{site_path}/{GROUP_REPORT_FILE}: {e}")))?;
            log::debug!("{} rows from {site_path}", rows.len());

            match route_project(project) {
                Route::Test => test_data.append(rows),
                Route::Production => all_data.append(rows),
            }
        }
    }

    if !all_data.is_empty() {
        write_and_upload(store, root, local_dir, MERGED_REPORT_FILE, &all_data).await?;
    }
    if !test_data.is_empty() {
        write_and_upload(store, root, local_dir, MERGED_TEST_REPORT_FILE, &test_data).await?;
    }

    if all_data.is_empty() && test_data.is_empty() {
        Ok(TaskOutcome::unchanged().with_msg("No reports found."))
    } else {
        Ok(TaskOutcome::changed().with_msg("Reports merged."))
    }
}

/// Persist a merged table locally, then upload it to the walk root,
/// overwriting any existing artifact of the same name.
async fn write_and_upload<S: FileStore + ?Sized>(
    store: &S,
    root: &str,
    local_dir: &Path,
    name: &str,
    table: &ReportTable,
) -> Result<(), Error> {
    let csv_text = table
        .to_csv_string()
        .map_err(|e| Error::Parse(e.to_string()))?;
    let local_path = local_dir.join(name);
    std::fs::write(&local_path, &csv_text)
        .map_err(|e| Error::Io(f!("failed to write {}: {e}", local_path.display())))?;
    store.upload_file(csv_text.as_bytes(), name, root).await?;
    Ok(())
}

async fn merge_data(options: &MergeOptions) -> Result<TaskOutcome, Error> {
    let store = SharePointClient::new(&options.connection)?;
    let root = f!(
        "{}/{}/{}/",
        options.connection.site_url,
        DOCUMENT_ROOT,
        PROJECT_ROOT_FOLDER
    );
    merge_reports(&store, &root, &options.local_dir).await
}

/// Handle the merge command
async fn merge_handler(options: MergeOptions) -> Result<()> {
    match merge_data(&options).await {
        Ok(outcome) => emit_outcome(&outcome),
        Err(error) => {
            emit_failure(&error);
            Err(error.into())
        }
    }
}

/// Run reports commands
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("Running reports command...");
    }

    match app.command {
        Commands::Merge(options) => merge_handler(options).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sharepoint::store::fake::InMemoryStore;
    use tempfile::TempDir;

    const ROOT: &str = "/sites/netops/Shared Documents/flat_networks_project/";

    /// Two production sites and one test site, each with a report.
    fn seeded_store() -> InMemoryStore {
        let mut store = InMemoryStore::default();
        store.add_folder(ROOT, "atlanta_rollout");
        store.add_folder(ROOT, "lab_migration");

        let atlanta = f!("{ROOT}atlanta_rollout");
        store.add_folder(&atlanta, "ATL1");
        store.add_folder(&atlanta, "ATL2");
        store.add_file(
            &f!("{atlanta}/ATL1"),
            GROUP_REPORT_FILE,
            b"date,project,job_id\n2024-01-01,atlanta_rollout,1\n",
        );
        store.add_file(
            &f!("{atlanta}/ATL2"),
            GROUP_REPORT_FILE,
            b"date,project,job_id\n2024-01-02,atlanta_rollout,2\n",
        );

        let lab = f!("{ROOT}lab_migration");
        store.add_folder(&lab, "LAB1");
        store.add_file(
            &f!("{lab}/LAB1"),
            GROUP_REPORT_FILE,
            b"date,project,job_id\n2024-01-03,lab_migration,3\n",
        );

        store
    }

    #[tokio::test]
    async fn test_merge_partitions_production_and_test() {
        let store = seeded_store();
        let local_dir = TempDir::new().unwrap();

        let outcome = merge_reports(&store, ROOT, local_dir.path()).await.unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.msg.as_deref(), Some("Reports merged."));

        let uploads = store.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 2);

        let (path, name, content) = &uploads[0];
        assert_eq!(path, ROOT);
        assert_eq!(name, "all_reports.csv");
        let text = String::from_utf8(content.clone()).unwrap();
        assert_eq!(text.lines().count(), 3); // header + two production rows
        assert!(text.contains("2024-01-01,atlanta_rollout"));
        assert!(text.contains("2024-01-02,atlanta_rollout"));

        let (_, name, content) = &uploads[1];
        assert_eq!(name, "all_reports_test.csv");
        let text = String::from_utf8(content.clone()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("2024-01-03,lab_migration"));
    }

    #[tokio::test]
    async fn test_merge_keeps_local_copies() {
        let store = seeded_store();
        let local_dir = TempDir::new().unwrap();

        merge_reports(&store, ROOT, local_dir.path()).await.unwrap();

        assert!(local_dir.path().join("atlanta_rollout_ATL1.csv").exists());
        assert!(local_dir.path().join("atlanta_rollout_ATL2.csv").exists());
        assert!(local_dir.path().join("lab_migration_LAB1.csv").exists());
        assert!(local_dir.path().join("all_reports.csv").exists());
        assert!(local_dir.path().join("all_reports_test.csv").exists());
    }

    #[tokio::test]
    async fn test_sites_without_reports_are_skipped() {
        let mut store = InMemoryStore::default();
        store.add_folder(ROOT, "atlanta_rollout");
        let atlanta = f!("{ROOT}atlanta_rollout");
        store.add_folder(&atlanta, "ATL1");
        store.add_folder(&atlanta, "ATL2");
        store.add_file(
            &f!("{atlanta}/ATL2"),
            GROUP_REPORT_FILE,
            b"date,project\n2024-01-02,atlanta_rollout\n",
        );
        // ATL1 has an unrelated file only
        store.add_file(&f!("{atlanta}/ATL1"), "notes.txt", b"not a report");

        let local_dir = TempDir::new().unwrap();
        let outcome = merge_reports(&store, ROOT, local_dir.path()).await.unwrap();

        assert!(outcome.changed);
        assert!(!local_dir.path().join("atlanta_rollout_ATL1.csv").exists());
        assert_eq!(store.uploads.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_reports_found_reports_no_change() {
        let mut store = InMemoryStore::default();
        store.add_folder(ROOT, "atlanta_rollout");
        store.add_folder(&f!("{ROOT}atlanta_rollout"), "ATL1");

        let local_dir = TempDir::new().unwrap();
        let outcome = merge_reports(&store, ROOT, local_dir.path()).await.unwrap();

        assert!(!outcome.changed);
        assert_eq!(outcome.msg.as_deref(), Some("No reports found."));
        assert!(store.uploads.lock().unwrap().is_empty());
        assert!(!local_dir.path().join("all_reports.csv").exists());
    }

    #[tokio::test]
    async fn test_test_project_prefix_routes_to_test_accumulator() {
        let mut store = InMemoryStore::default();
        store.add_folder(ROOT, "test_project_phase2");
        let project = f!("{ROOT}test_project_phase2");
        store.add_folder(&project, "SITE1");
        store.add_file(
            &f!("{project}/SITE1"),
            GROUP_REPORT_FILE,
            b"date,project\n2024-01-01,test_project_phase2\n",
        );

        let local_dir = TempDir::new().unwrap();
        merge_reports(&store, ROOT, local_dir.path()).await.unwrap();

        let uploads = store.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].1, "all_reports_test.csv");
    }

    #[tokio::test]
    async fn test_rows_keep_visit_order() {
        let store = seeded_store();
        let local_dir = TempDir::new().unwrap();

        merge_reports(&store, ROOT, local_dir.path()).await.unwrap();

        let uploads = store.uploads.lock().unwrap();
        let text = String::from_utf8(uploads[0].2.clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].starts_with("2024-01-01"));
        assert!(lines[2].starts_with("2024-01-02"));
    }
}
