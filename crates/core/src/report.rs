//! The shared site-report schema, row routing, and accumulation
//!
//! Historically the merge and conversion paths each carried their own column
//! list, drifting slightly apart. Both paths now share this single schema:
//! [`COLUMNS`] is the canonical column order and [`ReportRow`] holds one cell
//! per column as a named optional field. `switch_name` and `switch_os` are
//! only ever populated by the conversion path, but they are ordinary optional
//! fields like every other cell.

use serde::{Deserialize, Serialize};

/// Canonical column order of a site report.
pub const COLUMNS: [&str; 19] = [
    "date",
    "project",
    "job_id",
    "switch_ip",
    "switch_name",
    "switch_os",
    "ssh_version",
    "marsha",
    "ping_before",
    "snmp",
    "ping_after_lldp",
    "do_not_config",
    "ping_after",
    "interfaces",
    "reload_timer_set",
    "reload_timer_cancelled",
    "failure_reason",
    "success",
    "warnings",
];

/// Anchored at the start of the project name, like the routing rule it
/// replaces: `lab_migration` is a test project, `collab` is not.
const TEST_PROJECT_PATTERN: &str = r"^(?:lab|test_project)";

/// Error type for report parsing and serialization
#[derive(Debug)]
pub enum ReportError {
    Csv(String),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Csv(msg) => write!(f, "CSV error: {}", msg),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> Self {
        ReportError::Csv(err.to_string())
    }
}

/// One site-report record. Every cell is optional; a column absent from the
/// source simply leaves its field unset.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub date: Option<String>,
    pub project: Option<String>,
    pub job_id: Option<String>,
    pub switch_ip: Option<String>,
    pub switch_name: Option<String>,
    pub switch_os: Option<String>,
    pub ssh_version: Option<String>,
    pub marsha: Option<String>,
    pub ping_before: Option<String>,
    pub snmp: Option<String>,
    pub ping_after_lldp: Option<String>,
    pub do_not_config: Option<String>,
    pub ping_after: Option<String>,
    pub interfaces: Option<String>,
    pub reload_timer_set: Option<String>,
    pub reload_timer_cancelled: Option<String>,
    pub failure_reason: Option<String>,
    pub success: Option<String>,
    pub warnings: Option<String>,
}

impl ReportRow {
    fn field(&self, column: &str) -> Option<&Option<String>> {
        match column {
            "date" => Some(&self.date),
            "project" => Some(&self.project),
            "job_id" => Some(&self.job_id),
            "switch_ip" => Some(&self.switch_ip),
            "switch_name" => Some(&self.switch_name),
            "switch_os" => Some(&self.switch_os),
            "ssh_version" => Some(&self.ssh_version),
            "marsha" => Some(&self.marsha),
            "ping_before" => Some(&self.ping_before),
            "snmp" => Some(&self.snmp),
            "ping_after_lldp" => Some(&self.ping_after_lldp),
            "do_not_config" => Some(&self.do_not_config),
            "ping_after" => Some(&self.ping_after),
            "interfaces" => Some(&self.interfaces),
            "reload_timer_set" => Some(&self.reload_timer_set),
            "reload_timer_cancelled" => Some(&self.reload_timer_cancelled),
            "failure_reason" => Some(&self.failure_reason),
            "success" => Some(&self.success),
            "warnings" => Some(&self.warnings),
            _ => None,
        }
    }

    fn field_mut(&mut self, column: &str) -> Option<&mut Option<String>> {
        match column {
            "date" => Some(&mut self.date),
            "project" => Some(&mut self.project),
            "job_id" => Some(&mut self.job_id),
            "switch_ip" => Some(&mut self.switch_ip),
            "switch_name" => Some(&mut self.switch_name),
            "switch_os" => Some(&mut self.switch_os),
            "ssh_version" => Some(&mut self.ssh_version),
            "marsha" => Some(&mut self.marsha),
            "ping_before" => Some(&mut self.ping_before),
            "snmp" => Some(&mut self.snmp),
            "ping_after_lldp" => Some(&mut self.ping_after_lldp),
            "do_not_config" => Some(&mut self.do_not_config),
            "ping_after" => Some(&mut self.ping_after),
            "interfaces" => Some(&mut self.interfaces),
            "reload_timer_set" => Some(&mut self.reload_timer_set),
            "reload_timer_cancelled" => Some(&mut self.reload_timer_cancelled),
            "failure_reason" => Some(&mut self.failure_reason),
            "success" => Some(&mut self.success),
            "warnings" => Some(&mut self.warnings),
            _ => None,
        }
    }

    /// Read a cell by column name. `None` for unset cells and unknown columns.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.field(column).and_then(|cell| cell.as_deref())
    }

    /// Set a cell by column name. Unknown columns are ignored; returns
    /// whether the column is part of the schema.
    pub fn set(&mut self, column: &str, value: impl Into<String>) -> bool {
        match self.field_mut(column) {
            Some(cell) => {
                *cell = Some(value.into());
                true
            }
            None => false,
        }
    }
}

/// Where a project's rows accumulate during a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Production,
    Test,
}

/// Route a project's rows to the production or test accumulator.
///
/// Case-sensitive, anchored at the start of the project name.
pub fn route_project(project: &str) -> Route {
    let re = regex::Regex::new(TEST_PROJECT_PATTERN).unwrap();
    if re.is_match(project) {
        Route::Test
    } else {
        Route::Production
    }
}

/// Parse a site report into rows using header-derived column names.
///
/// Columns absent from the source leave their cells unset - that is not an
/// error. Columns outside the schema are ignored. Empty cells read as unset.
pub fn parse_report_csv(text: &str) -> Result<Vec<ReportRow>, ReportError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();

    let positions: Vec<Option<usize>> = COLUMNS
        .iter()
        .map(|column| headers.iter().position(|header| header == *column))
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = ReportRow::default();
        for (column, position) in COLUMNS.iter().zip(&positions) {
            let value = position.and_then(|index| record.get(index)).unwrap_or("");
            if !value.is_empty() {
                row.set(column, value);
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

/// An ordered, growing table of report rows collected during a merge.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportTable {
    rows: Vec<ReportRow>,
}

impl ReportTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: ReportRow) {
        self.rows.push(row);
    }

    pub fn append(&mut self, rows: Vec<ReportRow>) {
        self.rows.extend(rows);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Serialize to CSV with the canonical header. Unset cells are written
    /// as empty fields.
    pub fn to_csv_string(&self) -> Result<String, ReportError> {
        self.write_csv(None)
    }

    /// Serialize to CSV with the canonical header, writing `fill` for every
    /// unset cell.
    pub fn to_csv_string_filled(&self, fill: &str) -> Result<String, ReportError> {
        self.write_csv(Some(fill))
    }

    fn write_csv(&self, fill: Option<&str>) -> Result<String, ReportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(COLUMNS)?;
        for row in &self.rows {
            let record = COLUMNS
                .iter()
                .map(|column| row.get(column).or(fill).unwrap_or(""));
            writer.write_record(record)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| ReportError::Csv(err.to_string()))?;
        String::from_utf8(bytes).map_err(|err| ReportError::Csv(err.to_string()))
    }
}
