//! Dynamic host inventory built from the seed CSV
//!
//! The seed file is a plain CSV whose first line defines the column names.
//! Each usable row contributes one host to one group: `marsha` names the
//! group, `device_ip` the device address, and the combined identity
//! `"<device_ip>.<marsha>"` keys the host. Rows missing either field are
//! dropped silently.
//!
//! The source may carry a `system_hostname` column, but it is never
//! consulted: every host gets the constant placeholder instead. That
//! matches the long-standing behavior of the seed pipeline and is kept
//! until the real hostname source is settled.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

/// Placeholder attached to every host as `system_hostname`.
pub const PLACEHOLDER_HOSTNAME: &str = "unknown";

/// Error type for inventory construction
#[derive(Debug)]
pub enum InventoryError {
    Csv(String),
}

impl std::fmt::Display for InventoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InventoryError::Csv(msg) => write!(f, "CSV error: {}", msg),
        }
    }
}

impl std::error::Error for InventoryError {}

/// Variables attached to a single host entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostVars {
    pub ansible_host: String,
    pub do_not_config_flag: bool,
    pub system_hostname: String,
}

/// Mapping of group names to member hosts with attached variables.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Inventory {
    groups: BTreeMap<String, Vec<String>>,
    hostvars: BTreeMap<String, HostVars>,
}

impl Inventory {
    /// Register a group. Registering the same group twice is a no-op.
    pub fn add_group(&mut self, name: &str) {
        self.groups.entry(name.to_string()).or_default();
    }

    /// Register a host under a group and attach its variables. Registering
    /// the same identity twice neither errors nor duplicates the member.
    pub fn add_host(&mut self, group: &str, host: &str, vars: HostVars) {
        let members = self.groups.entry(group.to_string()).or_default();
        if !members.iter().any(|member| member == host) {
            members.push(host.to_string());
        }
        self.hostvars.insert(host.to_string(), vars);
    }

    pub fn groups(&self) -> &BTreeMap<String, Vec<String>> {
        &self.groups
    }

    pub fn host_vars(&self, host: &str) -> Option<&HostVars> {
        self.hostvars.get(host)
    }

    /// Build the dynamic-inventory JSON document consumed by the
    /// orchestration engine: one object per group with its member hosts,
    /// plus `_meta.hostvars` carrying the per-host variables.
    pub fn to_value(&self) -> Value {
        let mut document = serde_json::Map::new();
        for (group, hosts) in &self.groups {
            document.insert(group.clone(), json!({ "hosts": hosts }));
        }
        document.insert(
            "_meta".to_string(),
            json!({ "hostvars": self.hostvars }),
        );
        Value::Object(document)
    }
}

/// Build an inventory from the seed CSV text.
///
/// A leading byte-order-mark is stripped before parsing. Field names come
/// from the header line; a field absent from a row reads as empty. The
/// `do_not_config` flag is true only when the source cell, lower-cased,
/// equals `"true"`.
pub fn build_inventory(csv_text: &str) -> Result<Inventory, InventoryError> {
    let text = csv_text.strip_prefix('\u{feff}').unwrap_or(csv_text);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .map_err(|err| InventoryError::Csv(err.to_string()))?
        .clone();

    let position = |name: &str| headers.iter().position(|header| header == name);
    let group_index = position("marsha");
    let host_index = position("device_ip");
    let do_not_config_index = position("do_not_config");

    let mut inventory = Inventory::default();
    for record in reader.records() {
        let record = record.map_err(|err| InventoryError::Csv(err.to_string()))?;
        let cell = |index: Option<usize>| index.and_then(|i| record.get(i)).unwrap_or("");

        let group = cell(group_index);
        let host = cell(host_index);
        if group.is_empty() || host.is_empty() {
            continue;
        }

        let do_not_config_flag = cell(do_not_config_index).to_lowercase() == "true";
        let combined_hostname = format!("{host}.{group}");

        inventory.add_group(group);
        inventory.add_host(
            group,
            &combined_hostname,
            HostVars {
                ansible_host: host.to_string(),
                do_not_config_flag,
                system_hostname: PLACEHOLDER_HOSTNAME.to_string(),
            },
        );
    }
    Ok(inventory)
}
