//! Store inspection for the `summary` and `show` commands.

use std::str::FromStr;

use flo_model::Component;
use flo_store::ProjectStore;
use serde::Serialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCount {
    pub table: String,
    pub rows: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    Json,
    Yaml,
}

impl FromStr for DumpFormat {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(DumpFormat::Json),
            "yaml" | "yml" => Ok(DumpFormat::Yaml),
            other => Err(AppError::InvalidInput(format!(
                "unknown format '{}' (expected json or yaml)",
                other
            ))),
        }
    }
}

pub fn parse_component_key(key: &str) -> AppResult<Component> {
    Component::from_key(key).ok_or_else(|| AppError::ComponentNotFound(key.to_string()))
}

/// Row counts per table. Empty tables are dropped unless `include_empty`.
pub fn store_summary(store: &ProjectStore, include_empty: bool) -> AppResult<Vec<TableCount>> {
    Ok(store
        .summary()?
        .into_iter()
        .filter(|(_, rows)| include_empty || *rows > 0)
        .map(|(table, rows)| TableCount {
            table: table.to_string(),
            rows,
        })
        .collect())
}

/// One component read back from the store, serialised.
pub fn dump_component(
    store: &ProjectStore,
    component: Component,
    format: DumpFormat,
) -> AppResult<String> {
    let data = store
        .read_component(component)?
        .ok_or_else(|| AppError::ComponentNotFound(format!("{} holds no records", component)))?;
    let text = match format {
        DumpFormat::Json => serde_json::to_string_pretty(&data)
            .map_err(|e| AppError::InvalidInput(format!("cannot serialise {}: {}", component, e)))?,
        DumpFormat::Yaml => serde_yaml::to_string(&data)
            .map_err(|e| AppError::InvalidInput(format!("cannot serialise {}: {}", component, e)))?,
    };
    Ok(text)
}
