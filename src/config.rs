//! Per-invocation pipeline configuration
//!
//! Nothing is persisted between runs: the operator picks the join key and
//! grouping each time, optionally from a JSON file.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main-table field used to match rows against auxiliary lookup tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKey {
    #[default]
    ServicoAcessorio,
    Classe,
}

impl JoinKey {
    pub fn column(&self) -> &'static str {
        match self {
            JoinKey::ServicoAcessorio => "servico_acessorio",
            JoinKey::Classe => "classe",
        }
    }
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Dimensions available for the grouped summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupField {
    Cliente,
    Classe,
    Termo,
}

impl GroupField {
    pub fn column(&self) -> &'static str {
        match self {
            GroupField::Cliente => "cliente",
            GroupField::Classe => "classe",
            GroupField::Termo => "termo",
        }
    }
}

/// Parameters for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Join key for auxiliary-table enrichment
    #[serde(default)]
    pub join_key: JoinKey,

    /// Date remaining months are counted from.
    /// None means the local current date.
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,

    /// Grouping for the summary sheet (empty disables it)
    #[serde(default = "default_group_by")]
    pub group_by: Vec<GroupField>,
}

fn default_group_by() -> Vec<GroupField> { vec![GroupField::Cliente] }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            join_key: JoinKey::default(),
            reference_date: None,
            group_by: default_group_by(),
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file; absent fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// The "today" used by remaining-month derivation
    pub fn today(&self) -> NaiveDate {
        self.reference_date.unwrap_or_else(|| Local::now().date_naive())
    }
}
