use crate::errors::EditorResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Editor configuration, loaded from camelCase JSON. Every field has a
/// default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub page: PageGeometry,
    pub pagination: PaginationConfig,
    pub history: HistoryConfig,
    pub layout: TextMetrics,
}

impl EditorConfig {
    pub fn from_json(source: &str) -> EditorResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> EditorResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// Page box dimensions in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageGeometry {
    pub total_height: f64,
    pub header_height: f64,
    pub footer_height: f64,
    pub width: f64,
    /// Vertical space between stacked pages.
    pub gap: f64,
}

impl PageGeometry {
    /// Height available to the content region.
    pub fn content_budget(&self) -> f64 {
        self.total_height - self.header_height - self.footer_height
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            total_height: 365.0,
            header_height: 60.0,
            footer_height: 60.0,
            width: 600.0,
            gap: 24.0,
        }
    }
}

/// When the view runs pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettleTrigger {
    /// Only on commit transactions (Enter) and explicit settle calls.
    #[default]
    OnCommit,
    EveryTransaction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationConfig {
    pub trigger: SettleTrigger,
    pub max_settle_cycles: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            trigger: SettleTrigger::OnCommit,
            max_settle_cycles: 32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryConfig {
    /// Maximum undo levels (0 = unlimited)
    pub max_levels: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_levels: 100 }
    }
}

/// Fixed text metrics used by the estimating layout and headless geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextMetrics {
    pub line_height: f64,
    pub char_width: f64,
    pub image_height: f64,
    pub rule_height: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            line_height: 24.0,
            char_width: 8.0,
            image_height: 120.0,
            rule_height: 12.0,
        }
    }
}
