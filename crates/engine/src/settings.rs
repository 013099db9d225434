//! Admin preferences.

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Pie,
    Doughnut,
    Bar,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub primary_color: String,
    pub secondary_color: String,
    pub theme_mode: ThemeMode,
    pub chart_type: ChartType,
    pub chart_animation: bool,
    pub enable_notifications: bool,
    pub budget_alerts: bool,
    pub auto_backup: bool,
    /// Days.
    pub data_retention: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            primary_color: "#667eea".to_string(),
            secondary_color: "#764ba2".to_string(),
            theme_mode: ThemeMode::Light,
            chart_type: ChartType::Pie,
            chart_animation: true,
            enable_notifications: true,
            budget_alerts: true,
            auto_backup: false,
            data_retention: 365,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> ResultEngine<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(EngineError::InvalidValue(format!("{key}: expected true/false"))),
    }
}

fn parse_color(key: &str, value: &str) -> ResultEngine<String> {
    let value = value.trim();
    let hex = value.strip_prefix('#').unwrap_or("");
    if matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(value.to_string())
    } else {
        Err(EngineError::InvalidValue(format!("{key}: expected #rrggbb")))
    }
}

impl Settings {
    pub const KEYS: [&'static str; 9] = [
        "primaryColor",
        "secondaryColor",
        "themeMode",
        "chartType",
        "chartAnimation",
        "enableNotifications",
        "budgetAlerts",
        "autoBackup",
        "dataRetention",
    ];

    /// Sets one preference by its JSON key name.
    pub fn set(&mut self, key: &str, value: &str) -> ResultEngine<()> {
        match key {
            "primaryColor" => self.primary_color = parse_color(key, value)?,
            "secondaryColor" => self.secondary_color = parse_color(key, value)?,
            "themeMode" => {
                self.theme_mode = match value.trim() {
                    "light" => ThemeMode::Light,
                    "dark" => ThemeMode::Dark,
                    _ => return Err(EngineError::InvalidValue(format!("{key}: light|dark"))),
                }
            }
            "chartType" => {
                self.chart_type = match value.trim() {
                    "pie" => ChartType::Pie,
                    "doughnut" => ChartType::Doughnut,
                    "bar" => ChartType::Bar,
                    _ => {
                        return Err(EngineError::InvalidValue(format!(
                            "{key}: pie|doughnut|bar"
                        )));
                    }
                }
            }
            "chartAnimation" => self.chart_animation = parse_bool(key, value)?,
            "enableNotifications" => self.enable_notifications = parse_bool(key, value)?,
            "budgetAlerts" => self.budget_alerts = parse_bool(key, value)?,
            "autoBackup" => self.auto_backup = parse_bool(key, value)?,
            "dataRetention" => {
                self.data_retention = value
                    .trim()
                    .parse()
                    .map_err(|_| EngineError::InvalidValue(format!("{key}: expected days")))?
            }
            other => return Err(EngineError::KeyNotFound(other.to_string())),
        }
        Ok(())
    }
}
