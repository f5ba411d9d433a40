//! Query templates and defaults for geometry fetches.

use serde::Deserialize;

use crate::error::GeometryError;

/// Placeholder substituted with the requested signal name.
pub const SIGNAL_PLACEHOLDER: &str = "{signal}";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometryConfig {
    pub config_query: String,
    pub calibration_query: String,
    pub signal_map_query: String,
    /// Appended to configuration queries as `version_config=`.
    pub config_version: Option<String>,
    /// Appended to calibration queries as `version_cal=`.
    pub calibration_version: Option<String>,
    /// Skip the availability filter of signal-geometry results.
    pub keep_all_signals: bool,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            config_query: "GEOM::get(signal={signal}, Config=1)".to_string(),
            calibration_query: "GEOM::get(signal={signal}, cal=1)".to_string(),
            signal_map_query: "GEOM::getSignalFile(signal={signal})".to_string(),
            config_version: None,
            calibration_version: None,
            keep_all_signals: false,
        }
    }
}

impl GeometryConfig {
    /// Parses a TOML document. Missing keys take their default, unknown
    /// keys are rejected.
    pub fn from_toml_str(content: &str) -> Result<Self, GeometryError> {
        let config: GeometryConfig =
            toml::from_str(content).map_err(|e| GeometryError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        for (key, template) in [
            ("config_query", &self.config_query),
            ("calibration_query", &self.calibration_query),
            ("signal_map_query", &self.signal_map_query),
        ] {
            if !template.contains(SIGNAL_PLACEHOLDER) {
                return Err(GeometryError::Config(format!(
                    "{key} '{template}' has no {SIGNAL_PLACEHOLDER} placeholder"
                )));
            }
        }
        Ok(())
    }

    pub fn config_query_for(&self, signal: &str) -> String {
        let query = self.config_query.replace(SIGNAL_PLACEHOLDER, signal);
        with_argument(query, "version_config", self.config_version.as_deref())
    }

    pub fn calibration_query_for(&self, signal: &str) -> String {
        let query = self.calibration_query.replace(SIGNAL_PLACEHOLDER, signal);
        with_argument(query, "version_cal", self.calibration_version.as_deref())
    }

    pub fn signal_map_query_for(&self, signal: &str) -> String {
        self.signal_map_query.replace(SIGNAL_PLACEHOLDER, signal)
    }
}

fn with_argument(mut query: String, key: &str, value: Option<&str>) -> String {
    let Some(value) = value else {
        return query;
    };
    let argument = format!(", {key}={value}");
    match query.rfind(')') {
        Some(close) if close == query.len() - 1 => query.insert_str(close, &argument),
        _ => query.push_str(&argument),
    }
    query
}
