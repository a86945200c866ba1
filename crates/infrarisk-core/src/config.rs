use crate::error::{InfraRiskError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Default positional slack added to every buffer radius, in meters
pub const DEFAULT_SLACK_M: f64 = 0.5;

/// Width assumed for area assets without a usable width attribute, in meters
pub const DEFAULT_WIDTH_M: f64 = 4.0;

/// Default number of vertices used to approximate a full circle
pub const DEFAULT_BUFFER_SEGMENTS: usize = 64;

/// Fewest circle vertices accepted in configuration
pub const MIN_BUFFER_SEGMENTS: usize = 8;

/// Whether buffers stretch along longitude by `1 / cos(latitude)`
pub const DEFAULT_SCALE_LONGITUDE: bool = true;

pub const DEFAULT_ENDPOINT: &str = "https://www.mlit-data.jp/api/v1/";
pub const DEFAULT_PAGE_SIZE: usize = 500;
pub const DEFAULT_MAX_RECORDS: usize = 2000;
pub const DEFAULT_PAGE_DELAY_MS: u64 = 500;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// How candidate pairs are enumerated before the exact intersection test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Every area/linear pair, rejected early by bounding boxes
    #[default]
    Pairwise,
    /// Candidates drawn from an R-tree over linear asset bounds
    Rtree,
}

/// Parameters of one conflict-detection run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    pub slack_m: f64,
    pub default_width_m: f64,
    pub buffer_segments: usize,
    /// Stretch buffers along longitude at the asset's latitude; when off,
    /// both axes use the same flat degrees-per-meter factor
    pub scale_longitude: bool,
    pub strategy: MatchStrategy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            slack_m: DEFAULT_SLACK_M,
            default_width_m: DEFAULT_WIDTH_M,
            buffer_segments: DEFAULT_BUFFER_SEGMENTS,
            scale_longitude: DEFAULT_SCALE_LONGITUDE,
            strategy: MatchStrategy::Pairwise,
        }
    }
}

impl AnalysisConfig {
    /// Defaults with a specific slack
    pub fn with_slack(slack_m: f64) -> Self {
        Self { slack_m, ..Self::default() }
    }
}

/// Parameters of the catalog client
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub page_size: usize,
    pub max_records: usize,
    pub page_delay_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            page_size: DEFAULT_PAGE_SIZE,
            max_records: DEFAULT_MAX_RECORDS,
            page_delay_ms: DEFAULT_PAGE_DELAY_MS,
        }
    }
}

/// Layered configuration for InfraRisk
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub slack_m: ConfigValue<f64>,
    pub default_width_m: ConfigValue<f64>,
    pub buffer_segments: ConfigValue<usize>,
    pub scale_longitude: ConfigValue<bool>,
    pub strategy: ConfigValue<MatchStrategy>,
    pub endpoint: ConfigValue<String>,
    pub api_key: ConfigValue<Option<String>>,
    pub page_size: ConfigValue<usize>,
    pub max_records: ConfigValue<usize>,
    pub page_delay_ms: ConfigValue<u64>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            slack_m: ConfigValue::new(DEFAULT_SLACK_M, ConfigSource::Default),
            default_width_m: ConfigValue::new(DEFAULT_WIDTH_M, ConfigSource::Default),
            buffer_segments: ConfigValue::new(DEFAULT_BUFFER_SEGMENTS, ConfigSource::Default),
            scale_longitude: ConfigValue::new(DEFAULT_SCALE_LONGITUDE, ConfigSource::Default),
            strategy: ConfigValue::new(MatchStrategy::Pairwise, ConfigSource::Default),
            endpoint: ConfigValue::new(DEFAULT_ENDPOINT.to_string(), ConfigSource::Default),
            api_key: ConfigValue::new(None, ConfigSource::Default),
            page_size: ConfigValue::new(DEFAULT_PAGE_SIZE, ConfigSource::Default),
            max_records: ConfigValue::new(DEFAULT_MAX_RECORDS, ConfigSource::Default),
            page_delay_ms: ConfigValue::new(DEFAULT_PAGE_DELAY_MS, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| InfraRiskError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| InfraRiskError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(slack_m) = file_config.slack_m {
            self.slack_m.update(check_distance("slack_m", slack_m)?, ConfigSource::File);
        }

        if let Some(width) = file_config.default_width_m {
            self.default_width_m
                .update(check_distance("default_width_m", width)?, ConfigSource::File);
        }

        if let Some(segments) = file_config.buffer_segments {
            self.buffer_segments.update(check_segments(segments)?, ConfigSource::File);
        }

        if let Some(scale) = file_config.scale_longitude {
            self.scale_longitude.update(scale, ConfigSource::File);
        }

        if let Some(strategy) = file_config.strategy {
            self.strategy.update(strategy, ConfigSource::File);
        }

        if let Some(endpoint) = file_config.endpoint {
            self.endpoint.update(endpoint, ConfigSource::File);
        }

        if let Some(api_key) = file_config.api_key {
            self.api_key.update(Some(api_key), ConfigSource::File);
        }

        if let Some(page_size) = file_config.page_size {
            self.page_size.update(check_positive("page_size", page_size)?, ConfigSource::File);
        }

        if let Some(max_records) = file_config.max_records {
            self.max_records
                .update(check_positive("max_records", max_records)?, ConfigSource::File);
        }

        if let Some(delay) = file_config.page_delay_ms {
            self.page_delay_ms.update(delay, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Some(slack_m) =
            env_override("INFRARISK_SLACK_M", |s| check_distance("slack_m", parse_f64("slack_m", s)?))
        {
            self.slack_m.update(slack_m, ConfigSource::Environment);
        }

        if let Some(width) = env_override("INFRARISK_DEFAULT_WIDTH_M", |s| {
            check_distance("default_width_m", parse_f64("default_width_m", s)?)
        }) {
            self.default_width_m.update(width, ConfigSource::Environment);
        }

        if let Some(segments) = env_override("INFRARISK_BUFFER_SEGMENTS", |s| {
            check_segments(parse_usize("buffer_segments", s)?)
        }) {
            self.buffer_segments.update(segments, ConfigSource::Environment);
        }

        if let Some(scale) =
            env_override("INFRARISK_SCALE_LONGITUDE", |s| parse_bool("scale_longitude", s))
        {
            self.scale_longitude.update(scale, ConfigSource::Environment);
        }

        if let Some(strategy) = env_override("INFRARISK_STRATEGY", parse_strategy) {
            self.strategy.update(strategy, ConfigSource::Environment);
        }

        if let Ok(endpoint) = env::var("INFRARISK_ENDPOINT") {
            self.endpoint.update(endpoint, ConfigSource::Environment);
        }

        if let Ok(api_key) = env::var("INFRARISK_API_KEY") {
            self.api_key.update(Some(api_key), ConfigSource::Environment);
        }

        if let Some(page_size) = env_override("INFRARISK_PAGE_SIZE", |s| {
            check_positive("page_size", parse_usize("page_size", s)?)
        }) {
            self.page_size.update(page_size, ConfigSource::Environment);
        }

        if let Some(max_records) = env_override("INFRARISK_MAX_RECORDS", |s| {
            check_positive("max_records", parse_usize("max_records", s)?)
        }) {
            self.max_records.update(max_records, ConfigSource::Environment);
        }

        if let Some(delay) = env_override("INFRARISK_PAGE_DELAY_MS", |s| {
            s.trim().parse::<u64>().map_err(|e| InfraRiskError::ConfigInvalid {
                key: "page_delay_ms".to_string(),
                reason: e.to_string(),
            })
        }) {
            self.page_delay_ms.update(delay, ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) -> Result<()> {
        if let Some(slack_m) = overrides.slack_m {
            self.slack_m.update(check_distance("slack_m", slack_m)?, ConfigSource::Cli);
        }

        if let Some(width) = overrides.default_width_m {
            self.default_width_m
                .update(check_distance("default_width_m", width)?, ConfigSource::Cli);
        }

        if let Some(segments) = overrides.buffer_segments {
            self.buffer_segments.update(check_segments(segments)?, ConfigSource::Cli);
        }

        if let Some(scale) = overrides.scale_longitude {
            self.scale_longitude.update(scale, ConfigSource::Cli);
        }

        if let Some(strategy) = overrides.strategy {
            self.strategy.update(strategy, ConfigSource::Cli);
        }

        if let Some(endpoint) = overrides.endpoint {
            self.endpoint.update(endpoint, ConfigSource::Cli);
        }

        if let Some(api_key) = overrides.api_key {
            self.api_key.update(Some(api_key), ConfigSource::Cli);
        }

        if let Some(max_records) = overrides.max_records {
            self.max_records
                .update(check_positive("max_records", max_records)?, ConfigSource::Cli);
        }

        Ok(())
    }

    /// Project the layered values onto the analysis parameters
    pub fn to_analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            slack_m: self.slack_m.value,
            default_width_m: self.default_width_m.value,
            buffer_segments: self.buffer_segments.value,
            scale_longitude: self.scale_longitude.value,
            strategy: self.strategy.value,
        }
    }

    /// Project the layered values onto the catalog client parameters
    pub fn to_catalog_config(&self) -> CatalogConfig {
        CatalogConfig {
            endpoint: self.endpoint.value.clone(),
            api_key: self.api_key.value.clone(),
            page_size: self.page_size.value,
            max_records: self.max_records.value,
            page_delay_ms: self.page_delay_ms.value,
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert("slack_m".to_string(), (self.slack_m.value.to_string(), self.slack_m.source));

        map.insert(
            "default_width_m".to_string(),
            (self.default_width_m.value.to_string(), self.default_width_m.source),
        );

        map.insert(
            "buffer_segments".to_string(),
            (self.buffer_segments.value.to_string(), self.buffer_segments.source),
        );

        map.insert(
            "scale_longitude".to_string(),
            (self.scale_longitude.value.to_string(), self.scale_longitude.source),
        );

        map.insert(
            "strategy".to_string(),
            (format!("{:?}", self.strategy.value).to_lowercase(), self.strategy.source),
        );

        map.insert("endpoint".to_string(), (self.endpoint.value.clone(), self.endpoint.source));

        // Never echo the key itself
        let api_key = match &self.api_key.value {
            Some(_) => "<set>".to_string(),
            None => "<unset>".to_string(),
        };
        map.insert("api_key".to_string(), (api_key, self.api_key.source));

        map.insert(
            "page_size".to_string(),
            (self.page_size.value.to_string(), self.page_size.source),
        );

        map.insert(
            "max_records".to_string(),
            (self.max_records.value.to_string(), self.max_records.source),
        );

        map.insert(
            "page_delay_ms".to_string(),
            (self.page_delay_ms.value.to_string(), self.page_delay_ms.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    slack_m: Option<f64>,
    default_width_m: Option<f64>,
    buffer_segments: Option<usize>,
    scale_longitude: Option<bool>,
    strategy: Option<MatchStrategy>,
    endpoint: Option<String>,
    api_key: Option<String>,
    page_size: Option<usize>,
    max_records: Option<usize>,
    page_delay_ms: Option<u64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub slack_m: Option<f64>,
    pub default_width_m: Option<f64>,
    pub buffer_segments: Option<usize>,
    pub scale_longitude: Option<bool>,
    pub strategy: Option<MatchStrategy>,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub max_records: Option<usize>,
}

/// Read and parse an environment variable, logging and dropping bad values
fn env_override<T>(var: &str, parse: impl Fn(&str) -> Result<T>) -> Option<T> {
    let raw = env::var(var).ok()?;
    match parse(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring {} value '{}': {}", var, raw, e);
            None
        }
    }
}

/// Parse match strategy from string
pub fn parse_strategy(s: &str) -> Result<MatchStrategy> {
    match s.trim().to_lowercase().as_str() {
        "pairwise" | "pairs" => Ok(MatchStrategy::Pairwise),
        "rtree" | "r-tree" | "index" => Ok(MatchStrategy::Rtree),
        _ => Err(InfraRiskError::ConfigInvalid {
            key: "strategy".to_string(),
            reason: format!("Invalid strategy: {}. Use pairwise or rtree", s),
        }),
    }
}

fn parse_f64(key: &str, s: &str) -> Result<f64> {
    s.trim().parse::<f64>().map_err(|e| InfraRiskError::ConfigInvalid {
        key: key.to_string(),
        reason: format!("'{}' is not a number: {}", s, e),
    })
}

fn parse_bool(key: &str, s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(InfraRiskError::ConfigInvalid {
            key: key.to_string(),
            reason: format!("'{}' is not a boolean", s),
        }),
    }
}

fn parse_usize(key: &str, s: &str) -> Result<usize> {
    s.trim().parse::<usize>().map_err(|e| InfraRiskError::ConfigInvalid {
        key: key.to_string(),
        reason: format!("'{}' is not a non-negative integer: {}", s, e),
    })
}

fn check_distance(key: &str, meters: f64) -> Result<f64> {
    if !meters.is_finite() || meters < 0.0 {
        return Err(InfraRiskError::ConfigInvalid {
            key: key.to_string(),
            reason: format!("expected a finite, non-negative distance in meters, got {}", meters),
        });
    }
    Ok(meters)
}

fn check_segments(segments: usize) -> Result<usize> {
    if segments < MIN_BUFFER_SEGMENTS {
        return Err(InfraRiskError::ConfigInvalid {
            key: "buffer_segments".to_string(),
            reason: format!("must be at least {}, got {}", MIN_BUFFER_SEGMENTS, segments),
        });
    }
    Ok(segments)
}

fn check_positive(key: &str, value: usize) -> Result<usize> {
    if value == 0 {
        return Err(InfraRiskError::ConfigInvalid {
            key: key.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}
