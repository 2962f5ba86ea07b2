//! Configuration for popdash.
//!
//! [`DashboardConfig::load`] layers an optional TOML file over the embedded
//! defaults. [`DashboardConfig::defaults`] returns the defaults alone.

use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = r#"
[source]
path          = "data/population_2025.csv"
region_header = "행정구역(시군구)별"

[normalize]
nationwide_region = "전국"
period_policy     = "latest-per-year"

[display]
preview_rows = 20
"#;

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    pub source: SourceConfig,
    pub normalize: NormalizeConfig,
    pub display: DisplayConfig,
}

/// `[source]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub path: PathBuf,
    /// Expected first-row header of the region column.
    pub region_header: String,
}

/// `[normalize]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct NormalizeConfig {
    /// Region name of the nationwide aggregate row.
    pub nationwide_region: String,
    pub period_policy: PeriodPolicy,
}

/// `[display]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    pub preview_rows: usize,
}

/// How reporting periods are collapsed during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PeriodPolicy {
    /// One period per year, labelled `YYYY`: the annual figure when present,
    /// otherwise the latest monthly snapshot. Earlier same-year periods drop.
    #[default]
    LatestPerYear,
    /// Keep every period; monthly ones read `YYYY-MM`.
    Monthly,
}

/// The parts of the configuration the normalizer depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizeOptions {
    pub region_header: String,
    pub period_policy: PeriodPolicy,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        DashboardConfig::defaults().normalize_options()
    }
}

impl DashboardConfig {
    /// Defaults overlaid with `path`, when given. A missing file is an error
    /// here since the caller asked for it explicitly.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml));
        if let Some(p) = path {
            builder = builder.add_source(config::File::from(p).required(true));
        }
        builder.build()?.try_deserialize().map_err(Into::into)
    }

    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            region_header: self.source.region_header.clone(),
            period_policy: self.normalize.period_policy,
        }
    }
}
