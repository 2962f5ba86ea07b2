//! Source CSV fixtures in the KOSIS two-header layout.

use popdash::key::{KIND_FEMALE, KIND_MALE, KIND_TOTAL};
use std::io::Write;
use tempfile::NamedTempFile;

pub const REGION_HEADER: &str = "행정구역(시군구)별";
pub const NATIONWIDE: &str = "전국";

/// Builds a two-header-row source file column group by column group.
#[derive(Debug, Clone, Default)]
pub struct SourceBuilder {
    periods: Vec<(String, Vec<String>)>,
    rows: Vec<(String, Vec<String>)>,
}

impl SourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a period with the standard total/male/female kinds.
    pub fn period(self, label: &str) -> Self {
        self.period_with_kinds(label, &[KIND_TOTAL, KIND_MALE, KIND_FEMALE])
    }

    pub fn period_with_kinds(mut self, label: &str, kinds: &[&str]) -> Self {
        self.periods
            .push((label.to_string(), kinds.iter().map(|k| k.to_string()).collect()));
        self
    }

    /// Add a data row; `cells` follow the column order of the periods added.
    pub fn row(mut self, region: &str, cells: &[&str]) -> Self {
        self.rows
            .push((region.to_string(), cells.iter().map(|c| c.to_string()).collect()));
        self
    }

    pub fn build(&self) -> String {
        let mut top = vec![REGION_HEADER.to_string()];
        let mut sub = vec![REGION_HEADER.to_string()];
        for (label, kinds) in &self.periods {
            for kind in kinds {
                top.push(label.clone());
                sub.push(kind.clone());
            }
        }
        let mut out = String::new();
        out.push_str(&top.join(","));
        out.push('\n');
        out.push_str(&sub.join(","));
        out.push('\n');
        for (region, cells) in &self.rows {
            out.push_str(region);
            for c in cells {
                out.push(',');
                out.push_str(c);
            }
            out.push('\n');
        }
        out
    }

    pub fn write(&self) -> NamedTempFile {
        write_source(&self.build())
    }
}

pub fn write_source(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp source");
    file.write_all(contents.as_bytes()).expect("write temp source");
    file.flush().expect("flush temp source");
    file
}

/// Two annual years plus four monthly snapshots of 2025, three regions.
pub fn standard_source() -> SourceBuilder {
    SourceBuilder::new()
        .period("2023")
        .period("2024")
        .period("2025.01")
        .period("2025.02")
        .period("2025.03")
        .period("2025.04")
        .row(
            NATIONWIDE,
            &[
                "51325329", "25565736", "25759593",
                "51000000", "25400000", "25600000",
                "51211168", "25500131", "25711037",
                "51204323", "25496220", "25708103",
                "51190562", "25488560", "25702002",
                "51200000", "25490000", "25710000",
            ],
        )
        .row(
            "서울특별시",
            &[
                "9386034", "4537612", "4848422",
                "9331828", "4505132", "4826696",
                "9334244", "4505908", "4828336",
                "9335444", "4506093", "4829351",
                "9333730", "4504799", "4828931",
                "9331466", "4503421", "4828045",
            ],
        )
        .row(
            "세종특별자치시",
            &[
                "386525", "191802", "194723",
                "390685", "193487", "X",
                "391165", "193698", "197467",
                "391495", "193836", "197659",
                "391705", "193940", "197765",
                "391964", "-", "197898",
            ],
        )
}

/// Path to the sample data shipped with the repo.
pub fn sample_path() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/population_2025.csv")
}
