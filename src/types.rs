use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// Gender dimension of a population count.
///
/// Serialized as `all`/`male`/`female`; [`Gender::label`] gives the Korean
/// label the source file and the dashboard use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    All,
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::All, Gender::Male, Gender::Female];

    pub fn label(self) -> &'static str {
        match self {
            Gender::All => "전체",
            Gender::Male => "남자",
            Gender::Female => "여자",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::All => "all",
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGender(pub String);

impl fmt::Display for UnknownGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown gender '{}' (expected all/male/female or 전체/남자/여자)", self.0)
    }
}

impl std::error::Error for UnknownGender {}

impl FromStr for Gender {
    type Err = UnknownGender;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" | "전체" => Ok(Gender::All),
            "male" | "남자" => Ok(Gender::Male),
            "female" | "여자" => Ok(Gender::Female),
            other => Err(UnknownGender(other.to_string())),
        }
    }
}

/// A reporting period: a whole year, or one month of a year.
///
/// Periods order chronologically; an annual period sorts after every month
/// of the same year since it is the year-end figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    pub year: i32,
    pub month: Option<u32>,
}

impl Period {
    pub fn annual(year: i32) -> Self {
        Period { year, month: None }
    }

    pub fn monthly(year: i32, month: u32) -> Self {
        Period { year, month: Some(month) }
    }

    /// The same period one year earlier.
    pub fn prior(self) -> Self {
        Period { year: self.year - 1, month: self.month }
    }

    pub fn is_annual(self) -> bool {
        self.month.is_none()
    }

    fn sort_key(self) -> (i32, u32) {
        (self.year, self.month.unwrap_or(13))
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.month {
            Some(m) => write!(f, "{:04}-{:02}", self.year, m),
            None => write!(f, "{:04}", self.year),
        }
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One normalized (region, period, gender, population) observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationRecord {
    pub region: String,
    pub year: Period,
    pub gender: Gender,
    /// `None` when the source cell could not be read as a number.
    pub population: Option<f64>,
}

/// The normalized long-form table. Built once per load, read-only after.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationTable {
    records: Vec<PopulationRecord>,
}

impl PopulationTable {
    pub fn new(records: Vec<PopulationRecord>) -> Self {
        PopulationTable { records }
    }

    pub fn records(&self) -> &[PopulationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PopulationRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a PopulationTable {
    type Item = &'a PopulationRecord;
    type IntoIter = std::slice::Iter<'a, PopulationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn of(delta: f64) -> Self {
        if delta > 0.0 {
            Direction::Up
        } else if delta < 0.0 {
            Direction::Down
        } else {
            Direction::Flat
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Up => "↑",
            Direction::Down => "↓",
            Direction::Flat => "-",
        }
    }
}

/// Year-over-year summary for one region and gender.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub region: String,
    pub gender: Gender,
    pub year: Period,
    pub prior_year: Period,
    pub current: f64,
    pub prior: f64,
    pub delta: f64,
    pub direction: Direction,
    pub formatted_current: String,
    pub formatted_delta: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RankedRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "순위")]
    pub rank: usize,
    #[serde(rename = "Region")]
    #[tabled(rename = "행정구역")]
    pub region: String,
    #[serde(rename = "Population")]
    #[tabled(rename = "인구수")]
    pub population: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TrendRow {
    #[serde(rename = "Year")]
    #[tabled(rename = "연도")]
    pub year: String,
    #[serde(rename = "Population")]
    #[tabled(rename = "인구수")]
    pub population: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DetailRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "행정구역")]
    pub region: String,
    #[serde(rename = "Year")]
    #[tabled(rename = "연도")]
    pub year: String,
    #[serde(rename = "Gender")]
    #[tabled(rename = "성별")]
    pub gender: String,
    #[serde(rename = "Population")]
    #[tabled(rename = "인구수")]
    pub population: String,
}
