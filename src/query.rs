use crate::types::{
    DetailRow, Direction, Gender, Kpi, Period, PopulationRecord, PopulationTable, RankedRow,
    TrendRow,
};
use crate::util::{format_millions, format_population, format_thousands_delta, sum_present};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Distinct periods, newest first.
pub fn years(table: &PopulationTable) -> Vec<Period> {
    let set: BTreeSet<Period> = table.iter().map(|r| r.year).collect();
    set.into_iter().rev().collect()
}

/// Distinct region names, sorted.
pub fn regions(table: &PopulationTable) -> Vec<String> {
    let set: BTreeSet<&str> = table.iter().map(|r| r.region.as_str()).collect();
    set.into_iter().map(str::to_string).collect()
}

/// Records of one period and gender without the nationwide row, ascending by
/// population with missing values last.
pub fn ranked_bar<'a>(
    table: &'a PopulationTable,
    year: Period,
    gender: Gender,
    nationwide: &str,
) -> Vec<&'a PopulationRecord> {
    let mut rows: Vec<&PopulationRecord> = table
        .iter()
        .filter(|r| r.year == year && r.gender == gender && r.region != nationwide)
        .collect();
    rows.sort_by(|a, b| match (a.population, b.population) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    rows
}

/// Per-period totals for one region and gender, oldest first.
///
/// Duplicate rows are summed; missing values contribute nothing.
pub fn trend(table: &PopulationTable, region: &str, gender: Gender) -> Vec<(Period, f64)> {
    let mut acc: BTreeMap<Period, f64> = BTreeMap::new();
    for r in region_rows(table, region, gender) {
        *acc.entry(r.year).or_insert(0.0) += r.population.unwrap_or(0.0);
    }
    acc.into_iter().collect()
}

/// Current-period total against the same period a year earlier.
///
/// A prior period the region has no rows for counts as zero.
pub fn year_over_year(table: &PopulationTable, region: &str, gender: Gender, year: Period) -> Kpi {
    let prior_year = year.prior();
    let total = |p: Period| {
        sum_present(region_rows(table, region, gender).filter(|r| r.year == p).map(|r| r.population))
    };
    let current = total(year);
    let prior = total(prior_year);
    let delta = current - prior;
    let direction = Direction::of(delta);
    Kpi {
        region: region.to_string(),
        gender,
        year,
        prior_year,
        current,
        prior,
        delta,
        direction,
        formatted_current: format_millions(current),
        formatted_delta: format_thousands_delta(direction.arrow(), delta),
    }
}

/// The records behind a KPI: one region, gender and period.
pub fn detail<'a>(
    table: &'a PopulationTable,
    region: &str,
    gender: Gender,
    year: Period,
) -> Vec<&'a PopulationRecord> {
    table
        .iter()
        .filter(|r| r.region == region && r.gender == gender && r.year == year)
        .collect()
}

fn region_rows<'a>(
    table: &'a PopulationTable,
    region: &'a str,
    gender: Gender,
) -> impl Iterator<Item = &'a PopulationRecord> + 'a {
    table.iter().filter(move |r| r.region == region && r.gender == gender)
}

// Display rows for the terminal previews.

pub fn ranked_rows(rows: &[&PopulationRecord]) -> Vec<RankedRow> {
    // Largest first on screen, the way the bar chart reads top-down.
    let (present, missing): (Vec<&&PopulationRecord>, Vec<&&PopulationRecord>) =
        rows.iter().partition(|r| r.population.is_some());
    present
        .into_iter()
        .rev()
        .chain(missing)
        .enumerate()
        .map(|(idx, r)| RankedRow {
            rank: idx + 1,
            region: r.region.clone(),
            population: format_population(r.population),
        })
        .collect()
}

pub fn trend_rows(points: &[(Period, f64)]) -> Vec<TrendRow> {
    points
        .iter()
        .map(|(p, v)| TrendRow { year: p.to_string(), population: format_population(Some(*v)) })
        .collect()
}

pub fn detail_rows(rows: &[&PopulationRecord]) -> Vec<DetailRow> {
    rows.iter()
        .map(|r| DetailRow {
            region: r.region.clone(),
            year: r.year.to_string(),
            gender: r.gender.label().to_string(),
            population: format_population(r.population),
        })
        .collect()
}
