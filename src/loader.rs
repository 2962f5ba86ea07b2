use crate::config::{NormalizeOptions, PeriodPolicy};
use crate::error::{FormatError, NormalizeError};
use crate::key::CompositeKey;
use crate::types::{Period, PopulationRecord, PopulationTable};
use crate::util::parse_population;
use csv::{ReaderBuilder, StringRecord};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

const BOM: char = '\u{feff}';

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub source_rows: usize,
    pub regions: usize,
    pub records: usize,
    pub missing_values: usize,
    pub kept_periods: Vec<Period>,
    pub dropped_periods: Vec<Period>,
    pub duplicate_regions: Vec<String>,
}

/// Load `path` and reshape it into the long-form table.
pub fn normalize(
    path: impl AsRef<Path>,
    opts: &NormalizeOptions,
) -> Result<(PopulationTable, LoadReport), NormalizeError> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|source| NormalizeError::Load { path: path.to_path_buf(), source })?;
    let out = normalize_reader(file, opts)?;
    info!(
        path = %path.display(),
        regions = out.1.regions,
        records = out.1.records,
        missing = out.1.missing_values,
        "normalized population table"
    );
    Ok(out)
}

/// Same as [`normalize`] over any reader; nothing is returned unless the
/// whole input is well-formed.
pub fn normalize_reader<R: Read>(
    reader: R,
    opts: &NormalizeOptions,
) -> Result<(PopulationTable, LoadReport), NormalizeError> {
    let mut rdr = ReaderBuilder::new().has_headers(false).flexible(true).from_reader(reader);
    let mut rows = rdr.records();

    let top = rows.next().transpose()?.ok_or(FormatError::MissingHeader { found: 0 })?;
    let sub = rows.next().transpose()?.ok_or(FormatError::MissingHeader { found: 1 })?;
    let columns = flatten_header(&top, &sub, &opts.region_header)?;
    let keys = columns
        .iter()
        .map(|c| c.parse::<CompositeKey>())
        .collect::<Result<Vec<_>, _>>()?;
    let width = columns.len() + 1;

    let (canonical, dropped) = canonical_periods(&keys, opts.period_policy);
    for p in &dropped {
        debug!(period = %p, "dropping superseded period");
    }
    warn_duplicate_columns(&keys, &canonical);

    let mut wide: Vec<(String, Vec<Option<f64>>)> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut duplicate_regions = Vec::new();
    let mut source_rows = 0usize;
    let mut missing_values = 0usize;

    for result in rows {
        let rec = result?;
        if rec.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        source_rows += 1;
        if rec.len() != width {
            return Err(FormatError::RowWidth {
                row: rec.position().map(|p| p.line()).unwrap_or(0),
                found: rec.len(),
                expected: width,
            }
            .into());
        }
        let region = rec.get(0).unwrap_or_default().trim().to_string();
        if region.is_empty() {
            warn!(line = rec.position().map(|p| p.line()), "skipping row without region name");
            continue;
        }
        if !seen.insert(region.clone()) {
            warn!(region = %region, "region appears more than once");
            duplicate_regions.push(region.clone());
        }
        let values: Vec<Option<f64>> = rec.iter().skip(1).map(|f| parse_population(Some(f))).collect();
        wide.push((region, values));
    }

    // Wide to long, column by column.
    let mut records = Vec::new();
    for (col, key) in keys.iter().enumerate() {
        let Some(year) = canonical.get(&key.period) else { continue };
        for (region, values) in &wide {
            let population = values[col];
            if population.is_none() {
                missing_values += 1;
            }
            records.push(PopulationRecord {
                region: region.clone(),
                year: *year,
                gender: key.gender,
                population,
            });
        }
    }

    let mut kept_periods: Vec<Period> = canonical.values().copied().collect();
    kept_periods.sort();
    kept_periods.dedup();

    let report = LoadReport {
        source_rows,
        regions: seen.len(),
        records: records.len(),
        missing_values,
        kept_periods,
        dropped_periods: dropped,
        duplicate_regions,
    };
    Ok((PopulationTable::new(records), report))
}

/// Collapse the two header rows into one composite key per data column.
///
/// Column 0 is the region column: its top cell must be `region_header` and
/// its second cell blank or a repeat. Blank period cells inherit the period
/// to their left, as merged-cell exports leave them.
pub fn flatten_header(
    top: &StringRecord,
    sub: &StringRecord,
    region_header: &str,
) -> Result<Vec<String>, FormatError> {
    if top.len() != sub.len() {
        return Err(FormatError::RowWidth { row: 2, found: sub.len(), expected: top.len() });
    }
    let first = top.get(0).unwrap_or_default().trim_start_matches(BOM).trim();
    if first != region_header {
        return Err(FormatError::RegionHeader {
            expected: region_header.to_string(),
            found: first.to_string(),
        });
    }
    let second = sub.get(0).unwrap_or_default().trim();
    if !second.is_empty() && second != region_header {
        return Err(FormatError::RegionHeader {
            expected: region_header.to_string(),
            found: second.to_string(),
        });
    }
    if top.len() < 2 {
        return Err(FormatError::NoDataColumns);
    }

    let mut columns = Vec::with_capacity(top.len() - 1);
    let mut period = "";
    for column in 1..top.len() {
        let cell = top.get(column).unwrap_or_default().trim();
        if !cell.is_empty() {
            period = cell;
        } else if period.is_empty() {
            return Err(FormatError::EmptyPeriod { column });
        }
        let kind = sub.get(column).unwrap_or_default().trim();
        if kind.is_empty() {
            return Err(FormatError::EmptyKind { column });
        }
        columns.push(CompositeKey::join(period, kind));
    }
    Ok(columns)
}

/// Map every raw period to the label it is kept under; periods absent from
/// the map are dropped. Returns the map and the dropped periods in order.
pub fn canonical_periods(
    keys: &[CompositeKey],
    policy: PeriodPolicy,
) -> (HashMap<Period, Period>, Vec<Period>) {
    let mut by_year: BTreeMap<i32, Vec<Period>> = BTreeMap::new();
    for k in keys {
        let periods = by_year.entry(k.period.year).or_default();
        if !periods.contains(&k.period) {
            periods.push(k.period);
        }
    }

    let mut canonical = HashMap::new();
    let mut dropped = Vec::new();
    for (year, mut periods) in by_year {
        periods.sort();
        match policy {
            PeriodPolicy::Monthly => {
                canonical.extend(periods.into_iter().map(|p| (p, p)));
            }
            PeriodPolicy::LatestPerYear => {
                // Sorted ascending; the annual figure sorts last when present.
                if let Some(latest) = periods.pop() {
                    canonical.insert(latest, Period::annual(year));
                }
                dropped.extend(periods);
            }
        }
    }
    (canonical, dropped)
}

fn warn_duplicate_columns(keys: &[CompositeKey], canonical: &HashMap<Period, Period>) {
    let mut seen = HashSet::new();
    for k in keys {
        if let Some(p) = canonical.get(&k.period) {
            if !seen.insert((*p, k.gender)) {
                warn!(period = %p, gender = %k.gender, "duplicate column; values will be summed");
            }
        }
    }
}
