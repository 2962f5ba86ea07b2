//! Normalizer integration harness.
//!
//! # What this covers
//!
//! - **Output invariants**: every record has a known gender, canonical
//!   periods only, numeric-or-missing population.
//! - **Period collapse**: superseded monthly snapshots of a year are dropped
//!   and the survivor is relabelled `YYYY`; the monthly policy keeps them.
//! - **Missing values**: unparsable cells stay in the table as `None`.
//! - **Fatal errors**: missing file, header shape drift, unmapped kinds,
//!   malformed period labels, ragged rows.
//! - **Idempotence**: loading the same file twice yields the same table.
//!
//! # Running
//!
//! ```sh
//! cargo test --test normalize_harness
//! ```

mod common;
use common::*;
use popdash::key::{KIND_MALE, KIND_TOTAL};
use popdash::{
    normalize, normalize_reader, FormatError, Gender, NormalizeError, NormalizeOptions, Period,
    PeriodPolicy, PopulationTable,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use std::collections::BTreeSet;

fn opts() -> NormalizeOptions {
    NormalizeOptions::default()
}

fn load(builder: &SourceBuilder) -> Result<PopulationTable, NormalizeError> {
    normalize_reader(builder.build().as_bytes(), &opts()).map(|(t, _)| t)
}

fn find(table: &PopulationTable, region: &str, year: Period, gender: Gender) -> Option<f64> {
    table
        .iter()
        .find(|r| r.region == region && r.year == year && r.gender == gender)
        .and_then(|r| r.population)
}

// ---------------------------------------------------------------------------
// Output invariants
// ---------------------------------------------------------------------------

#[test]
fn standard_source_shape() {
    let file = standard_source().write();
    let (table, report) = normalize(file.path(), &opts()).unwrap();

    assert_eq!(report.source_rows, 3);
    assert_eq!(report.regions, 3);
    assert_eq!(report.records, 27);
    assert_eq!(table.len(), 27);
    assert_eq!(report.missing_values, 2);
    assert_eq!(
        report.kept_periods,
        vec![Period::annual(2023), Period::annual(2024), Period::annual(2025)]
    );
    assert_eq!(
        report.dropped_periods,
        vec![Period::monthly(2025, 1), Period::monthly(2025, 2), Period::monthly(2025, 3)]
    );
    assert!(report.duplicate_regions.is_empty());
}

#[test]
fn only_known_genders_and_canonical_years() {
    let table = load(&standard_source()).unwrap();
    let genders: BTreeSet<Gender> = table.iter().map(|r| r.gender).collect();
    assert_eq!(genders, Gender::ALL.into_iter().collect());

    let labels: BTreeSet<String> = table.iter().map(|r| r.year.to_string()).collect();
    assert_eq!(labels, ["2023", "2024", "2025"].iter().map(|s| s.to_string()).collect());
}

#[test]
fn latest_snapshot_becomes_the_year() {
    let table = load(&standard_source()).unwrap();
    assert_eq!(find(&table, NATIONWIDE, Period::annual(2025), Gender::All), Some(51_200_000.0));
    assert_eq!(find(&table, "서울특별시", Period::annual(2025), Gender::Male), Some(4_503_421.0));
}

#[test]
fn unparsable_cells_are_missing_not_zero() {
    let table = load(&standard_source()).unwrap();
    let sejong_female_2024 = table
        .iter()
        .find(|r| r.region == "세종특별자치시" && r.year == Period::annual(2024) && r.gender == Gender::Female)
        .expect("row is kept");
    assert_eq!(sejong_female_2024.population, None);

    let sejong_male_2025 = table
        .iter()
        .find(|r| r.region == "세종특별자치시" && r.year == Period::annual(2025) && r.gender == Gender::Male)
        .expect("row is kept");
    assert_eq!(sejong_male_2025.population, None);
}

#[test]
fn nationwide_row_is_kept() {
    let table = load(&standard_source()).unwrap();
    assert!(table.iter().any(|r| r.region == NATIONWIDE));
}

#[test]
fn monthly_policy_keeps_every_snapshot() {
    let opts = NormalizeOptions { period_policy: PeriodPolicy::Monthly, ..opts() };
    let (table, report) = normalize_reader(standard_source().build().as_bytes(), &opts).unwrap();
    let labels: BTreeSet<String> = table.iter().map(|r| r.year.to_string()).collect();
    assert_eq!(
        labels,
        ["2023", "2024", "2025-01", "2025-02", "2025-03", "2025-04"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    );
    assert!(report.dropped_periods.is_empty());
    assert_eq!(table.len(), 54);
}

#[test]
fn idempotent_over_the_same_file() {
    let file = standard_source().write();
    let (a, ra) = normalize(file.path(), &opts()).unwrap();
    let (b, rb) = normalize(file.path(), &opts()).unwrap();
    assert_eq!(a, b);
    assert_eq!(ra, rb);
}

#[test]
fn sample_data_nationwide_is_numeric_for_every_year() {
    let (table, _) = normalize(sample_path(), &opts()).unwrap();
    let years: BTreeSet<Period> = table.iter().map(|r| r.year).collect();
    assert_eq!(years.len(), 4);
    for year in years {
        for gender in Gender::ALL {
            let v = find(&table, NATIONWIDE, year, gender);
            assert!(v.is_some(), "nationwide {} {} missing", year, gender);
        }
    }
}

// ---------------------------------------------------------------------------
// Tolerated input variations
// ---------------------------------------------------------------------------

#[test]
fn bom_blank_lines_and_merged_period_cells() {
    let src = format!(
        "\u{feff}{h},2024,,\n,{t},{m},{f}\n{n},100,\"40\",60\n,,,\n서울특별시,\"1,000\",400,600\n",
        h = REGION_HEADER,
        t = KIND_TOTAL,
        m = KIND_MALE,
        f = popdash::key::KIND_FEMALE,
        n = NATIONWIDE,
    );
    let (table, report) = normalize_reader(src.as_bytes(), &opts()).unwrap();
    assert_eq!(report.source_rows, 2);
    assert_eq!(table.len(), 6);
    assert_eq!(find(&table, "서울특별시", Period::annual(2024), Gender::All), Some(1_000.0));
    assert_eq!(find(&table, NATIONWIDE, Period::annual(2024), Gender::Male), Some(40.0));
}

#[test]
fn duplicate_regions_are_reported() {
    let builder = SourceBuilder::new()
        .period("2024")
        .row("서울특별시", &["1", "1", "0"])
        .row("서울특별시", &["2", "1", "1"]);
    let (table, report) = normalize_reader(builder.build().as_bytes(), &opts()).unwrap();
    assert_eq!(report.duplicate_regions, vec!["서울특별시".to_string()]);
    assert_eq!(report.regions, 1);
    assert_eq!(table.len(), 6);
}

// ---------------------------------------------------------------------------
// Fatal errors
// ---------------------------------------------------------------------------

#[test]
fn missing_file_is_a_load_error() {
    let err = normalize("/nonexistent/population.csv", &opts()).unwrap_err();
    assert!(err.is_load_error());
    assert!(matches!(err, NormalizeError::Load { .. }));
}

#[test]
fn fourth_measurement_kind_is_fatal() {
    let builder = SourceBuilder::new()
        .period_with_kinds("2024", &[KIND_TOTAL, "세대수 (세대)"])
        .row(NATIONWIDE, &["51000000", "23000000"]);
    match load(&builder) {
        Err(NormalizeError::Format(FormatError::UnmappedKind(kind))) => {
            assert_eq!(kind, "세대수 (세대)")
        }
        other => panic!("expected unmapped kind, got {:?}", other),
    }
}

#[rstest]
#[case::empty("", FormatError::MissingHeader { found: 0 })]
#[case::single_header("행정구역(시군구)별,2024\n", FormatError::MissingHeader { found: 1 })]
#[case::no_data_columns("행정구역(시군구)별\n행정구역(시군구)별\n", FormatError::NoDataColumns)]
#[case::empty_kind("행정구역(시군구)별,2024\n,\n", FormatError::EmptyKind { column: 1 })]
#[case::empty_first_period(
    "행정구역(시군구)별,,2024\n,총인구수 (명),총인구수 (명)\n",
    FormatError::EmptyPeriod { column: 1 }
)]
#[case::bad_period(
    "행정구역(시군구)별,2024년\n,총인구수 (명)\n",
    FormatError::MalformedPeriod("2024년".to_string())
)]
#[case::wrong_region_header(
    "시도,2024\n,총인구수 (명)\n",
    FormatError::RegionHeader { expected: REGION_HEADER.to_string(), found: "시도".to_string() }
)]
#[case::ragged_header(
    "행정구역(시군구)별,2024,2024\n,총인구수 (명)\n",
    FormatError::RowWidth { row: 2, found: 2, expected: 3 }
)]
fn header_shape_errors(#[case] src: &str, #[case] expected: FormatError) {
    match normalize_reader(src.as_bytes(), &opts()) {
        Err(NormalizeError::Format(e)) => assert_eq!(e, expected),
        other => panic!("expected {:?}, got {:?}", expected, other),
    }
}

#[test]
fn ragged_data_row_is_fatal() {
    let builder = SourceBuilder::new().period("2024").row(NATIONWIDE, &["1", "2"]);
    match load(&builder) {
        Err(NormalizeError::Format(FormatError::RowWidth { found, expected, .. })) => {
            assert_eq!((found, expected), (3, 4));
        }
        other => panic!("expected row width error, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn cell() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..60_000_000).prop_map(|n| n.to_string()),
        Just(String::new()),
        Just("-".to_string()),
        Just("X".to_string()),
    ]
}

proptest! {
    #[test]
    fn any_cells_normalize_with_invariants(cells in proptest::collection::vec(cell(), 12)) {
        let refs: Vec<&str> = cells.iter().map(String::as_str).collect();
        let builder = SourceBuilder::new()
            .period("2024")
            .period("2025.03")
            .period("2025.06")
            .period("2025.09")
            .row(NATIONWIDE, &refs);
        let (table, report) = normalize_reader(builder.build().as_bytes(), &opts()).unwrap();

        prop_assert_eq!(table.len(), 6);
        prop_assert_eq!(report.dropped_periods.len(), 2);
        for r in &table {
            prop_assert!(r.year.is_annual());
            prop_assert!(r.population.map_or(true, |v| v >= 0.0));
        }
        let again = normalize_reader(builder.build().as_bytes(), &opts()).unwrap().0;
        prop_assert_eq!(table, again);
    }
}
