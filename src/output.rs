use crate::types::PopulationTable;
use serde::Serialize;
use std::error::Error;
use std::io::Write;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Write the normalized table in long form: `region,year,gender,population`.
/// Missing populations are written as empty cells.
pub fn write_table_csv<W: Write>(out: W, table: &PopulationTable) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_writer(out);
    for r in table {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_table_csv(path: impl AsRef<Path>, table: &PopulationTable) -> Result<(), Box<dyn Error>> {
    let file = std::fs::File::create(path)?;
    write_table_csv(file, table)
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Markdown table of the first `max_rows` rows, or `(no rows)`.
pub fn render_rows<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", render_rows(rows, max_rows));
    if rows.len() > max_rows {
        println!("({} more rows)", rows.len() - max_rows);
    }
    println!();
}
