// Entry point and menu-driven terminal flow.
//
// - Option [1] loads and normalizes the CSV, printing diagnostics.
// - Option [2] asks for year, gender and region and prints the dashboard:
//   KPI, ranked regions, trend and detail table.
// - Option [3] exports the normalized table as long-form CSV.
use anyhow::Context;
use clap::Parser;
use popdash::config::DashboardConfig;
use popdash::types::{Gender, Period, PopulationTable};
use popdash::util::format_int;
use popdash::{output, query, CacheOutcome, TableCache};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "popdash", about = "Korean population dashboard")]
struct Cli {
    /// TOML file layered over the built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Source CSV; overrides `source.path` from the config.
    #[arg(long)]
    source: Option<PathBuf>,

    /// Also write each dashboard KPI to this JSON file.
    #[arg(long)]
    kpi_json: Option<PathBuf>,

    /// Log at debug level (RUST_LOG still wins when set).
    #[arg(long)]
    debug: bool,
}

struct App {
    config: DashboardConfig,
    source: PathBuf,
    kpi_json: Option<PathBuf>,
    cache: TableCache,
}

/// Print `label` and read one trimmed line. EOF reads as `None`.
fn prompt(label: &str) -> Option<String> {
    print!("{}: ", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

impl App {
    /// Option [1]. Re-reads the file; the cache decides whether to rebuild.
    fn load(&mut self) {
        let opts = self.config.normalize_options();
        match self.cache.get_or_load(&self.source, &opts) {
            Ok((table, outcome)) => {
                if let (CacheOutcome::Miss, Some(report)) = (outcome, self.cache.report()) {
                    println!(
                        "Processing dataset... ({} source rows, {} regions, {} records)",
                        format_int(report.source_rows),
                        format_int(report.regions),
                        format_int(report.records)
                    );
                    println!(
                        "Note: {} population cells missing or unparsable.",
                        format_int(report.missing_values)
                    );
                    if !report.dropped_periods.is_empty() {
                        let dropped: Vec<String> =
                            report.dropped_periods.iter().map(Period::to_string).collect();
                        println!("Info: superseded periods dropped: {}", dropped.join(", "));
                    }
                } else {
                    println!("Source unchanged; using the loaded table.");
                }
                println!("Loaded {} records.\n", format_int(table.len()));
            }
            Err(e) => {
                eprintln!("Failed to load {}: {}\n", self.source.display(), e);
            }
        }
    }

    fn loaded(&self) -> Option<Arc<PopulationTable>> {
        let table = self.cache.table();
        if table.is_none() {
            println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        }
        table
    }

    /// Option [2].
    fn dashboard(&self) -> anyhow::Result<()> {
        let Some(table) = self.loaded() else { return Ok(()) };
        let years = query::years(&table);
        let regions = query::regions(&table);
        let Some(&latest) = years.first() else {
            println!("(table is empty)\n");
            return Ok(());
        };
        let nationwide = self.config.normalize.nationwide_region.clone();

        let year_labels: Vec<String> = years.iter().map(Period::to_string).collect();
        println!("Years: {}", year_labels.join(", "));
        let year = match prompt(&format!("Year [{}]", latest)).filter(|s| !s.is_empty()) {
            None => latest,
            Some(s) => match years.iter().find(|p| p.to_string() == s) {
                Some(p) => *p,
                None => {
                    println!("Unknown year '{}'.\n", s);
                    return Ok(());
                }
            },
        };
        let gender = match prompt("Gender (전체/남자/여자) [전체]").filter(|s| !s.is_empty()) {
            None => Gender::All,
            Some(s) => s.parse::<Gender>()?,
        };
        let region = prompt(&format!("Region [{}]", nationwide))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| nationwide.clone());
        if !regions.contains(&region) {
            println!("Unknown region '{}'.\n", region);
            return Ok(());
        }

        let rows = self.config.display.preview_rows;
        let kpi = query::year_over_year(&table, &region, gender, year);
        println!("\n인구 요약 지표");
        println!("{} 총 인구수: {}", year, kpi.formatted_current);
        println!("{} 대비 증감: {}\n", kpi.prior_year, kpi.formatted_delta);
        if let Some(path) = &self.kpi_json {
            output::write_json(path, &kpi)
                .map_err(|e| anyhow::anyhow!("{}", e))
                .with_context(|| format!("failed to write {}", path.display()))?;
        }

        println!("{} 지역별 인구수 ({})\n", year, gender.label());
        let ranked = query::ranked_bar(&table, year, gender, &nationwide);
        output::preview_table_rows(&query::ranked_rows(&ranked), rows);

        println!("{} 연도별 인구 변화 ({})\n", region, gender.label());
        output::preview_table_rows(&query::trend_rows(&query::trend(&table, &region, gender)), rows);

        println!("선택 조건 데이터 테이블\n");
        let detail = query::detail(&table, &region, gender, year);
        output::preview_table_rows(&query::detail_rows(&detail), rows);
        Ok(())
    }

    /// Option [3].
    fn export(&self) -> anyhow::Result<()> {
        let Some(table) = self.loaded() else { return Ok(()) };
        let path = prompt("Output file [normalized_population.csv]")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "normalized_population.csv".to_string());
        output::export_table_csv(&path, &table)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("failed to export to {}", path))?;
        println!("({} records exported to {})\n", format_int(table.len()), path);
        Ok(())
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = DashboardConfig::load(cli.config.as_deref()).context("failed to load config")?;
    let source = cli.source.unwrap_or_else(|| config.source.path.clone());
    let mut app = App { config, source, kpi_json: cli.kpi_json, cache: TableCache::new() };

    loop {
        println!("Population Dashboard");
        println!("[1] Load the file");
        println!("[2] Show dashboard");
        println!("[3] Export normalized table");
        println!("[4] Exit\n");
        let Some(choice) = prompt("Enter choice") else { break };
        let result = match choice.as_str() {
            "1" => {
                app.load();
                Ok(())
            }
            "2" => app.dashboard(),
            "3" => app.export(),
            "4" => break,
            _ => {
                println!("Invalid choice. Please enter 1 to 4.\n");
                Ok(())
            }
        };
        if let Err(e) = result {
            eprintln!("Error: {:#}\n", e);
        }
    }
    println!("Exiting the program.");
    Ok(())
}
