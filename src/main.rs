// Entry point and high-level CLI flow.
//
// - Option [1] loads a booking sheet and runs the analysis pipeline.
// - Option [2] writes the exports and prints previews of every report.
// - After generating reports, the user can go back to the menu or exit.
//
// `--batch` skips the menu: load `--input`, generate once, exit.
use anyhow::{Context, Result};
use booking_analytics::config::{AnalysisConfig, PgFloorRule};
use booking_analytics::insights::{booking_funnel, generate_insights, success_metrics};
use booking_analytics::types::{MetricRow, ProcessedData};
use booking_analytics::util::{format_int, format_number};
use booking_analytics::{loader, output, pipeline};
use chrono::Local;
use clap::Parser;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "booking_analytics")]
#[command(about = "Summaries, breakdowns and anomaly flags for minute-level booking data", long_about = None)]
struct Cli {
    /// Booking sheet to load (.xlsx, .xls, .ods, .csv, .tsv or .json)
    #[arg(short, long, env = "BOOKING_INPUT")]
    input: Option<PathBuf>,

    /// Directory the report files are written to
    #[arg(short, long, default_value = ".", env = "BOOKING_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Rows shown in each console preview
    #[arg(long, default_value_t = 5)]
    preview_rows: usize,

    /// Only export minutes whose label contains this text
    #[arg(long)]
    minute_filter: Option<String>,

    /// Also flag pgSuccessRate values below this absolute floor
    #[arg(long)]
    pg_floor: Option<f64>,

    /// pgSuccessRate below this is high severity when --pg-floor is set
    #[arg(long, default_value_t = 20.0)]
    pg_critical: f64,

    /// Load --input, generate reports once and exit
    #[arg(long, default_value_t = false)]
    batch: bool,
}

struct Settings {
    output_dir: PathBuf,
    preview_rows: usize,
    minute_filter: Option<String>,
    analysis: AnalysisConfig,
}

// The last successfully processed file. A failed load leaves it untouched.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        data: None,
        file_name: String::new(),
    })
});

struct AppState {
    data: Option<ProcessedData>,
    file_name: String,
}

fn with_state<R>(f: impl FnOnce(&mut AppState) -> R) -> R {
    let mut state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
    f(&mut state)
}

/// Print `prompt` and read one trimmed line from stdin.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask whether to go back to the menu. `true` for `Y`, `false` for `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        let resp = read_line("Back to Report Selection (Y/N): ").to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn load(path: &Path, settings: &Settings) -> booking_analytics::Result<()> {
    let (table, load_report) = loader::load_table(path)?;
    let data = pipeline::process_with_config(&table, &settings.analysis);

    println!(
        "Processing dataset... ({} rows read, {} minute rows)",
        format_int(load_report.total_rows),
        format_int(data.time_series_data.len())
    );
    if load_report.short_rows > 0 {
        println!(
            "Note: {} rows had missing columns; missing values were read as 0.",
            format_int(load_report.short_rows)
        );
    }
    println!("");

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    with_state(|state| {
        state.data = Some(data);
        state.file_name = file_name;
    });
    Ok(())
}

/// Handle option [1]: ask for a path (defaulting to `--input`) and load it.
fn handle_load(default_input: Option<&Path>, settings: &Settings) {
    let prompt = match default_input {
        Some(p) => format!("File path [{}]: ", p.display()),
        None => "File path: ".to_string(),
    };
    let entered = read_line(&prompt);
    let path = if entered.is_empty() {
        match default_input {
            Some(p) => p.to_path_buf(),
            None => {
                println!("Error: No file given.\n");
                return;
            }
        }
    } else {
        PathBuf::from(entered)
    };

    if let Err(e) = load(&path, settings) {
        warn!(path = %path.display(), error = %e, "Load failed");
        eprintln!("Failed to process the file. Please check the format. ({})\n", e);
    }
}

fn section(title: &str, note: &str) {
    println!("{}", title);
    println!("({})\n", note);
}

/// Handle option [2]: write every export and print console previews.
fn generate_reports(settings: &Settings) -> booking_analytics::Result<()> {
    let (data, file_name) = with_state(|state| (state.data.clone(), state.file_name.clone()));
    let Some(data) = data else {
        println!("Error: No data loaded. Please load a booking file first (option 1).\n");
        return Ok(());
    };

    std::fs::create_dir_all(&settings.output_dir)?;
    let out = |name: &str| settings.output_dir.join(name);
    let rows = settings.preview_rows;

    println!("Generating reports...");
    println!("Outputs saved to {}\n", settings.output_dir.display());

    section("Report 1: Booking Summary", "Totals across all minutes");
    output::preview_table_rows(&output::summary_rows(&data.summary), rows);

    let funnel = booking_funnel(&data.summary);
    let funnel_rows: Vec<MetricRow> = funnel
        .stages
        .iter()
        .map(|s| MetricRow {
            metric: s.label.to_string(),
            value: format!(
                "{} ({}% kept, {}% dropped)",
                format_int(s.value),
                format_number(s.conversion, 1),
                format_number(s.drop_off, 1)
            ),
        })
        .collect();
    section("Report 2: Booking Funnel", "Attempts -> Settled -> Bookings");
    output::preview_table_rows(&funnel_rows, funnel_rows.len());

    let success = success_metrics(&data.time_series_data);
    let success_rows = vec![
        MetricRow {
            metric: "Avg PG Success Rate".to_string(),
            value: format!("{}%", format_number(success.avg_pg_success, 2)),
        },
        MetricRow {
            metric: "Avg Booking Vs Attempt".to_string(),
            value: format!("{}%", format_number(success.avg_booking_rate, 2)),
        },
        MetricRow {
            metric: "Minutes Below 50% PG".to_string(),
            value: format_int(success.low_pg_minutes),
        },
        MetricRow {
            metric: "Critical Minutes (<30% PG)".to_string(),
            value: format_int(success.critical_pg_minutes),
        },
    ];
    section("Report 3: Success Metrics", "Per-minute payment and booking rates");
    output::preview_table_rows(&success_rows, success_rows.len());

    section("Report 4: Channel Performance", "Share of total bookings");
    output::preview_table_rows(&output::breakdown_rows(&data.summary.channel_breakdown), rows);

    section("Report 5: Ticket Analysis", "Share of total bookings");
    output::preview_table_rows(&output::breakdown_rows(&data.summary.ticket_breakdown), rows);

    section("Report 6: Geographic Insights", "Bookings by city");
    output::preview_table_rows(
        &output::city_rows(&data.summary.city_breakdown, data.summary.total_bookings),
        rows,
    );

    let anomaly_rows = output::anomaly_rows(&data.anomalies);
    let anomaly_file = out("anomalies.csv");
    output::write_csv(&anomaly_file, &anomaly_rows)?;
    section(
        "Report 7: Anomaly Detection",
        "z-score above 2, ranked by value",
    );
    output::preview_table_rows(&anomaly_rows, rows);
    println!("(Full table exported to {})\n", anomaly_file.display());

    let insights = generate_insights(&data);
    section("Report 8: Insights", "Generated from the loaded data");
    output::preview_table_rows(&output::insight_rows(&insights), insights.len());

    let export = output::export_rows(&data.time_series_data, settings.minute_filter.as_deref());
    let export_file = out("booking_data.csv");
    output::write_csv(&export_file, &export)?;
    println!(
        "Minute data: {} rows exported to {}",
        format_int(export.len()),
        export_file.display()
    );

    let summary_file = out("summary.json");
    output::write_json(&summary_file, &data)?;
    println!("Summary JSON: {}", summary_file.display());

    let now = Local::now();
    let report_file = out(&output::text_report_file_name(&now));
    output::write_text(&report_file, &output::render_text_report(&file_name, &data, &now))?;
    println!("Text report: {}\n", report_file.display());

    info!(
        file = %file_name,
        anomalies = data.anomalies.len(),
        exported = export.len(),
        "Reports generated"
    );
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut analysis = AnalysisConfig::default();
    if let Some(floor) = cli.pg_floor {
        analysis = analysis.with_pg_floor(PgFloorRule {
            floor,
            critical: cli.pg_critical,
        });
    }
    analysis.validate()?;

    let settings = Settings {
        output_dir: cli.output_dir,
        preview_rows: cli.preview_rows,
        minute_filter: cli.minute_filter,
        analysis,
    };

    if cli.batch {
        let input = cli.input.context("--batch needs an --input file")?;
        load(&input, &settings).with_context(|| format!("loading {}", input.display()))?;
        generate_reports(&settings)?;
        return Ok(());
    }

    loop {
        println!("Booking Analytics");
        println!("[1] Load a booking file");
        println!("[2] Generate Reports\n");
        match read_line("Enter choice: ").as_str() {
            "1" => {
                handle_load(cli.input.as_deref(), &settings);
            }
            "2" => {
                println!("");
                if let Err(e) = generate_reports(&settings) {
                    eprintln!("Write error: {}", e);
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
    Ok(())
}
