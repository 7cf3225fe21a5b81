mod analytics;
mod ingest;
mod records;
mod report;
mod storage;
mod web;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::ingest::{CaptureForm, ImageUpload};
use crate::records::{MissionFilter, DEFAULT_MISSION_ID};
use crate::report::{to_csv, ExportFormat, MissionExport, ReportData, ALL_MISSIONS};
use crate::storage::Storage;
use crate::web::Config;

#[derive(Parser)]
#[command(name = "rover-o-mat")]
#[command(about = "Rover photo, telemetry and mission report service")]
struct Cli {
    /// YAML config file. Defaults apply when it does not exist.
    #[arg(short, long, default_value = "config.yml")]
    config: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve,
    /// Print the route analysis as JSON
    Analyze {
        /// Mission to analyze; `default` or omitted analyzes every mission
        #[arg(long)]
        mission_id: Option<String>,
    },
    /// Write the map, HTML and PDF reports
    Report {
        #[arg(long)]
        mission_id: Option<String>,
    },
    /// Export stored data as JSON or CSV
    Export {
        /// Mission to export; all missions when omitted
        #[arg(long)]
        mission_id: Option<String>,
        #[arg(long, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Record a photo with its telemetry
    Capture(CaptureArgs),
}

#[derive(Args)]
struct CaptureArgs {
    /// Photo to store
    #[arg(long)]
    image: PathBuf,
    #[arg(long, allow_hyphen_values = true)]
    latitude: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    longitude: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    altitude: Option<String>,
    #[arg(long)]
    heading: Option<String>,
    #[arg(long)]
    speed: Option<String>,
    #[arg(long)]
    battery_level: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    temperature: Option<String>,
    #[arg(long)]
    humidity: Option<String>,
    #[arg(long)]
    note: Option<String>,
    #[arg(long)]
    mission_id: Option<String>,
    #[arg(long)]
    rover_id: Option<String>,
    /// JSON object with camera parameters
    #[arg(long)]
    camera_settings: Option<String>,
    /// Comma separated tags
    #[arg(long)]
    tags: Option<String>,
}

impl From<CaptureArgs> for CaptureForm {
    fn from(args: CaptureArgs) -> Self {
        CaptureForm {
            latitude: args.latitude,
            longitude: args.longitude,
            altitude: args.altitude,
            heading: args.heading,
            speed: args.speed,
            battery_level: args.battery_level,
            temperature: args.temperature,
            humidity: args.humidity,
            note: args.note,
            mission_id: args.mission_id,
            rover_id: args.rover_id,
            camera_settings: args.camera_settings,
            tags: args.tags,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Serve => serve(config),
        Commands::Analyze { mission_id } => analyze(&config, mission_id.as_deref()),
        Commands::Report { mission_id } => report(&config, mission_id.as_deref()),
        Commands::Export {
            mission_id,
            format,
            output,
        } => export(&config, mission_id.as_deref(), format, output.as_deref()),
        Commands::Capture(args) => capture(&config, args),
    }
}

fn serve(config: Config) -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(web::run_server(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn storage(config: &Config) -> Storage {
    Storage::new(config.storage.base_folder.clone())
}

fn analyze(config: &Config, mission_id: Option<&str>) -> ExitCode {
    let filter = MissionFilter::from_report_query(mission_id);
    match ReportData::load(&storage(config), &filter, DEFAULT_MISSION_ID) {
        Ok(data) => print_json(&data.analysis),
        Err(e) => {
            eprintln!("Error reading rover data: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn report(config: &Config, mission_id: Option<&str>) -> ExitCode {
    let settings = match config.report.settings() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let filter = MissionFilter::from_report_query(mission_id);

    match report::generate(&storage(config), &settings, &filter, Utc::now()) {
        Ok(outcome) => {
            if let Some(err) = &outcome.pdf_error {
                eprintln!("PDF report failed: {}", err);
            }
            print_json(&outcome)
        }
        Err(e) => {
            eprintln!("Report error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn export(
    config: &Config,
    mission_id: Option<&str>,
    format: ExportFormat,
    output: Option<&Path>,
) -> ExitCode {
    let filter = MissionFilter::from_query(mission_id);
    let data = match ReportData::load(&storage(config), &filter, ALL_MISSIONS) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading rover data: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let rendered = match format {
        ExportFormat::Csv => to_csv(&data.telemetry, &data.waypoints).map_err(|e| e.to_string()),
        ExportFormat::Json => serde_json::to_string_pretty(&MissionExport::new(data, Utc::now()))
            .map_err(|e| e.to_string()),
    };
    let rendered = match rendered {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Export error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match output {
        Some(path) => match std::fs::write(path, rendered) {
            Ok(()) => {
                println!("Exported {} data to {}", format, path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error writing {}: {}", path.display(), e);
                ExitCode::FAILURE
            }
        },
        None => {
            print!("{}", rendered);
            ExitCode::SUCCESS
        }
    }
}

fn capture(config: &Config, mut args: CaptureArgs) -> ExitCode {
    let image_path = std::mem::take(&mut args.image);
    let bytes = match std::fs::read(&image_path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error reading {}: {}", image_path.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let image = ImageUpload {
        filename: image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        bytes,
    };

    let storage = storage(config);
    match ingest::capture(&storage, args.into(), Some(image), Utc::now()) {
        Ok(outcome) => print_json(&outcome),
        Err(e) => {
            eprintln!("Capture failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
