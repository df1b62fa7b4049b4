use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use flo_app::{
    AppResult, CodecConfig, DumpFormat, ProgressEvent, SessionOptions, SessionReport, Stage,
    dump_component, export_dat, export_hdf5, import_dat_with_progress, import_hdf5,
    parse_component_key, store_summary, verify_dat,
};
use flo_core::ReportStatus;
use flo_store::ProjectStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flo-cli")]
#[command(about = "FLO-2D dataset codec - DAT/HDF5 <-> project store", long_about = None)]
struct Cli {
    /// Codec config file (YAML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Rows per store batch, overriding the config
    #[arg(long, global = true)]
    chunk_size: Option<usize>,
    /// Write each component in a single batch
    #[arg(long, global = true, conflicts_with = "chunk_size")]
    no_chunking: bool,
    /// Fail on the first component that reports warnings
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a DAT project directory into a project store
    ImportDat {
        /// Directory holding CONT.DAT, TOPO.DAT, ...
        dir: PathBuf,
        /// Project store (created when missing)
        store: PathBuf,
    },
    /// Export a project store as DAT files
    ExportDat {
        /// Project store
        store: PathBuf,
        /// Output directory (created when missing)
        dir: PathBuf,
    },
    /// Import an HDF5 file into a project store
    ImportHdf5 {
        /// Path to the HDF5 file
        file: PathBuf,
        /// Project store (created when missing)
        store: PathBuf,
    },
    /// Export a project store as an HDF5 file
    ExportHdf5 {
        /// Project store
        store: PathBuf,
        /// Output HDF5 file
        file: PathBuf,
    },
    /// Row counts of the project store tables
    Summary {
        /// Project store
        store: PathBuf,
        /// List empty tables too
        #[arg(long)]
        all: bool,
    },
    /// Print one component from the store
    Show {
        /// Project store
        store: PathBuf,
        /// Component key (grid, inflow, channels, arf, ...)
        component: String,
        /// Output format: json or yaml
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },
    /// Import a DAT directory in memory, re-export it and compare
    Verify {
        /// Directory holding the DAT files
        dir: PathBuf,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let options = session_options(&cli)?;

    match cli.command {
        Commands::ImportDat { dir, store } => cmd_import_dat(&dir, &store, &options),
        Commands::ExportDat { store, dir } => cmd_export_dat(&store, &dir, &options),
        Commands::ImportHdf5 { file, store } => cmd_import_hdf5(&file, &store, &options),
        Commands::ExportHdf5 { store, file } => cmd_export_hdf5(&store, &file, &options),
        Commands::Summary { store, all } => cmd_summary(&store, all),
        Commands::Show {
            store,
            component,
            format,
        } => cmd_show(&store, &component, &format),
        Commands::Verify { dir, json } => cmd_verify(&dir, &options, json),
    }
}

fn session_options(cli: &Cli) -> AppResult<SessionOptions> {
    let mut config = match &cli.config {
        Some(path) => CodecConfig::load(path)?,
        None => CodecConfig::default(),
    };
    if cli.no_chunking {
        config.chunk_size = None;
    } else if let Some(n) = cli.chunk_size {
        config.chunk_size = Some(n);
    }
    if cli.strict {
        config.strict = true;
    }
    config.validate()?;
    tracing::debug!(?config, "session config");
    Ok(SessionOptions::new(config))
}

fn cmd_import_dat(dir: &Path, store_path: &Path, options: &SessionOptions) -> AppResult<()> {
    println!("Importing {} into {}", dir.display(), store_path.display());
    let mut store = ProjectStore::create(store_path)?;

    let mut last_emit = Instant::now();
    let mut last_stage = String::new();
    let session = import_dat_with_progress(
        &mut store,
        dir,
        options,
        Some(&mut |event| {
            let stage_key = format!("{:?}{:?}", event.component, event.stage);
            if stage_key != last_stage || last_emit.elapsed().as_millis() >= 100 {
                render_cli_progress(&event);
                last_stage = stage_key;
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    print_session(&session);
    println!("✓ Import complete");
    Ok(())
}

fn cmd_export_dat(store_path: &Path, dir: &Path, options: &SessionOptions) -> AppResult<()> {
    let store = ProjectStore::open(store_path)?;
    let session = export_dat(&store, dir, options, None)?;
    print_session(&session);
    for file in &session.files {
        println!("  {:<24} {}", file.name, file.sha256);
    }
    println!("✓ Exported {} files to {}", session.files.len(), dir.display());
    Ok(())
}

fn cmd_import_hdf5(file: &Path, store_path: &Path, options: &SessionOptions) -> AppResult<()> {
    println!("Importing {} into {}", file.display(), store_path.display());
    let mut store = ProjectStore::create(store_path)?;
    let session = import_hdf5(&mut store, file, options, None)?;
    print_session(&session);
    println!("✓ Import complete");
    Ok(())
}

fn cmd_export_hdf5(store_path: &Path, file: &Path, options: &SessionOptions) -> AppResult<()> {
    let store = ProjectStore::open(store_path)?;
    let session = export_hdf5(&store, file, options, None)?;
    print_session(&session);
    println!("✓ Exported {}", file.display());
    Ok(())
}

fn cmd_summary(store_path: &Path, all: bool) -> AppResult<()> {
    let store = ProjectStore::open(store_path)?;
    let tables = store_summary(&store, all)?;
    if tables.is_empty() {
        println!("Project store is empty");
        return Ok(());
    }
    println!("Tables in {}:", store_path.display());
    for t in tables {
        println!("  {:<32} {:>10}", t.table, t.rows);
    }
    Ok(())
}

fn cmd_show(store_path: &Path, key: &str, format: &str) -> AppResult<()> {
    let store = ProjectStore::open(store_path)?;
    let component = parse_component_key(key)?;
    let format: DumpFormat = format.parse()?;
    println!("{}", dump_component(&store, component, format)?);
    Ok(())
}

fn cmd_verify(dir: &Path, options: &SessionOptions, json: bool) -> AppResult<()> {
    let report = verify_dat(dir, options)?;
    if json {
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| flo_app::AppError::InvalidInput(e.to_string()))?;
        println!("{}", text);
    } else {
        for check in &report.files {
            let mark = if check.matches() { "✓" } else { "✗" };
            println!("  {} {}", mark, check.name);
        }
    }
    let failed = report.mismatches().count();
    if failed > 0 {
        println!("✗ {} of {} files differ after a round trip", failed, report.files.len());
        std::process::exit(1);
    }
    println!("✓ {} files round-trip", report.files.len());
    Ok(())
}

fn print_session(session: &SessionReport) {
    for report in &session.components {
        match report.status {
            ReportStatus::Skipped => {}
            status => {
                let counts: Vec<String> = report
                    .counts
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect();
                println!(
                    "  {:<28} {:<5} {}",
                    report.component,
                    status.label(),
                    counts.join(" ")
                );
                if status != ReportStatus::Ok {
                    for message in &report.messages {
                        println!("      - {}", message);
                    }
                }
            }
        }
    }
    println!("{}", session.summary_line());
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &ProgressEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let component = event
        .component
        .map(|c| c.to_string())
        .unwrap_or_default();
    let mut line = format!(
        "\r{} {:<10} {:<28} elapsed={:.2}s",
        spinner[spin_idx],
        event.stage.label(),
        component,
        event.elapsed_wall_s
    );
    if let Stage::Writing { rows } = event.stage {
        line.push_str(&format!("  rows={}", rows));
    }
    print!("{}", line);
    let _ = io::stdout().flush();
}
