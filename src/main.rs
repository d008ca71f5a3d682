#![cfg(not(tarpaulin_include))]

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use node_status::config::Settings;
use node_status::session::Session;
use node_status::table::print_table;

/// Derive UP/DOWN node status from a packet-loss spreadsheet.
#[derive(Parser, Debug)]
#[command(name = "node-status", version, about)]
struct Cli {
    /// Spreadsheet to process (.xlsx or .xls)
    file: PathBuf,

    /// Directory the exported files are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Write the styled workbook (Modified_Node_Status.xlsx)
    #[arg(long)]
    xlsx: bool,

    /// Write the PNG snapshot (node_status_snapshot.png)
    #[arg(long)]
    snapshot: bool,

    /// Print the records as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// TOML file overriding the default settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log pipeline details
    #[arg(short, long)]
    verbose: bool,
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let session = Session::new(settings);

    session.upload(&cli.file).await?;
    let records = session.state().records.unwrap_or_default();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print_table(&records);
    }

    if cli.xlsx {
        let path = session.export_workbook()?.save_to(&cli.out_dir)?;
        println!("Saved {}", path.display());
    }

    if cli.snapshot {
        let path = session.generate_snapshot().await?.save_to(&cli.out_dir)?;
        println!("Saved {}", path.display());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
