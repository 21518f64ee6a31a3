use clap::Parser;
use color_eyre::Result;
use habitdash::{
    AppConfig, Args, ConfigManager, Dashboard, Dataset, InputEvent, LoadOptions, Output, APP_NAME,
};
use std::io::{BufRead, BufReader, Write};

/// Reads one JSON input event per line and emits the recomputed output
/// payloads as JSON lines. This is the stand-in for the UI and rendering
/// collaborators; the reactive core itself lives in the library.
fn run(args: &Args) -> Result<()> {
    let manager = match &args.config_dir {
        Some(dir) => ConfigManager::with_dir(dir.clone()),
        None => ConfigManager::new(APP_NAME)?,
    };

    if args.write_config {
        let path = manager.write_default_config(args.force)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = AppConfig::load(&manager)?;
    let mut options = LoadOptions::new();
    if let Some(sheet) = args.sheet.clone().or(config.data.excel_sheet.clone()) {
        options = options.with_excel_sheet(sheet);
    }
    if let Some(delimiter) = args
        .delimiter
        .map(|c| c as u8)
        .or_else(|| config.delimiter_byte())
    {
        options = options.with_delimiter(delimiter);
    }

    let dataset = Dataset::load(&args.path, &options)?;
    let mut dashboard = Dashboard::with_kpi_fields(dataset, config.kpi_fields());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if !args.no_initial {
        emit(&mut out, &dashboard.refresh_all())?;
    }

    let reader: Box<dyn BufRead> = match &args.events {
        Some(path) => Box::new(BufReader::new(std::fs::File::open(path)?)),
        None => Box::new(BufReader::new(std::io::stdin())),
    };
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event: InputEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                eprintln!("Ignoring malformed event: {}", e);
                continue;
            }
        };
        emit(&mut out, &dashboard.handle_event(event))?;
    }
    Ok(())
}

fn emit(out: &mut impl Write, outputs: &[Output]) -> Result<()> {
    for output in outputs {
        serde_json::to_writer(&mut *out, output)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
