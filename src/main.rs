use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use ratatui::DefaultTerminal;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, prelude::*};

mod clipboard;
mod controller;
mod domain;
mod inputter;
mod lookup;
mod model;
mod normalizer;
mod presenter;
mod store;
mod ui;

use clipboard::SystemClipboard;
use controller::Controller;
use domain::{AppConfig, CCError, DEFAULT_DATA_FILE, DEFAULT_SHEET};
use model::{Model, Status};
use store::RecordStore;
use ui::ClientUI;

/// Pick a client from a spreadsheet and copy its fields to the clipboard.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Workbook (xlsx, xls, ods) or csv file with the client records
    #[arg(default_value = DEFAULT_DATA_FILE)]
    path: String,

    /// Sheet holding the client records
    #[arg(long, default_value = DEFAULT_SHEET)]
    sheet: String,

    /// Where to write the log, defaults to clientclip.log in the temp dir
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.log_file.clone()) {
        eprintln!("Warning: logging disabled: {e}");
    }

    match run(args) {
        Err(e) => {
            error!("{e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_logging(log_file: Option<PathBuf>) -> Result<(), CCError> {
    let path = log_file.unwrap_or_else(|| std::env::temp_dir().join("clientclip.log"));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn run(args: Args) -> Result<(), CCError> {
    let path = shellexpand::full(&args.path)?;
    let config = AppConfig::default()
        .with_data_path(PathBuf::from(path.into_owned()))
        .with_sheet_name(args.sheet);
    info!("Starting clientclip with {}", config.data_path.display());

    // A file that cannot be loaded ends the run before the terminal is touched.
    let store = RecordStore::load(&config)?;

    let mut model = Model::init(&config, store, Box::new(SystemClipboard::default()));
    let ui = ClientUI::new(&config);
    let controller = Controller::new(&config);

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut model, &ui, &controller);
    ratatui::restore();

    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    model: &mut Model,
    ui: &ClientUI,
    controller: &Controller,
) -> Result<(), CCError> {
    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(model, f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(model)? {
            model.update(Some(message))?;
        };
    }
    Ok(())
}
