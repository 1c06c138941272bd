use std::env::VarError;
use std::fmt;
use std::io::Error;
use std::path::PathBuf;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;
use tracing_error::SpanTrace;

pub const DEFAULT_DATA_FILE: &str = "CONFERENCIA LIVRO CAIXA 2025.xlsx";
pub const DEFAULT_SHEET: &str = "DADOS";
pub const NAME_COLUMN: &str = "Nome";
pub const IDENTIFIER_COLUMN: &str = "Inscrição Estadual";
pub const IDENTIFIER_WIDTH: usize = 13;

/// Columns shown in the field panel, in display order.
pub const FIELD_LIST: [&str; 6] = [
    NAME_COLUMN,
    "CPF",
    IDENTIFIER_COLUMN,
    "SENHA IMA",
    "TELEFONE",
    "EMAIL",
];

pub const HELP_TEXT: &str = "\
Search box
  <type>        filter the client list
  Up / Down     move in the client list
  Enter         select the highlighted client
  Esc           clear the search (quit when empty)
  Tab           go to the field panel

Field panel
  Up / Down     move between fields (also k / j)
  Enter, c, y   copy the highlighted field
  1 .. 6        copy field by number
  Tab / Esc     back to the search box
  q             quit

Anywhere
  F1            this help
  Ctrl+C        quit

Close this window with Esc or Enter.";

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub sheet_name: String,
    pub name_column: String,
    pub identifier_column: String,
    pub identifier_width: usize,
    pub fields: Vec<String>,
    pub event_poll_time: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            sheet_name: DEFAULT_SHEET.to_string(),
            name_column: NAME_COLUMN.to_string(),
            identifier_column: IDENTIFIER_COLUMN.to_string(),
            identifier_width: IDENTIFIER_WIDTH,
            fields: FIELD_LIST.iter().map(|f| f.to_string()).collect(),
            event_poll_time: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    Select,
    ToggleFocus,
    Exit,
    Help,
    CopyField,
    CopyFieldAt(usize),
    RawKey(KeyEvent),
}

#[derive(Debug)]
pub enum CCError {
    Io(Error),
    FileNotFound(PathBuf),
    PermissionDenied(PathBuf),
    SheetNotFound { sheet: String, path: PathBuf },
    SchemaError { column: String, sheet: String },
    UnknownFileType(PathBuf),
    LoadFailed { message: String, context: SpanTrace },
    Clipboard(String),
}

impl CCError {
    pub fn load_failed(message: impl Into<String>) -> Self {
        CCError::LoadFailed {
            message: message.into(),
            context: SpanTrace::capture(),
        }
    }
}

impl fmt::Display for CCError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CCError::Io(e) => write!(f, "I/O error: {e}"),
            CCError::FileNotFound(path) => write!(
                f,
                "File '{}' not found. Make sure it is in the working directory or pass its path.",
                path.display()
            ),
            CCError::PermissionDenied(path) => {
                write!(f, "Permission denied while reading '{}'.", path.display())
            }
            CCError::SheetNotFound { sheet, path } => write!(
                f,
                "Sheet '{sheet}' was not found in '{}'. Check the sheet name.",
                path.display()
            ),
            CCError::SchemaError { column, sheet } => write!(
                f,
                "Column '{column}' was not found in sheet '{sheet}'. Check the exact column name."
            ),
            CCError::UnknownFileType(path) => {
                write!(f, "Unsupported file type: '{}'.", path.display())
            }
            CCError::LoadFailed { message, .. } => {
                write!(f, "An error occurred while reading the file: {message}")
            }
            CCError::Clipboard(message) => write!(
                f,
                "Could not copy the text: {message}\nMake sure a clipboard provider is available (for example xclip or xsel on Linux)."
            ),
        }
    }
}

impl std::error::Error for CCError {}

impl From<Error> for CCError {
    fn from(err: Error) -> Self {
        CCError::Io(err)
    }
}

impl From<PolarsError> for CCError {
    fn from(err: PolarsError) -> Self {
        CCError::load_failed(err.to_string())
    }
}

impl From<calamine::Error> for CCError {
    fn from(err: calamine::Error) -> Self {
        CCError::load_failed(err.to_string())
    }
}

impl From<shellexpand::LookupError<VarError>> for CCError {
    fn from(err: shellexpand::LookupError<VarError>) -> Self {
        CCError::load_failed(err.to_string())
    }
}

impl From<arboard::Error> for CCError {
    fn from(err: arboard::Error) -> Self {
        CCError::Clipboard(err.to_string())
    }
}
