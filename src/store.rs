use calamine::{Data, Reader, open_workbook_auto};
use polars::prelude::*;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::domain::{AppConfig, CCError};
use crate::normalizer::RawValue;

#[derive(Debug, PartialEq)]
enum FileType {
    WORKBOOK,
    CSV,
}

#[derive(Debug)]
struct FileInfo {
    path: PathBuf,
    file_size: u64,
    file_type: FileType,
}

/// One client record, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: HashMap<String, RawValue>,
}

impl Row {
    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, RawValue)>) -> Self {
        let mut cells = HashMap::new();
        for (k, v) in pairs {
            // Like a header lookup, the first column of a given name wins.
            cells.entry(k.into()).or_insert(v);
        }
        Row { cells }
    }

    pub fn get(&self, field: &str) -> Option<&RawValue> {
        self.cells.get(field)
    }

    /// True only for lines with no content at all. Whitespace counts as content.
    fn is_blank(&self) -> bool {
        self.cells.values().all(|v| matches!(v, RawValue::Empty))
    }
}

/// The table loaded from the data file. Read only once built.
#[derive(Debug, Default)]
pub struct RecordStore {
    path: PathBuf,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl RecordStore {
    #[instrument(skip(config), fields(path = %config.data_path.display(), sheet = %config.sheet_name))]
    pub fn load(config: &AppConfig) -> Result<Self, CCError> {
        let start_time = Instant::now();
        let file_info = Self::get_file_info(config.data_path.clone())?;
        debug!("Loading {:?} ({} bytes)", file_info.file_type, file_info.file_size);

        let (columns, rows) = match file_info.file_type {
            FileType::WORKBOOK => Self::load_workbook(&file_info.path, &config.sheet_name)?,
            FileType::CSV => Self::load_csv(&file_info.path)?,
        };

        info!("Available columns in '{}': {:?}", config.sheet_name, columns);
        if !columns.iter().any(|c| c == &config.name_column) {
            return Err(CCError::SchemaError {
                column: config.name_column.clone(),
                sheet: config.sheet_name.clone(),
            });
        }

        info!(
            "Loaded {} records in {}ms",
            rows.len(),
            start_time.elapsed().as_millis()
        );
        Ok(Self {
            path: file_info.path,
            columns,
            rows,
        })
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            path: PathBuf::new(),
            columns,
            rows,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn get_file_info(path: PathBuf) -> Result<FileInfo, CCError> {
        let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CCError::FileNotFound(path.clone()),
            ErrorKind::PermissionDenied => CCError::PermissionDenied(path.clone()),
            _ => CCError::Io(e),
        })?;
        if !metadata.is_file() {
            return Err(CCError::load_failed(format!(
                "'{}' is not a file",
                path.display()
            )));
        }

        let file_size = metadata.len();
        let file_type = Self::detect_file_type(&path)?;

        Ok(FileInfo {
            path,
            file_size,
            file_type,
        })
    }

    fn detect_file_type(path: &Path) -> Result<FileType, CCError> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_uppercase())
            .as_deref()
        {
            Some("XLSX") | Some("XLSM") | Some("XLSB") | Some("XLS") | Some("ODS") => {
                Ok(FileType::WORKBOOK)
            }
            Some("CSV") => Ok(FileType::CSV),
            _ => Err(CCError::UnknownFileType(path.to_path_buf())),
        }
    }

    fn load_workbook(path: &Path, sheet: &str) -> Result<(Vec<String>, Vec<Row>), CCError> {
        let mut workbook = open_workbook_auto(path)?;
        if !workbook.sheet_names().iter().any(|s| s == sheet) {
            return Err(CCError::SheetNotFound {
                sheet: sheet.to_string(),
                path: path.to_path_buf(),
            });
        }
        let range = workbook.worksheet_range(sheet)?;

        let mut lines = range.rows();
        let columns: Vec<String> = match lines.next() {
            Some(header) => header
                .iter()
                .enumerate()
                .map(|(idx, cell)| Self::header_name(idx, cell))
                .collect(),
            None => Vec::new(),
        };

        // Each record is converted on its own, rayon keeps the original order.
        let body: Vec<&[Data]> = lines.collect();
        let rows = body
            .par_iter()
            .map(|cells| {
                Row::from_pairs(
                    columns
                        .iter()
                        .zip(cells.iter())
                        .map(|(name, cell)| (name.clone(), Self::cell_value(cell))),
                )
            })
            .filter(|row| !row.is_blank())
            .collect();

        Ok((columns, rows))
    }

    fn header_name(idx: usize, cell: &Data) -> String {
        match cell {
            Data::Empty => format!("Unnamed: {idx}"),
            other => other.to_string(),
        }
    }

    fn cell_value(cell: &Data) -> RawValue {
        match cell {
            Data::Int(i) => RawValue::Int(*i),
            Data::Float(f) if f.is_nan() => RawValue::Empty,
            Data::Float(f) => RawValue::Float(*f),
            Data::String(s) => RawValue::Text(s.clone()),
            Data::Bool(b) => RawValue::Bool(*b),
            Data::Empty | Data::Error(_) => RawValue::Empty,
            Data::DateTime(dt) if dt.is_datetime() => match dt.as_datetime() {
                Some(ts) => RawValue::Text(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
                None => RawValue::Text(dt.to_string()),
            },
            other => RawValue::Text(other.to_string()),
        }
    }

    fn load_csv(path: &PathBuf) -> Result<(Vec<String>, Vec<Row>), CCError> {
        let df = LazyCsvReader::new(PlPath::Local(path.as_path().into()))
            .with_has_header(true)
            .finish()?
            .collect()?;

        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        // Convert column by column in parallel, then transpose into records.
        let data: Result<Vec<Vec<RawValue>>, PolarsError> = columns
            .par_iter()
            .map(|name| Self::load_column(&df, name))
            .collect();
        let data = data?;

        let rows = (0..df.height())
            .map(|ridx| {
                Row::from_pairs(
                    columns
                        .iter()
                        .zip(data.iter())
                        .map(|(name, values)| (name.clone(), values[ridx].clone())),
                )
            })
            .filter(|row| !row.is_blank())
            .collect();

        Ok((columns, rows))
    }

    fn load_column(df: &DataFrame, col_name: &str) -> Result<Vec<RawValue>, PolarsError> {
        let original_dtype = df.column(col_name)?.dtype().clone();

        let col = df.column(col_name)?.cast(&DataType::String)?;
        let series = col.str()?;
        Ok(series
            .into_iter()
            .map(|value| match value {
                Some(s) => Self::typed_value(&original_dtype, s),
                None => RawValue::Empty,
            })
            .collect())
    }

    fn typed_value(dtype: &DataType, s: &str) -> RawValue {
        match dtype {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32 => s
                .parse::<i64>()
                .map(RawValue::Int)
                .unwrap_or_else(|_| RawValue::Text(s.to_string())),
            // Values past i64::MAX stay exact as text.
            DataType::UInt64 => s
                .parse::<u64>()
                .ok()
                .and_then(|u| i64::try_from(u).ok())
                .map(RawValue::Int)
                .unwrap_or_else(|| RawValue::Text(s.to_string())),
            DataType::Float32 | DataType::Float64 => match s.parse::<f64>() {
                Ok(f) if f.is_nan() => RawValue::Empty,
                Ok(f) => RawValue::Float(f),
                Err(_) => RawValue::Text(s.to_string()),
            },
            DataType::Boolean => RawValue::Bool(s == "true"),
            _ => RawValue::Text(s.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    fn config_for(name: &str) -> AppConfig {
        AppConfig::default().with_data_path(fixture(name))
    }

    #[test]
    fn test_load_workbook() {
        let store = RecordStore::load(&config_for("clients.xlsx")).unwrap();
        assert_eq!(
            store.columns(),
            &["Nome", "CPF", "Inscrição Estadual", "SENHA IMA", "TELEFONE", "EMAIL"]
        );
        // The all-blank line in the sheet is skipped.
        assert_eq!(store.len(), 5);

        let first = store.row(0).unwrap();
        assert_eq!(first.get("Nome"), Some(&RawValue::Text("Maria ".into())));
        assert_eq!(
            first.get("Inscrição Estadual"),
            Some(&RawValue::Float(123.0))
        );
        assert_eq!(first.get("TELEFONE"), Some(&RawValue::Float(48999887766.0)));
    }

    #[test]
    fn test_load_workbook_keeps_row_order_and_blanks() {
        let store = RecordStore::load(&config_for("clients.xlsx")).unwrap();
        let names: Vec<String> = store
            .rows()
            .iter()
            .map(|r| r.get("Nome").map(|v| v.to_string()).unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["Maria ", "Maria", "  João", "", "Ana"]);
        assert_eq!(store.row(3).unwrap().get("Nome"), Some(&RawValue::Empty));
    }

    #[test]
    fn test_load_csv() {
        let cfg = config_for("clients.csv");
        let store = RecordStore::load(&cfg).unwrap();
        assert_eq!(store.len(), 3);
        assert!(store.columns().contains(&"Nome".to_string()));
        let first = store.row(0).unwrap();
        assert_eq!(first.get("Nome"), Some(&RawValue::Text("Carlos".into())));
        assert_eq!(first.get("Inscrição Estadual"), Some(&RawValue::Int(4567)));
        assert_eq!(store.row(1).unwrap().get("EMAIL"), Some(&RawValue::Empty));
    }

    #[test]
    fn test_missing_file() {
        let err = RecordStore::load(&config_for("does_not_exist.xlsx")).unwrap_err();
        assert!(matches!(err, CCError::FileNotFound(_)));
    }

    #[test]
    fn test_missing_sheet() {
        let err = RecordStore::load(&config_for("no_sheet.xlsx")).unwrap_err();
        match err {
            CCError::SheetNotFound { sheet, .. } => assert_eq!(sheet, "DADOS"),
            e => panic!("unexpected error {e:?}"),
        }
    }

    #[test]
    fn test_missing_name_column() {
        let err = RecordStore::load(&config_for("no_name_column.xlsx")).unwrap_err();
        match err {
            CCError::SchemaError { column, .. } => assert_eq!(column, "Nome"),
            e => panic!("unexpected error {e:?}"),
        }
    }

    #[test]
    fn test_unknown_file_type() {
        let err = RecordStore::load(&config_for("README.txt")).unwrap_err();
        assert!(matches!(err, CCError::UnknownFileType(_)));
    }

    #[test]
    fn test_directory_is_not_loadable() {
        let cfg = AppConfig::default().with_data_path(fixture(""));
        let err = RecordStore::load(&cfg).unwrap_err();
        assert!(matches!(err, CCError::LoadFailed { .. }));
    }

    #[test]
    fn test_row_first_duplicate_column_wins() {
        let row = Row::from_pairs([
            ("Nome", RawValue::Text("a".into())),
            ("Nome", RawValue::Text("b".into())),
        ]);
        assert_eq!(row.get("Nome"), Some(&RawValue::Text("a".into())));
        assert_eq!(row.get("CPF"), None);
    }

    #[test]
    fn test_whitespace_only_row_is_not_blank() {
        let row = Row::from_pairs([
            ("Nome", RawValue::Text("   ".into())),
            ("CPF", RawValue::Empty),
        ]);
        assert!(!row.is_blank());
        assert!(Row::from_pairs([("Nome", RawValue::Empty), ("CPF", RawValue::Empty)]).is_blank());

        let store = RecordStore::from_rows(vec!["Nome".into(), "CPF".into()], vec![row]);
        let index = crate::lookup::LookupIndex::build(&store, "Nome");
        assert_eq!(index.display_names(), &[crate::lookup::BLANK_NAME_SENTINEL]);
    }

    #[test]
    fn test_nan_cells_load_as_empty() {
        assert_eq!(RecordStore::cell_value(&Data::Float(f64::NAN)), RawValue::Empty);
        assert_eq!(RecordStore::cell_value(&Data::Float(2.5)), RawValue::Float(2.5));
        assert_eq!(RecordStore::typed_value(&DataType::Float64, "NaN"), RawValue::Empty);
        assert_eq!(RecordStore::typed_value(&DataType::Float64, "12.0"), RawValue::Float(12.0));
    }

    #[test]
    fn test_nan_csv_identifier_loads_as_empty() {
        let path = std::env::temp_dir().join(format!("clientclip_nan_{}.csv", std::process::id()));
        fs::write(&path, "Nome,Inscrição Estadual\nAna,NaN\nBia,12.5\n").unwrap();
        let store = RecordStore::load(&AppConfig::default().with_data_path(path.clone()));
        fs::remove_file(&path).unwrap();

        let store = store.unwrap();
        assert_eq!(store.row(0).unwrap().get("Inscrição Estadual"), Some(&RawValue::Empty));
        assert_eq!(
            store.row(1).unwrap().get("Inscrição Estadual"),
            Some(&RawValue::Float(12.5))
        );
    }

    #[test]
    fn test_date_cells_render_as_timestamp() {
        let cell = Data::DateTime(ExcelDateTime::new(45658.0, ExcelDateTimeType::DateTime, false));
        assert_eq!(
            RecordStore::cell_value(&cell),
            RawValue::Text("2025-01-01 00:00:00".into())
        );
        let with_time = Data::DateTime(ExcelDateTime::new(45658.5, ExcelDateTimeType::DateTime, false));
        assert_eq!(
            RecordStore::cell_value(&with_time),
            RawValue::Text("2025-01-01 12:00:00".into())
        );
    }

    #[test]
    fn test_uint64_values_stay_exact() {
        assert_eq!(
            RecordStore::typed_value(&DataType::UInt64, "9007199254740993"),
            RawValue::Int(9007199254740993)
        );
        assert_eq!(
            RecordStore::typed_value(&DataType::UInt64, "18446744073709551615"),
            RawValue::Text("18446744073709551615".into())
        );
    }
}
