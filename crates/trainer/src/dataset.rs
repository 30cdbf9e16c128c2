//! Training Dataset Loading
//!
//! Reads the measurement table from CSV or from the first sheet of an Excel
//! workbook. All five required columns must be present in the header before
//! any row is read; rows with a missing or non-numeric required value are
//! dropped.

use crate::error::DatasetError;
use calamine::{open_workbook_auto, Data, Reader};
use feature_scaler::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES, TARGET_NAME};
use std::path::Path;
use tracing::{debug, info, warn};

/// Feature rows with their recommended crutch heights
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub features: Vec<FeatureVector>,
    pub targets: Vec<f32>,
}

/// One cell as read from the source file
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    fn as_f32(&self) -> Option<f32> {
        let value = match self {
            Cell::Empty => return None,
            Cell::Number(n) => *n as f32,
            Cell::Text(s) => {
                let s = s.trim();
                if s.is_empty() || s.eq_ignore_ascii_case("nan") {
                    return None;
                }
                s.parse::<f32>().ok()?
            }
        };
        value.is_finite().then_some(value)
    }
}

/// Positions of the required columns in the header
struct ColumnMap {
    features: [usize; FEATURE_COUNT],
    target: usize,
}

impl ColumnMap {
    fn resolve(header: &[String]) -> Result<Self, DatasetError> {
        let find = |name: &'static str| {
            header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(DatasetError::MissingColumn(name))
        };
        let mut features = [0usize; FEATURE_COUNT];
        for (slot, name) in features.iter_mut().zip(FEATURE_NAMES) {
            *slot = find(name)?;
        }
        Ok(Self {
            features,
            target: find(TARGET_NAME)?,
        })
    }
}

impl Dataset {
    pub fn new(features: Vec<FeatureVector>, targets: Vec<f32>) -> Self {
        debug_assert_eq!(features.len(), targets.len());
        Self { features, targets }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Load from `.csv`, `.xlsx`, `.xlsm`, `.xlsb`, `.xls`, or `.ods`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        info!("Loading dataset from {}", path.display());

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let dataset = match extension.as_str() {
            "csv" => Self::load_csv(path)?,
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::load_workbook(path)?,
            other => return Err(DatasetError::UnsupportedFormat(other.to_string())),
        };

        info!("Dataset shape after dropping incomplete rows: {} rows", dataset.len());
        Ok(dataset)
    }

    /// Parse CSV text; used by `load` and tests
    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self, DatasetError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let header: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let columns = ColumnMap::resolve(&header)?;

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let row: Vec<Cell> = record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect();
            rows.push(row);
        }

        Self::from_rows(&columns, rows)
    }

    fn load_csv(path: &Path) -> Result<Self, DatasetError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    fn load_workbook(path: &Path) -> Result<Self, DatasetError> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(DatasetError::EmptyWorkbook)??;

        let mut sheet_rows = range.rows();
        let header: Vec<String> = match sheet_rows.next() {
            Some(row) => row.iter().map(|c| c.to_string().trim().to_string()).collect(),
            None => return Err(DatasetError::MissingColumn(FEATURE_NAMES[0])),
        };
        let columns = ColumnMap::resolve(&header)?;

        let rows = sheet_rows
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Data::Empty => Cell::Empty,
                        Data::Float(f) => Cell::Number(*f),
                        Data::Int(i) => Cell::Number(*i as f64),
                        Data::String(s) => Cell::Text(s.clone()),
                        other => Cell::Text(other.to_string()),
                    })
                    .collect()
            })
            .collect();

        Self::from_rows(&columns, rows)
    }

    fn from_rows(columns: &ColumnMap, rows: Vec<Vec<Cell>>) -> Result<Self, DatasetError> {
        let cell = |row: &[Cell], idx: usize| row.get(idx).and_then(Cell::as_f32);

        let mut features = Vec::with_capacity(rows.len());
        let mut targets = Vec::with_capacity(rows.len());
        let mut dropped = 0usize;

        for (line, row) in rows.iter().enumerate() {
            let mut values = [0.0f32; FEATURE_COUNT];
            let mut complete = true;
            for (value, &idx) in values.iter_mut().zip(columns.features.iter()) {
                match cell(row, idx) {
                    Some(v) => *value = v,
                    None => complete = false,
                }
            }
            let target = cell(row, columns.target);

            match (complete, target) {
                (true, Some(target)) => {
                    features.push(FeatureVector::from_array(values));
                    targets.push(target);
                }
                _ => {
                    debug!("Dropping incomplete row {}", line + 1);
                    dropped += 1;
                }
            }
        }

        if dropped > 0 {
            warn!("Dropped {} rows with missing values", dropped);
        }
        if targets.is_empty() {
            return Err(DatasetError::NoCompleteRows { dropped });
        }

        Ok(Self { features, targets })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "UserHeight_cm,ArmpitToWrist_cm,WristToFoot_cm,UserWeight_kg,RecommendedCrutchHeight_cm";

    #[test]
    fn test_parse_complete_rows() {
        let csv = format!("{}\n150,35,45,55,115.5\n170,40,50,70,131\n", HEADER);
        let ds = Dataset::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.features[0], FeatureVector::new(150.0, 35.0, 45.0, 55.0));
        assert_eq!(ds.targets, vec![115.5, 131.0]);
    }

    #[test]
    fn test_drops_rows_with_missing_values() {
        let csv = format!(
            "{}\n150,35,45,55,115.5\n160,,48,50,123\n170,40,50,70,\n175,42,52,95,NaN\n180,43,53,abc,139\n190,45,55,85,146\n",
            HEADER
        );
        let ds = Dataset::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.targets, vec![115.5, 146.0]);
    }

    #[test]
    fn test_column_order_and_extra_columns() {
        let csv = "Id,RecommendedCrutchHeight_cm,UserWeight_kg,WristToFoot_cm,ArmpitToWrist_cm,UserHeight_cm\n\
                   7,131,70,50,40,170\n";
        let ds = Dataset::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(ds.features[0], FeatureVector::new(170.0, 40.0, 50.0, 70.0));
        assert_eq!(ds.targets[0], 131.0);
    }

    #[test]
    fn test_missing_column_rejects_run() {
        let csv = "UserHeight_cm,ArmpitToWrist_cm,UserWeight_kg,RecommendedCrutchHeight_cm\n150,35,55,115\n";
        match Dataset::from_csv_reader(csv.as_bytes()) {
            Err(DatasetError::MissingColumn(name)) => assert_eq!(name, "WristToFoot_cm"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_all_rows_incomplete() {
        let csv = format!("{}\n150,35,,55,115\n", HEADER);
        assert!(matches!(
            Dataset::from_csv_reader(csv.as_bytes()),
            Err(DatasetError::NoCompleteRows { dropped: 1 })
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.parquet");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(
            Dataset::load(&path),
            Err(DatasetError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_load_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, format!("{}\n150,35,45,55,115.5\n", HEADER)).unwrap();
        assert_eq!(Dataset::load(&path).unwrap().len(), 1);
    }
}
