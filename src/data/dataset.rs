//! Concrete dataset access
//!
//! Reads the published UCI concrete dataset export and maps its verbose
//! column headers onto the canonical feature names.

use std::io::Read;
use std::path::Path;

use crate::features::FeatureMap;
use crate::{Result, StrengthError};

/// Header of the measured strength column (the trailing space is present in
/// the published file)
pub const TARGET_COLUMN: &str = "Concrete compressive strength(MPa, megapascals) ";

/// Dataset headers mapped to canonical feature names
///
/// The double spaces in the water and coarse aggregate headers are also
/// present in the published file.
pub const COLUMN_TO_FEATURE: [(&str, &str); 8] = [
    ("Cement (component 1)(kg in a m^3 mixture)", "cement"),
    ("Blast Furnace Slag (component 2)(kg in a m^3 mixture)", "slag"),
    ("Fly Ash (component 3)(kg in a m^3 mixture)", "fly_ash"),
    ("Water  (component 4)(kg in a m^3 mixture)", "water"),
    (
        "Superplasticizer (component 5)(kg in a m^3 mixture)",
        "superplasticizer",
    ),
    (
        "Coarse Aggregate  (component 6)(kg in a m^3 mixture)",
        "coarse_agg",
    ),
    ("Fine Aggregate (component 7)(kg in a m^3 mixture)", "fine_agg"),
    ("Age (day)", "age"),
];

/// An in-memory view of the dataset's raw cells
#[derive(Debug, Clone)]
pub struct ConcreteDataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// One row prepared for evaluation: raw features plus the recorded strength
#[derive(Debug, Clone)]
pub struct EvaluationRow {
    pub features: FeatureMap,
    pub actual: f32,
}

impl ConcreteDataset {
    /// Load the dataset from a CSV file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = csv::Reader::from_path(path.as_ref())?;
        let dataset = Self::ingest(reader)?;
        log::info!(
            "Loaded {} dataset rows from {}",
            dataset.len(),
            path.as_ref().display()
        );
        Ok(dataset)
    }

    /// Read the dataset from any source (in-memory CSV in tests)
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::ingest(csv::Reader::from_reader(reader))
    }

    fn ingest<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(ConcreteDataset { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn column_index(&self, column: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| StrengthError::MissingColumn {
                column: column.to_string(),
            })
    }

    /// Bounds-check a requested row index
    ///
    /// Negative indexes and indexes past the end are both out of range.
    pub fn row_index(&self, index: i64) -> Result<usize> {
        if index < 0 || index as usize >= self.rows.len() {
            return Err(StrengthError::RowOutOfRange {
                index,
                rows: self.rows.len(),
            });
        }
        Ok(index as usize)
    }

    /// Extract one row's raw features and recorded strength
    pub fn evaluation_row(&self, index: i64) -> Result<EvaluationRow> {
        let row = &self.rows[self.row_index(index)?];

        let mut features = FeatureMap::new();
        for (column, feature) in COLUMN_TO_FEATURE {
            let cell = row
                .get(self.column_index(column)?)
                .cloned()
                .unwrap_or_default();
            features.insert(feature, cell);
        }

        let target_cell = row
            .get(self.column_index(TARGET_COLUMN)?)
            .cloned()
            .unwrap_or_default();
        let actual = target_cell
            .trim()
            .parse::<f32>()
            .map_err(|_| StrengthError::TypeConversion {
                field: TARGET_COLUMN,
                value: target_cell.clone(),
            })?;

        Ok(EvaluationRow { features, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureVector, ValidationMode};

    fn uci_header() -> String {
        let mut fields: Vec<&str> = COLUMN_TO_FEATURE.iter().map(|(column, _)| *column).collect();
        fields.push(TARGET_COLUMN);
        // The target header contains a comma, so quote every field
        fields
            .iter()
            .map(|h| format!("\"{}\"", h))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn sample_csv() -> String {
        format!(
            "{}\n540.0,0.0,0.0,162.0,2.5,1040.0,676.0,28,79.99\n332.5,142.5,0.0,228.0,0.0,932.0,594.0,270,40.27\n",
            uci_header()
        )
    }

    #[test]
    fn test_load_rows_and_headers() {
        let dataset = ConcreteDataset::from_reader(sample_csv().as_bytes()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert!(!dataset.is_empty());
        assert!(dataset.headers().iter().any(|h| h == TARGET_COLUMN));
    }

    #[test]
    fn test_evaluation_row_maps_columns() {
        let dataset = ConcreteDataset::from_reader(sample_csv().as_bytes()).unwrap();
        let row = dataset.evaluation_row(0).unwrap();

        let features = FeatureVector::build(&row.features, ValidationMode::FailFast).unwrap();
        assert_eq!(features.cement, 540.0);
        assert_eq!(features.water, 162.0);
        assert_eq!(features.coarse_agg, 1040.0);
        assert_eq!(features.age, 28);
        assert_eq!(row.actual, 79.99);
    }

    #[test]
    fn test_row_index_resolves_valid_rows() {
        let dataset = ConcreteDataset::from_reader(sample_csv().as_bytes()).unwrap();
        assert_eq!(dataset.row_index(0).unwrap(), 0);
        assert_eq!(dataset.row_index(1).unwrap(), 1);

        let err = dataset.row_index(-3).unwrap_err();
        assert!(matches!(
            err,
            StrengthError::RowOutOfRange { index: -3, rows: 2 }
        ));
    }

    #[test]
    fn test_row_index_bounds() {
        let dataset = ConcreteDataset::from_reader(sample_csv().as_bytes()).unwrap();

        let err = dataset.evaluation_row(2).unwrap_err();
        assert!(matches!(
            err,
            StrengthError::RowOutOfRange { index: 2, rows: 2 }
        ));

        let err = dataset.evaluation_row(-1).unwrap_err();
        assert!(matches!(
            err,
            StrengthError::RowOutOfRange { index: -1, rows: 2 }
        ));
    }

    #[test]
    fn test_empty_dataset_has_no_valid_rows() {
        let csv = format!("{}\n", uci_header());
        let dataset = ConcreteDataset::from_reader(csv.as_bytes()).unwrap();
        assert!(dataset.is_empty());

        let err = dataset.evaluation_row(0).unwrap_err();
        assert!(matches!(
            err,
            StrengthError::RowOutOfRange { index: 0, rows: 0 }
        ));
    }

    #[test]
    fn test_missing_column_reported() {
        let csv = "\"Cement (component 1)(kg in a m^3 mixture)\",\"Age (day)\"\n540.0,28\n";
        let dataset = ConcreteDataset::from_reader(csv.as_bytes()).unwrap();

        let err = dataset.evaluation_row(0).unwrap_err();
        match err {
            StrengthError::MissingColumn { column } => {
                assert!(column.contains("Blast Furnace Slag"));
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_target_cell() {
        let csv = format!(
            "{}\n540.0,0.0,0.0,162.0,2.5,1040.0,676.0,28,n/a\n",
            uci_header()
        );
        let dataset = ConcreteDataset::from_reader(csv.as_bytes()).unwrap();

        let err = dataset.evaluation_row(0).unwrap_err();
        assert!(matches!(
            err,
            StrengthError::TypeConversion {
                field: TARGET_COLUMN,
                ..
            }
        ));
    }
}
