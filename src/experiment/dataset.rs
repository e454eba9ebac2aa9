use crate::core::errors::SimError;
use serde::{Deserialize, Serialize};

/// Name of the response column written by the experiment
pub const RESPONSE_COLUMN: &str = "wait_time";

/// One cell of a factorial design: factor levels and the observed response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorRow {
    /// Level of each factor, in the dataset's column order
    pub levels: Vec<f64>,
    pub response: f64,
}

/// Factor columns plus one response column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DatasetRecord")]
pub struct Dataset {
    factor_names: Vec<String>,
    response_name: String,
    rows: Vec<FactorRow>,
}

/// Serialized shape of a [`Dataset`], checked row by row on the way in
#[derive(Deserialize)]
struct DatasetRecord {
    factor_names: Vec<String>,
    response_name: String,
    rows: Vec<FactorRow>,
}

impl TryFrom<DatasetRecord> for Dataset {
    type Error = SimError;

    fn try_from(record: DatasetRecord) -> Result<Self, Self::Error> {
        let mut dataset = Dataset::new(record.factor_names, record.response_name);
        for row in record.rows {
            dataset.push_row(row.levels, row.response)?;
        }
        Ok(dataset)
    }
}

impl Dataset {
    pub fn new(factor_names: Vec<String>, response_name: impl Into<String>) -> Self {
        Self {
            factor_names,
            response_name: response_name.into(),
            rows: Vec::new(),
        }
    }

    /// Append a row; it must have one level per factor column
    pub fn push_row(&mut self, levels: Vec<f64>, response: f64) -> Result<(), SimError> {
        if levels.len() != self.factor_names.len() {
            return Err(SimError::RaggedRow {
                row: self.rows.len(),
                found: levels.len(),
                expected: self.factor_names.len(),
            });
        }
        self.rows.push(FactorRow { levels, response });
        Ok(())
    }

    pub fn factor_names(&self) -> &[String] {
        &self.factor_names
    }

    pub fn response_name(&self) -> &str {
        &self.response_name
    }

    pub fn rows(&self) -> &[FactorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of one factor column
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row.levels[index]).collect()
    }

    pub fn responses(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.response).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_row_checks_width() {
        let mut dataset = Dataset::new(vec!["a".into(), "b".into()], RESPONSE_COLUMN);
        dataset.push_row(vec![1.0, 2.0], 3.0).unwrap();
        assert!(matches!(
            dataset.push_row(vec![1.0], 3.0),
            Err(SimError::RaggedRow { row: 1, found: 1, expected: 2 })
        ));
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_columns_and_responses() {
        let mut dataset = Dataset::new(vec!["chefs".into(), "terminals".into()], RESPONSE_COLUMN);
        dataset.push_row(vec![2.0, 8.0], 100.0).unwrap();
        dataset.push_row(vec![8.0, 2.0], 50.0).unwrap();

        assert_eq!(dataset.column(0), vec![2.0, 8.0]);
        assert_eq!(dataset.column(1), vec![8.0, 2.0]);
        assert_eq!(dataset.responses(), vec![100.0, 50.0]);
    }

    #[test]
    fn test_deserialize_checks_row_width() {
        let mut dataset = Dataset::new(vec!["a".into(), "b".into()], RESPONSE_COLUMN);
        dataset.push_row(vec![-1.0, 1.0], 4.0).unwrap();
        let json = serde_json::to_string(&dataset).unwrap();
        let restored: Dataset = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, dataset);

        let ragged = r#"{
            "factor_names": ["a", "b"],
            "response_name": "wait_time",
            "rows": [
                {"levels": [-1.0, 1.0], "response": 4.0},
                {"levels": [1.0], "response": 2.0}
            ]
        }"#;
        let err = serde_json::from_str::<Dataset>(ragged).unwrap_err();
        assert!(err.to_string().contains("row 1 has 1 factor values"));
    }
}
