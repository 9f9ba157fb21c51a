//! Dataset preparation: imputation, label encoding, min-max scaling and the
//! seeded train/test split.

use crate::domain::model::{PassengerRecord, Sex, FEATURE_COUNT};
use crate::utils::error::{AppError, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

pub const TEST_SIZE: f64 = 0.2;
pub const SPLIT_SEED: u64 = 0;

/// Maps sorted distinct labels to `0..n`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut classes: Vec<String> = values.into_iter().map(str::to_string).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn transform(&self, value: &str) -> Option<usize> {
        self.classes.binary_search_by(|c| c.as_str().cmp(value)).ok()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Scales every column to `[0, 1]`; constant columns only get shifted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    data_min: Vec<f64>,
    data_range: Vec<f64>,
}

impl MinMaxScaler {
    pub fn fit(x: ArrayView2<'_, f64>) -> Self {
        let mut data_min = Vec::with_capacity(x.ncols());
        let mut data_range = Vec::with_capacity(x.ncols());

        for column in x.columns() {
            let min = column.iter().copied().fold(f64::INFINITY, f64::min);
            let max = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let range = max - min;
            data_min.push(min);
            data_range.push(if range > 0.0 { range } else { 1.0 });
        }

        Self {
            data_min,
            data_range,
        }
    }

    /// Both vectors must cover exactly `n_features` columns with usable ranges.
    pub fn check_shape(&self, n_features: usize) -> std::result::Result<(), String> {
        if self.data_min.len() != n_features || self.data_range.len() != n_features {
            return Err(format!(
                "scaler covers {}/{} columns, expected {}",
                self.data_min.len(),
                self.data_range.len(),
                n_features
            ));
        }
        if self.data_range.iter().any(|r| !r.is_finite() || *r == 0.0) {
            return Err("scaler has a zero or non-finite column range".to_string());
        }
        Ok(())
    }

    pub fn transform(&self, x: ArrayView2<'_, f64>) -> Array2<f64> {
        let mut scaled = x.to_owned();
        for mut row in scaled.rows_mut() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = (*value - self.data_min[j]) / self.data_range[j];
            }
        }
        scaled
    }

    pub fn transform_row(&self, row: &[f64]) -> Array1<f64> {
        row.iter()
            .enumerate()
            .map(|(j, value)| (value - self.data_min[j]) / self.data_range[j])
            .collect()
    }
}

/// Fitted preprocessing state, stored alongside every trained model so that
/// serving encodes rows exactly as training did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    pub age_median: f64,
    pub embarked_mode: String,
    pub sex_encoder: LabelEncoder,
    pub embarked_encoder: LabelEncoder,
    pub scaler: MinMaxScaler,
}

impl Preprocessor {
    /// Fits imputers, encoders and scaler; returns the scaled feature matrix
    /// and the 0/1 survival labels.
    pub fn fit(records: &[PassengerRecord]) -> Result<(Self, Array2<f64>, Array1<f64>)> {
        if records.is_empty() {
            return Err(AppError::DatasetError {
                message: "dataset has no rows".to_string(),
            });
        }

        let mut ages: Vec<f64> = records.iter().filter_map(|r| r.age).collect();
        let age_median = median(&mut ages).ok_or_else(|| AppError::DatasetError {
            message: "column 'Age' has no values".to_string(),
        })?;

        let embarked_mode = mode(
            records
                .iter()
                .filter_map(|r| r.embarked.as_deref())
                .filter(|e| !e.is_empty()),
        )
        .ok_or_else(|| AppError::DatasetError {
            message: "column 'Embarked' has no values".to_string(),
        })?;

        let sexes: Vec<&str> = records.iter().map(|r| Sex::parse(&r.sex).as_str()).collect();
        let sex_encoder = LabelEncoder::fit(sexes.iter().copied());

        let embarked: Vec<&str> = records
            .iter()
            .map(|r| match r.embarked.as_deref() {
                Some(e) if !e.is_empty() => e,
                _ => embarked_mode.as_str(),
            })
            .collect();
        let embarked_encoder = LabelEncoder::fit(embarked.iter().copied());

        let mut raw = Array2::<f64>::zeros((records.len(), FEATURE_COUNT));
        for (i, record) in records.iter().enumerate() {
            let sex_code = sex_encoder.transform(sexes[i]).unwrap_or(0);
            let embarked_code = embarked_encoder.transform(embarked[i]).unwrap_or(0);
            let row = [
                f64::from(record.pclass),
                sex_code as f64,
                record.age.unwrap_or(age_median),
                f64::from(record.sib_sp),
                f64::from(record.parch),
                embarked_code as f64,
            ];
            for (j, value) in row.into_iter().enumerate() {
                raw[[i, j]] = value;
            }
        }

        let scaler = MinMaxScaler::fit(raw.view());
        let x = scaler.transform(raw.view());
        let y: Array1<f64> = records
            .iter()
            .map(|r| if r.survived == 1 { 1.0 } else { 0.0 })
            .collect();

        tracing::debug!(
            "Preprocessed {} rows (age median {:.2}, embarked mode {})",
            records.len(),
            age_median,
            embarked_mode
        );

        Ok((
            Self {
                age_median,
                embarked_mode,
                sex_encoder,
                embarked_encoder,
                scaler,
            },
            x,
            y,
        ))
    }
}

/// Output of the transform step, ready to fit.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub preprocessor: Preprocessor,
    pub x_train: Array2<f64>,
    pub y_train: Array1<f64>,
    pub x_test: Array2<f64>,
    pub y_test: Array1<f64>,
}

impl PreparedDataset {
    pub fn from_records(records: &[PassengerRecord]) -> Result<Self> {
        let (preprocessor, x, y) = Preprocessor::fit(records)?;
        let (x_train, x_test, y_train, y_test) = train_test_split(x.view(), &y, TEST_SIZE, SPLIT_SEED);

        Ok(Self {
            preprocessor,
            x_train,
            y_train,
            x_test,
            y_test,
        })
    }
}

/// Shuffles row indices with a seeded RNG; the first `ceil(test_size * n)`
/// become the test split.
pub fn train_test_split(
    x: ArrayView2<'_, f64>,
    y: &Array1<f64>,
    test_size: f64,
    seed: u64,
) -> (Array2<f64>, Array2<f64>, Array1<f64>, Array1<f64>) {
    let n = x.nrows();
    let n_test = ((test_size * n as f64).ceil() as usize).min(n);

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);

    (
        x.select(Axis(0), train_idx),
        x.select(Axis(0), test_idx),
        y.select(Axis(0), train_idx),
        y.select(Axis(0), test_idx),
    )
}

pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Most frequent value; ties go to the smallest.
pub fn mode<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: std::collections::BTreeMap<&str, usize> = std::collections::BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn record(id: u32, survived: u8, sex: &str, age: Option<f64>, embarked: Option<&str>) -> PassengerRecord {
        PassengerRecord {
            passenger_id: id,
            survived,
            pclass: 3,
            sex: sex.to_string(),
            age,
            sib_sp: 0,
            parch: 0,
            embarked: embarked.map(str::to_string),
        }
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&mut []), None);
    }

    #[test]
    fn test_mode_breaks_ties_alphabetically() {
        assert_eq!(mode(["S", "C", "S", "Q"]), Some("S".to_string()));
        assert_eq!(mode(["Q", "C"]), Some("C".to_string()));
        assert_eq!(mode(Vec::<&str>::new()), None);
    }

    #[test]
    fn test_label_encoder_sorts_classes() {
        let enc = LabelEncoder::fit(["male", "female", "male"]);
        assert_eq!(enc.classes(), &["female".to_string(), "male".to_string()]);
        assert_eq!(enc.transform("female"), Some(0));
        assert_eq!(enc.transform("male"), Some(1));
        assert_eq!(enc.transform("other"), None);
    }

    #[test]
    fn test_min_max_scaler_handles_constant_column() {
        let x = array![[1.0, 5.0], [3.0, 5.0], [2.0, 5.0]];
        let scaler = MinMaxScaler::fit(x.view());
        let scaled = scaler.transform(x.view());
        assert_eq!(scaled, array![[0.0, 0.0], [1.0, 0.0], [0.5, 0.0]]);
        assert_eq!(scaler.transform_row(&[4.0, 6.0]).to_vec(), vec![1.5, 1.0]);
    }

    #[test]
    fn test_preprocessor_imputes_missing_values() {
        let records = vec![
            record(1, 0, "male", Some(20.0), Some("S")),
            record(2, 1, "female", None, None),
            record(3, 1, "female", Some(40.0), Some("C")),
            record(4, 0, "male", Some(30.0), Some("S")),
        ];
        let (pre, x, y) = Preprocessor::fit(&records).unwrap();

        assert_eq!(pre.age_median, 30.0);
        assert_eq!(pre.embarked_mode, "S");
        assert_eq!(pre.sex_encoder.transform("male"), Some(1));
        assert_eq!(x.dim(), (4, FEATURE_COUNT));
        assert_eq!(y.to_vec(), vec![0.0, 1.0, 1.0, 0.0]);
        // 年齡補值 30 落在 20..40 中間
        assert!((x[[1, 2]] - 0.5).abs() < 1e-12);
        // 缺少的登船港口補成 S，編碼為 1
        assert_eq!(x[[1, 5]], 1.0);
    }

    #[test]
    fn test_split_sizes_and_determinism() {
        let x = Array2::from_shape_fn((10, 2), |(i, j)| (i * 2 + j) as f64);
        let y = Array1::from_shape_fn(10, |i| (i % 2) as f64);

        let (x_train, x_test, y_train, y_test) = train_test_split(x.view(), &y, 0.2, 0);
        assert_eq!(x_train.nrows(), 8);
        assert_eq!(x_test.nrows(), 2);
        assert_eq!(y_train.len(), 8);
        assert_eq!(y_test.len(), 2);

        let (_, again, _, _) = train_test_split(x.view(), &y, 0.2, 0);
        assert_eq!(x_test, again);
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        assert!(matches!(
            Preprocessor::fit(&[]),
            Err(AppError::DatasetError { .. })
        ));
    }
}
