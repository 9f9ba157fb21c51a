//! Request fields → model input row.
//!
//! Column order is `Pclass, Sex, Age, SibSp, Parch, Embarked`, the order the
//! training pipeline builds. Sex uses the training label table
//! (`female = 0`, `male = 1`) on both paths. Embarkation is always the first
//! port label.

use crate::domain::model::{PassengerFeatures, Sex, FEATURE_COUNT};
use crate::ml::Preprocessor;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::validate_range;
use ndarray::Array1;
use serde::Deserialize;
use std::str::FromStr;

pub const DEFAULT_EMBARKED_CODE: f64 = 0.0;

/// Raw, optional form / JSON fields of a prediction request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureFields {
    pub sex: Option<String>,
    pub pclass: Option<String>,
    pub age: Option<String>,
    pub sibsp: Option<String>,
    pub parch: Option<String>,
    pub model: Option<String>,
}

impl FeatureFields {
    /// Field-wise merge; values already present win.
    pub fn or(self, other: FeatureFields) -> FeatureFields {
        FeatureFields {
            sex: self.sex.or(other.sex),
            pclass: self.pclass.or(other.pclass),
            age: self.age.or(other.age),
            sibsp: self.sibsp.or(other.sibsp),
            parch: self.parch.or(other.parch),
            model: self.model.or(other.model),
        }
    }

    /// Missing fields take the demo values; malformed ones are rejected.
    pub fn to_features(&self) -> Result<PassengerFeatures> {
        let sex = Sex::parse(self.sex.as_deref().unwrap_or_default());
        let pclass = parse_field("pclass", self.pclass.as_deref(), PassengerFeatures::DEMO_PCLASS)?;
        validate_range("pclass", pclass, 1, 3).map_err(|e| AppError::bad_request(e.to_string()))?;
        let age = parse_field("age", self.age.as_deref(), PassengerFeatures::DEMO_AGE)?;
        if !age.is_finite() || age < 0.0 {
            return Err(AppError::bad_request(format!("age must be a non-negative number, got {}", age)));
        }

        Ok(PassengerFeatures {
            pclass,
            sex,
            age,
            sib_sp: parse_field("sibsp", self.sibsp.as_deref(), PassengerFeatures::DEMO_SIB_SP)?,
            parch: parse_field("parch", self.parch.as_deref(), PassengerFeatures::DEMO_PARCH)?,
        })
    }
}

fn parse_field<T: FromStr>(name: &str, raw: Option<&str>, default: T) -> Result<T> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| AppError::bad_request(format!("field '{}' has invalid value '{}'", name, value))),
    }
}

fn sex_code(sex: Sex, preprocessor: &Preprocessor) -> f64 {
    match preprocessor.sex_encoder.transform(sex.as_str()) {
        Some(code) => code as f64,
        // 訓練資料只有單一性別時沿用固定編碼
        None => match sex {
            Sex::Female => 0.0,
            Sex::Male => 1.0,
        },
    }
}

/// Unscaled row, in training column order.
pub fn encode(features: &PassengerFeatures, preprocessor: &Preprocessor) -> [f64; FEATURE_COUNT] {
    [
        f64::from(features.pclass),
        sex_code(features.sex, preprocessor),
        features.age,
        f64::from(features.sib_sp),
        f64::from(features.parch),
        DEFAULT_EMBARKED_CODE,
    ]
}

/// Encoded and min-max scaled with the model's own scaler.
pub fn encode_scaled(features: &PassengerFeatures, preprocessor: &Preprocessor) -> Array1<f64> {
    preprocessor.scaler.transform_row(&encode(features, preprocessor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::PassengerRecord;

    fn fitted() -> Preprocessor {
        let records: Vec<PassengerRecord> = [("male", 0u8, 30.0), ("female", 1, 20.0), ("male", 1, 40.0)]
            .iter()
            .enumerate()
            .map(|(i, (sex, survived, age))| PassengerRecord {
                passenger_id: i as u32 + 1,
                survived: *survived,
                pclass: (i % 3) as u8 + 1,
                sex: sex.to_string(),
                age: Some(*age),
                sib_sp: i as u32,
                parch: 0,
                embarked: Some(if i == 0 { "C" } else { "S" }.to_string()),
            })
            .collect();
        Preprocessor::fit(&records).unwrap().0
    }

    fn fields(sex: &str) -> FeatureFields {
        FeatureFields {
            sex: Some(sex.to_string()),
            ..FeatureFields::default()
        }
    }

    #[test]
    fn test_case_variants_encode_identically() {
        let pre = fitted();
        let male = fields("male").to_features().unwrap();
        let upper = fields("Male").to_features().unwrap();
        assert_eq!(encode(&male, &pre), encode(&upper, &pre));
        assert_eq!(encode(&male, &pre)[1], 1.0);
        assert_eq!(encode(&fields("female").to_features().unwrap(), &pre)[1], 0.0);
    }

    #[test]
    fn test_demo_defaults_and_fixed_embarkation() {
        let pre = fitted();
        let features = FeatureFields::default().to_features().unwrap();
        assert_eq!(features, PassengerFeatures::demo(Sex::Female));
        assert_eq!(encode(&features, &pre), [1.0, 0.0, 21.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_scaled_row_uses_training_ranges() {
        let pre = fitted();
        let features = PassengerFeatures {
            pclass: 3,
            sex: Sex::Male,
            age: 40.0,
            sib_sp: 2,
            parch: 0,
        };
        let row = encode_scaled(&features, &pre);
        assert_eq!(row.len(), FEATURE_COUNT);
        assert_eq!(row[0], 1.0);
        assert_eq!(row[2], 1.0);
    }

    #[test]
    fn test_malformed_fields_are_rejected() {
        let bad_age = FeatureFields {
            age: Some("old".to_string()),
            ..FeatureFields::default()
        };
        assert!(matches!(bad_age.to_features(), Err(AppError::BadRequest { .. })));

        let bad_class = FeatureFields {
            pclass: Some("4".to_string()),
            ..FeatureFields::default()
        };
        assert!(bad_class.to_features().is_err());
    }

    #[test]
    fn test_merge_prefers_existing_values() {
        let query = fields("male");
        let form = FeatureFields {
            sex: Some("female".to_string()),
            age: Some("30".to_string()),
            ..FeatureFields::default()
        };
        let merged = query.or(form);
        assert_eq!(merged.sex.as_deref(), Some("male"));
        assert_eq!(merged.age.as_deref(), Some("30"));
    }
}
