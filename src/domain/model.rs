use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the historical passenger CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassengerRecord {
    #[serde(rename = "PassengerId")]
    pub passenger_id: u32,
    #[serde(rename = "Survived")]
    pub survived: u8,
    #[serde(rename = "Pclass")]
    pub pclass: u8,
    #[serde(rename = "Sex")]
    pub sex: String,
    #[serde(rename = "Age")]
    pub age: Option<f64>,
    #[serde(rename = "SibSp")]
    pub sib_sp: u32,
    #[serde(rename = "Parch")]
    pub parch: u32,
    #[serde(rename = "Embarked")]
    pub embarked: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    /// 只有 "male" 視為男性，其餘一律當作女性
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("male") {
            Sex::Male
        } else {
            Sex::Female
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Female => "female",
            Sex::Male => "male",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sex::Female => "Female",
            Sex::Male => "Male",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short key identifying a trained classifier variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelCode {
    Dt,
    Svc,
    Lr,
}

impl ModelCode {
    pub const ALL: [ModelCode; 3] = [ModelCode::Dt, ModelCode::Svc, ModelCode::Lr];
    pub const DEFAULT: ModelCode = ModelCode::Lr;

    /// Unknown codes resolve to logistic regression.
    pub fn resolve(code: &str) -> Self {
        Self::parse(code).unwrap_or(Self::DEFAULT)
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "dt" => Some(ModelCode::Dt),
            "svc" => Some(ModelCode::Svc),
            "lr" => Some(ModelCode::Lr),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelCode::Dt => "dt",
            ModelCode::Svc => "svc",
            ModelCode::Lr => "lr",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelCode::Dt => "Decision Tree",
            ModelCode::Svc => "Support Vector",
            ModelCode::Lr => "Logistic Regression",
        }
    }

    pub fn file_name(&self) -> String {
        format!("model_{}.json", self.as_str())
    }
}

impl fmt::Display for ModelCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const FEATURE_COLUMNS: [&str; 6] = ["Pclass", "Sex", "Age", "SibSp", "Parch", "Embarked"];
pub const FEATURE_COUNT: usize = FEATURE_COLUMNS.len();

/// Passenger attributes for a single prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerFeatures {
    pub pclass: u8,
    pub sex: Sex,
    pub age: f64,
    pub sib_sp: u32,
    pub parch: u32,
}

impl PassengerFeatures {
    pub const DEMO_PCLASS: u8 = 1;
    pub const DEMO_AGE: f64 = 21.0;
    pub const DEMO_SIB_SP: u32 = 1;
    pub const DEMO_PARCH: u32 = 1;

    pub fn demo(sex: Sex) -> Self {
        Self {
            pclass: Self::DEMO_PCLASS,
            sex,
            age: Self::DEMO_AGE,
            sib_sp: Self::DEMO_SIB_SP,
            parch: Self::DEMO_PARCH,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub gender: String,
    pub survived: bool,
    pub outcome: String,
    pub model_code: ModelCode,
    pub model_name: String,
    pub accuracy: String,
}

impl PredictionResult {
    pub const SURVIVED: &'static str = "Survived";
    pub const NOT_SURVIVED: &'static str = "Did not survive";

    pub fn outcome_label(survived: bool) -> &'static str {
        if survived {
            Self::SURVIVED
        } else {
            Self::NOT_SURVIVED
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathStatistics {
    pub gender: String,
    pub total: usize,
    pub deaths: usize,
    pub death_ratio: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sex_parse_is_case_insensitive() {
        assert_eq!(Sex::parse("male"), Sex::Male);
        assert_eq!(Sex::parse("Male"), Sex::Male);
        assert_eq!(Sex::parse(" MALE "), Sex::Male);
        assert_eq!(Sex::parse("female"), Sex::Female);
        assert_eq!(Sex::parse(""), Sex::Female);
    }

    #[test]
    fn test_model_code_fallback() {
        assert_eq!(ModelCode::resolve("svc"), ModelCode::Svc);
        assert_eq!(ModelCode::resolve("DT"), ModelCode::Dt);
        assert_eq!(ModelCode::resolve("random_forest"), ModelCode::Lr);
        assert_eq!(ModelCode::resolve(""), ModelCode::Lr);
    }

    #[test]
    fn test_model_file_names() {
        assert_eq!(ModelCode::Lr.file_name(), "model_lr.json");
        assert_eq!(ModelCode::Svc.file_name(), "model_svc.json");
        assert_eq!(ModelCode::Dt.file_name(), "model_dt.json");
    }
}
