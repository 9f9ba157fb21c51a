#![allow(dead_code)]

use std::path::Path;
use tempfile::TempDir;
use titanic_survival::domain::model::ModelCode;
use titanic_survival::{AppConfig, LocalStorage, TrainingEngine, TrainingPipeline, Variant};

pub const HEADER: &str =
    "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked\n";

/// Deterministic passenger list: women and first class mostly survive,
/// with a few exceptions so no single feature is perfect.
pub fn titanic_csv(rows: usize) -> String {
    let mut csv = String::from(HEADER);
    for i in 0..rows {
        let female = i % 3 == 0 || i % 5 == 0;
        let pclass = i % 3 + 1;
        let mut survived = female || (pclass == 1 && i % 4 == 0);
        if i % 11 == 0 {
            survived = !survived;
        }
        let age = if i % 9 == 0 {
            String::new()
        } else {
            (2 + (i * 7) % 60).to_string()
        };
        let embarked = if i % 13 == 0 { "" } else { ["S", "C", "Q", "S"][i % 4] };

        csv.push_str(&format!(
            "{},{},{},\"Passenger, {}\",{},{},{},{},TK{},{}.5,,{}\n",
            i + 1,
            u8::from(survived),
            pclass,
            i,
            if female { "female" } else { "male" },
            age,
            i % 3,
            i % 2,
            i,
            7 + i % 50,
            embarked
        ));
    }
    csv
}

pub fn only_men_csv() -> String {
    let mut csv = String::from(HEADER);
    for i in 0..6 {
        csv.push_str(&format!(
            "{},{},3,\"Man, {}\",male,30,0,0,T,7.25,,S\n",
            i + 1,
            i % 2,
            i
        ));
    }
    csv
}

pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new(csv: &str) -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("titanic.csv"), csv).unwrap();
        Self { dir }
    }

    pub fn dataset_path(&self) -> String {
        self.dir.path().join("titanic.csv").to_string_lossy().into_owned()
    }

    pub fn model_dir(&self) -> String {
        self.dir.path().join("models").to_string_lossy().into_owned()
    }

    pub fn config(&self, variant: Variant) -> AppConfig {
        let mut config = AppConfig::default();
        config.server.variant = variant;
        config.data.dataset_path = self.dataset_path();
        config.data.model_dir = self.model_dir();
        config
    }

    pub async fn train(&self, code: ModelCode) -> titanic_survival::Result<f64> {
        let pipeline = TrainingPipeline::new(
            LocalStorage::new("."),
            self.dataset_path(),
            LocalStorage::new(self.model_dir()),
            code,
        );
        let report = TrainingEngine::new(pipeline).run().await?;
        Ok(report.accuracy)
    }

    pub fn has_model(&self, code: ModelCode) -> bool {
        Path::new(&self.model_dir()).join(code.file_name()).is_file()
    }
}
