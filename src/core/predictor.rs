use crate::core::encoder::encode_scaled;
use crate::domain::model::{PassengerFeatures, PredictionResult};
use crate::domain::ports::Classifier;
use crate::ml::TrainedModel;

pub fn predict(model: &TrainedModel, features: &PassengerFeatures) -> bool {
    let row = encode_scaled(features, &model.preprocessor);
    model.classifier.predict_row(row.view())
}

pub fn predict_result(model: &TrainedModel, features: &PassengerFeatures) -> PredictionResult {
    let survived = predict(model, features);
    tracing::debug!(
        "{} predicted survived={} for {:?}",
        model.code.display_name(),
        survived,
        features
    );

    PredictionResult {
        gender: features.sex.label().to_string(),
        survived,
        outcome: PredictionResult::outcome_label(survived).to_string(),
        model_code: model.code,
        model_name: model.code.display_name().to_string(),
        accuracy: model.accuracy_label(),
    }
}
