//! Preprocessor + ridge estimator as a single fit/predict unit

use super::preprocessing::{FittedPreprocessor, Preprocessor};
use super::ridge::{FittedRidge, Ridge};
use super::Predictor;
use crate::dataset::Frame;
use crate::error::{PredictorError, Result};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Learned state of a pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedState {
    pub preprocessor: FittedPreprocessor,
    pub model: FittedRidge,
}

/// Column transformer chained with a ridge regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPipeline {
    preprocessor: Preprocessor,
    ridge: Ridge,
    fitted: Option<FittedState>,
}

/// Chain `preprocessor` with a ridge estimator of strength `alpha`
pub fn build_model_pipeline(preprocessor: Preprocessor, alpha: f64) -> Result<ModelPipeline> {
    Ok(ModelPipeline {
        preprocessor,
        ridge: Ridge::new(alpha)?,
        fitted: None,
    })
}

impl ModelPipeline {
    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn alpha(&self) -> f64 {
        self.ridge.alpha()
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    pub fn fitted_state(&self) -> Option<&FittedState> {
        self.fitted.as_ref()
    }

    /// Fit the preprocessor and the estimator; any previous fitted state is replaced
    ///
    /// On error the previous fitted state is kept.
    pub fn fit(&mut self, features: &Frame, targets: &[f64]) -> Result<()> {
        if features.n_rows() != targets.len() {
            return Err(PredictorError::InvalidInput(format!(
                "features have {} rows but targets have {}",
                features.n_rows(),
                targets.len()
            )));
        }

        let preprocessor = self.preprocessor.fit(features)?;
        let x = preprocessor.transform(features)?;
        let model = self.ridge.fit(x.view(), ArrayView1::from(targets))?;

        debug!(
            rows = features.n_rows(),
            features_out = preprocessor.n_features_out(),
            intercept = model.intercept(),
            "Pipeline fitted"
        );

        self.fitted = Some(FittedState {
            preprocessor,
            model,
        });
        Ok(())
    }

    /// Predict targets for `features`
    pub fn predict(&self, features: &Frame) -> Result<Vec<f64>> {
        let state = self.fitted.as_ref().ok_or(PredictorError::NotFitted)?;
        let x = state.preprocessor.transform(features)?;
        Ok(state.model.predict(x.view())?.to_vec())
    }
}

impl Predictor for ModelPipeline {
    fn predict(&self, features: &Frame) -> Result<Vec<f64>> {
        ModelPipeline::predict(self, features)
    }
}
