//! Column-wise preprocessing
//!
//! Numerical columns are standardized, categorical columns are one-hot encoded
//! with the first category dropped, and every other column is passed through.
//! The output matrix lays out the numerical block first, then the categorical
//! block, then the passthrough block.

use super::features::ColumnRoles;
use crate::dataset::Frame;
use crate::error::{PredictorError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Unfitted column transformer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    roles: ColumnRoles,
}

/// Build the transformer: standard scaling for `numerical`, one-hot for `categorical`
pub fn build_preprocessor(categorical: Vec<String>, numerical: Vec<String>) -> Preprocessor {
    Preprocessor {
        roles: ColumnRoles {
            categorical,
            numerical,
        },
    }
}

/// Mean and scale learned for one numerical column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub column: String,
    pub mean: f64,
    /// Population standard deviation; 1.0 for constant columns
    pub scale: f64,
}

/// Categories learned for one categorical column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotParams {
    pub column: String,
    /// All observed categories, sorted. The first one is dropped from the output.
    pub categories: Vec<String>,
}

impl OneHotParams {
    pub fn encoded_categories(&self) -> &[String] {
        self.categories.get(1..).unwrap_or(&[])
    }
}

/// Name and storage class of a column seen at fit time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub numeric: bool,
}

/// Column transformer with statistics learned from training data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPreprocessor {
    input_schema: Vec<ColumnSchema>,
    scalers: Vec<ScalerParams>,
    encoders: Vec<OneHotParams>,
    passthrough: Vec<String>,
}

impl Preprocessor {
    pub fn roles(&self) -> &ColumnRoles {
        &self.roles
    }

    /// Learn scaling statistics and categories from `features`
    pub fn fit(&self, features: &Frame) -> Result<FittedPreprocessor> {
        if features.n_rows() == 0 {
            return Err(PredictorError::InvalidInput(
                "cannot fit preprocessor on empty data".to_string(),
            ));
        }

        if let Some(dup) = self
            .roles
            .numerical
            .iter()
            .find(|c| self.roles.categorical.contains(*c))
        {
            return Err(PredictorError::InvalidInput(format!(
                "column `{}` is listed as both numerical and categorical",
                dup
            )));
        }

        let mut scalers = Vec::with_capacity(self.roles.numerical.len());
        for name in &self.roles.numerical {
            let values = numeric_values(features, name)?;
            scalers.push(fit_scaler(name, &values));
        }

        let mut encoders = Vec::with_capacity(self.roles.categorical.len());
        for name in &self.roles.categorical {
            let column = features.require(name)?;
            let categories: BTreeSet<String> =
                (0..features.n_rows()).map(|i| column.data.label(i)).collect();
            encoders.push(OneHotParams {
                column: name.clone(),
                categories: categories.into_iter().collect(),
            });
        }

        let mut passthrough = Vec::new();
        for column in features.columns() {
            let assigned = self.roles.numerical.contains(&column.name)
                || self.roles.categorical.contains(&column.name);
            if !assigned {
                numeric_values(features, &column.name)?;
                passthrough.push(column.name.clone());
            }
        }

        let input_schema = features
            .columns()
            .iter()
            .map(|c| ColumnSchema {
                name: c.name.clone(),
                numeric: c.kind().is_numeric(),
            })
            .collect();

        Ok(FittedPreprocessor {
            input_schema,
            scalers,
            encoders,
            passthrough,
        })
    }
}

fn fit_scaler(name: &str, values: &[f64]) -> ScalerParams {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = var.sqrt();
    ScalerParams {
        column: name.to_string(),
        mean,
        scale: if std == 0.0 { 1.0 } else { std },
    }
}

/// Finite numeric values of a column, or the appropriate error
fn numeric_values(frame: &Frame, name: &str) -> Result<Vec<f64>> {
    let column = frame.require(name)?;
    let values = column.data.to_f64_vec().ok_or_else(|| {
        PredictorError::SchemaMismatch(format!(
            "column `{}` must be numeric, found {}",
            name,
            column.kind()
        ))
    })?;
    if let Some(row) = values.iter().position(|v| !v.is_finite()) {
        return Err(PredictorError::InvalidInput(format!(
            "column `{}` has a missing or non-finite value at row {}",
            name, row
        )));
    }
    Ok(values)
}

impl FittedPreprocessor {
    pub fn input_schema(&self) -> &[ColumnSchema] {
        &self.input_schema
    }

    pub fn scalers(&self) -> &[ScalerParams] {
        &self.scalers
    }

    pub fn encoders(&self) -> &[OneHotParams] {
        &self.encoders
    }

    pub fn n_features_out(&self) -> usize {
        self.scalers.len()
            + self
                .encoders
                .iter()
                .map(|e| e.encoded_categories().len())
                .sum::<usize>()
            + self.passthrough.len()
    }

    /// Output feature names, in matrix column order
    pub fn feature_names_out(&self) -> Vec<String> {
        let mut names: Vec<String> = self.scalers.iter().map(|s| s.column.clone()).collect();
        for enc in &self.encoders {
            for cat in enc.encoded_categories() {
                names.push(format!("{}_{}", enc.column, cat));
            }
        }
        names.extend(self.passthrough.iter().cloned());
        names
    }

    /// Check that `frame` has exactly the fit-time columns with matching storage classes
    pub fn check_schema(&self, frame: &Frame) -> Result<()> {
        let missing: Vec<&str> = self
            .input_schema
            .iter()
            .filter(|s| !frame.has_column(&s.name))
            .map(|s| s.name.as_str())
            .collect();
        let unexpected: Vec<&str> = frame
            .column_names()
            .into_iter()
            .filter(|name| !self.input_schema.iter().any(|s| s.name == *name))
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(PredictorError::SchemaMismatch(format!(
                "columns differ from those seen at fit time (missing: {:?}, unexpected: {:?})",
                missing, unexpected
            )));
        }

        for schema in &self.input_schema {
            let kind = frame.require(&schema.name)?.kind();
            if kind.is_numeric() != schema.numeric {
                let expected = if schema.numeric { "numeric" } else { "text" };
                return Err(PredictorError::SchemaMismatch(format!(
                    "column `{}` should be {}, found {}",
                    schema.name, expected, kind
                )));
            }
        }
        Ok(())
    }

    /// Transform `frame` into the model's design matrix
    ///
    /// Categories not seen during fit encode to all zeros.
    pub fn transform(&self, frame: &Frame) -> Result<Array2<f64>> {
        self.check_schema(frame)?;

        let n_rows = frame.n_rows();
        let mut out = Array2::<f64>::zeros((n_rows, self.n_features_out()));
        let mut col = 0;

        for scaler in &self.scalers {
            let values = numeric_values(frame, &scaler.column)?;
            for (row, v) in values.iter().enumerate() {
                out[[row, col]] = (v - scaler.mean) / scaler.scale;
            }
            col += 1;
        }

        for enc in &self.encoders {
            let data = &frame.require(&enc.column)?.data;
            let encoded = enc.encoded_categories();
            for row in 0..n_rows {
                let label = data.label(row);
                if let Some(pos) = encoded.iter().position(|c| *c == label) {
                    out[[row, col + pos]] = 1.0;
                }
            }
            col += encoded.len();
        }

        for name in &self.passthrough {
            let values = numeric_values(frame, name)?;
            for (row, v) in values.iter().enumerate() {
                out[[row, col]] = *v;
            }
            col += 1;
        }

        Ok(out)
    }
}
