//! Predictor Client
//!
//! Reads the civic inputs off the page, asks the prediction service for a
//! verdict, renders it into the output container and speaks a summary.

mod client;
mod flow;
pub mod markup;

pub use client::{DEFAULT_ENDPOINT, PredictionClient};
pub use flow::{PredictFlow, Predictor};
pub use markup::MarkupMode;

#[cfg(test)]
pub use flow::MockPredictFlow;

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::Result;
use crate::page::{
    COMPLAINTS_ID, FormSource, POLLUTION_ID, POWER_USAGE_ID, TRAFFIC_ID, WATER_USE_ID,
};

/// Text rendered for a field the service left out
pub const UNDEFINED: &str = "undefined";

/// The five civic readings, captured verbatim from the page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CivicInputs {
    pub traffic: String,
    pub pollution: String,
    pub power_usage: String,
    pub water_use: String,
    pub complaints: String,
}

impl CivicInputs {
    /// Read every field from the page. Fails on the first missing element.
    pub fn read_from(form: &dyn FormSource) -> Result<Self> {
        Ok(Self {
            traffic: form.field_value(TRAFFIC_ID)?,
            pollution: form.field_value(POLLUTION_ID)?,
            power_usage: form.field_value(POWER_USAGE_ID)?,
            water_use: form.field_value(WATER_USE_ID)?,
            complaints: form.field_value(COMPLAINTS_ID)?,
        })
    }

    /// Values in field order
    pub fn values(&self) -> [&str; 5] {
        [
            self.traffic.as_str(),
            self.pollution.as_str(),
            self.power_usage.as_str(),
            self.water_use.as_str(),
            self.complaints.as_str(),
        ]
    }
}

/// Verdict returned by the prediction service.
///
/// The service owns the shape: every field is optional and kept as raw JSON,
/// so a string score or a missing suggestion still renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionResult {
    pub mood: Option<Value>,
    pub score: Option<Value>,
    pub suggestion: Option<Value>,
}

impl PredictionResult {
    /// Pick the known fields out of a JSON object. Any other document is a
    /// `CivicError::Parse`.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut map: Map<String, Value> = serde_json::from_value(value)?;
        Ok(Self {
            mood: map.remove("mood"),
            score: map.remove("score"),
            suggestion: map.remove("suggestion"),
        })
    }

    pub fn mood_text(&self) -> String {
        field_text(self.mood.as_ref())
    }

    pub fn score_text(&self) -> String {
        field_text(self.score.as_ref())
    }

    pub fn suggestion_text(&self) -> String {
        field_text(self.suggestion.as_ref())
    }
}

fn field_text(value: Option<&Value>) -> String {
    match value {
        None => UNDEFINED.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => number_text(n),
        Some(other) => other.to_string(),
    }
}

/// Whole floats print without a fraction (`82.0` -> `82`), as a browser
/// would print the number.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{:.0}", f)
            }
        }
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MockFormSource;
    use crate::error::CivicError;
    use serde_json::json;

    #[test]
    fn test_inputs_serialize_with_fixed_keys_in_order() {
        let inputs = CivicInputs {
            traffic: "70".to_string(),
            pollution: "55".to_string(),
            power_usage: "40".to_string(),
            water_use: "35".to_string(),
            complaints: "12".to_string(),
        };
        let body = serde_json::to_string(&inputs).unwrap();
        assert_eq!(
            body,
            r#"{"traffic":"70","pollution":"55","power_usage":"40","water_use":"35","complaints":"12"}"#
        );
    }

    #[test]
    fn test_read_from_reads_every_field() {
        let mut form = MockFormSource::new();
        form.expect_field_value()
            .times(5)
            .returning(|id| Ok(format!("{}-value", id)));

        let inputs = CivicInputs::read_from(&form).unwrap();
        assert_eq!(inputs.traffic, "traffic-value");
        assert_eq!(inputs.power_usage, "power_usage-value");
        assert_eq!(inputs.complaints, "complaints-value");
    }

    #[test]
    fn test_read_from_stops_at_missing_field() {
        let mut form = MockFormSource::new();
        form.expect_field_value()
            .returning(|id| match id {
                "water_use" => Err(CivicError::element_not_found(id)),
                _ => Ok("1".to_string()),
            });

        let err = CivicInputs::read_from(&form).unwrap_err();
        assert!(matches!(err, CivicError::ElementNotFound { ref id } if id == "water_use"));
    }

    #[test]
    fn test_result_from_full_object() {
        let result = PredictionResult::from_value(json!({
            "mood": "Calm",
            "score": 82,
            "suggestion": "Reduce water use"
        }))
        .unwrap();
        assert_eq!(result.mood_text(), "Calm");
        assert_eq!(result.score_text(), "82");
        assert_eq!(result.suggestion_text(), "Reduce water use");
    }

    #[test]
    fn test_result_missing_fields_render_undefined() {
        let result = PredictionResult::from_value(json!({"mood": "green", "civic_stress": 21.4}))
            .unwrap();
        assert_eq!(result.mood_text(), "green");
        assert_eq!(result.score_text(), "undefined");
        assert_eq!(result.suggestion_text(), "undefined");
    }

    #[test]
    fn test_result_string_score_and_null() {
        let result = PredictionResult::from_value(json!({
            "mood": null,
            "score": "high",
            "suggestion": "Plant trees"
        }))
        .unwrap();
        assert_eq!(result.mood_text(), "null");
        assert_eq!(result.score_text(), "high");
    }

    #[test]
    fn test_result_from_non_object_is_parse_error() {
        for body in [json!([1, 2, 3]), json!(null), json!(42), json!("Calm")] {
            let err = PredictionResult::from_value(body).unwrap_err();
            assert!(matches!(err, CivicError::Parse(_)), "unexpected error: {}", err);
        }
    }

    #[test]
    fn test_whole_float_score_prints_as_integer() {
        let score = |v: Value| {
            PredictionResult::from_value(json!({ "score": v }))
                .unwrap()
                .score_text()
        };
        assert_eq!(score(json!(82.0)), "82");
        assert_eq!(score(json!(82.5)), "82.5");
        assert_eq!(score(json!(-3.0)), "-3");
        assert_eq!(score(json!(-0.0)), "0");
        assert_eq!(score(json!(82)), "82");
        assert_eq!(score(json!(0.25)), "0.25");
    }
}
