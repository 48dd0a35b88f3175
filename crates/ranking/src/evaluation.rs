//! Offline evaluation from user survey responses.
//!
//! Each response marks every recommended attraction as relevant (1) or not
//! (0) and reports how many further relevant attractions the user would have
//! expected (`additionalAttractionsCount`). From that:
//! - precision = relevant / list size
//! - recall = relevant / (relevant + additional)
//! - F1 is taken over the averaged precision and recall

use crate::error::{RankingError, Result};
use serde::Serialize;
use serde_json::Value;

/// Number of recommendations shown to survey participants
pub const SURVEY_LIST_SIZE: usize = 10;

const ADDITIONAL_KEY: &str = "additionalAttractionsCount";

/// One participant's answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurveyResponse {
    pub relevant: usize,
    pub additional: usize,
}

impl SurveyResponse {
    /// Read a response object: `{ "<attractionId>": 0|1, ..., "additionalAttractionsCount": n }`
    pub fn from_record(record: &Value) -> Result<Self> {
        let object = record
            .as_object()
            .ok_or_else(|| RankingError::MalformedInput("survey response is not an object".into()))?;

        let relevant = object
            .iter()
            .filter(|(key, _)| key.as_str() != ADDITIONAL_KEY)
            .filter(|(_, value)| value.as_f64() == Some(1.0))
            .count();

        let additional = match object.get(ADDITIONAL_KEY) {
            None | Some(Value::Null) => 0,
            Some(value) => value.as_u64().ok_or_else(|| {
                RankingError::MalformedInput(format!("{} must be a non-negative integer", ADDITIONAL_KEY))
            })? as usize,
        };

        Ok(Self { relevant, additional })
    }

    pub fn precision(&self, list_size: usize) -> f64 {
        if list_size == 0 {
            return 0.0;
        }
        self.relevant as f64 / list_size as f64
    }

    /// 0 when the user found nothing relevant at all
    pub fn recall(&self) -> f64 {
        let denominator = self.relevant + self.additional;
        if denominator == 0 {
            return 0.0;
        }
        self.relevant as f64 / denominator as f64
    }
}

/// Aggregate metrics over all responses
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSummary {
    pub responses: usize,
    pub average_precision: f64,
    pub average_recall: f64,
    pub f1_score: f64,
}

/// Parse a JSON array of survey responses
pub fn parse_survey(records: &Value) -> Result<Vec<SurveyResponse>> {
    records
        .as_array()
        .ok_or_else(|| RankingError::MalformedInput("survey results are not an array".into()))?
        .iter()
        .map(SurveyResponse::from_record)
        .collect()
}

pub fn evaluate(responses: &[SurveyResponse], list_size: usize) -> EvaluationSummary {
    if responses.is_empty() {
        return EvaluationSummary {
            responses: 0,
            average_precision: 0.0,
            average_recall: 0.0,
            f1_score: 0.0,
        };
    }

    let n = responses.len() as f64;
    let average_precision = responses.iter().map(|r| r.precision(list_size)).sum::<f64>() / n;
    let average_recall = responses.iter().map(SurveyResponse::recall).sum::<f64>() / n;
    let f1_score = if average_precision + average_recall == 0.0 {
        0.0
    } else {
        2.0 * average_precision * average_recall / (average_precision + average_recall)
    };

    EvaluationSummary {
        responses: responses.len(),
        average_precision,
        average_recall,
        f1_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_counts_relevant() {
        let response = SurveyResponse::from_record(&json!({
            "a1": 1, "a2": 0, "a3": 1, "a4": 1,
            "additionalAttractionsCount": 1
        }))
        .unwrap();
        // The count field is never mistaken for a relevance mark
        assert_eq!(response, SurveyResponse { relevant: 3, additional: 1 });
        assert!((response.precision(SURVEY_LIST_SIZE) - 0.3).abs() < 1e-12);
        assert!((response.recall() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_missing_additional_defaults_to_zero() {
        let response = SurveyResponse::from_record(&json!({"a1": 1})).unwrap();
        assert_eq!(response.additional, 0);
        assert_eq!(response.recall(), 1.0);
    }

    #[test]
    fn test_evaluate_averages() {
        let responses = parse_survey(&json!([
            {"a1": 1, "a2": 1, "additionalAttractionsCount": 2},
            {"a1": 0, "a2": 1, "additionalAttractionsCount": 0}
        ]))
        .unwrap();
        let summary = evaluate(&responses, SURVEY_LIST_SIZE);

        assert_eq!(summary.responses, 2);
        assert!((summary.average_precision - 0.15).abs() < 1e-12);
        assert!((summary.average_recall - 0.75).abs() < 1e-12);
        assert!((summary.f1_score - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_empty() {
        assert_eq!(evaluate(&[], SURVEY_LIST_SIZE).f1_score, 0.0);
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(parse_survey(&json!([1])).is_err());
        assert!(parse_survey(&json!({})).is_err());
    }
}
