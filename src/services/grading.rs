use std::collections::HashMap;

use thiserror::Error;

use crate::db::models::{Question, QuestionOption};

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum GradingError {
    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(String),
    #[error("option {option_id} is not part of question {question_id}")]
    UnknownOption { question_id: String, option_id: String },
}

/// Everything the grader needs to know about one question.
#[derive(Debug, Clone)]
pub(crate) struct QuestionKey {
    pub(crate) id: String,
    pub(crate) points: i32,
    pub(crate) options: Vec<OptionKey>,
}

#[derive(Debug, Clone)]
pub(crate) struct OptionKey {
    pub(crate) id: String,
    pub(crate) is_correct: bool,
}

/// One submitted answer entry, already shape-normalized from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AnswerEntry {
    pub(crate) question_id: String,
    pub(crate) response: AnswerResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AnswerResponse {
    SelectedOption(String),
    FreeText(String),
    /// The entry named a question but carried no usable payload. It still
    /// counts toward the total; it can never earn.
    Empty,
}

#[derive(Debug, Clone)]
pub(crate) struct GradedAnswer {
    pub(crate) question_id: String,
    pub(crate) selected_option_id: Option<String>,
    pub(crate) free_text: Option<String>,
    pub(crate) is_correct: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct GradeOutcome {
    pub(crate) answers: Vec<GradedAnswer>,
    pub(crate) earned_points: i32,
    pub(crate) total_points: i32,
    pub(crate) score: i32,
}

pub(crate) fn question_key(questions: &[Question], options: &[QuestionOption]) -> Vec<QuestionKey> {
    let mut by_question: HashMap<&str, Vec<OptionKey>> = HashMap::new();
    for option in options {
        by_question
            .entry(option.question_id.as_str())
            .or_default()
            .push(OptionKey { id: option.id.clone(), is_correct: option.is_correct });
    }

    questions
        .iter()
        .map(|question| QuestionKey {
            id: question.id.clone(),
            points: question.points,
            options: by_question.remove(question.id.as_str()).unwrap_or_default(),
        })
        .collect()
}

/// Scores a submission against the quiz's question key.
///
/// Each entry adds its question's points to the denominator. Selected options
/// earn the full question points when the option is marked correct; free-text
/// responses are recorded but never earn (manual grading is out of scope).
/// The score is the percentage, rounded, and pinned to 0 when the quiz has no
/// scored questions.
pub(crate) fn grade(
    questions: &[QuestionKey],
    entries: &[AnswerEntry],
) -> Result<GradeOutcome, GradingError> {
    let by_id: HashMap<&str, &QuestionKey> =
        questions.iter().map(|question| (question.id.as_str(), question)).collect();

    let mut answers = Vec::new();
    let mut total_points = 0;
    let mut earned_points = 0;

    for entry in entries {
        let question = by_id
            .get(entry.question_id.as_str())
            .ok_or_else(|| GradingError::UnknownQuestion(entry.question_id.clone()))?;

        total_points += question.points;

        match &entry.response {
            AnswerResponse::SelectedOption(option_id) => {
                let option = question
                    .options
                    .iter()
                    .find(|option| option.id == *option_id)
                    .ok_or_else(|| GradingError::UnknownOption {
                        question_id: entry.question_id.clone(),
                        option_id: option_id.clone(),
                    })?;

                if option.is_correct {
                    earned_points += question.points;
                }

                answers.push(GradedAnswer {
                    question_id: entry.question_id.clone(),
                    selected_option_id: Some(option.id.clone()),
                    free_text: None,
                    is_correct: option.is_correct,
                });
            }
            AnswerResponse::FreeText(text) => {
                answers.push(GradedAnswer {
                    question_id: entry.question_id.clone(),
                    selected_option_id: None,
                    free_text: Some(text.clone()),
                    is_correct: false,
                });
            }
            AnswerResponse::Empty => {
                tracing::debug!(question_id = %entry.question_id, "Answer entry carried no payload");
            }
        }
    }

    let score = percentage_score(earned_points, total_points);

    Ok(GradeOutcome { answers, earned_points, total_points, score })
}

fn percentage_score(earned: i32, total: i32) -> i32 {
    if total == 0 {
        return 0;
    }
    let raw = (f64::from(earned) * 100.0 / f64::from(total)).round() as i32;
    raw.clamp(0, 100)
}

/// Pulls the answer list out of a submission body.
///
/// Two historical client shapes are accepted: `{"answers": [...]}` and the
/// doubly-wrapped `{"answers": {"answers": [...]}}`. Anything else degrades
/// to "no answers" instead of failing the submission.
pub(crate) fn extract_entries(payload: &serde_json::Value) -> Vec<AnswerEntry> {
    const EMPTY: &[serde_json::Value] = &[];

    let raw: &[serde_json::Value] = match payload.get("answers") {
        Some(serde_json::Value::Array(items)) => items.as_slice(),
        Some(serde_json::Value::Object(wrapper)) => match wrapper.get("answers") {
            Some(serde_json::Value::Array(items)) => items.as_slice(),
            _ => {
                tracing::warn!("Unrecognized nested answers shape; treating submission as empty");
                EMPTY
            }
        },
        _ => {
            tracing::warn!("Unrecognized answers payload shape; treating submission as empty");
            EMPTY
        }
    };

    raw.iter().filter_map(parse_entry).collect()
}

fn parse_entry(value: &serde_json::Value) -> Option<AnswerEntry> {
    let question_id = id_field(value, "questionId")?;

    let response = if let Some(option_id) = id_field(value, "selectedOptionId") {
        AnswerResponse::SelectedOption(option_id)
    } else if let Some(text) = value.get("answer").and_then(|v| v.as_str()) {
        AnswerResponse::FreeText(text.to_string())
    } else {
        AnswerResponse::Empty
    };

    Some(AnswerEntry { question_id, response })
}

/// Ids arrive as strings from current clients, but older ones sent numbers.
fn id_field(value: &serde_json::Value, key: &str) -> Option<String> {
    match value.get(key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(questions: &[(&str, i32, &[(&str, bool)])]) -> Vec<QuestionKey> {
        questions
            .iter()
            .map(|(id, points, options)| QuestionKey {
                id: id.to_string(),
                points: *points,
                options: options
                    .iter()
                    .map(|(option_id, is_correct)| OptionKey {
                        id: option_id.to_string(),
                        is_correct: *is_correct,
                    })
                    .collect(),
            })
            .collect()
    }

    fn select(question_id: &str, option_id: &str) -> AnswerEntry {
        AnswerEntry {
            question_id: question_id.to_string(),
            response: AnswerResponse::SelectedOption(option_id.to_string()),
        }
    }

    const TWO_QUESTIONS: &[(&str, i32, &[(&str, bool)])] = &[
        ("q1", 10, &[("q1-a", true), ("q1-b", false)]),
        ("q2", 10, &[("q2-a", false), ("q2-b", true)]),
    ];

    #[test]
    fn all_correct_scores_100() {
        let questions = key(TWO_QUESTIONS);
        let outcome =
            grade(&questions, &[select("q1", "q1-a"), select("q2", "q2-b")]).expect("grade");

        assert_eq!(outcome.score, 100);
        assert_eq!(outcome.earned_points, 20);
        assert_eq!(outcome.total_points, 20);
        assert!(outcome.answers.iter().all(|answer| answer.is_correct));
    }

    #[test]
    fn all_incorrect_scores_0() {
        let questions = key(TWO_QUESTIONS);
        let outcome =
            grade(&questions, &[select("q1", "q1-b"), select("q2", "q2-a")]).expect("grade");

        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.earned_points, 0);
        assert!(outcome.answers.iter().all(|answer| !answer.is_correct));
    }

    #[test]
    fn half_correct_scores_50() {
        let questions = key(TWO_QUESTIONS);
        let outcome =
            grade(&questions, &[select("q1", "q1-a"), select("q2", "q2-a")]).expect("grade");

        assert_eq!(outcome.score, 50);
        assert_eq!(outcome.earned_points, 10);
        assert_eq!(outcome.total_points, 20);
    }

    #[test]
    fn zero_questions_scores_0_without_division() {
        let outcome = grade(&[], &[]).expect("grade");
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.total_points, 0);
    }

    #[test]
    fn free_text_is_recorded_but_earns_nothing() {
        let questions = key(&[("q1", 10, &[("q1-a", true)])]);
        let entries = vec![AnswerEntry {
            question_id: "q1".to_string(),
            response: AnswerResponse::FreeText("my essay".to_string()),
        }];

        let outcome = grade(&questions, &entries).expect("grade");
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.total_points, 10);
        assert_eq!(outcome.answers.len(), 1);
        assert_eq!(outcome.answers[0].free_text.as_deref(), Some("my essay"));
        assert!(outcome.answers[0].selected_option_id.is_none());
        assert!(!outcome.answers[0].is_correct);
    }

    #[test]
    fn empty_payload_counts_toward_total_but_records_nothing() {
        let questions = key(TWO_QUESTIONS);
        let entries = vec![
            select("q1", "q1-a"),
            AnswerEntry { question_id: "q2".to_string(), response: AnswerResponse::Empty },
        ];

        let outcome = grade(&questions, &entries).expect("grade");
        assert_eq!(outcome.total_points, 20);
        assert_eq!(outcome.earned_points, 10);
        assert_eq!(outcome.score, 50);
        assert_eq!(outcome.answers.len(), 1);
    }

    #[test]
    fn unknown_question_is_an_error() {
        let questions = key(TWO_QUESTIONS);
        let err = grade(&questions, &[select("q9", "q1-a")]).unwrap_err();
        assert_eq!(err, GradingError::UnknownQuestion("q9".to_string()));
    }

    #[test]
    fn option_from_another_question_is_an_error() {
        let questions = key(TWO_QUESTIONS);
        let err = grade(&questions, &[select("q1", "q2-b")]).unwrap_err();
        assert_eq!(
            err,
            GradingError::UnknownOption {
                question_id: "q1".to_string(),
                option_id: "q2-b".to_string()
            }
        );
    }

    #[test]
    fn uneven_points_round_to_nearest() {
        // 1 of 3 one-point questions correct: 33.33 rounds to 33.
        let questions = key(&[
            ("q1", 1, &[("a", true)]),
            ("q2", 1, &[("b", true)]),
            ("q3", 1, &[("c", true)]),
        ]);
        let entries = vec![
            select("q1", "a"),
            AnswerEntry { question_id: "q2".to_string(), response: AnswerResponse::Empty },
            AnswerEntry { question_id: "q3".to_string(), response: AnswerResponse::Empty },
        ];

        let outcome = grade(&questions, &entries).expect("grade");
        assert_eq!(outcome.score, 33);
    }

    #[test]
    fn extract_entries_direct_list() {
        let payload = json!({
            "answers": [
                {"questionId": "q1", "selectedOptionId": "o1"},
                {"questionId": "q2", "answer": "free form"},
            ]
        });

        let entries = extract_entries(&payload);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], AnswerEntry {
            question_id: "q1".to_string(),
            response: AnswerResponse::SelectedOption("o1".to_string()),
        });
        assert_eq!(entries[1], AnswerEntry {
            question_id: "q2".to_string(),
            response: AnswerResponse::FreeText("free form".to_string()),
        });
    }

    #[test]
    fn extract_entries_wrapped_list() {
        let payload = json!({
            "answers": {"answers": [{"questionId": "q1", "selectedOptionId": "o1"}]}
        });

        let entries = extract_entries(&payload);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].question_id, "q1");
    }

    #[test]
    fn extract_entries_unrecognized_shape_degrades_to_empty() {
        assert!(extract_entries(&json!({"answers": "what"})).is_empty());
        assert!(extract_entries(&json!({"answers": {"nested": true}})).is_empty());
        assert!(extract_entries(&json!({})).is_empty());
    }

    #[test]
    fn extract_entries_accepts_numeric_ids() {
        let payload = json!({"answers": [{"questionId": 7, "selectedOptionId": 12}]});
        let entries = extract_entries(&payload);
        assert_eq!(entries[0], AnswerEntry {
            question_id: "7".to_string(),
            response: AnswerResponse::SelectedOption("12".to_string()),
        });
    }

    #[test]
    fn extract_entries_skips_entries_without_question_id() {
        let payload = json!({"answers": [{"selectedOptionId": "o1"}, {"questionId": "q1"}]});
        let entries = extract_entries(&payload);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].response, AnswerResponse::Empty);
    }
}
