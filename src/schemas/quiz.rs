use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Quiz, QuestionOption};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct OptionCreate {
    #[serde(alias = "optionText")]
    #[validate(length(min = 1, max = 500, message = "option text must be 1-500 characters"))]
    pub(crate) option_text: String,
    #[serde(default)]
    #[serde(alias = "isCorrect")]
    pub(crate) is_correct: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionCreate {
    #[serde(alias = "questionText")]
    #[validate(length(min = 1, max = 1000, message = "question text must be 1-1000 characters"))]
    pub(crate) question_text: String,
    #[serde(default = "default_points")]
    #[validate(range(min = 0, message = "points must be non-negative"))]
    pub(crate) points: i32,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) options: Vec<OptionCreate>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuizCreate {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub(crate) title: String,
    #[validate(length(min = 1, max = 1000, message = "description must be 1-1000 characters"))]
    pub(crate) description: String,
    #[serde(alias = "timeLimit")]
    #[validate(range(min = 1, message = "time limit must be at least one minute"))]
    pub(crate) time_limit_minutes: i32,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) questions: Vec<QuestionCreate>,
}

fn default_points() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuizStatusUpdate {
    pub(crate) active: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExaminerQuizRow {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    #[serde(rename = "timeLimit")]
    pub(crate) time_limit_minutes: i32,
    pub(crate) active: bool,
    #[serde(rename = "createdAt")]
    pub(crate) created_at: String,
    #[serde(rename = "questionCount")]
    pub(crate) question_count: i64,
}

impl ExaminerQuizRow {
    pub(crate) fn from_db(quiz: &Quiz, question_count: i64) -> Self {
        Self {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            time_limit_minutes: quiz.time_limit_minutes,
            active: quiz.is_active,
            created_at: format_primitive(quiz.created_at),
            question_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentQuizRow {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    #[serde(rename = "timeLimit")]
    pub(crate) time_limit_minutes: i32,
    #[serde(rename = "createdAt")]
    pub(crate) created_at: String,
    #[serde(rename = "questionCount")]
    pub(crate) question_count: i64,
    pub(crate) examiner: String,
}

impl StudentQuizRow {
    pub(crate) fn from_db(quiz: &Quiz, question_count: i64, examiner_name: String) -> Self {
        Self {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            time_limit_minutes: quiz.time_limit_minutes,
            created_at: format_primitive(quiz.created_at),
            question_count,
            examiner: examiner_name,
        }
    }
}

/// Option as shown to a taker: correctness stays hidden until completion.
#[derive(Debug, Serialize)]
pub(crate) struct TakerOption {
    pub(crate) id: String,
    #[serde(rename = "optionText")]
    pub(crate) option_text: String,
}

impl TakerOption {
    pub(crate) fn from_db(option: &QuestionOption) -> Self {
        Self { id: option.id.clone(), option_text: option.option_text.clone() }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TakerQuestion {
    pub(crate) id: String,
    #[serde(rename = "questionText")]
    pub(crate) question_text: String,
    pub(crate) points: i32,
    pub(crate) options: Vec<TakerOption>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizDetailResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    #[serde(rename = "timeLimit")]
    pub(crate) time_limit_minutes: i32,
    #[serde(rename = "attemptId")]
    pub(crate) attempt_id: String,
    #[serde(rename = "startedAt")]
    pub(crate) started_at: String,
    pub(crate) questions: Vec<TakerQuestion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_create_accepts_camel_case_aliases() {
        let payload = serde_json::json!({
            "title": "Basics",
            "description": "Intro quiz",
            "timeLimit": 30,
            "questions": [
                {
                    "questionText": "2+2?",
                    "points": 10,
                    "options": [
                        {"optionText": "4", "isCorrect": true},
                        {"optionText": "5"},
                    ],
                },
            ],
        });

        let parsed: QuizCreate = serde_json::from_value(payload).expect("parse");
        assert_eq!(parsed.time_limit_minutes, 30);
        assert_eq!(parsed.questions.len(), 1);
        assert_eq!(parsed.questions[0].options[0].option_text, "4");
        assert!(parsed.questions[0].options[0].is_correct);
        assert!(!parsed.questions[0].options[1].is_correct);
    }

    #[test]
    fn quiz_create_defaults_points_to_one() {
        let payload = serde_json::json!({
            "title": "Basics",
            "description": "Intro quiz",
            "timeLimit": 30,
            "questions": [{"questionText": "2+2?", "options": []}],
        });

        let parsed: QuizCreate = serde_json::from_value(payload).expect("parse");
        assert_eq!(parsed.questions[0].points, 1);
    }

    #[test]
    fn quiz_create_validation_rejects_empty_title() {
        let parsed: QuizCreate = serde_json::from_value(serde_json::json!({
            "title": "",
            "description": "d",
            "timeLimit": 10,
        }))
        .expect("parse");

        assert!(parsed.validate().is_err());
    }

    #[test]
    fn taker_option_hides_correctness() {
        let option = QuestionOption {
            id: "o1".to_string(),
            question_id: "q1".to_string(),
            option_text: "4".to_string(),
            is_correct: true,
            position: 0,
        };

        let json = serde_json::to_value(TakerOption::from_db(&option)).unwrap();
        assert!(json.get("isCorrect").is_none());
        assert!(json.get("is_correct").is_none());
    }
}
