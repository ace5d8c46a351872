use serde::Serialize;

use crate::core::time::{elapsed_whole_minutes, format_mdy, format_primitive};
use crate::db::models::{Quiz, QuizAttempt, User};
use crate::services::results::ScoreStats;

#[derive(Debug, Serialize)]
pub(crate) struct SubmitResponse {
    pub(crate) score: i32,
    #[serde(rename = "completedAt")]
    pub(crate) completed_at: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct HistoryQuizRef {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) examiner: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct HistoryRow {
    pub(crate) id: String,
    pub(crate) quiz: HistoryQuizRef,
    #[serde(rename = "startedAt")]
    pub(crate) started_at: String,
    #[serde(rename = "completedAt")]
    pub(crate) completed_at: Option<String>,
    pub(crate) score: Option<i32>,
}

impl HistoryRow {
    pub(crate) fn from_db(attempt: &QuizAttempt, quiz: &Quiz, examiner_name: String) -> Self {
        Self {
            id: attempt.id.clone(),
            quiz: HistoryQuizRef {
                id: quiz.id.clone(),
                title: quiz.title.clone(),
                examiner: examiner_name,
            },
            started_at: format_primitive(attempt.started_at),
            completed_at: attempt.completed_at.map(format_primitive),
            score: attempt.score,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptUserRef {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: String,
}

impl AttemptUserRef {
    pub(crate) fn from_db(user: &User) -> Self {
        Self { id: user.id.clone(), name: user.full_name.clone(), email: user.email.clone() }
    }
}

/// One completed attempt as listed in a quiz's results view.
#[derive(Debug, Serialize)]
pub(crate) struct ResultAttemptRow {
    pub(crate) id: String,
    pub(crate) user: AttemptUserRef,
    #[serde(rename = "startedAt")]
    pub(crate) started_at: String,
    #[serde(rename = "completedAt")]
    pub(crate) completed_at: String,
    pub(crate) score: i32,
    #[serde(rename = "minutesTaken")]
    pub(crate) minutes_taken: i64,
    #[serde(rename = "formattedDate")]
    pub(crate) formatted_date: String,
}

impl ResultAttemptRow {
    pub(crate) fn from_db(attempt: &QuizAttempt, user: &User) -> Option<Self> {
        let completed_at = attempt.completed_at?;
        Some(Self {
            id: attempt.id.clone(),
            user: AttemptUserRef::from_db(user),
            started_at: format_primitive(attempt.started_at),
            completed_at: format_primitive(completed_at),
            score: attempt.score.unwrap_or(0),
            minutes_taken: elapsed_whole_minutes(attempt.started_at, completed_at),
            formatted_date: format_mdy(completed_at),
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizStatistics {
    pub(crate) title: String,
    #[serde(rename = "quizId")]
    pub(crate) quiz_id: String,
    #[serde(rename = "averageScore")]
    pub(crate) average_score: f64,
    #[serde(rename = "highestScore")]
    pub(crate) highest_score: i32,
    #[serde(rename = "lowestScore")]
    pub(crate) lowest_score: i32,
}

impl QuizStatistics {
    pub(crate) fn from_stats(quiz: &Quiz, stats: &ScoreStats) -> Self {
        Self {
            title: quiz.title.clone(),
            quiz_id: quiz.id.clone(),
            average_score: stats.average_score,
            highest_score: stats.highest_score,
            lowest_score: stats.lowest_score,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizResultsResponse {
    pub(crate) statistics: QuizStatistics,
    pub(crate) attempts: Vec<ResultAttemptRow>,
}

/// Option detail in the post-completion review; correctness is revealed here.
#[derive(Debug, Serialize)]
pub(crate) struct ReviewOption {
    pub(crate) id: String,
    pub(crate) text: String,
    #[serde(rename = "isCorrect")]
    pub(crate) is_correct: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReviewQuestionRef {
    pub(crate) id: String,
    pub(crate) text: String,
    pub(crate) points: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReviewSelection {
    #[serde(rename = "optionId", skip_serializing_if = "Option::is_none")]
    pub(crate) option_id: Option<String>,
    #[serde(rename = "optionText", skip_serializing_if = "Option::is_none")]
    pub(crate) option_text: Option<String>,
    #[serde(rename = "freeText", skip_serializing_if = "Option::is_none")]
    pub(crate) free_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReviewAnswerRow {
    pub(crate) id: String,
    pub(crate) question: ReviewQuestionRef,
    pub(crate) selected: ReviewSelection,
    #[serde(rename = "isCorrect")]
    pub(crate) is_correct: bool,
    #[serde(rename = "allOptions")]
    pub(crate) all_options: Vec<ReviewOption>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptStatistics {
    #[serde(rename = "totalQuestions")]
    pub(crate) total_questions: usize,
    #[serde(rename = "answeredQuestions")]
    pub(crate) answered_questions: usize,
    #[serde(rename = "correctAnswers")]
    pub(crate) correct_answers: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptDetailQuizRef {
    pub(crate) id: String,
    pub(crate) title: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptDetailResponse {
    pub(crate) id: String,
    pub(crate) quiz: AttemptDetailQuizRef,
    pub(crate) user: AttemptUserRef,
    #[serde(rename = "startedAt")]
    pub(crate) started_at: String,
    #[serde(rename = "completedAt")]
    pub(crate) completed_at: Option<String>,
    pub(crate) score: Option<i32>,
    #[serde(rename = "minutesTaken")]
    pub(crate) minutes_taken: Option<i64>,
    pub(crate) answers: Vec<ReviewAnswerRow>,
    pub(crate) statistics: AttemptStatistics,
}

#[derive(Debug, Serialize)]
pub(crate) struct DashboardQuizRow {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    #[serde(rename = "createdAt")]
    pub(crate) created_at: String,
    #[serde(rename = "totalAttempts")]
    pub(crate) total_attempts: usize,
    #[serde(rename = "averageScore")]
    pub(crate) average_score: f64,
    #[serde(rename = "highestScore")]
    pub(crate) highest_score: i32,
    #[serde(rename = "lowestScore")]
    pub(crate) lowest_score: i32,
}

impl DashboardQuizRow {
    pub(crate) fn from_stats(quiz: &Quiz, stats: &ScoreStats) -> Self {
        Self {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            created_at: format_primitive(quiz.created_at),
            total_attempts: stats.total_attempts,
            average_score: stats.average_score,
            highest_score: stats.highest_score,
            lowest_score: stats.lowest_score,
        }
    }
}
