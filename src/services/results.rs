use time::PrimitiveDateTime;

use crate::core::time::{elapsed_whole_minutes, format_mdy_hm};
use crate::db::models::{QuizAttempt, User};

/// Aggregate over the completed attempts of one quiz.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoreStats {
    pub(crate) total_attempts: usize,
    /// Mean score rounded to one decimal place.
    pub(crate) average_score: f64,
    pub(crate) highest_score: i32,
    pub(crate) lowest_score: i32,
}

pub(crate) fn score_stats(scores: &[i32]) -> ScoreStats {
    if scores.is_empty() {
        return ScoreStats {
            total_attempts: 0,
            average_score: 0.0,
            highest_score: 0,
            lowest_score: 0,
        };
    }

    let sum: i64 = scores.iter().map(|score| i64::from(*score)).sum();
    let average = sum as f64 / scores.len() as f64;

    ScoreStats {
        total_attempts: scores.len(),
        average_score: (average * 10.0).round() / 10.0,
        highest_score: scores.iter().copied().max().unwrap_or(0),
        lowest_score: scores.iter().copied().min().unwrap_or(0),
    }
}

pub(crate) fn completed_scores(attempts: &[QuizAttempt]) -> Vec<i32> {
    attempts
        .iter()
        .filter(|attempt| attempt.completed)
        .filter_map(|attempt| attempt.score)
        .collect()
}

pub(crate) struct CsvRow<'a> {
    pub(crate) student_name: &'a str,
    pub(crate) email: &'a str,
    pub(crate) score: i32,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) completed_at: PrimitiveDateTime,
}

impl<'a> CsvRow<'a> {
    pub(crate) fn new(student: &'a User, attempt: &'a QuizAttempt) -> Option<Self> {
        let completed_at = attempt.completed_at?;
        Some(Self {
            student_name: &student.full_name,
            email: &student.email,
            score: attempt.score.unwrap_or(0),
            started_at: attempt.started_at,
            completed_at,
        })
    }
}

/// Results export consumed by examiners; column set and formats are part of
/// the external contract.
pub(crate) fn render_results_csv(rows: &[CsvRow<'_>]) -> String {
    let mut csv = String::from("Student Name,Email,Score,Time Taken (min),Submission Date\n");

    for row in rows {
        let minutes = elapsed_whole_minutes(row.started_at, row.completed_at);
        csv.push_str(&format!(
            "{},{},{}%,{},{}\n",
            row.student_name,
            row.email,
            row.score,
            minutes,
            format_mdy_hm(row.completed_at),
        ));
    }

    csv
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Month, Time};

    fn stamp(day: u8, hour: u8, minute: u8) -> PrimitiveDateTime {
        let date = Date::from_calendar_date(2025, Month::March, day).unwrap();
        PrimitiveDateTime::new(date, Time::from_hms(hour, minute, 0).unwrap())
    }

    #[test]
    fn stats_over_empty_set_are_zero() {
        let stats = score_stats(&[]);
        assert_eq!(stats, ScoreStats {
            total_attempts: 0,
            average_score: 0.0,
            highest_score: 0,
            lowest_score: 0,
        });
    }

    #[test]
    fn stats_mean_rounds_to_one_decimal() {
        // (85 + 70 + 90) / 3 = 81.666... -> 81.7
        let stats = score_stats(&[85, 70, 90]);
        assert_eq!(stats.average_score, 81.7);
        assert_eq!(stats.highest_score, 90);
        assert_eq!(stats.lowest_score, 70);
        assert_eq!(stats.total_attempts, 3);
    }

    #[test]
    fn stats_single_score() {
        let stats = score_stats(&[50]);
        assert_eq!(stats.average_score, 50.0);
        assert_eq!(stats.highest_score, 50);
        assert_eq!(stats.lowest_score, 50);
    }

    #[test]
    fn csv_header_and_rows_match_contract() {
        let admin_fixture = crate::test_support::fixture_user(crate::db::types::UserRole::User, "pw");
        let mut student = admin_fixture;
        student.full_name = "Jane Cooper".to_string();
        student.email = "jane@example.com".to_string();

        let attempt = crate::db::models::QuizAttempt {
            id: "attempt-1".to_string(),
            user_id: student.id.clone(),
            quiz_id: "quiz-1".to_string(),
            started_at: stamp(4, 10, 0),
            completed_at: Some(stamp(4, 10, 22)),
            score: Some(85),
            completed: true,
        };

        let row = CsvRow::new(&student, &attempt).expect("row");
        let csv = render_results_csv(&[row]);

        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Student Name,Email,Score,Time Taken (min),Submission Date")
        );
        assert_eq!(lines.next(), Some("Jane Cooper,jane@example.com,85%,22,03/04/2025 10:22"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_row_requires_completion_timestamp() {
        let student = crate::test_support::fixture_user(crate::db::types::UserRole::User, "pw");
        let attempt = crate::db::models::QuizAttempt {
            id: "attempt-1".to_string(),
            user_id: student.id.clone(),
            quiz_id: "quiz-1".to_string(),
            started_at: stamp(4, 10, 0),
            completed_at: None,
            score: None,
            completed: false,
        };

        assert!(CsvRow::new(&student, &attempt).is_none());
    }
}
