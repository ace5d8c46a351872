use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStudent;
use crate::core::state::AppState;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::db::models::{Quiz, QuizAttempt, User};
use crate::repositories;
use crate::schemas::attempt::{HistoryRow, SubmitResponse};
use crate::schemas::quiz::{QuizDetailResponse, StudentQuizRow, TakerOption, TakerQuestion};
use crate::services::grading::{self, GradingError};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/quizzes", get(list_quizzes))
        .route("/quizzes/:quiz_id", get(quiz_detail))
        .route("/quizzes/:quiz_id/submit", post(submit_quiz))
        .route("/history", get(history))
}

/// Active quizzes visible to this user. A user with an assigned examiner
/// only ever sees that examiner's quizzes.
async fn list_quizzes(
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentQuizRow>>, ApiError> {
    let quizzes = match user.assigned_examiner_id.as_deref() {
        Some(examiner_id) => {
            repositories::quizzes::list_active_by_examiner(state.db(), examiner_id).await
        }
        None => repositories::quizzes::list_active(state.db()).await,
    }
    .map_err(|e| ApiError::internal(e, "Failed to list quizzes"))?;

    let mut rows = Vec::with_capacity(quizzes.len());
    for quiz in &quizzes {
        let question_count = repositories::questions::count_by_quiz(state.db(), &quiz.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count questions"))?;
        let examiner_name = repositories::users::find_name_by_id(state.db(), &quiz.examiner_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load examiner"))?
            .unwrap_or_default();

        rows.push(StudentQuizRow::from_db(quiz, question_count, examiner_name));
    }

    Ok(Json(rows))
}

/// Fetching the quiz view is what opens an attempt: re-entering returns the
/// same attempt without resetting its start time.
async fn quiz_detail(
    Path(quiz_id): Path<String>,
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<QuizDetailResponse>, ApiError> {
    let quiz = fetch_quiz(&state, &quiz_id).await?;

    if !quiz.is_active {
        return Err(ApiError::Forbidden("Quiz is not active"));
    }

    let completed = repositories::attempts::has_completed(state.db(), &user.id, &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check prior attempts"))?;

    if completed {
        return Err(ApiError::Conflict("You have already completed this quiz".to_string()));
    }

    let attempt = start_attempt(&state, &user, &quiz).await?;

    let questions = repositories::questions::list_by_quiz(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load questions"))?;
    let options = repositories::questions::list_options_by_quiz(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load options"))?;

    let taker_questions = questions
        .iter()
        .map(|question| TakerQuestion {
            id: question.id.clone(),
            question_text: question.question_text.clone(),
            points: question.points,
            options: options
                .iter()
                .filter(|option| option.question_id == question.id)
                .map(TakerOption::from_db)
                .collect(),
        })
        .collect();

    Ok(Json(QuizDetailResponse {
        id: quiz.id,
        title: quiz.title,
        description: quiz.description,
        time_limit_minutes: quiz.time_limit_minutes,
        attempt_id: attempt.id,
        started_at: format_primitive(attempt.started_at),
        questions: taker_questions,
    }))
}

/// Idempotent start: at most one open attempt per (user, quiz). The advisory
/// lock serializes racing starts; the partial unique index backs it up.
async fn start_attempt(
    state: &AppState,
    user: &User,
    quiz: &Quiz,
) -> Result<QuizAttempt, ApiError> {
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    repositories::attempts::acquire_pair_lock(&mut *tx, &user.id, &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to acquire attempt lock"))?;

    let existing = repositories::attempts::find_open(&mut *tx, &user.id, &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?;

    if let Some(attempt) = existing {
        tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;
        return Ok(attempt);
    }

    let attempt_id = Uuid::new_v4().to_string();
    let inserted = repositories::attempts::create(
        &mut *tx,
        repositories::attempts::CreateAttempt {
            id: &attempt_id,
            user_id: &user.id,
            quiz_id: &quiz.id,
            started_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create attempt"))?;

    if !inserted {
        // Lost the insert race; the open attempt must exist now.
        let existing = repositories::attempts::find_open(&mut *tx, &user.id, &quiz.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?
            .ok_or_else(|| {
                ApiError::Conflict("An open attempt already exists for this quiz".to_string())
            })?;
        tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;
        return Ok(existing);
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    tracing::info!(user_id = %user.id, quiz_id = %quiz.id, attempt_id = %attempt_id, "Attempt started");

    repositories::attempts::find_by_id(state.db(), &attempt_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?
        .ok_or_else(|| ApiError::Internal("Attempt missing after creation".to_string()))
}

async fn submit_quiz(
    Path(quiz_id): Path<String>,
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let quiz = fetch_quiz(&state, &quiz_id).await?;

    let open = repositories::attempts::find_open(state.db(), &user.id, &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?;

    let attempt = match open {
        Some(attempt) => attempt,
        None => {
            // A sealed attempt is a resubmission, not a missing one.
            let completed = repositories::attempts::has_completed(state.db(), &user.id, &quiz.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to check prior attempts"))?;
            if completed {
                tracing::warn!(user_id = %user.id, quiz_id = %quiz.id, "Submission rejected: attempt already completed");
                return Err(ApiError::Conflict("Quiz attempt already completed".to_string()));
            }
            return Err(ApiError::NotFound("No active attempt found for this quiz".to_string()));
        }
    };

    let entries = grading::extract_entries(&payload);

    let questions = repositories::questions::list_by_quiz(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load questions"))?;
    let options = repositories::questions::list_options_by_quiz(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load options"))?;

    let key = grading::question_key(&questions, &options);
    let outcome = grading::grade(&key, &entries).map_err(|err| match err {
        GradingError::UnknownQuestion(_) | GradingError::UnknownOption { .. } => {
            ApiError::NotFound(err.to_string())
        }
    })?;

    // Seal and record answers in one transaction: a second submit loses the
    // conditional update and the partial write is never visible.
    let completed_at = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let sealed = repositories::attempts::seal(&mut *tx, &attempt.id, completed_at, outcome.score)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to seal attempt"))?;

    if !sealed {
        tracing::warn!(attempt_id = %attempt.id, "Submission rejected: attempt already completed");
        return Err(ApiError::Conflict("Quiz attempt already completed".to_string()));
    }

    for (position, answer) in outcome.answers.iter().enumerate() {
        repositories::attempts::create_answer(
            &mut *tx,
            repositories::attempts::CreateAnswer {
                id: &Uuid::new_v4().to_string(),
                attempt_id: &attempt.id,
                question_id: &answer.question_id,
                selected_option_id: answer.selected_option_id.as_deref(),
                free_text: answer.free_text.as_deref(),
                is_correct: answer.is_correct,
                position: position as i32,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to record answer"))?;
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    tracing::info!(
        user_id = %user.id,
        quiz_id = %quiz.id,
        attempt_id = %attempt.id,
        score = outcome.score,
        earned_points = outcome.earned_points,
        total_points = outcome.total_points,
        "Attempt completed"
    );

    Ok(Json(SubmitResponse { score: outcome.score, completed_at: format_primitive(completed_at) }))
}

async fn history(
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryRow>>, ApiError> {
    let attempts = repositories::attempts::list_completed_by_user(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list attempts"))?;

    let mut rows = Vec::with_capacity(attempts.len());
    for attempt in &attempts {
        let Some(quiz) = repositories::quizzes::find_by_id(state.db(), &attempt.quiz_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load quiz"))?
        else {
            continue;
        };
        let examiner_name = repositories::users::find_name_by_id(state.db(), &quiz.examiner_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load examiner"))?
            .unwrap_or_default();

        rows.push(HistoryRow::from_db(attempt, &quiz, examiner_name));
    }

    Ok(Json(rows))
}

async fn fetch_quiz(state: &AppState, quiz_id: &str) -> Result<Quiz, ApiError> {
    repositories::quizzes::find_by_id(state.db(), quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load quiz"))?
        .ok_or_else(|| ApiError::NotFound(format!("Quiz not found: {quiz_id}")))
}
