use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{delete, get, put},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentExaminer;
use crate::core::state::AppState;
use crate::core::time::{elapsed_whole_minutes, format_primitive, primitive_now_utc};
use crate::db::models::{Quiz, User};
use crate::repositories;
use crate::schemas::attempt::{
    AttemptDetailQuizRef, AttemptDetailResponse, AttemptStatistics, AttemptUserRef,
    DashboardQuizRow, QuizResultsResponse, QuizStatistics, ResultAttemptRow, ReviewAnswerRow,
    ReviewOption, ReviewQuestionRef, ReviewSelection,
};
use crate::schemas::quiz::{ExaminerQuizRow, QuizCreate, QuizStatusUpdate};
use crate::services::results::{self, CsvRow};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/quizzes", get(list_quizzes).post(create_quiz))
        .route("/quizzes/:quiz_id/status", put(update_quiz_status))
        .route("/quizzes/:quiz_id", delete(delete_quiz))
        .route("/quizzes/:quiz_id/results", get(quiz_results))
        .route("/quizzes/:quiz_id/export-csv", get(export_results_csv))
        .route("/quizzes/:quiz_id/attempts/:attempt_id", get(attempt_detail))
        .route("/results-dashboard", get(results_dashboard))
}

async fn list_quizzes(
    CurrentExaminer(examiner): CurrentExaminer,
    State(state): State<AppState>,
) -> Result<Json<Vec<ExaminerQuizRow>>, ApiError> {
    let quizzes = repositories::quizzes::list_by_examiner(state.db(), &examiner.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list quizzes"))?;

    let mut rows = Vec::with_capacity(quizzes.len());
    for quiz in &quizzes {
        let question_count = repositories::questions::count_by_quiz(state.db(), &quiz.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count questions"))?;
        rows.push(ExaminerQuizRow::from_db(quiz, question_count));
    }

    Ok(Json(rows))
}

/// Creates the quiz together with its questions and options; insertion order
/// becomes the stable display order.
async fn create_quiz(
    CurrentExaminer(examiner): CurrentExaminer,
    State(state): State<AppState>,
    Json(payload): Json<QuizCreate>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let quiz_id = Uuid::new_v4().to_string();
    repositories::quizzes::create(
        &mut *tx,
        repositories::quizzes::CreateQuiz {
            id: &quiz_id,
            title: &payload.title,
            description: &payload.description,
            time_limit_minutes: payload.time_limit_minutes,
            examiner_id: &examiner.id,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create quiz"))?;

    for (question_position, question) in payload.questions.iter().enumerate() {
        let question_id = Uuid::new_v4().to_string();
        repositories::questions::create(
            &mut *tx,
            repositories::questions::CreateQuestion {
                id: &question_id,
                quiz_id: &quiz_id,
                question_text: &question.question_text,
                points: question.points,
                position: question_position as i32,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

        for (option_position, option) in question.options.iter().enumerate() {
            repositories::questions::create_option(
                &mut *tx,
                repositories::questions::CreateOption {
                    id: &Uuid::new_v4().to_string(),
                    question_id: &question_id,
                    option_text: &option.option_text,
                    is_correct: option.is_correct,
                    position: option_position as i32,
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to create option"))?;
        }
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    tracing::info!(
        examiner_id = %examiner.id,
        quiz_id = %quiz_id,
        questions = payload.questions.len(),
        "Quiz created"
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Quiz created successfully",
            "quizId": quiz_id,
        })),
    ))
}

async fn update_quiz_status(
    Path(quiz_id): Path<String>,
    CurrentExaminer(examiner): CurrentExaminer,
    State(state): State<AppState>,
    Json(payload): Json<QuizStatusUpdate>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let quiz = fetch_owned_quiz(&state, &quiz_id, &examiner).await?;

    let updated = repositories::quizzes::set_active(state.db(), &quiz.id, payload.active)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update quiz status"))?
        .ok_or_else(|| ApiError::NotFound(format!("Quiz not found: {quiz_id}")))?;

    tracing::info!(quiz_id = %quiz.id, active = updated.is_active, "Quiz status updated");

    Ok(Json(serde_json::json!({
        "quizId": updated.id,
        "active": updated.is_active,
    })))
}

async fn delete_quiz(
    Path(quiz_id): Path<String>,
    CurrentExaminer(examiner): CurrentExaminer,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let quiz = fetch_owned_quiz(&state, &quiz_id, &examiner).await?;

    let deleted = repositories::quizzes::delete(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete quiz"))?;

    if !deleted {
        return Err(ApiError::NotFound(format!("Quiz not found: {quiz_id}")));
    }

    tracing::info!(quiz_id = %quiz.id, "Quiz deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn quiz_results(
    Path(quiz_id): Path<String>,
    CurrentExaminer(examiner): CurrentExaminer,
    State(state): State<AppState>,
) -> Result<Json<QuizResultsResponse>, ApiError> {
    let quiz = fetch_owned_quiz(&state, &quiz_id, &examiner).await?;

    let attempts = repositories::attempts::list_completed_by_quiz(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list attempts"))?;

    let stats = results::score_stats(&results::completed_scores(&attempts));

    let mut rows = Vec::with_capacity(attempts.len());
    for attempt in &attempts {
        let Some(student) = repositories::users::find_by_id(state.db(), &attempt.user_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load student"))?
        else {
            continue;
        };

        if let Some(row) = ResultAttemptRow::from_db(attempt, &student) {
            rows.push(row);
        }
    }

    Ok(Json(QuizResultsResponse {
        statistics: QuizStatistics::from_stats(&quiz, &stats),
        attempts: rows,
    }))
}

async fn export_results_csv(
    Path(quiz_id): Path<String>,
    CurrentExaminer(examiner): CurrentExaminer,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let quiz = fetch_owned_quiz(&state, &quiz_id, &examiner).await?;

    let attempts = repositories::attempts::list_completed_by_quiz(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list attempts"))?;

    let mut students: Vec<User> = Vec::with_capacity(attempts.len());
    for attempt in &attempts {
        let student = repositories::users::find_by_id(state.db(), &attempt.user_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load student"))?
            .ok_or_else(|| ApiError::Internal("Attempt references missing user".to_string()))?;
        students.push(student);
    }

    let rows: Vec<CsvRow<'_>> = attempts
        .iter()
        .zip(students.iter())
        .filter_map(|(attempt, student)| CsvRow::new(student, attempt))
        .collect();

    let csv = results::render_results_csv(&rows);

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=quiz_results_{}.csv", quiz.id),
            ),
        ],
        csv,
    ))
}

async fn attempt_detail(
    Path((quiz_id, attempt_id)): Path<(String, String)>,
    CurrentExaminer(examiner): CurrentExaminer,
    State(state): State<AppState>,
) -> Result<Json<AttemptDetailResponse>, ApiError> {
    let quiz = fetch_owned_quiz(&state, &quiz_id, &examiner).await?;

    let attempt = repositories::attempts::find_by_id(state.db(), &attempt_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load attempt"))?
        .ok_or_else(|| ApiError::NotFound(format!("Attempt not found: {attempt_id}")))?;

    if attempt.quiz_id != quiz.id {
        return Err(ApiError::BadRequest(
            "Quiz attempt does not belong to the specified quiz".to_string(),
        ));
    }

    let student = repositories::users::find_by_id(state.db(), &attempt.user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load student"))?
        .ok_or_else(|| ApiError::Internal("Attempt references missing user".to_string()))?;

    let questions = repositories::questions::list_by_quiz(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load questions"))?;
    let options = repositories::questions::list_options_by_quiz(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load options"))?;
    let answers = repositories::attempts::list_answers(state.db(), &attempt.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load answers"))?;

    let mut answer_rows = Vec::with_capacity(answers.len());
    for answer in &answers {
        let Some(question) = questions.iter().find(|question| question.id == answer.question_id)
        else {
            continue;
        };

        let selected_option = answer
            .selected_option_id
            .as_deref()
            .and_then(|option_id| options.iter().find(|option| option.id == option_id));

        answer_rows.push(ReviewAnswerRow {
            id: answer.id.clone(),
            question: ReviewQuestionRef {
                id: question.id.clone(),
                text: question.question_text.clone(),
                points: question.points,
            },
            selected: ReviewSelection {
                option_id: selected_option.map(|option| option.id.clone()),
                option_text: selected_option.map(|option| option.option_text.clone()),
                free_text: answer.free_text.clone(),
            },
            is_correct: answer.is_correct,
            all_options: options
                .iter()
                .filter(|option| option.question_id == question.id)
                .map(|option| ReviewOption {
                    id: option.id.clone(),
                    text: option.option_text.clone(),
                    is_correct: option.is_correct,
                })
                .collect(),
        });
    }

    let correct_answers = answers.iter().filter(|answer| answer.is_correct).count();

    Ok(Json(AttemptDetailResponse {
        id: attempt.id.clone(),
        quiz: AttemptDetailQuizRef { id: quiz.id.clone(), title: quiz.title.clone() },
        user: AttemptUserRef::from_db(&student),
        started_at: format_primitive(attempt.started_at),
        completed_at: attempt.completed_at.map(format_primitive),
        score: attempt.score,
        minutes_taken: attempt
            .completed_at
            .map(|completed_at| elapsed_whole_minutes(attempt.started_at, completed_at)),
        answers: answer_rows,
        statistics: AttemptStatistics {
            total_questions: questions.len(),
            answered_questions: answers.len(),
            correct_answers,
        },
    }))
}

async fn results_dashboard(
    CurrentExaminer(examiner): CurrentExaminer,
    State(state): State<AppState>,
) -> Result<Json<Vec<DashboardQuizRow>>, ApiError> {
    let quizzes = repositories::quizzes::list_by_examiner(state.db(), &examiner.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list quizzes"))?;

    let mut rows = Vec::with_capacity(quizzes.len());
    for quiz in &quizzes {
        let attempts = repositories::attempts::list_completed_by_quiz(state.db(), &quiz.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list attempts"))?;
        let stats = results::score_stats(&results::completed_scores(&attempts));
        rows.push(DashboardQuizRow::from_stats(quiz, &stats));
    }

    Ok(Json(rows))
}

/// Authorization for every examiner operation: the catalog itself does not
/// authorize, so the acting examiner must own the quiz.
async fn fetch_owned_quiz(
    state: &AppState,
    quiz_id: &str,
    examiner: &User,
) -> Result<Quiz, ApiError> {
    let quiz = repositories::quizzes::find_by_id(state.db(), quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load quiz"))?
        .ok_or_else(|| ApiError::NotFound(format!("Quiz not found: {quiz_id}")))?;

    if quiz.examiner_id != examiner.id {
        tracing::warn!(
            examiner_id = %examiner.id,
            quiz_id = %quiz_id,
            "Rejected access to another examiner's quiz"
        );
        return Err(ApiError::Forbidden("Not the examiner of this quiz"));
    }

    Ok(quiz)
}
