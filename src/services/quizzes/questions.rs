use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::rules::validate_question;
use super::{QuizService, ensure_can_view, ensure_creator, load_quiz};
use crate::models::{
    ApiResponse, ErrorCode,
    quizzes::{
        entities::QuizType,
        requests::{CreateQuestionRequest, NewQuestion, NewQuestionOption},
        responses::{QuestionListResponse, QuestionView},
    },
};
use crate::services::{current_user, storage_failure};

pub async fn add_question(
    service: &QuizService,
    request: &HttpRequest,
    quiz_id: i64,
    req: CreateQuestionRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let quiz = match load_quiz(&storage, quiz_id).await {
        Ok(quiz) => quiz,
        Err(resp) => return Ok(resp),
    };

    if let Err(resp) = ensure_creator(&quiz, &user) {
        return Ok(resp);
    }

    if quiz.is_published {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::QuizAlreadyPublished,
            "Cannot add questions to a published quiz",
        )));
    }
    if quiz.quiz_type != QuizType::Digital {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::QuizInvalidType,
            "Questions can only be added to digital quizzes",
        )));
    }

    if let Err(msg) = validate_question(
        &req.question_text,
        req.question_type,
        req.marks,
        &req.options,
    ) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::QuestionInvalid, msg)));
    }

    let new_question = NewQuestion {
        quiz_id: quiz.id,
        question_text: req.question_text.trim().to_string(),
        question_type: req.question_type,
        marks: req.marks,
        options: req
            .options
            .into_iter()
            .enumerate()
            .map(|(i, o)| NewQuestionOption {
                label: o.label.trim().to_string(),
                option_text: o.option_text.trim().to_string(),
                is_correct: o.is_correct,
                order_number: i as i32 + 1,
            })
            .collect(),
    };

    match storage.add_question(new_question).await {
        Ok((question, options)) => {
            tracing::info!(
                "Question {} (#{}) added to quiz {}",
                question.id,
                question.order_number,
                quiz.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                QuestionView::new(question, options, true),
                "Question added successfully",
            )))
        }
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to add question",
        )),
    }
}

/// 学生视角不返回正确答案
pub async fn list_questions(
    service: &QuizService,
    request: &HttpRequest,
    quiz_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let quiz = match load_quiz(&storage, quiz_id).await {
        Ok(quiz) => quiz,
        Err(resp) => return Ok(resp),
    };

    let reveal = match ensure_can_view(&storage, &quiz, &user).await {
        Ok(reveal) => reveal,
        Err(resp) => return Ok(resp),
    };

    match storage.list_questions(quiz.id).await {
        Ok(questions) => {
            let items = questions
                .into_iter()
                .map(|(q, options)| QuestionView::new(q, options, reveal))
                .collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                QuestionListResponse { items },
                "Questions retrieved successfully",
            )))
        }
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to retrieve questions",
        )),
    }
}
