//! 测验：在线答题与上传答卷两种形式

pub mod attempts;
pub mod grading;
pub mod manage;
pub mod query;
pub mod questions;
pub mod rules;
pub mod scoring;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ApiResponse, ErrorCode,
    quizzes::{
        entities::Quiz,
        requests::{
            CreateQuestionRequest, CreateQuizRequest, GradeQuizRequest, QuizFileSubmitRequest,
            QuizListParams, SubmitAnswersRequest, UpdateQuizRequest,
        },
    },
    users::entities::{User, UserRole},
};
use crate::services::assignments::ensure_manages_offering;
use crate::services::courses::ensure_enrolled;
use crate::services::storage_failure;
use crate::storage::Storage;

pub struct QuizService {
    storage: Option<Arc<dyn Storage>>,
}

impl QuizService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub async fn create_quiz(
        &self,
        request: &HttpRequest,
        req: CreateQuizRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_quiz(self, request, req).await
    }

    pub async fn update_quiz(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
        req: UpdateQuizRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_quiz(self, request, quiz_id, req).await
    }

    pub async fn delete_quiz(&self, request: &HttpRequest, quiz_id: i64) -> ActixResult<HttpResponse> {
        manage::delete_quiz(self, request, quiz_id).await
    }

    pub async fn publish_quiz(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
    ) -> ActixResult<HttpResponse> {
        manage::publish_quiz(self, request, quiz_id).await
    }

    pub async fn list_quizzes(
        &self,
        request: &HttpRequest,
        query: QuizListParams,
    ) -> ActixResult<HttpResponse> {
        query::list_quizzes(self, request, query).await
    }

    pub async fn get_quiz(&self, request: &HttpRequest, quiz_id: i64) -> ActixResult<HttpResponse> {
        query::get_quiz(self, request, quiz_id).await
    }

    pub async fn student_view(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
    ) -> ActixResult<HttpResponse> {
        query::student_view(self, request, quiz_id).await
    }

    pub async fn my_attempts(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        query::my_attempts(self, request).await
    }

    // 题目
    pub async fn add_question(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
        req: CreateQuestionRequest,
    ) -> ActixResult<HttpResponse> {
        questions::add_question(self, request, quiz_id, req).await
    }

    pub async fn list_questions(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
    ) -> ActixResult<HttpResponse> {
        questions::list_questions(self, request, quiz_id).await
    }

    // 作答
    pub async fn start_attempt(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
    ) -> ActixResult<HttpResponse> {
        attempts::start_attempt(self, request, quiz_id).await
    }

    pub async fn submit_attempt(
        &self,
        request: &HttpRequest,
        attempt_id: i64,
        req: SubmitAnswersRequest,
    ) -> ActixResult<HttpResponse> {
        attempts::submit_attempt(self, request, attempt_id, req).await
    }

    pub async fn submit_file(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
        req: QuizFileSubmitRequest,
    ) -> ActixResult<HttpResponse> {
        attempts::submit_file(self, request, quiz_id, req).await
    }

    pub async fn grade_quiz(
        &self,
        request: &HttpRequest,
        quiz_id: i64,
        req: GradeQuizRequest,
    ) -> ActixResult<HttpResponse> {
        grading::grade_quiz(self, request, quiz_id, req).await
    }
}

pub(crate) async fn load_quiz(storage: &Arc<dyn Storage>, quiz_id: i64) -> Result<Quiz, HttpResponse> {
    match storage.get_quiz_by_id(quiz_id).await {
        Ok(Some(quiz)) => Ok(quiz),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::QuizNotFound,
            "Quiz not found",
        ))),
        Err(e) => Err(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "Failed to load quiz",
        )),
    }
}

/// 测验创建者才能修改测验与题目
pub(crate) fn ensure_creator(quiz: &Quiz, user: &User) -> Result<(), HttpResponse> {
    if quiz.created_by != user.id {
        return Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "You can only modify your own quizzes",
        )));
    }
    Ok(())
}

/// 查看测验的权限
///
/// 学生需已选课且测验已发布；教师需负责该开课；管理员不受限。
/// 返回值表示是否可以看到正确答案。
pub(crate) async fn ensure_can_view(
    storage: &Arc<dyn Storage>,
    quiz: &Quiz,
    user: &User,
) -> Result<bool, HttpResponse> {
    if user.role != UserRole::Student {
        ensure_manages_offering(storage, quiz.offering_id, user).await?;
        return Ok(true);
    }

    ensure_enrolled(storage, user.id, quiz.offering_id).await?;
    if !quiz.is_published {
        // 未发布的测验对学生不可见
        return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::QuizNotFound,
            "Quiz not found",
        )));
    }
    Ok(false)
}
