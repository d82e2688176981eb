pub mod assignments;
pub mod auth;
pub mod courses;
pub mod files;
pub mod quizzes;
pub mod system;
pub mod users;

pub use assignments::AssignmentService;
pub use auth::AuthService;
pub use courses::CourseService;
pub use files::FileService;
pub use quizzes::QuizService;
pub use system::SystemService;
pub use users::UserService;

use actix_web::{HttpRequest, HttpResponse};
use std::sync::Arc;
use tracing::error;

use crate::cache::ObjectCache;
use crate::errors::LmsError;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, users::entities::User};

/// 当前登录用户，未登录时返回 401 响应
pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user_claims(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        ))
    })
}

/// 对象缓存（未配置时为 None）
pub(crate) fn app_cache(request: &HttpRequest) -> Option<Arc<dyn ObjectCache>> {
    request
        .app_data::<actix_web::web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone())
}

/// 存储层错误转为响应：冲突 409，其余 500
pub(crate) fn storage_failure(err: LmsError, code: ErrorCode, context: &str) -> HttpResponse {
    if err.is_conflict() {
        return HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::Conflict,
            format!("{context}: {}", err.message()),
        ));
    }

    error!("{}: {}", context, err);
    HttpResponse::InternalServerError()
        .json(ApiResponse::error_empty(code, format!("{context}: {err}")))
}
