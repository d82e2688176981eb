use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{app_cache, storage_failure};

/// 软删除：状态改为 inactive
pub async fn delete_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if RequireJWT::extract_user_id(request) == Some(user_id) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::CanNotDeleteCurrentUser,
            "Cannot delete current user",
        )));
    }

    match storage.deactivate_user(user_id).await {
        Ok(true) => {
            if let Some(cache) = app_cache(request) {
                cache.invalidate_all().await;
            }
            tracing::info!("User {} deactivated", user_id);
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty(
                "User deleted successfully",
            )))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::UserDeleteFailed,
            "User deletion failed",
        )),
    }
}
