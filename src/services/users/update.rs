use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{
        requests::{UpdateUserRequest, UserChanges},
        responses::UserResponse,
    },
};
use crate::services::{app_cache, storage_failure};
use crate::utils::password::hash_password;
use crate::utils::validate::{
    normalize_email, validate_email, validate_full_name, validate_password_simple,
};

pub async fn update_user(
    service: &UserService,
    user_id: i64,
    update_data: UpdateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let mut changes = UserChanges::default();

    if let Some(email) = update_data.email {
        let email = normalize_email(&email);
        if let Err(msg) = validate_email(&email) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
        }
        // 邮箱被其他用户占用
        match storage.get_user_by_email(&email).await {
            Ok(Some(existing)) if existing.id != user_id => {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::UserEmailAlreadyExists,
                    "Email already exists",
                )));
            }
            Ok(_) => {}
            Err(e) => {
                return Ok(storage_failure(
                    e,
                    ErrorCode::UserUpdateFailed,
                    "Failed to update user information",
                ));
            }
        }
        changes.email = Some(email);
    }

    if let Some(full_name) = update_data.full_name {
        let full_name = full_name.trim().to_string();
        if let Err(msg) = validate_full_name(&full_name) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
        }
        changes.full_name = Some(full_name);
    }

    if let Some(password) = update_data.password {
        if let Err(msg) = validate_password_simple(&password) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::PasswordPolicyViolation, msg)));
        }
        match hash_password(&password) {
            Ok(hash) => changes.password_hash = Some(hash),
            Err(e) => {
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("Password hashing failed: {e}"),
                    )),
                );
            }
        }
    }

    let status_changed = update_data.status.is_some();
    changes.status = update_data.status;

    match storage.update_user(user_id, changes).await {
        Ok(Some(user)) => {
            // 状态变化需要让缓存中的会话失效
            if status_changed && let Some(cache) = app_cache(request) {
                cache.invalidate_all().await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                UserResponse { user },
                "User information updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::UserEmailAlreadyExists,
            "Email already exists",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::UserUpdateFailed,
            "Failed to update user information",
        )),
    }
}
