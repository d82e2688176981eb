use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::cache::user_cache_key;
use crate::middlewares::require_jwt::bearer_token;
use crate::models::auth::requests::UpdateProfileRequest;
use crate::models::users::requests::UserChanges;
use crate::models::users::responses::UserResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{app_cache, current_user, storage_failure};
use crate::utils::validate::validate_full_name;

use super::AuthService;

/// 只允许修改姓名，角色与状态由管理员维护
pub async fn handle_update_profile(
    service: &AuthService,
    update_data: UpdateProfileRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let full_name = match update_data.full_name {
        Some(name) => {
            let name = name.trim().to_string();
            if let Err(msg) = validate_full_name(&name) {
                return Ok(HttpResponse::BadRequest()
                    .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
            }
            Some(name)
        }
        None => None,
    };

    let changes = UserChanges {
        full_name,
        ..Default::default()
    };

    match storage.update_user(current.id, changes).await {
        Ok(Some(user)) => {
            if let (Some(token), Some(cache)) = (bearer_token(request), app_cache(request)) {
                cache.remove(&user_cache_key(&token)).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                UserResponse { user },
                "Profile updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::UserNotFound, "User not found"))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::UserUpdateFailed,
            "Failed to update profile",
        )),
    }
}
