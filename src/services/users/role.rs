use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{UserService, allocate_student_code};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{
        entities::UserRole,
        requests::{AssignRoleRequest, UserChanges},
        responses::UserResponse,
    },
};
use crate::services::{app_cache, storage_failure};

pub async fn assign_role(
    service: &UserService,
    user_id: i64,
    role_data: AssignRoleRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 管理员不能修改自己的角色
    if RequireJWT::extract_user_id(request) == Some(user_id) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Cannot change the role of the current user",
        )));
    }

    let user = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(HttpResponse::NotFound()
                .json(ApiResponse::error_empty(ErrorCode::UserNotFound, "User not found")));
        }
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::UserUpdateFailed,
                "Failed to assign role",
            ));
        }
    };

    let mut changes = UserChanges {
        role: Some(role_data.role),
        ..Default::default()
    };

    // 转为学生时补发学号
    if role_data.role == UserRole::Student && user.student_code.is_none() {
        match allocate_student_code(&storage).await {
            Ok(code) => changes.student_code = Some(code),
            Err(e) => {
                return Ok(storage_failure(
                    e,
                    ErrorCode::UserUpdateFailed,
                    "Failed to assign role",
                ));
            }
        }
    }

    match storage.update_user(user_id, changes).await {
        Ok(Some(user)) => {
            if let Some(cache) = app_cache(request) {
                cache.invalidate_all().await;
            }
            tracing::info!("User {} role set to {}", user.id, user.role);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                UserResponse { user },
                "Role assigned successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::UserNotFound, "User not found"))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::UserUpdateFailed,
            "Failed to assign role",
        )),
    }
}
