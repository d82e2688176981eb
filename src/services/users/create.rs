use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{UserService, insert_user};
use crate::models::{
    ApiResponse, ErrorCode,
    users::{
        requests::{CreateUserRequest, NewUser},
        responses::UserResponse,
    },
};
use crate::services::storage_failure;
use crate::utils::password::hash_password;
use crate::utils::validate::{
    normalize_email, validate_email, validate_full_name, validate_password_simple,
};

pub async fn create_user(
    service: &UserService,
    user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let email = normalize_email(&user_data.email);
    if let Err(msg) = validate_email(&email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }

    let full_name = user_data.full_name.trim().to_string();
    if let Err(msg) = validate_full_name(&full_name) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
    }

    if let Err(msg) = validate_password_simple(&user_data.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::PasswordPolicyViolation, msg)));
    }

    let password_hash = match hash_password(&user_data.password) {
        Ok(hash) => hash,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Password hashing failed: {e}"),
                )),
            );
        }
    };


    let new_user = NewUser {
        email,
        password_hash,
        full_name,
        role: user_data.role,
        student_code: None,
    };

    // 学生账号在插入时分配学号
    match insert_user(&storage, new_user).await {
        Ok(user) => {
            tracing::info!("Created {} account {}", user.role, user.id);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(UserResponse { user }, "User created successfully")))
        }
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::UserEmailAlreadyExists,
            "Email already exists",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::UserCreationFailed,
            "User creation failed",
        )),
    }
}
