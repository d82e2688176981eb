use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiResponse, ErrorCode,
    auth::{LoginResponse, RegisterRequest},
    users::{entities::UserRole, requests::NewUser},
};
use crate::services::{storage_failure, users::insert_user};
use crate::utils::jwt::JwtUtils;
use crate::utils::password::hash_password;
use crate::utils::validate::{
    normalize_email, validate_email, validate_full_name, validate_password_simple,
};

use super::AuthService;

pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let config = service.get_config();

    // 1. 校验输入
    if register_request.password != register_request.confirm_password {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::PasswordMismatch,
            "Passwords do not match",
        )));
    }

    if let Err(msg) = validate_password_simple(&register_request.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::PasswordPolicyViolation, msg)));
    }

    let email = normalize_email(&register_request.email);
    if let Err(msg) = validate_email(&email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }

    let full_name = register_request.full_name.trim().to_string();
    if let Err(msg) = validate_full_name(&full_name) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
    }

    // 2. 邮箱唯一
    match storage.get_user_by_email(&email).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserEmailAlreadyExists,
                "Email already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => return Ok(storage_failure(e, ErrorCode::RegisterFailed, "Register failed")),
    }

    // 3. 哈希密码
    let password_hash = match hash_password(&register_request.password) {
        Ok(hash) => hash,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::RegisterFailed,
                    format!("Password hashing failed: {e}"),
                )),
            );
        }
    };

    let new_user = NewUser {
        email,
        password_hash,
        full_name,
        role: UserRole::Student,
        student_code: None,
    };

    // 4. 创建用户并签发令牌，学号在插入时分配
    let user = match insert_user(&storage, new_user).await {
        Ok(user) => user,
        Err(e) if e.is_conflict() => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserEmailAlreadyExists,
                "Email already exists",
            )));
        }
        Err(e) => return Ok(storage_failure(e, ErrorCode::RegisterFailed, "Register failed")),
    };

    let refresh_expiry = chrono::Duration::days(config.jwt.refresh_token_expiry);
    match user.generate_token_pair(Some(refresh_expiry)) {
        Ok(token_pair) => {
            tracing::info!("Student {} registered", user.id);

            let refresh_cookie =
                JwtUtils::create_refresh_token_cookie(&token_pair.refresh_token, refresh_expiry);
            let response = LoginResponse {
                access_token: token_pair.access_token,
                token_type: "Bearer".to_string(),
                expires_in: config.jwt.access_token_expiry * 60,
                user,
                created_at: chrono::Utc::now(),
            };

            Ok(HttpResponse::Created()
                .cookie(refresh_cookie)
                .json(ApiResponse::success(response, "Registration successful")))
        }
        Err(e) => {
            tracing::error!("Failed to generate JWT token after registration: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::RegisterFailed,
                    "Registered, but unable to generate token; please login",
                )),
            )
        }
    }
}
