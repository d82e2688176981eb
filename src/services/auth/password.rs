//! 修改密码、忘记密码与重置密码

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::auth::requests::{
    ChangePasswordRequest, ForgotPasswordRequest, ResetPasswordRequest,
};
use crate::models::auth::responses::ForgotPasswordResponse;
use crate::models::users::requests::UserChanges;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{app_cache, current_user, storage_failure};
use crate::utils::jwt::JwtUtils;
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validate::{normalize_email, validate_password_simple};

use super::AuthService;

const FORGOT_PASSWORD_MESSAGE: &str =
    "If the email is registered, password reset instructions have been issued";

/// 校验新密码：两次输入一致且满足密码策略
fn check_new_password(password: &str, confirm: &str) -> Result<(), HttpResponse> {
    if password != confirm {
        return Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::PasswordMismatch,
            "Passwords do not match",
        )));
    }
    validate_password_simple(password).map_err(|msg| {
        HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::PasswordPolicyViolation, msg))
    })
}

fn hash_or_response(password: &str) -> Result<String, HttpResponse> {
    hash_password(password).map_err(|e| {
        HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            format!("Password hashing failed: {e}"),
        ))
    })
}

pub async fn handle_change_password(
    service: &AuthService,
    change_request: ChangePasswordRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    // 缓存中的用户不含密码哈希，重新读取
    let user = match storage.get_user_by_id(current.id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(HttpResponse::NotFound()
                .json(ApiResponse::error_empty(ErrorCode::UserNotFound, "User not found")));
        }
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Failed to load user",
            ));
        }
    };

    if !verify_password(&change_request.current_password, &user.password_hash) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::PasswordIncorrect,
            "Current password is incorrect",
        )));
    }

    if let Err(resp) =
        check_new_password(&change_request.new_password, &change_request.confirm_password)
    {
        return Ok(resp);
    }

    if change_request.new_password == change_request.current_password {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::PasswordPolicyViolation,
            "New password must be different from the current password",
        )));
    }

    let password_hash = match hash_or_response(&change_request.new_password) {
        Ok(hash) => hash,
        Err(resp) => return Ok(resp),
    };

    let changes = UserChanges {
        password_hash: Some(password_hash),
        ..Default::default()
    };

    match storage.update_user(user.id, changes).await {
        Ok(Some(_)) => {
            tracing::info!("User {} changed password", user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty(
                "Password changed successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::UserNotFound, "User not found"))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::UserUpdateFailed,
            "Failed to change password",
        )),
    }
}

pub async fn handle_forgot_password(
    service: &AuthService,
    forgot_request: ForgotPasswordRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let config = service.get_config();
    let email = normalize_email(&forgot_request.email);

    // 无论邮箱是否存在都返回相同信息
    let reset_token = match storage.get_user_by_email(&email).await {
        Ok(Some(user)) if user.is_active() => {
            match JwtUtils::generate_reset_token(user.id, user.role.as_str()) {
                Ok(token) => {
                    tracing::info!("Password reset token issued for user {}", user.id);
                    Some(token)
                }
                Err(e) => {
                    tracing::error!("Failed to generate reset token: {}", e);
                    None
                }
            }
        }
        Ok(_) => None,
        Err(e) => {
            tracing::error!("Forgot password lookup failed: {}", e);
            None
        }
    };

    // 没有邮件通道，开发环境下直接返回令牌
    let response = ForgotPasswordResponse {
        reset_token: reset_token.filter(|_| config.is_development()),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, FORGOT_PASSWORD_MESSAGE)))
}

pub async fn handle_reset_password(
    service: &AuthService,
    reset_request: ResetPasswordRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let claims = match JwtUtils::verify_reset_token(&reset_request.token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::info!("Reset token rejected: {}", e);
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::InvalidResetToken,
                "Reset token is invalid or expired",
            )));
        }
    };

    let Some(user_id) = claims.user_id() else {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::InvalidResetToken,
            "Reset token is invalid or expired",
        )));
    };

    if let Err(resp) =
        check_new_password(&reset_request.new_password, &reset_request.confirm_password)
    {
        return Ok(resp);
    }

    let password_hash = match hash_or_response(&reset_request.new_password) {
        Ok(hash) => hash,
        Err(resp) => return Ok(resp),
    };

    let changes = UserChanges {
        password_hash: Some(password_hash),
        ..Default::default()
    };

    match storage.update_user(user_id, changes).await {
        Ok(Some(_)) => {
            // 重置后让已缓存的会话重新从存储加载
            if let Some(cache) = app_cache(request) {
                cache.invalidate_all().await;
            }
            tracing::info!("User {} reset password", user_id);
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty(
                "Password has been reset successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::InvalidResetToken,
            "Reset token is invalid or expired",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::UserUpdateFailed,
            "Failed to reset password",
        )),
    }
}
