use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::cache::user_cache_key;
use crate::middlewares::require_jwt::bearer_token;
use crate::models::ApiResponse;
use crate::services::app_cache;
use crate::utils::jwt::JwtUtils;

/// 登出：清除 refresh cookie，并移除该 access token 对应的缓存用户
pub async fn handle_logout(request: &HttpRequest) -> ActixResult<HttpResponse> {
    if let (Some(token), Some(cache)) = (bearer_token(request), app_cache(request)) {
        cache.remove(&user_cache_key(&token)).await;
    }

    let empty_cookie = JwtUtils::create_empty_refresh_token_cookie();

    Ok(HttpResponse::Ok()
        .cookie(empty_cookie)
        .json(ApiResponse::<()>::success_empty("Logout successful")))
}
