//! 路径参数的安全提取器
//!
//! 解析失败时直接返回 400 和统一的错误响应，避免 actix 默认的纯文本错误。

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn bad_path_param(name: &str, raw: &str) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::BadRequest,
        format!("Invalid path parameter '{name}': '{raw}'"),
    ));
    InternalError::from_response(format!("invalid path parameter {name}"), response).into()
}

/// 解析正整数 ID
pub(crate) fn parse_positive_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

macro_rules! define_safe_i64_extractor {
    ($name:ident, $param:literal) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name(pub i64);

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                let raw = req.match_info().get($param).unwrap_or_default();
                ready(
                    parse_positive_id(raw)
                        .map($name)
                        .ok_or_else(|| bad_path_param($param, raw)),
                )
            }
        }
    };
}

define_safe_i64_extractor!(SafeIDI64, "id");
define_safe_i64_extractor!(SafeStudentIdI64, "student_id");
define_safe_i64_extractor!(SafeSubmissionIdI64, "submission_id");

/// 课程代码，统一转为大写
#[derive(Debug, Clone)]
pub struct SafeCourseCode(pub String);

impl FromRequest for SafeCourseCode {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let raw = req.match_info().get("code").unwrap_or_default();
        let code = raw.trim().to_uppercase();
        ready(
            crate::utils::validate::validate_course_code(&code)
                .map(|_| SafeCourseCode(code))
                .map_err(|_| bad_path_param("code", raw)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive_id() {
        assert_eq!(parse_positive_id("15"), Some(15));
        assert_eq!(parse_positive_id("0"), None);
        assert_eq!(parse_positive_id("-4"), None);
        assert_eq!(parse_positive_id("abc"), None);
        assert_eq!(parse_positive_id("99999999999999999999"), None);
    }
}
