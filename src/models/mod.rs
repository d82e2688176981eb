//! 数据模型定义
//!
//! 每个业务域拆分为 `entities`（业务实体）、`requests`（请求体/查询参数）
//! 与 `responses`（响应体）。

pub mod assignments;
pub mod auth;
pub mod common;
pub mod courses;
pub mod files;
pub mod quizzes;
pub mod system;
pub mod users;

pub use common::{ApiResponse, PaginatedResponse, PaginationInfo, PaginationQuery};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码
///
/// 0 表示成功；1xxx 通用，2xxx 认证，3xxx 用户，4xxx 文件，
/// 5xxx 课程与选课，6xxx 作业，7xxx 测验。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    PayloadTooLarge = 1013,
    RateLimitExceeded = 1029,
    InternalServerError = 1099,

    // 认证
    AuthFailed = 2000,
    UserInactive = 2001,
    RegisterFailed = 2002,
    PasswordMismatch = 2003,
    PasswordPolicyViolation = 2004,
    InvalidResetToken = 2005,
    PasswordIncorrect = 2006,

    // 用户
    UserNotFound = 3000,
    UserAlreadyExists = 3001,
    UserEmailInvalid = 3002,
    UserEmailAlreadyExists = 3003,
    UserCreationFailed = 3004,
    UserUpdateFailed = 3005,
    UserDeleteFailed = 3006,
    CanNotDeleteCurrentUser = 3007,
    UserNameInvalid = 3008,

    // 文件
    FileNotFound = 4000,
    FileUploadFailed = 4001,
    FileTypeNotAllowed = 4002,
    FileSizeExceeded = 4003,
    MultifileUploadNotAllowed = 4004,
    FileAccessDenied = 4005,
    FileEmpty = 4006,
    FileOwnershipRequired = 4007,

    // 课程与选课
    CourseNotFound = 5000,
    CourseAlreadyExists = 5001,
    CourseCodeInvalid = 5002,
    CourseInUse = 5003,
    CourseInvalid = 5004,
    OfferingNotFound = 5010,
    OfferingAlreadyExists = 5011,
    OfferingClosed = 5012,
    InvalidProfessor = 5013,
    EnrollmentNotFound = 5020,
    AlreadyEnrolled = 5021,
    NotEnrolled = 5022,
    EnrollmentLocked = 5023,
    InvalidFinalGrade = 5024,

    // 作业
    AssignmentNotFound = 6000,
    AssignmentDeadlinePassed = 6001,
    AssignmentInvalid = 6002,
    AlreadySubmitted = 6003,
    SubmissionNotFound = 6004,
    AlreadyGraded = 6005,
    InvalidScore = 6006,

    // 测验
    QuizNotFound = 7000,
    QuizNotPublished = 7001,
    QuizAlreadyPublished = 7002,
    QuizHasNoQuestions = 7003,
    QuizInvalidType = 7004,
    QuizDeadlinePassed = 7005,
    QuizNotStarted = 7006,
    MaxAttemptsReached = 7007,
    AttemptNotFound = 7008,
    AttemptAlreadySubmitted = 7009,
    AttemptTimeExpired = 7010,
    QuestionInvalid = 7011,
    QuizGradeTargetInvalid = 7012,
    QuizAlreadyGraded = 7013,
    QuizFileAlreadySubmitted = 7014,
    QuizInvalid = 7015,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success as i32, 0);
        assert_eq!(ErrorCode::NotFound as i32, 1004);
        assert_eq!(ErrorCode::MaxAttemptsReached as i32, 7007);
    }

    #[test]
    fn test_error_response_carries_code() {
        let resp = ApiResponse::error_empty(ErrorCode::QuizNotFound, "Quiz not found");
        assert_eq!(resp.code, 7000);
        assert!(resp.data.is_none());

        let json = serde_json::to_value(&resp).expect("serializable");
        assert!(json.get("data").is_none());
        assert_eq!(json["message"], "Quiz not found");
    }
}
