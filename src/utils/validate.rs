use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

static COURSE_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2,6}[0-9]{2,4}$").expect("Invalid course code regex"));

static STUDENT_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^S[0-9]{4}[0-9]{4}$").expect("Invalid student code regex"));

static SESSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-(Spring|Summer|Fall|Winter)$").expect("Invalid session regex")
});

/// 密码中允许的特殊字符
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*";

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.len() > 255 {
        return Err("Email must be at most 255 characters");
    }
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 邮箱统一存储为小写
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_full_name(name: &str) -> Result<(), &'static str> {
    let len = name.trim().chars().count();
    if !(2..=255).contains(&len) {
        return Err("Full name must be between 2 and 255 characters");
    }
    Ok(())
}

/// 校验课程代码（需先转为大写）
pub fn validate_course_code(code: &str) -> Result<(), &'static str> {
    if !COURSE_CODE_RE.is_match(code) {
        return Err("Course code must be 2-6 uppercase letters followed by 2-4 digits");
    }
    Ok(())
}

pub fn validate_credits(credits: i32) -> Result<(), &'static str> {
    if !(1..=10).contains(&credits) {
        return Err("Credits must be between 1 and 10");
    }
    Ok(())
}

pub fn validate_session(session: &str) -> Result<(), &'static str> {
    if !SESSION_RE.is_match(session) {
        return Err("Session must look like 2025-Fall (Spring, Summer, Fall or Winter)");
    }
    Ok(())
}

pub fn is_valid_student_code(code: &str) -> bool {
    STUDENT_CODE_RE.is_match(code)
}

/// 标题长度校验（作业与测验共用）
pub fn validate_title(title: &str) -> Result<(), &'static str> {
    let len = title.trim().chars().count();
    if !(3..=255).contains(&len) {
        return Err("Title must be between 3 and 255 characters");
    }
    Ok(())
}

/// 密码策略验证结果
#[derive(Debug, Clone)]
pub struct PasswordValidationResult {
    pub is_valid: bool,
    pub errors: Vec<&'static str>,
}

impl PasswordValidationResult {
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

/// 验证密码是否符合安全策略
///
/// 至少 8 个字符，同时包含大写字母、小写字母、数字和 `!@#$%^&*` 中的一个特殊字符，
/// 且不能是常见弱密码。
pub fn validate_password(password: &str) -> PasswordValidationResult {
    let mut errors = Vec::new();

    if password.chars().count() < 8 {
        errors.push("Password must be at least 8 characters long");
    }
    if password.chars().count() > 128 {
        errors.push("Password must be at most 128 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit");
    }
    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        errors.push("Password must contain at least one special character (!@#$%^&*)");
    }

    let weak_passwords = [
        "password",
        "password1!",
        "password123!",
        "p@ssw0rd",
        "p@ssword1",
        "qwerty123!",
        "admin123!",
        "welcome1!",
        "letmein1!",
    ];
    if weak_passwords
        .iter()
        .any(|&weak| password.eq_ignore_ascii_case(weak))
    {
        errors.push("Password is too common, please choose a stronger password");
    }

    PasswordValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// 简化的密码验证（返回 Result）
pub fn validate_password_simple(password: &str) -> Result<(), String> {
    let result = validate_password(password);
    if result.is_valid {
        Ok(())
    } else {
        Err(result.error_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password() {
        assert!(validate_password("SecureP@ss1").is_valid);
        assert!(validate_password("MyP@ssw0rd").is_valid);
    }

    #[test]
    fn test_missing_special_char() {
        let result = validate_password("SecurePass123");
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec!["Password must contain at least one special character (!@#$%^&*)"]
        );
    }

    #[test]
    fn test_short_password() {
        let result = validate_password("Ab1!");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must be at least 8 characters long")
        );
    }

    #[test]
    fn test_case_and_digit_rules() {
        assert!(!validate_password("abcd123!").is_valid);
        assert!(!validate_password("ABCD123!").is_valid);
        assert!(!validate_password("Abcdefg!").is_valid);
    }

    #[test]
    fn test_common_password() {
        let result = validate_password("Password1!");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password is too common, please choose a stronger password")
        );
    }

    #[test]
    fn test_email() {
        assert!(validate_email("ada.lovelace@uni.edu").is_ok());
        assert!(validate_email("no-at-sign.edu").is_err());
        assert!(validate_email("a@b").is_err());
        assert_eq!(normalize_email("  Ada@Uni.EDU "), "ada@uni.edu");
    }

    #[test]
    fn test_course_code() {
        assert!(validate_course_code("CS101").is_ok());
        assert!(validate_course_code("MATH2040").is_ok());
        assert!(validate_course_code("cs101").is_err());
        assert!(validate_course_code("C101").is_err());
        assert!(validate_course_code("CS1").is_err());
        assert!(validate_course_code("COMPSCI101").is_err());
    }

    #[test]
    fn test_credits_and_session() {
        assert!(validate_credits(1).is_ok());
        assert!(validate_credits(10).is_ok());
        assert!(validate_credits(0).is_err());
        assert!(validate_credits(11).is_err());
        assert!(validate_session("2025-Fall").is_ok());
        assert!(validate_session("Fall 2025").is_err());
    }

    #[test]
    fn test_student_code() {
        assert!(is_valid_student_code("S20250042"));
        assert!(!is_valid_student_code("S2025042"));
        assert!(!is_valid_student_code("X20250042"));
    }

    #[test]
    fn test_title_and_name() {
        assert!(validate_title("Quiz 1").is_ok());
        assert!(validate_title("Q1").is_err());
        assert!(validate_full_name("Al").is_ok());
        assert!(validate_full_name(" A ").is_err());
    }
}
