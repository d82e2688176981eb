//! 测验规则：设置校验、作答资格、时限与迟交判定

use chrono::{DateTime, Duration, Utc};

use crate::models::{
    ErrorCode,
    quizzes::{
        entities::{QuestionType, Quiz, QuizType},
        requests::OptionInput,
    },
};

/// 超出时限后仍接受提交的宽限时间（秒）
pub const SUBMIT_GRACE_SECONDS: i64 = 60;

pub const TIME_LIMIT_RANGE: std::ops::RangeInclusive<i32> = 5..=300;
pub const MAX_ATTEMPTS_RANGE: std::ops::RangeInclusive<i32> = 1..=10;
const MARKS_RANGE: std::ops::RangeInclusive<f64> = 0.5..=100.0;
const MCQ_OPTION_LABELS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

/// 合并后的测验设置
#[derive(Debug, Clone, Copy)]
pub struct QuizSettings<'a> {
    pub title: &'a str,
    pub start_time: Option<DateTime<Utc>>,
    pub deadline: DateTime<Utc>,
    pub time_limit_minutes: Option<i32>,
    pub max_attempts: i32,
}

pub fn validate_settings(settings: &QuizSettings<'_>) -> Result<(), &'static str> {
    crate::utils::validate::validate_title(settings.title)?;

    if let Some(start) = settings.start_time
        && start >= settings.deadline
    {
        return Err("Start time must be before the deadline");
    }

    if let Some(limit) = settings.time_limit_minutes
        && !TIME_LIMIT_RANGE.contains(&limit)
    {
        return Err("Time limit must be between 5 and 300 minutes");
    }

    if !MAX_ATTEMPTS_RANGE.contains(&settings.max_attempts) {
        return Err("Max attempts must be between 1 and 10");
    }

    Ok(())
}

/// 题目与选项校验
pub fn validate_question(
    question_text: &str,
    question_type: QuestionType,
    marks: f64,
    options: &[OptionInput],
) -> Result<(), String> {
    if question_text.trim().is_empty() {
        return Err("Question text cannot be empty".to_string());
    }
    if !marks.is_finite() || !MARKS_RANGE.contains(&marks) {
        return Err("Marks must be between 0.5 and 100".to_string());
    }

    let correct = options.iter().filter(|o| o.is_correct).count();

    match question_type {
        QuestionType::Mcq => {
            if !(2..=6).contains(&options.len()) {
                return Err("MCQ questions need between 2 and 6 options".to_string());
            }
            let mut seen = Vec::with_capacity(options.len());
            for option in options {
                let label = option.label.trim();
                if !MCQ_OPTION_LABELS.contains(&label) {
                    return Err(format!("Invalid option label '{label}', expected A to F"));
                }
                if seen.contains(&label) {
                    return Err(format!("Duplicate option label '{label}'"));
                }
                seen.push(label);
            }
        }
        QuestionType::TrueFalse => {
            if options.len() != 2 {
                return Err("True/false questions need exactly two options".to_string());
            }
        }
        QuestionType::Paragraph => {
            if !options.is_empty() {
                return Err("Paragraph questions cannot have options".to_string());
            }
            return Ok(());
        }
    }

    if options.iter().any(|o| o.option_text.trim().is_empty()) {
        return Err("Option text cannot be empty".to_string());
    }
    if correct != 1 {
        return Err("Exactly one option must be marked correct".to_string());
    }

    Ok(())
}

/// 作答资格检查失败的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligible {
    NotPublished,
    WrongType,
    NotStarted,
    DeadlinePassed,
    MaxAttemptsReached,
}

impl Ineligible {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Ineligible::NotPublished => ErrorCode::QuizNotPublished,
            Ineligible::WrongType => ErrorCode::QuizInvalidType,
            Ineligible::NotStarted => ErrorCode::QuizNotStarted,
            Ineligible::DeadlinePassed => ErrorCode::QuizDeadlinePassed,
            Ineligible::MaxAttemptsReached => ErrorCode::MaxAttemptsReached,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Ineligible::NotPublished => "Quiz is not published",
            Ineligible::WrongType => "Operation not supported for this quiz type",
            Ineligible::NotStarted => "Quiz has not started yet",
            Ineligible::DeadlinePassed => "Quiz deadline has passed",
            Ineligible::MaxAttemptsReached => "Maximum number of attempts reached",
        }
    }
}

/// 测验当前是否开放（已发布且处于开始时间与截止时间之间）
pub fn check_open(quiz: &Quiz, now: DateTime<Utc>) -> Result<(), Ineligible> {
    if !quiz.is_published {
        return Err(Ineligible::NotPublished);
    }
    if let Some(start) = quiz.start_time
        && now < start
    {
        return Err(Ineligible::NotStarted);
    }
    if now > quiz.deadline {
        return Err(Ineligible::DeadlinePassed);
    }
    Ok(())
}

/// 能否开始新的在线作答
pub fn check_can_attempt(
    quiz: &Quiz,
    attempts_used: usize,
    now: DateTime<Utc>,
) -> Result<(), Ineligible> {
    if quiz.quiz_type != QuizType::Digital {
        return Err(Ineligible::WrongType);
    }
    check_open(quiz, now)?;
    if attempts_used >= quiz.max_attempts.max(0) as usize {
        return Err(Ineligible::MaxAttemptsReached);
    }
    Ok(())
}

/// 学生当前能否提交：在线测验看作答次数，答卷型测验看是否已交过文件
pub fn can_submit(
    quiz: &Quiz,
    attempts_used: usize,
    has_file_submission: bool,
    now: DateTime<Utc>,
) -> bool {
    match quiz.quiz_type {
        QuizType::Digital => check_can_attempt(quiz, attempts_used, now).is_ok(),
        QuizType::FileUpload => !has_file_submission && check_open(quiz, now).is_ok(),
    }
}

/// 作答是否已超出时限（含宽限）
pub fn attempt_expired(
    started_at: DateTime<Utc>,
    time_limit_minutes: Option<i32>,
    now: DateTime<Utc>,
) -> bool {
    match time_limit_minutes {
        Some(limit) => {
            let allowed =
                Duration::minutes(i64::from(limit)) + Duration::seconds(SUBMIT_GRACE_SECONDS);
            now > started_at + allowed
        }
        None => false,
    }
}

pub fn is_late(submitted_at: DateTime<Utc>, deadline: DateTime<Utc>) -> bool {
    submitted_at > deadline
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz(now: DateTime<Utc>) -> Quiz {
        Quiz {
            id: 1,
            offering_id: 1,
            created_by: 2,
            title: "Midterm".into(),
            description: None,
            instructions_file_id: None,
            quiz_type: QuizType::Digital,
            start_time: Some(now - Duration::hours(1)),
            deadline: now + Duration::hours(1),
            time_limit_minutes: Some(30),
            max_attempts: 2,
            is_published: true,
            show_results_after: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn option(label: &str, is_correct: bool) -> OptionInput {
        OptionInput {
            label: label.into(),
            option_text: format!("Option {label}"),
            is_correct,
        }
    }

    #[test]
    fn test_settings_validation() {
        let now = Utc::now();
        let mut settings = QuizSettings {
            title: "Week 1 quiz",
            start_time: Some(now),
            deadline: now + Duration::days(1),
            time_limit_minutes: Some(30),
            max_attempts: 1,
        };
        assert!(validate_settings(&settings).is_ok());

        settings.start_time = Some(now + Duration::days(2));
        assert!(validate_settings(&settings).is_err());
        settings.start_time = None;

        settings.time_limit_minutes = Some(4);
        assert!(validate_settings(&settings).is_err());
        settings.time_limit_minutes = Some(301);
        assert!(validate_settings(&settings).is_err());
        settings.time_limit_minutes = None;

        settings.max_attempts = 0;
        assert!(validate_settings(&settings).is_err());
        settings.max_attempts = 11;
        assert!(validate_settings(&settings).is_err());
        settings.max_attempts = 10;
        assert!(validate_settings(&settings).is_ok());

        settings.title = "Hi";
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_mcq_options() {
        let ok = [option("A", false), option("B", true), option("C", false)];
        assert!(validate_question("2 + 2?", QuestionType::Mcq, 2.0, &ok).is_ok());

        let one = [option("A", true)];
        assert!(validate_question("q", QuestionType::Mcq, 1.0, &one).is_err());

        let two_correct = [option("A", true), option("B", true)];
        assert!(validate_question("q", QuestionType::Mcq, 1.0, &two_correct).is_err());

        let none_correct = [option("A", false), option("B", false)];
        assert!(validate_question("q", QuestionType::Mcq, 1.0, &none_correct).is_err());

        let bad_label = [option("A", true), option("G", false)];
        assert!(validate_question("q", QuestionType::Mcq, 1.0, &bad_label).is_err());

        let dup_label = [option("A", true), option("A", false)];
        assert!(validate_question("q", QuestionType::Mcq, 1.0, &dup_label).is_err());

        let seven: Vec<_> = ["A", "B", "C", "D", "E", "F", "A"]
            .iter()
            .enumerate()
            .map(|(i, l)| option(l, i == 0))
            .collect();
        assert!(validate_question("q", QuestionType::Mcq, 1.0, &seven).is_err());
    }

    #[test]
    fn test_true_false_and_paragraph() {
        let tf = [option("True", true), option("False", false)];
        assert!(validate_question("Sky is blue", QuestionType::TrueFalse, 1.0, &tf).is_ok());
        assert!(validate_question("q", QuestionType::TrueFalse, 1.0, &tf[..1]).is_err());

        assert!(validate_question("Explain", QuestionType::Paragraph, 10.0, &[]).is_ok());
        assert!(validate_question("Explain", QuestionType::Paragraph, 10.0, &tf).is_err());
    }

    #[test]
    fn test_marks_range() {
        assert!(validate_question("q", QuestionType::Paragraph, 0.5, &[]).is_ok());
        assert!(validate_question("q", QuestionType::Paragraph, 100.0, &[]).is_ok());
        assert!(validate_question("q", QuestionType::Paragraph, 0.4, &[]).is_err());
        assert!(validate_question("q", QuestionType::Paragraph, 100.5, &[]).is_err());
        assert!(validate_question("  ", QuestionType::Paragraph, 1.0, &[]).is_err());
    }

    #[test]
    fn test_attempt_eligibility() {
        let now = Utc::now();
        let q = quiz(now);
        assert_eq!(check_can_attempt(&q, 0, now), Ok(()));
        assert_eq!(check_can_attempt(&q, 1, now), Ok(()));
        assert_eq!(
            check_can_attempt(&q, 2, now),
            Err(Ineligible::MaxAttemptsReached)
        );

        let mut unpublished = q.clone();
        unpublished.is_published = false;
        assert_eq!(
            check_can_attempt(&unpublished, 0, now),
            Err(Ineligible::NotPublished)
        );

        assert_eq!(
            check_can_attempt(&q, 0, now - Duration::hours(2)),
            Err(Ineligible::NotStarted)
        );
        assert_eq!(
            check_can_attempt(&q, 0, now + Duration::hours(2)),
            Err(Ineligible::DeadlinePassed)
        );

        let mut file_quiz = q.clone();
        file_quiz.quiz_type = QuizType::FileUpload;
        assert_eq!(
            check_can_attempt(&file_quiz, 0, now),
            Err(Ineligible::WrongType)
        );
        assert_eq!(check_open(&file_quiz, now), Ok(()));
    }

    #[test]
    fn test_can_submit_by_quiz_type() {
        let now = Utc::now();
        let digital = quiz(now);
        assert!(can_submit(&digital, 1, false, now));
        assert!(!can_submit(&digital, 2, false, now));

        let mut file_quiz = digital.clone();
        file_quiz.quiz_type = QuizType::FileUpload;
        file_quiz.max_attempts = 1;
        // 答卷型测验不计在线作答次数
        assert!(can_submit(&file_quiz, 0, false, now));
        assert!(!can_submit(&file_quiz, 0, true, now));
        assert!(!can_submit(&file_quiz, 0, false, now + Duration::hours(2)));

        file_quiz.is_published = false;
        assert!(!can_submit(&file_quiz, 0, false, now));
    }

    #[test]
    fn test_time_limit_with_grace() {
        let started = Utc::now();
        assert!(!attempt_expired(started, None, started + Duration::days(3)));
        assert!(!attempt_expired(
            started,
            Some(10),
            started + Duration::minutes(10) + Duration::seconds(SUBMIT_GRACE_SECONDS)
        ));
        assert!(attempt_expired(
            started,
            Some(10),
            started + Duration::minutes(10) + Duration::seconds(SUBMIT_GRACE_SECONDS + 1)
        ));
    }

    #[test]
    fn test_late_detection() {
        let deadline = Utc::now();
        assert!(!is_late(deadline, deadline));
        assert!(is_late(deadline + Duration::seconds(1), deadline));
        assert!(!is_late(deadline - Duration::minutes(5), deadline));
    }

    #[test]
    fn test_ineligible_codes() {
        assert_eq!(
            Ineligible::MaxAttemptsReached.error_code(),
            ErrorCode::MaxAttemptsReached
        );
        assert_eq!(
            Ineligible::NotStarted.error_code(),
            ErrorCode::QuizNotStarted
        );
    }
}
