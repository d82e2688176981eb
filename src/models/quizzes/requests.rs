use serde::Deserialize;
use ts_rs::TS;

use super::entities::{QuestionType, QuizType};
use crate::models::common::PaginationQuery;
use crate::models::common::pagination::deserialize_optional_i64;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuizListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offering_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct CreateQuizRequest {
    pub offering_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub instructions_file_id: Option<i64>,
    pub quiz_type: QuizType,
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    pub deadline: chrono::DateTime<chrono::Utc>,
    pub time_limit_minutes: Option<i32>,
    pub max_attempts: Option<i32>,
    pub show_results_after: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct UpdateQuizRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions_file_id: Option<i64>,
    pub quiz_type: Option<QuizType>,
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    pub deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub time_limit_minutes: Option<i32>,
    pub max_attempts: Option<i32>,
    pub show_results_after: Option<bool>,
    /// 只能由 false 改为 true
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct OptionInput {
    pub label: String,
    pub option_text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct CreateQuestionRequest {
    pub question_text: String,
    pub question_type: QuestionType,
    pub marks: f64,
    #[serde(default)]
    pub options: Vec<OptionInput>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct AnswerInput {
    pub question_id: i64,
    pub selected_option_id: Option<i64>,
    pub answer_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct SubmitAnswersRequest {
    pub answers: Vec<AnswerInput>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuizFileSubmitRequest {
    pub file_id: i64,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct GradeQuizRequest {
    pub attempt_id: Option<i64>,
    pub file_submission_id: Option<i64>,
    pub final_score: f64,
    pub feedback_text: Option<String>,
    pub feedback_file_id: Option<i64>,
}

// 存储层使用的结构

#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub offering_id: i64,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub instructions_file_id: Option<i64>,
    pub quiz_type: QuizType,
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    pub deadline: chrono::DateTime<chrono::Utc>,
    pub time_limit_minutes: Option<i32>,
    pub max_attempts: i32,
    pub show_results_after: bool,
}

#[derive(Debug, Clone, Default)]
pub struct QuizChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions_file_id: Option<i64>,
    pub quiz_type: Option<QuizType>,
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    pub deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub time_limit_minutes: Option<i32>,
    pub max_attempts: Option<i32>,
    pub show_results_after: Option<bool>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct QuizListQuery {
    pub page: u64,
    pub size: u64,
    pub offering_id: Option<i64>,
    /// 学生只能看到已发布的测验
    pub published_only: bool,
}

#[derive(Debug, Clone)]
pub struct NewQuestionOption {
    pub label: String,
    pub option_text: String,
    pub is_correct: bool,
    pub order_number: i32,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub quiz_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub marks: f64,
    pub options: Vec<NewQuestionOption>,
}

/// 已评分的作答，随提交一并写入
#[derive(Debug, Clone, PartialEq)]
pub struct GradedAnswer {
    pub question_id: i64,
    pub selected_option_id: Option<i64>,
    pub answer_text: Option<String>,
    pub awarded_marks: Option<f64>,
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewQuizFileSubmission {
    pub quiz_id: i64,
    pub student_id: i64,
    pub file_id: i64,
    pub is_late: bool,
}

/// 测验评分对象
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizGradeTarget {
    Attempt(i64),
    FileSubmission(i64),
}

#[derive(Debug, Clone)]
pub struct NewQuizGrade {
    pub quiz_id: i64,
    pub target: QuizGradeTarget,
    pub graded_by: i64,
    pub final_score: f64,
    pub feedback_text: Option<String>,
    pub feedback_file_id: Option<i64>,
}
