use serde::Serialize;
use ts_rs::TS;

use super::entities::{
    Question, QuestionOption, Quiz, QuizAnswer, QuizAttempt, QuizFileSubmission, QuizGrade,
};
use crate::models::common::PaginationInfo;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuizListResponse {
    pub items: Vec<Quiz>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuizDetailResponse {
    pub quiz: Quiz,
    pub question_count: i64,
    pub total_marks: f64,
}

/// 选项视图，学生视角下不含正确答案
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuestionOptionView {
    pub id: i64,
    pub label: String,
    pub option_text: String,
    pub order_number: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub is_correct: Option<bool>,
}

impl QuestionOptionView {
    pub fn from_option(option: QuestionOption, reveal: bool) -> Self {
        Self {
            id: option.id,
            label: option.label,
            option_text: option.option_text,
            order_number: option.order_number,
            is_correct: reveal.then_some(option.is_correct),
        }
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuestionView {
    pub question: Question,
    pub options: Vec<QuestionOptionView>,
}

impl QuestionView {
    pub fn new(question: Question, options: Vec<QuestionOption>, reveal: bool) -> Self {
        Self {
            question,
            options: options
                .into_iter()
                .map(|o| QuestionOptionView::from_option(o, reveal))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuestionListResponse {
    pub items: Vec<QuestionView>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct AttemptStartResponse {
    pub attempt: QuizAttempt,
    pub questions: Vec<QuestionView>,
}

/// 提交后的结果，`answers` 仅在测验允许查看结果时返回
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct AttemptResultResponse {
    pub attempt: QuizAttempt,
    pub max_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub answers: Option<Vec<QuizAnswer>>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuizStudentView {
    pub quiz: Quiz,
    pub has_attempted: bool,
    pub attempts_used: i32,
    pub best_score: Option<f64>,
    pub can_attempt: bool,
    pub file_submission: Option<QuizFileSubmission>,
    pub grade: Option<QuizGrade>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct MyAttemptsResponse {
    pub items: Vec<QuizAttempt>,
}
