use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 测验类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "quiz.ts")]
pub enum QuizType {
    Digital,    // 在线答题
    FileUpload, // 上传答卷
}

impl QuizType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizType::Digital => "digital",
            QuizType::FileUpload => "file_upload",
        }
    }
}

impl<'de> Deserialize<'de> for QuizType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<QuizType>().map_err(|_| {
            serde::de::Error::custom(format!(
                "Invalid quiz type: '{s}'. Supported: digital, file_upload"
            ))
        })
    }
}

impl std::fmt::Display for QuizType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QuizType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "digital" => Ok(QuizType::Digital),
            "file_upload" => Ok(QuizType::FileUpload),
            _ => Err(format!("Invalid quiz type: {s}")),
        }
    }
}

// 题目类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "quiz.ts")]
pub enum QuestionType {
    Mcq,
    TrueFalse,
    Paragraph,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "mcq",
            QuestionType::TrueFalse => "true_false",
            QuestionType::Paragraph => "paragraph",
        }
    }

    /// 能否按正确选项自动评分
    pub fn is_auto_graded(&self) -> bool {
        !matches!(self, QuestionType::Paragraph)
    }
}

impl<'de> Deserialize<'de> for QuestionType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<QuestionType>().map_err(|_| {
            serde::de::Error::custom(format!(
                "Invalid question type: '{s}'. Supported: mcq, true_false, paragraph"
            ))
        })
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mcq" => Ok(QuestionType::Mcq),
            "true_false" => Ok(QuestionType::TrueFalse),
            "paragraph" => Ok(QuestionType::Paragraph),
            _ => Err(format!("Invalid question type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct Quiz {
    pub id: i64,
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
    pub is_published: bool,
    pub show_results_after: bool,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub marks: f64,
    pub order_number: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuestionOption {
    pub id: i64,
    pub question_id: i64,
    pub label: String,
    pub option_text: String,
    pub is_correct: bool,
    pub order_number: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuizAttempt {
    pub id: i64,
    pub quiz_id: i64,
    pub student_id: i64,
    pub attempt_number: i32,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub score: Option<f64>,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuizAnswer {
    pub id: i64,
    pub attempt_id: i64,
    pub question_id: i64,
    pub selected_option_id: Option<i64>,
    pub answer_text: Option<String>,
    /// 简答题在人工评分前为空
    pub awarded_marks: Option<f64>,
    pub is_correct: Option<bool>,
    pub answered_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuizFileSubmission {
    pub id: i64,
    pub quiz_id: i64,
    pub student_id: i64,
    pub file_id: i64,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub is_late: bool,
}

// attempt_id 与 file_submission_id 二者恰有其一
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "quiz.ts")]
pub struct QuizGrade {
    pub id: i64,
    pub quiz_id: i64,
    pub attempt_id: Option<i64>,
    pub file_submission_id: Option<i64>,
    pub graded_by: i64,
    pub final_score: f64,
    pub feedback_text: Option<String>,
    pub feedback_file_id: Option<i64>,
    pub graded_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_type_strings() {
        assert_eq!(QuizType::FileUpload.to_string(), "file_upload");
        assert_eq!("digital".parse::<QuizType>(), Ok(QuizType::Digital));
        assert!(serde_json::from_str::<QuizType>("\"oral\"").is_err());
    }

    #[test]
    fn test_question_auto_grading() {
        assert!(QuestionType::Mcq.is_auto_graded());
        assert!(QuestionType::TrueFalse.is_auto_graded());
        assert!(!QuestionType::Paragraph.is_auto_graded());
    }
}
