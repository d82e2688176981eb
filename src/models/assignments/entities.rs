use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 作业提交状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "assignment.ts")]
pub enum SubmissionStatus {
    Submitted,
    Graded,
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Submitted => write!(f, "submitted"),
            SubmissionStatus::Graded => write!(f, "graded"),
        }
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(SubmissionStatus::Submitted),
            "graded" => Ok(SubmissionStatus::Graded),
            _ => Err(format!("Invalid submission status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct Assignment {
    pub id: i64,
    pub offering_id: i64,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub reference_file_id: Option<i64>,
    pub deadline: chrono::DateTime<chrono::Utc>,
    pub total_marks: f64,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Assignment {
    pub fn is_past_deadline(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        now > self.deadline
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentSubmission {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub file_id: i64,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub is_late: bool,
    pub status: SubmissionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentGrade {
    pub id: i64,
    pub submission_id: i64,
    pub graded_by: i64,
    pub final_score: f64,
    pub feedback_text: Option<String>,
    pub feedback_file_id: Option<i64>,
    pub graded_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_deadline_check() {
        let now = Utc::now();
        let a = Assignment {
            id: 1,
            offering_id: 1,
            created_by: 2,
            title: "Essay".into(),
            description: None,
            reference_file_id: None,
            deadline: now,
            total_marks: 100.0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert!(!a.is_past_deadline(now));
        assert!(a.is_past_deadline(now + Duration::seconds(1)));
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(SubmissionStatus::Graded.to_string(), "graded");
        assert_eq!(
            "submitted".parse::<SubmissionStatus>(),
            Ok(SubmissionStatus::Submitted)
        );
    }
}
