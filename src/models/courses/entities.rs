use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::users::entities::{User, UserRole};

// 课程授课形式
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "course.ts")]
pub enum CourseType {
    LectureOnly,       // 仅讲授
    LectureSection,    // 讲授 + 小班
    LectureSectionLab, // 讲授 + 小班 + 实验
}

impl CourseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseType::LectureOnly => "lecture_only",
            CourseType::LectureSection => "lecture_section",
            CourseType::LectureSectionLab => "lecture_section_lab",
        }
    }
}

impl<'de> Deserialize<'de> for CourseType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<CourseType>().map_err(|_| {
            serde::de::Error::custom(format!(
                "Invalid course type: '{s}'. Supported: lecture_only, lecture_section, lecture_section_lab"
            ))
        })
    }
}

impl std::fmt::Display for CourseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CourseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lecture_only" => Ok(CourseType::LectureOnly),
            "lecture_section" => Ok(CourseType::LectureSection),
            "lecture_section_lab" => Ok(CourseType::LectureSectionLab),
            _ => Err(format!("Invalid course type: {s}")),
        }
    }
}

// 开课状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "course.ts")]
pub enum OfferingStatus {
    Planned,
    Active,
    Completed,
    Cancelled,
}

impl OfferingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferingStatus::Planned => "planned",
            OfferingStatus::Active => "active",
            OfferingStatus::Completed => "completed",
            OfferingStatus::Cancelled => "cancelled",
        }
    }

    /// 是否允许学生选课
    pub fn accepts_enrollment(&self) -> bool {
        matches!(self, OfferingStatus::Planned | OfferingStatus::Active)
    }
}

impl<'de> Deserialize<'de> for OfferingStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<OfferingStatus>().map_err(|_| {
            serde::de::Error::custom(format!(
                "Invalid offering status: '{s}'. Supported: planned, active, completed, cancelled"
            ))
        })
    }
}

impl std::fmt::Display for OfferingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OfferingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(OfferingStatus::Planned),
            "active" => Ok(OfferingStatus::Active),
            "completed" => Ok(OfferingStatus::Completed),
            "cancelled" => Ok(OfferingStatus::Cancelled),
            _ => Err(format!("Invalid offering status: {s}")),
        }
    }
}

// 课程目录条目
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct Course {
    pub course_code: String,
    pub course_name: String,
    pub credits: i32,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 某学期的一次开课
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseOffering {
    pub id: i64,
    pub course_code: String,
    pub session: String,
    pub professor_id: i64,
    pub course_type: CourseType,
    pub status: OfferingStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl CourseOffering {
    /// 能否管理该开课下的作业、测验与成绩
    ///
    /// 助教不绑定具体开课，可协助任意开课。
    pub fn is_managed_by(&self, user: &User) -> bool {
        match user.role {
            UserRole::Admin | UserRole::AssociateTeacher => true,
            UserRole::Professor => self.professor_id == user.id,
            UserRole::Student => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub offering_id: i64,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
    pub final_grade: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserStatus;

    fn user(id: i64, role: UserRole) -> User {
        let now = chrono::Utc::now();
        User {
            id,
            email: format!("u{id}@uni.edu"),
            password_hash: String::new(),
            full_name: "Someone".into(),
            role,
            status: UserStatus::Active,
            student_code: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn offering(professor_id: i64) -> CourseOffering {
        let now = chrono::Utc::now();
        CourseOffering {
            id: 1,
            course_code: "CS101".into(),
            session: "2025-Fall".into(),
            professor_id,
            course_type: CourseType::LectureOnly,
            status: OfferingStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_offering_management_rights() {
        let o = offering(10);
        assert!(o.is_managed_by(&user(10, UserRole::Professor)));
        assert!(!o.is_managed_by(&user(11, UserRole::Professor)));
        assert!(o.is_managed_by(&user(12, UserRole::AssociateTeacher)));
        assert!(o.is_managed_by(&user(1, UserRole::Admin)));
        assert!(!o.is_managed_by(&user(10, UserRole::Student)));
    }

    #[test]
    fn test_enrollment_statuses() {
        assert!(OfferingStatus::Planned.accepts_enrollment());
        assert!(OfferingStatus::Active.accepts_enrollment());
        assert!(!OfferingStatus::Completed.accepts_enrollment());
        assert!(!OfferingStatus::Cancelled.accepts_enrollment());
    }

    #[test]
    fn test_course_type_parse() {
        let t: CourseType = serde_json::from_str("\"lecture_section_lab\"").expect("valid");
        assert_eq!(t, CourseType::LectureSectionLab);
        assert!(serde_json::from_str::<CourseType>("\"seminar\"").is_err());
    }
}
