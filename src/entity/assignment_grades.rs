//! 作业评分实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assignment_grades")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub submission_id: i64,
    pub graded_by: i64,
    pub final_score: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub feedback_text: Option<String>,
    pub feedback_file_id: Option<i64>,
    pub graded_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignment_submissions::Entity",
        from = "Column::SubmissionId",
        to = "super::assignment_submissions::Column::Id"
    )]
    Submission,
}

impl Related<super::assignment_submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_grade(self) -> crate::models::assignments::entities::AssignmentGrade {
        use chrono::{DateTime, Utc};

        crate::models::assignments::entities::AssignmentGrade {
            id: self.id,
            submission_id: self.submission_id,
            graded_by: self.graded_by,
            final_score: self.final_score,
            feedback_text: self.feedback_text,
            feedback_file_id: self.feedback_file_id,
            graded_at: DateTime::<Utc>::from_timestamp(self.graded_at, 0).unwrap_or_default(),
        }
    }
}
