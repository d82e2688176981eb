//! 测验评分实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "quiz_grades")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub quiz_id: i64,
    #[sea_orm(unique)]
    pub attempt_id: Option<i64>,
    #[sea_orm(unique)]
    pub file_submission_id: Option<i64>,
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
        belongs_to = "super::quizzes::Entity",
        from = "Column::QuizId",
        to = "super::quizzes::Column::Id"
    )]
    Quiz,
}

impl Related<super::quizzes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quiz.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_quiz_grade(self) -> crate::models::quizzes::entities::QuizGrade {
        use chrono::{DateTime, Utc};

        crate::models::quizzes::entities::QuizGrade {
            id: self.id,
            quiz_id: self.quiz_id,
            attempt_id: self.attempt_id,
            file_submission_id: self.file_submission_id,
            graded_by: self.graded_by,
            final_score: self.final_score,
            feedback_text: self.feedback_text,
            feedback_file_id: self.feedback_file_id,
            graded_at: DateTime::<Utc>::from_timestamp(self.graded_at, 0).unwrap_or_default(),
        }
    }
}
