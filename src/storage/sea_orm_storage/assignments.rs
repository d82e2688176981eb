//! 作业、提交与评分存储操作

use super::{SeaOrmStorage, db_error};
use crate::entity::assignment_grades::{
    ActiveModel as GradeActiveModel, Column as GradeColumn, Entity as AssignmentGrades,
};
use crate::entity::assignment_submissions::{
    ActiveModel as SubmissionActiveModel, Column as SubmissionColumn,
    Entity as AssignmentSubmissions,
};
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::errors::{LmsError, Result};
use crate::models::{
    PaginationInfo,
    assignments::{
        entities::{Assignment, AssignmentGrade, AssignmentSubmission, SubmissionStatus},
        requests::{
            AssignmentChanges, AssignmentListQuery, NewAssignment, NewAssignmentGrade,
            NewSubmission,
        },
        responses::{AssignmentListResponse, PendingSubmission, SubmissionWithGrade},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    pub async fn create_assignment_impl(&self, assignment: NewAssignment) -> Result<Assignment> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            offering_id: Set(assignment.offering_id),
            created_by: Set(assignment.created_by),
            title: Set(assignment.title),
            description: Set(assignment.description),
            reference_file_id: Set(assignment.reference_file_id),
            deadline: Set(assignment.deadline.timestamp()),
            total_marks: Set(assignment.total_marks),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_error("Failed to create assignment"))?;

        Ok(result.into_assignment())
    }

    pub async fn get_assignment_by_id_impl(&self, id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(id)
            .filter(Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .map_err(db_error("Failed to query assignment"))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    pub async fn list_assignments_with_pagination_impl(
        &self,
        query: AssignmentListQuery,
    ) -> Result<AssignmentListResponse> {
        let mut select = Assignments::find().filter(Column::IsActive.eq(true));

        if let Some(offering_id) = query.offering_id {
            select = select.filter(Column::OfferingId.eq(offering_id));
        }

        let paginator = select
            .order_by_asc(Column::Deadline)
            .order_by_asc(Column::Id)
            .paginate(&self.db, query.size);

        let total = paginator
            .num_items()
            .await
            .map_err(db_error("Failed to count assignments"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_error("Failed to count assignment pages"))?;
        let assignments = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(db_error("Failed to list assignments"))?;

        Ok(AssignmentListResponse {
            items: assignments
                .into_iter()
                .map(|m| m.into_assignment())
                .collect(),
            pagination: PaginationInfo::new(query.page, query.size, total, pages),
        })
    }

    pub async fn update_assignment_impl(
        &self,
        id: i64,
        changes: AssignmentChanges,
    ) -> Result<Option<Assignment>> {
        if self.get_assignment_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(title) = changes.title {
            model.title = Set(title);
        }
        if let Some(description) = changes.description {
            model.description = Set(Some(description));
        }
        if let Some(file_id) = changes.reference_file_id {
            model.reference_file_id = Set(Some(file_id));
        }
        if let Some(deadline) = changes.deadline {
            model.deadline = Set(deadline.timestamp());
        }
        if let Some(total_marks) = changes.total_marks {
            model.total_marks = Set(total_marks);
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(db_error("Failed to update assignment"))?;

        Ok(Some(updated.into_assignment()))
    }

    pub async fn deactivate_assignment_impl(&self, id: i64) -> Result<bool> {
        let result = Assignments::update_many()
            .col_expr(Column::IsActive, sea_orm::sea_query::Expr::value(false))
            .col_expr(
                Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.eq(id))
            .filter(Column::IsActive.eq(true))
            .exec(&self.db)
            .await
            .map_err(db_error("Failed to delete assignment"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn create_submission_impl(
        &self,
        submission: NewSubmission,
    ) -> Result<AssignmentSubmission> {
        let model = SubmissionActiveModel {
            assignment_id: Set(submission.assignment_id),
            student_id: Set(submission.student_id),
            file_id: Set(submission.file_id),
            submitted_at: Set(chrono::Utc::now().timestamp()),
            is_late: Set(submission.is_late),
            status: Set(SubmissionStatus::Submitted.to_string()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_error("Failed to create submission"))?;

        Ok(result.into_submission())
    }

    pub async fn get_submission_by_id_impl(
        &self,
        id: i64,
    ) -> Result<Option<AssignmentSubmission>> {
        let result = AssignmentSubmissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("Failed to query submission"))?;

        Ok(result.map(|m| m.into_submission()))
    }

    pub async fn get_student_submission_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<AssignmentSubmission>> {
        let result = AssignmentSubmissions::find()
            .filter(SubmissionColumn::AssignmentId.eq(assignment_id))
            .filter(SubmissionColumn::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(db_error("Failed to query submission"))?;

        Ok(result.map(|m| m.into_submission()))
    }

    pub async fn list_submissions_for_assignment_impl(
        &self,
        assignment_id: i64,
    ) -> Result<Vec<SubmissionWithGrade>> {
        let rows = AssignmentSubmissions::find()
            .filter(SubmissionColumn::AssignmentId.eq(assignment_id))
            .find_also_related(AssignmentGrades)
            .order_by_asc(SubmissionColumn::SubmittedAt)
            .all(&self.db)
            .await
            .map_err(db_error("Failed to list submissions"))?;

        Ok(rows
            .into_iter()
            .map(|(submission, grade)| SubmissionWithGrade {
                submission: submission.into_submission(),
                grade: grade.map(|g| g.into_grade()),
            })
            .collect())
    }

    pub async fn list_pending_submissions_impl(
        &self,
        creator: Option<i64>,
    ) -> Result<Vec<PendingSubmission>> {
        let mut select = AssignmentSubmissions::find()
            .filter(SubmissionColumn::Status.eq(SubmissionStatus::Submitted.to_string()))
            .find_also_related(Assignments)
            .filter(Column::IsActive.eq(true));

        if let Some(creator) = creator {
            select = select.filter(Column::CreatedBy.eq(creator));
        }

        let rows = select
            .order_by_asc(SubmissionColumn::SubmittedAt)
            .all(&self.db)
            .await
            .map_err(db_error("Failed to list pending submissions"))?;

        Ok(rows
            .into_iter()
            .filter_map(|(submission, assignment)| {
                assignment.map(|a| PendingSubmission {
                    assignment: a.into_assignment(),
                    submission: submission.into_submission(),
                })
            })
            .collect())
    }

    pub async fn grade_submission_impl(
        &self,
        grade: NewAssignmentGrade,
    ) -> Result<AssignmentGrade> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let model = GradeActiveModel {
            submission_id: Set(grade.submission_id),
            graded_by: Set(grade.graded_by),
            final_score: Set(grade.final_score),
            feedback_text: Set(grade.feedback_text),
            feedback_file_id: Set(grade.feedback_file_id),
            graded_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        // submission_id 唯一，重复评分会触发 Conflict
        let inserted = model
            .insert(&txn)
            .await
            .map_err(db_error("Failed to save grade"))?;

        let result = AssignmentSubmissions::update_many()
            .col_expr(
                SubmissionColumn::Status,
                sea_orm::sea_query::Expr::value(SubmissionStatus::Graded.to_string()),
            )
            .filter(SubmissionColumn::Id.eq(grade.submission_id))
            .exec(&txn)
            .await
            .map_err(db_error("Failed to update submission status"))?;

        if result.rows_affected == 0 {
            return Err(LmsError::not_found(format!(
                "Submission {} not found",
                grade.submission_id
            )));
        }

        txn.commit()
            .await
            .map_err(db_error("Failed to commit grade"))?;

        Ok(inserted.into_grade())
    }

    pub async fn get_grade_for_submission_impl(
        &self,
        submission_id: i64,
    ) -> Result<Option<AssignmentGrade>> {
        let result = AssignmentGrades::find()
            .filter(GradeColumn::SubmissionId.eq(submission_id))
            .one(&self.db)
            .await
            .map_err(db_error("Failed to query grade"))?;

        Ok(result.map(|m| m.into_grade()))
    }
}
