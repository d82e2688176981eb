use super::{SeaOrmStorage, db_error};
use crate::entity::course_offerings::Entity as CourseOfferings;
use crate::entity::enrollments::{ActiveModel, Column, Entity as Enrollments};
use crate::entity::users::Entity as Users;
use crate::errors::Result;
use crate::models::courses::{
    entities::Enrollment,
    responses::{EnrolledStudent, MyEnrollment},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn create_enrollment_impl(
        &self,
        student_id: i64,
        offering_id: i64,
    ) -> Result<Enrollment> {
        let model = ActiveModel {
            student_id: Set(student_id),
            offering_id: Set(offering_id),
            enrolled_at: Set(chrono::Utc::now().timestamp()),
            final_grade: Set(None),
            ..Default::default()
        };

        // (student_id, offering_id) 唯一约束冲突映射为 Conflict
        let result = model
            .insert(&self.db)
            .await
            .map_err(db_error("Failed to create enrollment"))?;

        Ok(result.into_enrollment())
    }

    pub async fn get_enrollment_impl(
        &self,
        student_id: i64,
        offering_id: i64,
    ) -> Result<Option<Enrollment>> {
        let result = Enrollments::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::OfferingId.eq(offering_id))
            .one(&self.db)
            .await
            .map_err(db_error("Failed to query enrollment"))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    pub async fn delete_enrollment_impl(&self, enrollment_id: i64) -> Result<bool> {
        let result = Enrollments::delete_by_id(enrollment_id)
            .exec(&self.db)
            .await
            .map_err(db_error("Failed to delete enrollment"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn set_final_grade_impl(
        &self,
        enrollment_id: i64,
        final_grade: f64,
    ) -> Result<Option<Enrollment>> {
        let Some(existing) = Enrollments::find_by_id(enrollment_id)
            .one(&self.db)
            .await
            .map_err(db_error("Failed to query enrollment"))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.final_grade = Set(Some(final_grade));

        let updated = model
            .update(&self.db)
            .await
            .map_err(db_error("Failed to set final grade"))?;

        Ok(Some(updated.into_enrollment()))
    }

    pub async fn list_offering_students_impl(
        &self,
        offering_id: i64,
    ) -> Result<Vec<EnrolledStudent>> {
        let rows = Enrollments::find()
            .filter(Column::OfferingId.eq(offering_id))
            .find_also_related(Users)
            .order_by_asc(Column::EnrolledAt)
            .all(&self.db)
            .await
            .map_err(db_error("Failed to list enrolled students"))?;

        Ok(rows
            .into_iter()
            .filter_map(|(enrollment, user)| {
                user.map(|u| EnrolledStudent {
                    user: u.into_user(),
                    enrollment: enrollment.into_enrollment(),
                })
            })
            .collect())
    }

    pub async fn list_student_enrollments_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<MyEnrollment>> {
        let rows = Enrollments::find()
            .filter(Column::StudentId.eq(student_id))
            .find_also_related(CourseOfferings)
            .order_by_desc(Column::EnrolledAt)
            .all(&self.db)
            .await
            .map_err(db_error("Failed to list enrollments"))?;

        Ok(rows
            .into_iter()
            .filter_map(|(enrollment, offering)| {
                offering.map(|o| MyEnrollment {
                    enrollment: enrollment.into_enrollment(),
                    offering: o.into_offering(),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LmsError;

    #[tokio::test]
    async fn test_duplicate_enrollment_is_conflict() {
        let storage = SeaOrmStorage::in_memory().await.expect("in-memory db");
        let (_, student, offering) = storage.seed_offering().await.expect("seed");

        let first = storage
            .create_enrollment_impl(student.id, offering.id)
            .await
            .expect("first enrollment");
        assert_eq!(first.student_id, student.id);

        let second = storage.create_enrollment_impl(student.id, offering.id).await;
        assert!(matches!(second, Err(LmsError::Conflict(_))));

        let found = storage
            .get_enrollment_impl(student.id, offering.id)
            .await
            .expect("lookup");
        assert_eq!(found.map(|e| e.id), Some(first.id));
    }
}
