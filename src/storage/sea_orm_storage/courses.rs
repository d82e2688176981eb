//! 课程目录与开课存储操作

use super::{SeaOrmStorage, db_error};
use crate::entity::course_offerings::{
    ActiveModel as OfferingActiveModel, Column as OfferingColumn, Entity as CourseOfferings,
};
use crate::entity::courses::{ActiveModel as CourseActiveModel, Column, Entity as Courses};
use crate::entity::enrollments::{Column as EnrollmentColumn, Entity as Enrollments};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    courses::{
        entities::{Course, CourseOffering},
        requests::{
            CourseChanges, CourseListQuery, NewCourse, NewOffering, OfferingChanges,
            OfferingListQuery,
        },
        responses::{CourseListResponse, OfferingListResponse},
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    pub async fn create_course_impl(&self, course: NewCourse) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();

        let model = CourseActiveModel {
            course_code: Set(course.course_code),
            course_name: Set(course.course_name),
            credits: Set(course.credits),
            description: Set(course.description),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_error("Failed to create course"))?;

        Ok(result.into_course())
    }

    pub async fn get_course_impl(&self, code: &str) -> Result<Option<Course>> {
        let result = Courses::find_by_id(code.to_string())
            .one(&self.db)
            .await
            .map_err(db_error("Failed to query course"))?;

        Ok(result.map(|m| m.into_course()))
    }

    pub async fn list_courses_with_pagination_impl(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        let mut select = Courses::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::CourseCode.contains(&escaped))
                    .add(Column::CourseName.contains(&escaped)),
            );
        }

        let paginator = select
            .order_by_asc(Column::CourseCode)
            .paginate(&self.db, query.size);

        let total = paginator
            .num_items()
            .await
            .map_err(db_error("Failed to count courses"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_error("Failed to count course pages"))?;
        let courses = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(db_error("Failed to list courses"))?;

        Ok(CourseListResponse {
            items: courses.into_iter().map(|m| m.into_course()).collect(),
            pagination: PaginationInfo::new(query.page, query.size, total, pages),
        })
    }

    pub async fn update_course_impl(
        &self,
        code: &str,
        changes: CourseChanges,
    ) -> Result<Option<Course>> {
        if self.get_course_impl(code).await?.is_none() {
            return Ok(None);
        }

        let mut model = CourseActiveModel {
            course_code: Set(code.to_string()),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = changes.course_name {
            model.course_name = Set(name);
        }
        if let Some(credits) = changes.credits {
            model.credits = Set(credits);
        }
        if let Some(description) = changes.description {
            model.description = Set(Some(description));
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(db_error("Failed to update course"))?;

        Ok(Some(updated.into_course()))
    }

    pub async fn delete_course_impl(&self, code: &str) -> Result<bool> {
        let result = Courses::delete_by_id(code.to_string())
            .exec(&self.db)
            .await
            .map_err(db_error("Failed to delete course"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_offerings_for_course_impl(&self, code: &str) -> Result<u64> {
        CourseOfferings::find()
            .filter(OfferingColumn::CourseCode.eq(code))
            .count(&self.db)
            .await
            .map_err(db_error("Failed to count offerings"))
    }

    pub async fn create_offering_impl(&self, offering: NewOffering) -> Result<CourseOffering> {
        let now = chrono::Utc::now().timestamp();

        let model = OfferingActiveModel {
            course_code: Set(offering.course_code),
            session: Set(offering.session),
            professor_id: Set(offering.professor_id),
            course_type: Set(offering.course_type.to_string()),
            status: Set(offering.status.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_error("Failed to create offering"))?;

        Ok(result.into_offering())
    }

    pub async fn get_offering_by_id_impl(&self, id: i64) -> Result<Option<CourseOffering>> {
        let result = CourseOfferings::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("Failed to query offering"))?;

        Ok(result.map(|m| m.into_offering()))
    }

    pub async fn list_offerings_with_pagination_impl(
        &self,
        query: OfferingListQuery,
    ) -> Result<OfferingListResponse> {
        let mut select = CourseOfferings::find();

        if let Some(ref code) = query.course_code {
            select = select.filter(OfferingColumn::CourseCode.eq(code.to_uppercase()));
        }
        if let Some(ref session) = query.session {
            select = select.filter(OfferingColumn::Session.eq(session.as_str()));
        }
        if let Some(status) = query.status {
            select = select.filter(OfferingColumn::Status.eq(status.to_string()));
        }
        if let Some(professor_id) = query.professor_id {
            select = select.filter(OfferingColumn::ProfessorId.eq(professor_id));
        }

        let paginator = select
            .order_by_desc(OfferingColumn::CreatedAt)
            .order_by_desc(OfferingColumn::Id)
            .paginate(&self.db, query.size);

        let total = paginator
            .num_items()
            .await
            .map_err(db_error("Failed to count offerings"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_error("Failed to count offering pages"))?;
        let offerings = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(db_error("Failed to list offerings"))?;

        Ok(OfferingListResponse {
            items: offerings.into_iter().map(|m| m.into_offering()).collect(),
            pagination: PaginationInfo::new(query.page, query.size, total, pages),
        })
    }

    pub async fn update_offering_impl(
        &self,
        id: i64,
        changes: OfferingChanges,
    ) -> Result<Option<CourseOffering>> {
        if self.get_offering_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = OfferingActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(session) = changes.session {
            model.session = Set(session);
        }
        if let Some(professor_id) = changes.professor_id {
            model.professor_id = Set(professor_id);
        }
        if let Some(course_type) = changes.course_type {
            model.course_type = Set(course_type.to_string());
        }
        if let Some(status) = changes.status {
            model.status = Set(status.to_string());
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(db_error("Failed to update offering"))?;

        Ok(Some(updated.into_offering()))
    }

    pub async fn delete_offering_impl(&self, id: i64) -> Result<bool> {
        let result = CourseOfferings::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_error("Failed to delete offering"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_enrollments_for_offering_impl(&self, offering_id: i64) -> Result<u64> {
        Enrollments::find()
            .filter(EnrollmentColumn::OfferingId.eq(offering_id))
            .count(&self.db)
            .await
            .map_err(db_error("Failed to count enrollments"))
    }
}
