use super::{SeaOrmStorage, db_error};
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    users::{
        entities::{User, UserRole, UserStatus},
        requests::{NewUser, UserChanges, UserListQuery},
        responses::{UserListResponse, UserStatsResponse},
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    pub async fn create_user_impl(&self, user: NewUser) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            full_name: Set(user.full_name),
            role: Set(user.role.to_string()),
            status: Set(UserStatus::Active.to_string()),
            student_code: Set(user.student_code),
            last_login: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_error("Failed to create user"))?;

        Ok(result.into_user())
    }

    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("Failed to query user"))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_error("Failed to query user"))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        let mut select = Users::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Email.contains(&escaped))
                    .add(Column::FullName.contains(&escaped)),
            );
        }

        if let Some(role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, query.size);
        let total = paginator
            .num_items()
            .await
            .map_err(db_error("Failed to count users"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_error("Failed to count user pages"))?;
        let users = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(db_error("Failed to list users"))?;

        Ok(UserListResponse {
            items: users.into_iter().map(|m| m.into_user()).collect(),
            pagination: PaginationInfo::new(query.page, query.size, total, pages),
        })
    }

    pub async fn update_user_impl(&self, id: i64, changes: UserChanges) -> Result<Option<User>> {
        if self.get_user_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(email) = changes.email {
            model.email = Set(email);
        }
        if let Some(password_hash) = changes.password_hash {
            model.password_hash = Set(password_hash);
        }
        if let Some(full_name) = changes.full_name {
            model.full_name = Set(full_name);
        }
        if let Some(role) = changes.role {
            model.role = Set(role.to_string());
        }
        if let Some(status) = changes.status {
            model.status = Set(status.to_string());
        }
        if let Some(student_code) = changes.student_code {
            model.student_code = Set(Some(student_code));
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(db_error("Failed to update user"))?;

        Ok(Some(updated.into_user()))
    }

    pub async fn deactivate_user_impl(&self, id: i64) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(
                Column::Status,
                sea_orm::sea_query::Expr::value(UserStatus::Inactive.to_string()),
            )
            .col_expr(
                Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_error("Failed to deactivate user"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(Column::LastLogin, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_error("Failed to update last login"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_users_impl(&self) -> Result<u64> {
        Users::find()
            .count(&self.db)
            .await
            .map_err(db_error("Failed to count users"))
    }

    async fn count_users_by_role(&self, role: UserRole) -> Result<i64> {
        let count = Users::find()
            .filter(Column::Role.eq(role.to_string()))
            .count(&self.db)
            .await
            .map_err(db_error("Failed to count users by role"))?;
        Ok(count as i64)
    }

    pub async fn user_stats_impl(&self) -> Result<UserStatsResponse> {
        let total = self.count_users_impl().await?;
        let active = Users::find()
            .filter(Column::Status.eq(UserStatus::Active.to_string()))
            .count(&self.db)
            .await
            .map_err(db_error("Failed to count active users"))?;

        Ok(UserStatsResponse {
            total: total as i64,
            active: active as i64,
            admins: self.count_users_by_role(UserRole::Admin).await?,
            professors: self.count_users_by_role(UserRole::Professor).await?,
            associate_teachers: self
                .count_users_by_role(UserRole::AssociateTeacher)
                .await?,
            students: self.count_users_by_role(UserRole::Student).await?,
        })
    }

    pub async fn student_code_exists_impl(&self, code: &str) -> Result<bool> {
        let count = Users::find()
            .filter(Column::StudentCode.eq(code))
            .count(&self.db)
            .await
            .map_err(db_error("Failed to check student code"))?;
        Ok(count > 0)
    }
}
