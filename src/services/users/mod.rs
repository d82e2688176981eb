pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod role;
pub mod stats;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Datelike;
use std::sync::Arc;

use crate::errors::{LmsError, Result};
use crate::models::users::{
    entities::{User, UserRole},
    requests::{AssignRoleRequest, CreateUserRequest, NewUser, UpdateUserRequest, UserListParams},
};
use crate::storage::Storage;
use crate::utils::random_code::generate_student_code;

pub struct UserService {
    storage: Option<Arc<dyn Storage>>,
}

impl UserService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 获取用户列表
    pub async fn list_users(
        &self,
        query: UserListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_users(self, query, request).await
    }

    // 创建用户
    pub async fn create_user(
        &self,
        user_data: CreateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_user(self, user_data, request).await
    }

    // 根据ID获取用户
    pub async fn get_user(&self, user_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_user(self, user_id, request).await
    }

    // 更新用户信息
    pub async fn update_user(
        &self,
        user_id: i64,
        update_data: UpdateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_user(self, user_id, update_data, request).await
    }

    // 停用用户
    pub async fn delete_user(
        &self,
        user_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_user(self, user_id, request).await
    }

    // 分配角色
    pub async fn assign_role(
        &self,
        user_id: i64,
        role_data: AssignRoleRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        role::assign_role(self, user_id, role_data, request).await
    }

    pub async fn user_stats(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        stats::user_stats(self, request).await
    }
}

/// 插入学生时最多尝试的学号个数
const STUDENT_CODE_ATTEMPTS: usize = 5;

/// 分配一个未被占用的学号
pub(crate) async fn allocate_student_code(storage: &Arc<dyn Storage>) -> Result<String> {
    let year = chrono::Utc::now().year();
    for _ in 0..20 {
        let code = generate_student_code(year);
        if !storage.student_code_exists(&code).await? {
            return Ok(code);
        }
    }
    Err(LmsError::database_operation(
        "Unable to allocate a unique student code",
    ))
}

/// 创建用户，学生自动分配学号
///
/// 返回 Conflict 只说明邮箱已被占用；学号被并发抢占时换号重试。
pub(crate) async fn insert_user(storage: &Arc<dyn Storage>, user: NewUser) -> Result<User> {
    if user.role != UserRole::Student {
        return storage.create_user(user).await;
    }
    let year = chrono::Utc::now().year();
    let codes = (0..STUDENT_CODE_ATTEMPTS)
        .map(|_| generate_student_code(year))
        .collect();
    insert_student_with_codes(storage, user, codes).await
}

async fn insert_student_with_codes(
    storage: &Arc<dyn Storage>,
    user: NewUser,
    codes: Vec<String>,
) -> Result<User> {
    for code in codes {
        let candidate = NewUser {
            student_code: Some(code),
            ..user.clone()
        };
        match storage.create_user(candidate).await {
            Err(e) if e.is_conflict() => {
                if storage.get_user_by_email(&user.email).await?.is_some() {
                    return Err(e);
                }
                tracing::debug!("Student code collision while creating {}, retrying", user.email);
            }
            result => return result,
        }
    }
    Err(LmsError::database_operation(
        "Unable to allocate a unique student code",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    fn student(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password_hash: "hash".into(),
            full_name: "Grace Hopper".into(),
            role: UserRole::Student,
            student_code: None,
        }
    }

    #[tokio::test]
    async fn test_student_code_collision_retries() {
        let db = SeaOrmStorage::in_memory().await.expect("in-memory db");
        let storage: Arc<dyn Storage> = Arc::new(db);

        let first = insert_student_with_codes(
            &storage,
            student("first@uni.edu"),
            vec!["S20250001".into()],
        )
        .await
        .expect("first student");
        assert_eq!(first.student_code.as_deref(), Some("S20250001"));

        // 第一个学号已被占用，换用下一个
        let second = insert_student_with_codes(
            &storage,
            student("second@uni.edu"),
            vec!["S20250001".into(), "S20250002".into()],
        )
        .await
        .expect("second student");
        assert_eq!(second.student_code.as_deref(), Some("S20250002"));

        let exhausted = insert_student_with_codes(
            &storage,
            student("third@uni.edu"),
            vec!["S20250001".into()],
        )
        .await;
        assert!(matches!(exhausted, Err(LmsError::DatabaseOperation(_))));
    }

    #[tokio::test]
    async fn test_taken_email_is_conflict() {
        let db = SeaOrmStorage::in_memory().await.expect("in-memory db");
        let storage: Arc<dyn Storage> = Arc::new(db);

        insert_user(&storage, student("dup@uni.edu"))
            .await
            .expect("first student");
        let again = insert_user(&storage, student("dup@uni.edu")).await;
        assert!(matches!(again, Err(LmsError::Conflict(_))));
    }
}
