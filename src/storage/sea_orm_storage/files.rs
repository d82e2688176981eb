//! 文件存储操作

use std::collections::BTreeMap;

use super::{SeaOrmStorage, db_error};
use crate::entity::files::{ActiveModel, Column, Entity as Files};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    files::{
        entities::{ScanStatus, UploadedFile},
        requests::{FileListQuery, NewFile},
        responses::{ExtensionCount, FileListResponse, FileStatsResponse},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    pub async fn create_file_impl(&self, file: NewFile) -> Result<UploadedFile> {
        let model = ActiveModel {
            stored_name: Set(file.stored_name),
            original_name: Set(file.original_name),
            file_size: Set(file.file_size),
            mime_type: Set(file.mime_type),
            extension: Set(file.extension),
            uploaded_by: Set(file.uploaded_by),
            uploader_role: Set(file.uploader_role),
            is_public: Set(file.is_public),
            scan_status: Set(ScanStatus::Pending.to_string()),
            expires_at: Set(file.expires_at.map(|at| at.timestamp())),
            is_active: Set(true),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_error("Failed to create file record"))?;

        Ok(result.into_file())
    }

    pub async fn get_file_by_id_impl(&self, id: i64) -> Result<Option<UploadedFile>> {
        let result = Files::find_by_id(id)
            .filter(Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .map_err(db_error("Failed to query file"))?;

        Ok(result.map(|m| m.into_file()))
    }

    pub async fn list_user_files_impl(&self, query: FileListQuery) -> Result<FileListResponse> {
        let paginator = Files::find()
            .filter(Column::UploadedBy.eq(query.uploaded_by))
            .filter(Column::IsActive.eq(true))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, query.size);

        let total = paginator
            .num_items()
            .await
            .map_err(db_error("Failed to count files"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_error("Failed to count file pages"))?;
        let files = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(db_error("Failed to list files"))?;

        Ok(FileListResponse {
            items: files.into_iter().map(|m| m.into_file()).collect(),
            pagination: PaginationInfo::new(query.page, query.size, total, pages),
        })
    }

    pub async fn deactivate_file_impl(&self, id: i64) -> Result<bool> {
        let result = Files::update_many()
            .col_expr(Column::IsActive, sea_orm::sea_query::Expr::value(false))
            .filter(Column::Id.eq(id))
            .filter(Column::IsActive.eq(true))
            .exec(&self.db)
            .await
            .map_err(db_error("Failed to delete file"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn deactivate_expired_files_impl(&self, now: i64) -> Result<u64> {
        let result = Files::update_many()
            .col_expr(Column::IsActive, sea_orm::sea_query::Expr::value(false))
            .filter(Column::IsActive.eq(true))
            .filter(Column::ExpiresAt.is_not_null())
            .filter(Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await
            .map_err(db_error("Failed to deactivate expired files"))?;

        Ok(result.rows_affected)
    }

    pub async fn file_stats_impl(&self) -> Result<FileStatsResponse> {
        let rows: Vec<(String, i64)> = Files::find()
            .select_only()
            .column(Column::Extension)
            .column(Column::FileSize)
            .filter(Column::IsActive.eq(true))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_error("Failed to collect file stats"))?;

        Ok(summarize_files(&rows))
    }
}

/// 按扩展名汇总文件数量与总大小
pub(crate) fn summarize_files(rows: &[(String, i64)]) -> FileStatsResponse {
    let mut by_extension: BTreeMap<&str, i64> = BTreeMap::new();
    let mut total_bytes = 0i64;
    for (extension, size) in rows {
        *by_extension.entry(extension.as_str()).or_default() += 1;
        total_bytes += size;
    }

    FileStatsResponse {
        total_files: rows.len() as i64,
        total_bytes,
        by_extension: by_extension
            .into_iter()
            .map(|(extension, count)| ExtensionCount {
                extension: extension.to_string(),
                count,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_files() {
        let rows = vec![
            (".pdf".to_string(), 100),
            (".png".to_string(), 50),
            (".pdf".to_string(), 25),
        ];
        let stats = summarize_files(&rows);
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_bytes, 175);
        assert_eq!(stats.by_extension.len(), 2);
        assert_eq!(stats.by_extension[0].extension, ".pdf");
        assert_eq!(stats.by_extension[0].count, 2);
    }

    fn new_file(uploaded_by: i64, expires_at: Option<chrono::DateTime<chrono::Utc>>) -> NewFile {
        NewFile {
            stored_name: format!("{}.pdf", uuid::Uuid::new_v4()),
            original_name: "notes.pdf".into(),
            file_size: 1024,
            mime_type: "application/pdf".into(),
            extension: ".pdf".into(),
            uploaded_by,
            uploader_role: "professor".into(),
            is_public: false,
            expires_at,
        }
    }

    #[tokio::test]
    async fn test_expiring_upload_is_deactivated() {
        let storage = SeaOrmStorage::in_memory().await.expect("in-memory db");
        let (professor, _, _) = storage.seed_offering().await.expect("seed");
        let now = chrono::Utc::now();

        let expiring = storage
            .create_file_impl(new_file(professor.id, Some(now - chrono::Duration::minutes(5))))
            .await
            .expect("expiring file");
        assert!(expiring.expires_at.is_some());
        assert!(expiring.is_expired(now));

        let kept = storage
            .create_file_impl(new_file(professor.id, None))
            .await
            .expect("permanent file");
        assert!(kept.expires_at.is_none());

        let swept = storage
            .deactivate_expired_files_impl(now.timestamp())
            .await
            .expect("sweep");
        assert_eq!(swept, 1);
        assert!(storage.get_file_by_id_impl(expiring.id).await.expect("lookup").is_none());
        assert!(storage.get_file_by_id_impl(kept.id).await.expect("lookup").is_some());
    }

    #[test]
    fn test_summarize_empty() {
        let stats = summarize_files(&[]);
        assert_eq!(stats.total_files, 0);
        assert!(stats.by_extension.is_empty());
    }
}
