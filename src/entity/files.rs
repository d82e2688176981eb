//! 上传文件实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub stored_name: String,
    pub original_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub extension: String,
    pub uploaded_by: i64,
    pub uploader_role: String,
    pub is_public: bool,
    pub scan_status: String,
    pub expires_at: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UploadedBy",
        to = "super::users::Column::Id"
    )]
    Uploader,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Uploader.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_file(self) -> crate::models::files::entities::UploadedFile {
        use crate::models::files::entities::{ScanStatus, UploadedFile};
        use chrono::{DateTime, Utc};

        UploadedFile {
            id: self.id,
            stored_name: self.stored_name,
            original_name: self.original_name,
            file_size: self.file_size,
            mime_type: self.mime_type,
            extension: self.extension,
            uploaded_by: self.uploaded_by,
            uploader_role: self.uploader_role,
            is_public: self.is_public,
            scan_status: self
                .scan_status
                .parse::<ScanStatus>()
                .unwrap_or(ScanStatus::Pending),
            expires_at: self
                .expires_at
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            is_active: self.is_active,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
