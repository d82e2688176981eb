// 新文件记录（用于存储层）
#[derive(Debug, Clone)]
pub struct NewFile {
    pub stored_name: String,
    pub original_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub extension: String,
    pub uploaded_by: i64,
    pub uploader_role: String,
    pub is_public: bool,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

// 文件列表查询参数（用于存储层）
#[derive(Debug, Clone)]
pub struct FileListQuery {
    pub page: u64,
    pub size: u64,
    pub uploaded_by: i64,
}
