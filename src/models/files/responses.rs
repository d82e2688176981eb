use serde::Serialize;
use ts_rs::TS;

use super::entities::UploadedFile;
use crate::models::common::PaginationInfo;

/// 上传成功后返回的文件信息
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "file.ts")]
pub struct FileUploadResponse {
    pub file: UploadedFile,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "file.ts")]
pub struct FileListResponse {
    pub items: Vec<UploadedFile>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "file.ts")]
pub struct ExtensionCount {
    pub extension: String,
    pub count: i64,
}

/// 存储统计（仅统计有效文件）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "file.ts")]
pub struct FileStatsResponse {
    pub total_files: i64,
    pub total_bytes: i64,
    pub by_extension: Vec<ExtensionCount>,
}
