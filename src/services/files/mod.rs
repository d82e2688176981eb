pub mod delete;
pub mod download;
pub mod list;
pub mod upload;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::{
    ApiResponse, ErrorCode, PaginationQuery, files::entities::UploadedFile,
    users::entities::User,
};
use crate::services::storage_failure;
use crate::storage::Storage;

pub struct FileService {
    storage: Option<Arc<dyn Storage>>,
}

impl FileService {
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

    // 上传
    pub async fn handle_upload(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        upload::handle_upload(self, request, payload).await
    }

    // 文件元数据
    pub async fn get_file(&self, request: &HttpRequest, file_id: i64) -> ActixResult<HttpResponse> {
        download::handle_get_file(self, request, file_id).await
    }

    // 下载
    pub async fn handle_download(
        &self,
        request: &HttpRequest,
        file_id: i64,
    ) -> ActixResult<HttpResponse> {
        download::handle_download(self, request, file_id).await
    }

    pub async fn delete_file(
        &self,
        request: &HttpRequest,
        file_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::handle_delete(self, request, file_id).await
    }

    // 我的文件
    pub async fn list_my_files(
        &self,
        request: &HttpRequest,
        query: PaginationQuery,
    ) -> ActixResult<HttpResponse> {
        list::handle_list_mine(self, request, query).await
    }

    pub async fn file_stats(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::handle_stats(self, request).await
    }
}

/// 上传文件在磁盘上的路径
pub(crate) fn stored_path(stored_name: &str) -> PathBuf {
    PathBuf::from(&AppConfig::get().upload.dir).join(stored_name)
}

/// 读取可被引用的文件，并要求属于指定用户
///
/// 作业参考文件、学生提交与评分反馈都通过这里校验。
pub(crate) async fn load_owned_file(
    storage: &Arc<dyn Storage>,
    file_id: i64,
    owner: &User,
) -> Result<UploadedFile, HttpResponse> {
    let file = match storage.get_file_by_id(file_id).await {
        Ok(Some(file)) if file.is_usable(chrono::Utc::now()) => file,
        Ok(_) => {
            return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::FileNotFound,
                format!("File {file_id} not found"),
            )));
        }
        Err(e) => {
            return Err(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "Failed to load file",
            ));
        }
    };

    if !file.is_owned_by(owner.id) {
        return Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::FileOwnershipRequired,
            format!("File {file_id} does not belong to you"),
        )));
    }

    Ok(file)
}
