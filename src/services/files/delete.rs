use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{FileService, stored_path};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, storage_failure};

/// 软删除，磁盘文件尽力删除
pub async fn handle_delete(
    service: &FileService,
    request: &HttpRequest,
    file_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let file = match storage.get_file_by_id(file_id).await {
        Ok(Some(file)) => file,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::FileNotFound,
                "File not found",
            )));
        }
        Err(e) => {
            return Ok(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "File query failed",
            ));
        }
    };

    if !(file.is_owned_by(user.id) || user.is_admin()) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::FileAccessDenied,
            "Only the uploader or an admin can delete this file",
        )));
    }

    match storage.deactivate_file(file.id).await {
        Ok(true) => {
            if let Err(e) = std::fs::remove_file(stored_path(&file.stored_name)) {
                tracing::warn!("Failed to remove file {} from disk: {}", file.id, e);
            }
            tracing::info!("File {} deleted by user {}", file.id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty(
                "File deleted successfully",
            )))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::FileNotFound,
            "File not found",
        ))),
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::InternalServerError,
            "File deletion failed",
        )),
    }
}
