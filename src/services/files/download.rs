use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};
use std::sync::Arc;

use super::{FileService, stored_path};
use crate::errors::LmsError;
use crate::models::{ApiResponse, ErrorCode, files::entities::UploadedFile};
use crate::services::{current_user, storage_failure};
use crate::storage::Storage;

/// 读取文件并检查访问权限：公开文件对所有登录用户可见，否则仅上传者与管理员
async fn load_readable_file(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
    file_id: i64,
) -> Result<UploadedFile, HttpResponse> {
    let user = current_user(request)?;

    let file = match storage.get_file_by_id(file_id).await {
        Ok(Some(file)) => file,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::FileNotFound,
                "File not found",
            )));
        }
        Err(e) => {
            return Err(storage_failure(
                e,
                ErrorCode::InternalServerError,
                "File query failed",
            ));
        }
    };

    if !file.is_readable_by(&user) {
        return Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::FileAccessDenied,
            "You do not have access to this file",
        )));
    }

    Ok(file)
}

pub async fn handle_get_file(
    service: &FileService,
    request: &HttpRequest,
    file_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match load_readable_file(&storage, request, file_id).await {
        Ok(file) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            file,
            "File retrieved successfully",
        ))),
        Err(resp) => Ok(resp),
    }
}

pub async fn handle_download(
    service: &FileService,
    request: &HttpRequest,
    file_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let file = match load_readable_file(&storage, request, file_id).await {
        Ok(file) => file,
        Err(resp) => return Ok(resp),
    };

    let file_path = stored_path(&file.stored_name);
    let buf = match std::fs::read(&file_path) {
        Ok(buf) => buf,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("File {} missing on disk: {}", file.id, file_path.display());
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::FileNotFound,
                "File content not found",
            )));
        }
        Err(e) => {
            tracing::error!("{}", LmsError::file_operation(format!("{e}")));
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "File read failed",
                )),
            );
        }
    };

    // 使用原始文件名
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, file.mime_type.clone()))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file.original_name),
        ))
        .body(buf))
}
