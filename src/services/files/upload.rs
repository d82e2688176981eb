use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::TryStreamExt;
use futures_util::stream::StreamExt;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use uuid::Uuid;

use super::{FileService, stored_path};
use crate::config::AppConfig;
use crate::errors::LmsError;
use crate::models::{
    ApiResponse, ErrorCode,
    files::{requests::NewFile, responses::FileUploadResponse},
};
use crate::services::{current_user, storage_failure};
use crate::utils::file_magic::{extension_of, mime_type_for};
use crate::utils::validate_magic_bytes;

/// 清理原始文件名，用于存储与 Content-Disposition
pub(crate) fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .take(255)
        .collect();
    let cleaned = cleaned.trim().to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// 文件有效期上限（天）
const MAX_EXPIRES_IN_DAYS: i64 = 365;

/// 解析 `expires_in_days` 字段，空值表示永不过期
fn parse_expires_in_days(raw: &str) -> Result<Option<i64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<i64>() {
        Ok(days) if (1..=MAX_EXPIRES_IN_DAYS).contains(&days) => Ok(Some(days)),
        _ => Err(format!(
            "expires_in_days must be an integer between 1 and {MAX_EXPIRES_IN_DAYS}"
        )),
    }
}

async fn read_text_field(field: &mut Field) -> Result<String, MultipartError> {
    let mut raw = Vec::new();
    while let Some(chunk) = field.next().await {
        raw.extend_from_slice(&chunk?);
    }
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// 已写入磁盘但尚未入库的文件，未提交前离开作用域即删除
struct PendingFile {
    path: PathBuf,
    committed: bool,
}

impl PendingFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if !self.committed
            && let Err(e) = fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!("Failed to remove pending upload {:?}: {}", self.path, e);
        }
    }
}

fn upload_error(status: actix_web::http::StatusCode, code: ErrorCode, msg: &str) -> HttpResponse {
    HttpResponse::build(status).json(ApiResponse::error_empty(code, msg))
}

pub async fn handle_upload(
    service: &FileService,
    req: &HttpRequest,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    use actix_web::http::StatusCode;

    let user = match current_user(req) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let config = AppConfig::get();
    let upload_dir = &config.upload.dir;
    let max_size = config.upload.max_size;

    // 确保上传目录存在
    if let Err(e) = fs::create_dir_all(upload_dir) {
        tracing::error!("{}", LmsError::file_operation(format!("{e}")));
        return Ok(upload_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::FileUploadFailed,
            "Failed to create upload directory",
        ));
    }

    let mut original_name = String::new();
    let mut extension = String::new();
    let mut stored_name = String::new();
    let mut file_size: i64 = 0;
    let mut pending: Option<PendingFile> = None;
    let mut is_public = false;
    let mut expires_in_days: Option<i64> = None;

    while let Ok(Some(mut field)) = payload.try_next().await {
        let content_disposition = field.content_disposition();
        let name = content_disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        if name == "is_public" {
            is_public = parse_flag(&read_text_field(&mut field).await?);
            continue;
        }

        if name == "expires_in_days" {
            match parse_expires_in_days(&read_text_field(&mut field).await?) {
                Ok(days) => expires_in_days = days,
                Err(msg) => {
                    return Ok(upload_error(
                        StatusCode::BAD_REQUEST,
                        ErrorCode::BadRequest,
                        &msg,
                    ));
                }
            }
            continue;
        }

        if name != "file" {
            continue;
        }

        if pending.is_some() {
            return Ok(upload_error(
                StatusCode::BAD_REQUEST,
                ErrorCode::MultifileUploadNotAllowed,
                "Only one file can be uploaded at a time",
            ));
        }

        original_name = sanitize_file_name(
            content_disposition
                .and_then(|cd| cd.get_filename())
                .unwrap_or_default(),
        );

        // 扩展名白名单
        extension = extension_of(&original_name).unwrap_or_default();
        if extension.is_empty()
            || !config
                .upload
                .allowed_types
                .iter()
                .any(|t| t.eq_ignore_ascii_case(&extension))
        {
            return Ok(upload_error(
                StatusCode::BAD_REQUEST,
                ErrorCode::FileTypeNotAllowed,
                "File type not allowed",
            ));
        }

        stored_name = format!("{}{}", Uuid::new_v4(), extension);
        let file_path = stored_path(&stored_name);
        let mut f = match File::create(&file_path) {
            Ok(file) => file,
            Err(e) => {
                tracing::error!("{}", LmsError::file_operation(format!("{e}")));
                return Ok(upload_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::FileUploadFailed,
                    "Failed to create file",
                ));
            }
        };
        // 此后任何提前返回（包括读流出错）都会删除该文件
        pending = Some(PendingFile::new(file_path));

        let mut total_size: usize = 0;
        let mut first_chunk = true;
        while let Some(chunk) = field.next().await {
            let data = chunk?;
            if data.is_empty() {
                continue;
            }

            // 第一个数据块校验魔术字节
            if first_chunk {
                first_chunk = false;
                if !validate_magic_bytes(&data, &extension) {
                    return Ok(upload_error(
                        StatusCode::BAD_REQUEST,
                        ErrorCode::FileTypeNotAllowed,
                        "File content does not match its extension",
                    ));
                }
            }

            total_size += data.len();
            if total_size > max_size {
                return Ok(upload_error(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    ErrorCode::FileSizeExceeded,
                    "File size exceeds the limit",
                ));
            }

            if let Err(e) = f.write_all(&data) {
                tracing::error!("{}", LmsError::file_operation(format!("{e}")));
                return Ok(upload_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::FileUploadFailed,
                    "Failed to write file",
                ));
            }
        }

        if total_size == 0 {
            return Ok(upload_error(
                StatusCode::BAD_REQUEST,
                ErrorCode::FileEmpty,
                "Uploaded file is empty",
            ));
        }
        file_size = total_size as i64;
    }

    let Some(pending) = pending else {
        return Ok(upload_error(
            StatusCode::BAD_REQUEST,
            ErrorCode::FileNotFound,
            "No file found in upload payload",
        ));
    };

    let storage = service.get_storage(req);

    let new_file = NewFile {
        stored_name,
        original_name,
        file_size,
        mime_type: mime_type_for(&extension).to_string(),
        extension,
        uploaded_by: user.id,
        uploader_role: user.role.to_string(),
        is_public,
        expires_at: expires_in_days.map(|days| chrono::Utc::now() + chrono::Duration::days(days)),
    };

    match storage.create_file(new_file).await {
        Ok(file) => {
            pending.commit();
            tracing::info!(
                "User {} uploaded file {} ({} bytes)",
                user.id,
                file.id,
                file.file_size
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                FileUploadResponse { file },
                "File uploaded successfully",
            )))
        }
        Err(e) => Ok(storage_failure(
            e,
            ErrorCode::FileUploadFailed,
            "Failed to save file record",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\a\\hw.docx"), "hw.docx");
        assert_eq!(sanitize_file_name("bad\"name\n.txt"), "badname.txt");
        assert_eq!(sanitize_file_name(""), "file");
    }

    #[test]
    fn test_parse_expires_in_days() {
        assert_eq!(parse_expires_in_days(""), Ok(None));
        assert_eq!(parse_expires_in_days(" 7 "), Ok(Some(7)));
        assert_eq!(parse_expires_in_days("365"), Ok(Some(365)));
        assert!(parse_expires_in_days("0").is_err());
        assert!(parse_expires_in_days("-3").is_err());
        assert!(parse_expires_in_days("366").is_err());
        assert!(parse_expires_in_days("soon").is_err());
    }

    fn scratch_file(tag: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("lms-{tag}-{}.pdf", Uuid::new_v4()));
        fs::write(&path, b"%PDF-1.4 partial").expect("scratch file");
        path
    }

    #[test]
    fn test_pending_file_removed_unless_committed() {
        let dropped = scratch_file("dropped");
        {
            let _pending = PendingFile::new(dropped.clone());
        }
        assert!(!dropped.exists());

        // 提前返回路径上同样会删除
        let aborted = scratch_file("aborted");
        let early_return = || -> Result<(), &'static str> {
            let _pending = PendingFile::new(aborted.clone());
            Err("stream interrupted")
        };
        assert!(early_return().is_err());
        assert!(!aborted.exists());

        let kept = scratch_file("kept");
        PendingFile::new(kept.clone()).commit();
        assert!(kept.exists());
        fs::remove_file(&kept).expect("cleanup");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("ON"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}
