use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::users::entities::User;

// 病毒扫描状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "file.ts")]
pub enum ScanStatus {
    Pending,
    Clean,
    Infected,
    Failed,
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanStatus::Pending => write!(f, "pending"),
            ScanStatus::Clean => write!(f, "clean"),
            ScanStatus::Infected => write!(f, "infected"),
            ScanStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for ScanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ScanStatus::Pending),
            "clean" => Ok(ScanStatus::Clean),
            "infected" => Ok(ScanStatus::Infected),
            "failed" => Ok(ScanStatus::Failed),
            _ => Err(format!("Invalid scan status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "file.ts")]
pub struct UploadedFile {
    pub id: i64,
    // 磁盘上的文件名（uuid + 扩展名）
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub stored_name: String,
    // 上传时的原始文件名
    pub original_name: String,
    // 文件大小（字节）
    pub file_size: i64,
    pub mime_type: String,
    // 扩展名（含点号）
    pub extension: String,
    pub uploaded_by: i64,
    pub uploader_role: String,
    pub is_public: bool,
    pub scan_status: ScanStatus,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl UploadedFile {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.uploaded_by == user_id
    }

    /// 公开文件对任何登录用户可见，否则仅上传者与管理员可见
    pub fn is_readable_by(&self, user: &User) -> bool {
        self.is_public || self.is_owned_by(user.id) || user.is_admin()
    }

    pub fn is_expired(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// 文件可以被作业/测验引用
    pub fn is_usable(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.is_active && !self.is_expired(now) && self.scan_status != ScanStatus::Infected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::{UserRole, UserStatus};
    use chrono::{Duration, Utc};

    fn file(owner: i64, is_public: bool) -> UploadedFile {
        UploadedFile {
            id: 7,
            stored_name: "abc.pdf".into(),
            original_name: "essay.pdf".into(),
            file_size: 10,
            mime_type: "application/pdf".into(),
            extension: ".pdf".into(),
            uploaded_by: owner,
            uploader_role: "student".into(),
            is_public,
            scan_status: ScanStatus::Pending,
            expires_at: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn user(id: i64, role: UserRole) -> User {
        let now = Utc::now();
        User {
            id,
            email: format!("u{id}@uni.edu"),
            password_hash: String::new(),
            full_name: "Someone".into(),
            role,
            status: UserStatus::Active,
            student_code: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_private_file_access() {
        let f = file(1, false);
        assert!(f.is_readable_by(&user(1, UserRole::Student)));
        assert!(f.is_readable_by(&user(99, UserRole::Admin)));
        assert!(!f.is_readable_by(&user(2, UserRole::Professor)));
    }

    #[test]
    fn test_public_file_access() {
        let f = file(1, true);
        assert!(f.is_readable_by(&user(2, UserRole::Student)));
    }

    #[test]
    fn test_expiry_and_usability() {
        let now = Utc::now();
        let mut f = file(1, false);
        assert!(f.is_usable(now));

        f.expires_at = Some(now - Duration::minutes(1));
        assert!(f.is_expired(now));
        assert!(!f.is_usable(now));

        f.expires_at = None;
        f.scan_status = ScanStatus::Infected;
        assert!(!f.is_usable(now));
    }
}
