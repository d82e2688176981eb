/// 验证文件内容的魔术字节是否与扩展名匹配
///
/// `data` 为文件开头的若干字节，`extension` 含点号（如 ".png"）。
/// 纯文本没有魔术字节，只要求不含 NUL 字节。
pub fn validate_magic_bytes(data: &[u8], extension: &str) -> bool {
    if data.is_empty() {
        return false;
    }

    match extension.to_lowercase().as_str() {
        ".png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
        ".jpg" | ".jpeg" => data.starts_with(&[0xFF, 0xD8, 0xFF]),
        ".pdf" => data.starts_with(b"%PDF"),
        // OLE 复合文档
        ".doc" => data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]),
        // docx 本质是 zip
        ".docx" | ".zip" => {
            data.starts_with(&[0x50, 0x4B, 0x03, 0x04]) || data.starts_with(&[0x50, 0x4B, 0x05, 0x06])
        }
        ".txt" => !data.contains(&0),
        _ => false,
    }
}

/// 根据扩展名推断 MIME 类型
pub fn mime_type_for(extension: &str) -> &'static str {
    match extension.to_lowercase().as_str() {
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".pdf" => "application/pdf",
        ".doc" => "application/msword",
        ".docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".zip" => "application/zip",
        ".txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// 取出小写扩展名（含点号），没有扩展名时返回 None
pub fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(format!(".{}", ext.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_magic() {
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert!(validate_magic_bytes(&png_header, ".png"));
        assert!(validate_magic_bytes(&png_header, ".PNG"));
        assert!(!validate_magic_bytes(&png_header, ".jpg"));
    }

    #[test]
    fn test_office_formats() {
        let ole = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0x00];
        assert!(validate_magic_bytes(&ole, ".doc"));
        assert!(!validate_magic_bytes(&ole, ".docx"));

        let zip = [0x50, 0x4B, 0x03, 0x04, 0x14];
        assert!(validate_magic_bytes(&zip, ".docx"));
        assert!(validate_magic_bytes(&zip, ".zip"));
    }

    #[test]
    fn test_pdf_disguised_as_image() {
        assert!(validate_magic_bytes(b"%PDF-1.7", ".pdf"));
        assert!(!validate_magic_bytes(b"%PDF-1.7", ".jpeg"));
    }

    #[test]
    fn test_text_files() {
        assert!(validate_magic_bytes(b"Hello, World!", ".txt"));
        assert!(!validate_magic_bytes(&[0x48, 0x00, 0x49], ".txt"));
    }

    #[test]
    fn test_empty_and_unknown() {
        assert!(!validate_magic_bytes(&[], ".pdf"));
        assert!(!validate_magic_bytes(&[0x4D, 0x5A], ".exe"));
    }

    #[test]
    fn test_extension_and_mime() {
        assert_eq!(extension_of("Essay.Final.PDF"), Some(".pdf".to_string()));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of(".bashrc"), None);
        assert_eq!(mime_type_for(".jpeg"), "image/jpeg");
        assert_eq!(mime_type_for(".bin"), "application/octet-stream");
    }
}
