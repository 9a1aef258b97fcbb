//! 名称和文件名净化工具

use crate::utils::error::{AppError, AppResult};

/// 规范化用户输入的文件夹名称
///
/// 去掉首尾空白；空名称返回 `InvalidName`
pub fn normalize_folder_name(input: &str) -> AppResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidName(input.to_string()));
    }
    Ok(trimmed.to_string())
}

/// 从资源定位符中提取安全的扩展名，未知时使用 jpg
pub fn sanitize_extension(locator: &str) -> String {
    let name = locator.rsplit(['/', '\\']).next().unwrap_or(locator);
    let ext = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => return "jpg".to_string(),
    };

    let mut out = String::with_capacity(ext.len().min(8));
    for c in ext.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        }
        if out.len() >= 8 {
            break;
        }
    }
    if out.is_empty() {
        "jpg".to_string()
    } else {
        out
    }
}
