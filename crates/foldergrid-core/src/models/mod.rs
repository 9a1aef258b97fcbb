//! FolderGrid 数据模型模块
//!
//! 包含所有数据结构定义

pub mod folder;
pub mod image;
pub mod settings;

// 重新导出常用类型
pub use folder::{Folder, FolderWithCount};
pub use image::{CreateImage, Image};
pub use settings::{AppSettings, ImportSettings, PreviewSettings, ViewSettings};

/// 当前时间（自 Unix 纪元起的毫秒数）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
