//! FolderGrid 服务模块
//!
//! 包含导入、预览和设置服务

pub mod importer;
pub mod preview;
pub mod settings;

// 重新导出常用类型
pub use importer::{ImportedResource, ResourceImporter};
pub use preview::{Preview, PreviewService, RenderError, RenderOptions};
pub use settings::SettingsManager;
