//! FolderGrid 错误处理模块
//!
//! 定义应用程序错误类型

use serde::Serialize;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 数据库错误（读写、删除、约束失败）
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 图像处理错误
    #[error("图像处理错误: {0}")]
    Image(#[from] image::ImageError),

    /// 选取的资源不可访问（文件不存在或权限被撤销）
    #[error("资源不可访问: {0}")]
    ResourceAccess(String),

    /// 文件夹名称重复
    #[error("文件夹已存在: {0}")]
    DuplicateName(String),

    /// 文件夹名称无效
    #[error("文件夹名称无效: {0:?}")]
    InvalidName(String),

    /// 尚未创建任何文件夹
    #[error("请先创建文件夹")]
    NoFolders,

    /// 文件夹不存在
    #[error("文件夹不存在: {0}")]
    FolderNotFound(i64),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 通用错误
    #[error("{0}")]
    General(String),
}

impl AppError {
    /// 稳定的错误码，供前端区分处理
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "E_DB_ERROR",
            AppError::Io(_) => "E_IO_ERROR",
            AppError::Image(_) => "E_IMAGE_ERROR",
            AppError::ResourceAccess(_) => "E_RESOURCE_ACCESS",
            AppError::DuplicateName(_) => "E_DUPLICATE_NAME",
            AppError::InvalidName(_) => "E_INVALID_NAME",
            AppError::NoFolders => "E_NO_FOLDERS",
            AppError::FolderNotFound(_) => "E_FOLDER_NOT_FOUND",
            AppError::Config(_) => "E_CONFIG",
            AppError::General(_) => "E_GENERAL",
        }
    }
}

/// 命令返回给前端的错误包装
#[derive(Debug, Clone, Serialize)]
pub struct CommandError {
    pub code: String,
    pub message: String,
}

impl From<AppError> for CommandError {
    fn from(err: AppError) -> Self {
        CommandError {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// 应用程序结果类型别名
pub type AppResult<T> = Result<T, AppError>;
