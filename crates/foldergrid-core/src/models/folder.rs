//! 文件夹数据模型

use serde::{Deserialize, Serialize};

/// 文件夹
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// 文件夹ID（由数据库自增分配）
    pub id: i64,
    /// 文件夹名称
    pub name: String,
    /// 创建时间（毫秒）
    pub created_at: i64,
}

impl Folder {
    /// 创建新文件夹（用于插入前）
    pub fn new(name: String) -> Self {
        Self {
            id: 0,
            name,
            created_at: crate::models::now_millis(),
        }
    }
}

/// 带图片数量的文件夹（文件夹网格中的一行）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderWithCount {
    #[serde(flatten)]
    pub folder: Folder,
    /// 图片数量
    pub image_count: i64,
}
