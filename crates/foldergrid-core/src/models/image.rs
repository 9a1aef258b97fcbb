//! 图片数据模型

use serde::{Deserialize, Serialize};

/// 图片记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// 图片ID
    pub id: i64,
    /// 标题
    pub title: String,
    /// 资源定位符（应用私有存储中的路径）
    pub source_uri: String,
    /// 描述
    pub description: Option<String>,
    /// 所属文件夹ID（旧版无文件夹数据为空）
    pub folder_id: Option<i64>,
    /// 添加时间（毫秒）
    pub created_at: i64,
}

/// 用于创建新图片的输入结构
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateImage {
    pub title: String,
    pub source_uri: String,
    pub description: Option<String>,
    pub folder_id: Option<i64>,
}

impl CreateImage {
    /// 创建归入指定文件夹的图片
    pub fn in_folder(
        title: impl Into<String>,
        source_uri: impl Into<String>,
        description: Option<String>,
        folder_id: i64,
    ) -> Self {
        Self {
            title: title.into(),
            source_uri: source_uri.into(),
            description,
            folder_id: Some(folder_id),
        }
    }
}
