//! 应用程序设置数据模型

use serde::{Deserialize, Serialize};

/// 导入设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSettings {
    /// 新图片的默认标题
    pub default_title: String,
    /// 新图片的默认描述
    pub default_description: Option<String>,
    /// 是否先复制到应用私有存储再记录
    pub copy_to_private_storage: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            default_title: String::from("新图片"),
            default_description: Some(String::from("从相册添加的照片")),
            copy_to_private_storage: true,
        }
    }
}

/// 视图设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSettings {
    /// 文件夹网格列数
    pub folder_grid_columns: u32,
    /// 根路径标签（文件夹列表标题）
    pub root_label: String,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            folder_grid_columns: 2,
            root_label: String::from("/home"),
        }
    }
}

/// 预览设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSettings {
    /// 缩略图最长边（像素）
    pub edge: u32,
    /// 淡入效果
    pub crossfade: bool,
    /// 加载中显示占位图
    pub placeholder_on_pending: bool,
    /// 加载失败显示占位图
    pub placeholder_on_error: bool,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            edge: 300,
            crossfade: true,
            placeholder_on_pending: true,
            placeholder_on_error: true,
        }
    }
}

/// 应用程序设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// 导入设置
    pub import: ImportSettings,
    /// 视图设置
    pub view: ViewSettings,
    /// 预览设置
    pub preview: PreviewSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.view.folder_grid_columns, 2);
        assert!(settings.import.copy_to_private_storage);
        assert!(settings.preview.crossfade);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let json = r#"{"view":{"folderGridColumns":3,"rootLabel":"/"}}"#;
        let settings: AppSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.view.folder_grid_columns, 3);
        assert_eq!(settings.import, ImportSettings::default());
    }
}
