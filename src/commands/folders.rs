//! 文件夹视图命令
//!
//! 文件夹列表、进入/返回、新建文件夹和统计

use foldergrid_core::{CommandError, DatabaseStats, Folder, FolderWithCount};

use super::ViewSnapshot;
use crate::AppState;

/// 进入文件夹列表（重新加载并统计图片数量）
pub async fn list_folders(state: &mut AppState) -> Result<Vec<FolderWithCount>, CommandError> {
    state.controller.show_folders().await?;
    Ok(state.controller.folders().to_vec())
}

/// 打开列表中指定位置的文件夹
pub async fn open_folder(state: &mut AppState, index: usize) -> Result<ViewSnapshot, CommandError> {
    state.controller.open_folder(index).await?;
    Ok(ViewSnapshot::capture(&state.controller))
}

pub async fn go_back(state: &mut AppState) -> Result<ViewSnapshot, CommandError> {
    state.controller.back().await?;
    Ok(ViewSnapshot::capture(&state.controller))
}

pub async fn refresh(state: &mut AppState) -> Result<ViewSnapshot, CommandError> {
    state.controller.refresh().await?;
    Ok(ViewSnapshot::capture(&state.controller))
}

/// 新建文件夹
pub async fn create_folder(state: &mut AppState, name: &str) -> Result<Folder, CommandError> {
    Ok(state.controller.create_folder(name).await?)
}

/// 获取数据库统计
pub async fn get_stats(state: &AppState) -> Result<DatabaseStats, CommandError> {
    Ok(state.core.store().stats().await?)
}
