//! 设置命令

use foldergrid_core::{AppSettings, CommandError};

use crate::AppState;

/// 获取当前设置
pub fn get_settings(state: &AppState) -> Result<AppSettings, CommandError> {
    Ok(state.core.settings_manager().load()?)
}

/// 重置设置（下次启动生效）
pub fn reset_settings(state: &AppState) -> Result<AppSettings, CommandError> {
    Ok(state.core.settings_manager().reset()?)
}
