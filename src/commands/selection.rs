//! 多选命令

use foldergrid_core::{CommandError, Image, TapAction};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub selecting: bool,
    pub selected: Vec<usize>,
}

impl SelectionResponse {
    fn capture(state: &AppState) -> Self {
        Self {
            selecting: state.controller.is_selecting(),
            selected: state.controller.selected(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TapResponse {
    OpenedFolder { folder_id: i64, title: String },
    OpenedImage { image: Image },
    Toggled { selection: SelectionResponse },
    Ignored,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub removed: usize,
}

pub fn long_press(state: &mut AppState, index: usize) -> SelectionResponse {
    state.controller.long_press(index);
    SelectionResponse::capture(state)
}

pub async fn tap(state: &mut AppState, index: usize) -> Result<TapResponse, CommandError> {
    let response = match state.controller.tap(index).await? {
        TapAction::OpenedFolder(folder_id) => TapResponse::OpenedFolder {
            folder_id,
            title: state.controller.title(),
        },
        TapAction::OpenedImage(image) => TapResponse::OpenedImage { image },
        TapAction::Toggled => TapResponse::Toggled {
            selection: SelectionResponse::capture(state),
        },
        TapAction::Ignored => TapResponse::Ignored,
    };
    Ok(response)
}

pub fn cancel_selection(state: &mut AppState) -> SelectionResponse {
    state.controller.cancel_selection();
    SelectionResponse::capture(state)
}

/// 删除已选项（文件夹列表中会连带删除其中的图片）
pub async fn delete_selected(state: &mut AppState) -> Result<DeleteResponse, CommandError> {
    let removed = state.controller.delete_selected().await?;
    Ok(DeleteResponse { removed })
}
