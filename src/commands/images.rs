//! 图片命令
//!
//! 添加图片（含文件夹选择）与预览

use foldergrid_core::{AddImageOutcome, CommandError, Folder, Preview};
use serde::Serialize;

use crate::AppState;

/// 添加图片的结果
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum AddImageResponse {
    Added { image_id: i64, folder_id: i64 },
    /// 需要用 `choose <文件夹ID>` 选择目标文件夹
    ChooseFolder { folders: Vec<Folder> },
}

pub async fn add_image(state: &mut AppState, locator: String) -> Result<AddImageResponse, CommandError> {
    match state.controller.add_image(&locator).await? {
        AddImageOutcome::Added {
            image_id,
            folder_id,
        } => {
            state.pending_add = None;
            Ok(AddImageResponse::Added {
                image_id,
                folder_id,
            })
        }
        AddImageOutcome::ChooseFolder(folders) => {
            state.pending_add = Some(locator);
            Ok(AddImageResponse::ChooseFolder { folders })
        }
    }
}

/// 为待添加的图片选择文件夹
pub async fn choose_folder(state: &mut AppState, folder_id: i64) -> Result<AddImageResponse, CommandError> {
    let Some(locator) = state.pending_add.take() else {
        return Err(CommandError {
            code: "E_USAGE".to_string(),
            message: "没有待添加的图片，请先执行 add".to_string(),
        });
    };

    match state.controller.add_image_to_folder(&locator, folder_id).await {
        Ok(image_id) => Ok(AddImageResponse::Added {
            image_id,
            folder_id,
        }),
        Err(e) => {
            // 选错文件夹时保留待添加项，可以重新选择
            state.pending_add = Some(locator);
            Err(e.into())
        }
    }
}

pub async fn get_preview(state: &AppState, index: usize) -> Result<Preview, CommandError> {
    Ok(state.controller.preview(index).await?)
}
