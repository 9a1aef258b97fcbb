//! FolderGrid 命令模块
//!
//! 解析外壳输入的命令行并分发到各命令

pub mod folders;
pub mod images;
pub mod selection;
pub mod settings;

use foldergrid_core::{AppError, CommandError, FolderWithCount, GalleryController, Image, ViewMode};
use serde::Serialize;
use serde_json::Value;

use crate::AppState;

pub const HELP: &str = "\
命令:
  folders | ls          显示文件夹列表
  open <序号>           打开文件夹
  back                  返回文件夹列表
  refresh               重新加载当前列表
  mkdir <名称>          新建文件夹
  add <路径>            添加图片（文件夹列表中需再 choose）
  choose <文件夹ID>     为待添加的图片选择文件夹
  press <序号>          长按：进入多选
  tap <序号>            点按：打开或切换选择
  cancel                退出多选
  delete                删除已选项
  preview <序号>        生成图片预览
  stats                 数据库统计
  settings [reset]      查看或重置设置
  quit                  退出";

/// 外壳命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Folders,
    Open(usize),
    Back,
    Refresh,
    Mkdir(String),
    Add(String),
    Choose(i64),
    Press(usize),
    Tap(usize),
    Cancel,
    Delete,
    Preview(usize),
    Stats,
    Settings,
    ResetSettings,
}

/// 当前视图快照
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ViewSnapshot {
    Folders {
        title: String,
        folders: Vec<FolderWithCount>,
    },
    Images {
        title: String,
        folder_id: i64,
        images: Vec<Image>,
    },
}

impl ViewSnapshot {
    pub fn capture(controller: &GalleryController) -> Self {
        match controller.mode() {
            ViewMode::FolderList => ViewSnapshot::Folders {
                title: controller.title(),
                folders: controller.folders().to_vec(),
            },
            ViewMode::ImageList { folder_id } => ViewSnapshot::Images {
                title: controller.title(),
                folder_id,
                images: controller.images().to_vec(),
            },
        }
    }
}

fn usage(message: impl Into<String>) -> CommandError {
    CommandError {
        code: "E_USAGE".to_string(),
        message: message.into(),
    }
}

fn parse_arg<T: std::str::FromStr>(arg: &str, hint: &str) -> Result<T, CommandError> {
    arg.parse().map_err(|_| usage(format!("用法: {}", hint)))
}

/// 解析一行输入；空行和 `#` 注释返回 `None`
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb {
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "folders" | "ls" => Command::Folders,
        "open" => Command::Open(parse_arg(rest, "open <序号>")?),
        "back" => Command::Back,
        "refresh" => Command::Refresh,
        "mkdir" => Command::Mkdir(rest.to_string()),
        "add" if rest.is_empty() => return Err(usage("用法: add <路径>")),
        "add" => Command::Add(rest.to_string()),
        "choose" => Command::Choose(parse_arg(rest, "choose <文件夹ID>")?),
        "press" => Command::Press(parse_arg(rest, "press <序号>")?),
        "tap" => Command::Tap(parse_arg(rest, "tap <序号>")?),
        "cancel" => Command::Cancel,
        "delete" => Command::Delete,
        "preview" => Command::Preview(parse_arg(rest, "preview <序号>")?),
        "stats" => Command::Stats,
        "settings" => match rest {
            "" => Command::Settings,
            "reset" => Command::ResetSettings,
            _ => return Err(usage("用法: settings [reset]")),
        },
        other => return Err(usage(format!("未知命令: {}（输入 help 查看帮助）", other))),
    };

    Ok(Some(command))
}

fn to_json<T: Serialize>(value: T) -> Result<Value, CommandError> {
    serde_json::to_value(value)
        .map_err(|e| AppError::General(format!("无法序列化结果: {}", e)).into())
}

/// 输出文本：纯文本结果（如帮助）原样输出，其余为格式化 JSON
pub fn render(output: &Value) -> String {
    match output {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|e| format!("error: {}", e)),
    }
}

/// 执行命令，结果以 JSON 返回
pub async fn dispatch(state: &mut AppState, command: Command) -> Result<Value, CommandError> {
    match command {
        Command::Help => Ok(Value::String(HELP.to_string())),
        Command::Quit => Ok(Value::Null),
        Command::Folders => to_json(folders::list_folders(state).await?),
        Command::Open(index) => to_json(folders::open_folder(state, index).await?),
        Command::Back => to_json(folders::go_back(state).await?),
        Command::Refresh => to_json(folders::refresh(state).await?),
        Command::Mkdir(name) => to_json(folders::create_folder(state, &name).await?),
        Command::Stats => to_json(folders::get_stats(state).await?),
        Command::Add(locator) => to_json(images::add_image(state, locator).await?),
        Command::Choose(folder_id) => to_json(images::choose_folder(state, folder_id).await?),
        Command::Preview(index) => to_json(images::get_preview(state, index).await?),
        Command::Press(index) => to_json(selection::long_press(state, index)),
        Command::Tap(index) => to_json(selection::tap(state, index).await?),
        Command::Cancel => to_json(selection::cancel_selection(state)),
        Command::Delete => to_json(selection::delete_selected(state).await?),
        Command::Settings => to_json(settings::get_settings(state)?),
        Command::ResetSettings => to_json(settings::reset_settings(state)?),
    }
}
