//! 文件夹数据访问层

use rusqlite::{params, params_from_iter, OptionalExtension, Row};

use crate::models::{Folder, FolderWithCount};
use crate::utils::error::AppResult;

use super::connection::Database;

/// 从数据库行映射到 Folder 结构
fn row_to_folder(row: &Row<'_>) -> rusqlite::Result<Folder> {
    Ok(Folder {
        id: row.get("id")?,
        name: row.get("name")?,
        created_at: row.get("timestamp")?,
    })
}

/// 生成 `?, ?, ?` 形式的占位符
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

impl Database {
    // ==================== Folder CRUD ====================

    /// 获取所有文件夹（最新创建的在前）
    pub fn list_folders(&self) -> AppResult<Vec<Folder>> {
        let conn = self.connection()?;

        let mut stmt = conn.prepare("SELECT * FROM folders ORDER BY id DESC")?;
        let folders = stmt
            .query_map([], row_to_folder)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(folders)
    }

    /// 获取所有文件夹（带图片数量）
    pub fn list_folders_with_count(&self) -> AppResult<Vec<FolderWithCount>> {
        let conn = self.connection()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT f.*, COUNT(i.id) AS image_count
            FROM folders f
            LEFT JOIN images i ON i.folderId = f.id
            GROUP BY f.id
            ORDER BY f.id DESC
            "#,
        )?;

        let folders = stmt
            .query_map([], |row| {
                Ok(FolderWithCount {
                    folder: row_to_folder(row)?,
                    image_count: row.get("image_count")?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(folders)
    }

    /// 创建文件夹，返回新文件夹ID
    ///
    /// 不检查重名；重名检查由调用方先行完成
    pub fn insert_folder(&self, name: &str) -> AppResult<i64> {
        let conn = self.connection()?;

        conn.execute(
            "INSERT INTO folders (name, timestamp) VALUES (?1, ?2)",
            params![name, crate::models::now_millis()],
        )?;

        let id = conn.last_insert_rowid();
        tracing::debug!("创建文件夹: {} (id={})", name, id);
        Ok(id)
    }

    /// 批量删除文件夹（级联删除其中的图片）
    ///
    /// 不存在的ID忽略，返回实际删除的文件夹数
    pub fn delete_folders(&self, ids: &[i64]) -> AppResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        self.transaction(|conn| {
            let sql = format!(
                "DELETE FROM folders WHERE id IN ({})",
                placeholders(ids.len())
            );
            let rows = conn.execute(&sql, params_from_iter(ids.iter()))?;
            Ok(rows)
        })
    }

    /// 统计文件夹中的图片数量
    pub fn count_images(&self, folder_id: i64) -> AppResult<i64> {
        let conn = self.connection()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM images WHERE folderId = ?1",
            params![folder_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 根据名称查找文件夹（精确匹配）
    pub fn find_folder_by_name(&self, name: &str) -> AppResult<Option<Folder>> {
        let conn = self.connection()?;

        let folder = conn
            .query_row(
                "SELECT * FROM folders WHERE name = ?1 LIMIT 1",
                params![name],
                row_to_folder,
            )
            .optional()?;

        Ok(folder)
    }

    /// 根据 ID 查找文件夹
    pub fn find_folder_by_id(&self, folder_id: i64) -> AppResult<Option<Folder>> {
        let conn = self.connection()?;

        let folder = conn
            .query_row(
                "SELECT * FROM folders WHERE id = ?1 LIMIT 1",
                params![folder_id],
                row_to_folder,
            )
            .optional()?;

        Ok(folder)
    }
}
