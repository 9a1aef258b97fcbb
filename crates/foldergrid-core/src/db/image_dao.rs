//! 图片数据访问层

use rusqlite::{params, params_from_iter, OptionalExtension, Row};

use crate::models::{CreateImage, Image};
use crate::utils::error::AppResult;

use super::connection::Database;
use super::folder_dao::placeholders;

/// 从数据库行映射到 Image 结构
fn row_to_image(row: &Row<'_>) -> rusqlite::Result<Image> {
    Ok(Image {
        id: row.get("id")?,
        title: row.get("title")?,
        source_uri: row.get("imageUri")?,
        description: row.get("description")?,
        folder_id: row.get("folderId")?,
        created_at: row.get("timestamp")?,
    })
}

impl Database {
    // ==================== Image CRUD ====================

    /// 获取所有图片（最新添加的在前）
    pub fn list_images(&self) -> AppResult<Vec<Image>> {
        let conn = self.connection()?;

        let mut stmt = conn.prepare("SELECT * FROM images ORDER BY id DESC")?;
        let images = stmt
            .query_map([], row_to_image)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(images)
    }

    /// 获取文件夹中的图片（最新添加的在前）
    pub fn list_images_in_folder(&self, folder_id: i64) -> AppResult<Vec<Image>> {
        let conn = self.connection()?;

        let mut stmt =
            conn.prepare("SELECT * FROM images WHERE folderId = ?1 ORDER BY id DESC")?;
        let images = stmt
            .query_map(params![folder_id], row_to_image)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(images)
    }

    /// 根据 ID 获取图片
    pub fn find_image_by_id(&self, image_id: i64) -> AppResult<Option<Image>> {
        let conn = self.connection()?;

        let image = conn
            .query_row(
                "SELECT * FROM images WHERE id = ?1",
                params![image_id],
                row_to_image,
            )
            .optional()?;

        Ok(image)
    }

    /// 添加图片，返回新图片ID
    ///
    /// folder_id 指向不存在的文件夹时由外键约束拒绝
    pub fn insert_image(&self, image: &CreateImage) -> AppResult<i64> {
        let conn = self.connection()?;

        conn.execute(
            "INSERT INTO images (title, imageUri, description, folderId, timestamp) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                image.title,
                image.source_uri,
                image.description,
                image.folder_id,
                crate::models::now_millis()
            ],
        )?;

        let id = conn.last_insert_rowid();
        tracing::debug!("添加图片: {} (id={}, folder={:?})", image.source_uri, id, image.folder_id);
        Ok(id)
    }

    /// 批量删除图片，不存在的ID忽略，返回实际删除数
    pub fn delete_images(&self, ids: &[i64]) -> AppResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        self.transaction(|conn| {
            let sql = format!(
                "DELETE FROM images WHERE id IN ({})",
                placeholders(ids.len())
            );
            let rows = conn.execute(&sql, params_from_iter(ids.iter()))?;
            Ok(rows)
        })
    }
}
