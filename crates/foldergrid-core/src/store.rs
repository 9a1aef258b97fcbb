//! Asynchronous facade over [`Database`].
//!
//! Each call runs on tokio's blocking pool so the caller (the controller
//! task that owns the view state) never blocks on SQLite. The database
//! connection mutex keeps the operations sequential: every call observes
//! the effects of all calls that completed before it.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::db::{Database, DatabaseStats};
use crate::models::{CreateImage, Folder, FolderWithCount, Image};
use crate::utils::error::{AppError, AppResult};

/// Shared store handle. Construct once at startup and inject by reference.
#[derive(Clone)]
pub struct GalleryStore {
    db: Arc<Database>,
}

impl GalleryStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Open an initialized in-memory store (for tests).
    pub fn in_memory() -> AppResult<Self> {
        let db = Database::open_in_memory()?;
        db.init()?;
        Ok(Self::new(Arc::new(db)))
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    async fn run<F, T>(&self, op: &'static str, f: F) -> AppResult<T>
    where
        F: FnOnce(&Database) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| AppError::General(format!("存储任务失败 ({}): {}", op, e)))?
    }

    pub async fn list_folders(&self) -> AppResult<Vec<Folder>> {
        self.run("list_folders", |db| db.list_folders()).await
    }

    pub async fn list_folders_with_count(&self) -> AppResult<Vec<FolderWithCount>> {
        self.run("list_folders_with_count", |db| db.list_folders_with_count())
            .await
    }

    pub async fn insert_folder(&self, name: &str) -> AppResult<i64> {
        let name = name.to_string();
        self.run("insert_folder", move |db| db.insert_folder(&name))
            .await
    }

    /// Delete folders (and, by cascade, their images). Missing ids are ignored.
    pub async fn delete_folders<I>(&self, ids: I) -> AppResult<usize>
    where
        I: IntoIterator<Item = i64>,
    {
        let ids = dedup(ids);
        self.run("delete_folders", move |db| db.delete_folders(&ids))
            .await
    }

    pub async fn count_images(&self, folder_id: i64) -> AppResult<i64> {
        self.run("count_images", move |db| db.count_images(folder_id))
            .await
    }

    pub async fn find_folder_by_name(&self, name: &str) -> AppResult<Option<Folder>> {
        let name = name.to_string();
        self.run("find_folder_by_name", move |db| db.find_folder_by_name(&name))
            .await
    }

    pub async fn find_folder_by_id(&self, folder_id: i64) -> AppResult<Option<Folder>> {
        self.run("find_folder_by_id", move |db| db.find_folder_by_id(folder_id))
            .await
    }

    pub async fn list_images(&self) -> AppResult<Vec<Image>> {
        self.run("list_images", |db| db.list_images()).await
    }

    pub async fn list_images_in_folder(&self, folder_id: i64) -> AppResult<Vec<Image>> {
        self.run("list_images_in_folder", move |db| {
            db.list_images_in_folder(folder_id)
        })
        .await
    }

    pub async fn find_image_by_id(&self, image_id: i64) -> AppResult<Option<Image>> {
        self.run("find_image_by_id", move |db| db.find_image_by_id(image_id))
            .await
    }

    pub async fn insert_image(&self, image: CreateImage) -> AppResult<i64> {
        self.run("insert_image", move |db| db.insert_image(&image))
            .await
    }

    /// Delete images by id. Missing ids are ignored.
    pub async fn delete_images<I>(&self, ids: I) -> AppResult<usize>
    where
        I: IntoIterator<Item = i64>,
    {
        let ids = dedup(ids);
        self.run("delete_images", move |db| db.delete_images(&ids))
            .await
    }

    pub async fn stats(&self) -> AppResult<DatabaseStats> {
        self.run("stats", |db| db.stats()).await
    }
}

fn dedup<I: IntoIterator<Item = i64>>(ids: I) -> Vec<i64> {
    ids.into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
