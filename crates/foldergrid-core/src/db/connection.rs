//! 数据库连接管理
//!
//! 提供 SQLite 数据库连接和初始化功能

use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::paths::PathProvider;
use crate::utils::error::{AppError, AppResult};

use super::schema::{INIT_SCHEMA, MIGRATIONS, SCHEMA_VERSION};

/// 数据库连接管理器
///
/// 所有操作经由同一个连接互斥锁串行执行，
/// 每个操作都能看到之前已完成操作的结果
#[derive(Clone)]
pub struct Database {
    /// 数据库连接（使用 Arc<Mutex> 实现线程安全）
    conn: Arc<Mutex<Connection>>,
    /// 数据库文件路径
    path: PathBuf,
}

impl Database {
    /// 打开或创建数据库
    pub fn open(path: PathBuf) -> AppResult<Self> {
        // 确保父目录存在
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        };

        db.configure()?;

        Ok(db)
    }

    /// 使用 PathProvider 打开数据库
    pub fn open_with_provider(provider: &dyn PathProvider) -> AppResult<Self> {
        Self::open(provider.database_path())
    }

    /// 打开内存数据库（用于测试）
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            path: PathBuf::from(":memory:"),
        };

        db.configure()?;

        Ok(db)
    }

    /// 配置数据库连接
    fn configure(&self) -> AppResult<()> {
        let conn = self.connection()?;

        // 级联删除依赖外键约束
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
            PRAGMA busy_timeout = 5000;
            "#,
        )?;

        Ok(())
    }

    /// 初始化数据库 Schema
    pub fn init(&self) -> AppResult<()> {
        let conn = self.connection()?;

        let table_exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
                [],
                |row| row.get(0),
            )
            .unwrap_or(false);

        if !table_exists {
            tracing::info!("初始化数据库 Schema...");

            conn.execute_batch(INIT_SCHEMA)?;

            conn.execute(
                "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![SCHEMA_VERSION, crate::models::now_millis()],
            )?;

            tracing::info!("数据库 Schema 初始化完成，版本: {}", SCHEMA_VERSION);
        } else {
            Self::migrate_internal(&conn)?;
        }

        Ok(())
    }

    /// 执行数据库迁移
    fn migrate_internal(conn: &Connection) -> AppResult<()> {
        let current_version: i32 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        tracing::info!("当前数据库版本: {}", current_version);

        for migration in MIGRATIONS {
            if migration.version > current_version {
                tracing::info!(
                    "执行迁移 v{}: {}",
                    migration.version,
                    migration.description
                );

                conn.execute_batch(migration.sql)?;

                conn.execute(
                    "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, crate::models::now_millis()],
                )?;

                tracing::info!("迁移 v{} 完成", migration.version);
            }
        }

        Ok(())
    }

    /// 获取数据库连接（用于执行查询）
    pub fn connection(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            AppError::Database(rusqlite::Error::InvalidParameterName(e.to_string()))
        })
    }

    /// 执行事务
    pub fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> AppResult<T>,
    {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    /// 获取数据库文件路径
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// 获取数据库统计信息
    pub fn stats(&self) -> AppResult<DatabaseStats> {
        let conn = self.connection()?;

        let folder_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM folders", [], |row| row.get(0))?;
        let image_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))?;

        let db_size = std::fs::metadata(&self.path)
            .map(|m| m.len() as i64)
            .unwrap_or(0);

        Ok(DatabaseStats {
            folder_count,
            image_count,
            db_size,
        })
    }
}

/// 数据库统计信息
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStats {
    pub folder_count: i64,
    pub image_count: i64,
    pub db_size: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::V1_SCHEMA;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        db.init().expect("Failed to initialize database");

        let stats = db.stats().expect("Failed to get stats");
        assert_eq!(stats.folder_count, 0);
        assert_eq!(stats.image_count, 0);
    }

    #[test]
    fn test_schema_creation() {
        let db = Database::open_in_memory().expect("Failed to open database");
        db.init().expect("Failed to initialize");

        let conn = db.connection().expect("Failed to get connection");

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"folders".to_string()));
        assert!(tables.contains(&"images".to_string()));
        assert!(tables.contains(&"schema_version".to_string()));

        let index_exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='index' AND name='idx_images_folderId'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(index_exists);
    }

    #[test]
    fn test_init_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.init().unwrap();
        db.init().unwrap();

        let conn = db.connection().unwrap();
        let version: i32 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_migrate_from_flat_schema() {
        let db = Database::open_in_memory().unwrap();
        {
            let conn = db.connection().unwrap();
            conn.execute_batch(V1_SCHEMA).unwrap();
            conn.execute(
                "INSERT INTO images (title, imageUri, description, timestamp) VALUES ('old', '/a.jpg', NULL, 1)",
                [],
            )
            .unwrap();
        }

        db.init().unwrap();

        let conn = db.connection().unwrap();
        let folder_id: Option<i64> = conn
            .query_row("SELECT folderId FROM images WHERE title = 'old'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(folder_id, None);

        let version: i32 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 2);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = Database::open_in_memory().unwrap();
        db.init().unwrap();

        let result: AppResult<()> = db.transaction(|conn| {
            conn.execute(
                "INSERT INTO folders (name, timestamp) VALUES ('tmp', 0)",
                [],
            )?;
            Err(AppError::General("abort".to_string()))
        });
        assert!(result.is_err());

        let stats = db.stats().unwrap();
        assert_eq!(stats.folder_count, 0);
    }
}
