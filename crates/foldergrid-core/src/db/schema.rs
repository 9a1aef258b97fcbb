//! 数据库 Schema 定义
//!
//! 包含所有表的 CREATE 语句和迁移脚本

/// 数据库版本
pub const SCHEMA_VERSION: i32 = 2;

/// 初始化 Schema SQL
pub const INIT_SCHEMA: &str = r#"
-- 文件夹表
CREATE TABLE IF NOT EXISTS folders (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    timestamp       INTEGER NOT NULL
);

-- 图片表
CREATE TABLE IF NOT EXISTS images (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    title           TEXT NOT NULL,
    imageUri        TEXT NOT NULL,
    description     TEXT,
    folderId        INTEGER REFERENCES folders(id) ON DELETE CASCADE,
    timestamp       INTEGER NOT NULL
);

-- 数据库版本表
CREATE TABLE IF NOT EXISTS schema_version (
    version         INTEGER PRIMARY KEY,
    applied_at      INTEGER NOT NULL
);

-- 索引
CREATE INDEX IF NOT EXISTS idx_images_folderId ON images(folderId);
CREATE INDEX IF NOT EXISTS idx_folders_name ON folders(name);
"#;

/// 迁移脚本
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// 所有迁移脚本列表
///
/// v1 是没有文件夹的扁平图片表
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 2,
    description: "Add folders table and images.folderId with cascading delete",
    sql: r#"
        CREATE TABLE IF NOT EXISTS folders (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT NOT NULL,
            timestamp       INTEGER NOT NULL
        );
        ALTER TABLE images ADD COLUMN folderId INTEGER REFERENCES folders(id) ON DELETE CASCADE;
        CREATE INDEX IF NOT EXISTS idx_images_folderId ON images(folderId);
        CREATE INDEX IF NOT EXISTS idx_folders_name ON folders(name);
    "#,
}];

/// v1 扁平 Schema（仅用于迁移测试）
#[cfg(test)]
pub const V1_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS images (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    title           TEXT NOT NULL,
    imageUri        TEXT NOT NULL,
    description     TEXT,
    timestamp       INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS schema_version (
    version         INTEGER PRIMARY KEY,
    applied_at      INTEGER NOT NULL
);

INSERT INTO schema_version (version, applied_at) VALUES (1, 0);
"#;
