//! 资源导入服务
//!
//! 将选取器返回的资源复制到应用私有存储，再以私有路径入库

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use xxhash_rust::xxh3::xxh3_64;

use crate::utils::error::{AppError, AppResult};
use crate::utils::sanitize::sanitize_extension;

/// 导入结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedResource {
    /// 入库用的资源定位符（私有副本路径）
    pub locator: String,
    /// 文件大小（字节）
    pub size: u64,
}

/// 资源导入服务
#[derive(Debug, Clone)]
pub struct ResourceImporter {
    /// 私有存储目录
    images_dir: PathBuf,
}

impl ResourceImporter {
    /// 创建导入服务，确保私有目录存在
    pub fn new(images_dir: PathBuf) -> AppResult<Self> {
        if !images_dir.exists() {
            fs::create_dir_all(&images_dir)?;
            tracing::info!("创建图片私有存储目录: {:?}", images_dir);
        }
        Ok(Self { images_dir })
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// 将定位符解析为本地路径（接受 file:// 前缀）
    pub fn resolve_locator(locator: &str) -> PathBuf {
        PathBuf::from(locator.strip_prefix("file://").unwrap_or(locator))
    }

    /// 定位符是否指向本服务管理的私有副本
    pub fn owns(&self, locator: &str) -> bool {
        Self::resolve_locator(locator).starts_with(&self.images_dir)
    }

    /// 复制资源到私有存储（阻塞）
    ///
    /// 文件名为 `image_<毫秒>_<xxh3>.<扩展名>`，同一毫秒内导入不同内容不会冲突
    pub fn import_blocking(&self, locator: &str) -> AppResult<ImportedResource> {
        let source = Self::resolve_locator(locator);
        let bytes = fs::read(&source).map_err(|e| access_error(locator, e))?;

        let stem = format!("image_{}_{:016x}", crate::models::now_millis(), xxh3_64(&bytes));
        let ext = sanitize_extension(locator);
        let dest = self.write_unique(&stem, &ext, &bytes)?;

        tracing::debug!("图片已复制到: {:?}", dest);

        Ok(ImportedResource {
            locator: dest.to_string_lossy().into_owned(),
            size: bytes.len() as u64,
        })
    }

    /// 写入新文件；同名已存在时追加序号，每条记录拥有独立副本
    fn write_unique(&self, stem: &str, ext: &str, bytes: &[u8]) -> AppResult<PathBuf> {
        let mut attempt = 0u32;
        loop {
            let file_name = match attempt {
                0 => format!("{}.{}", stem, ext),
                n => format!("{}_{}.{}", stem, n, ext),
            };
            let dest = self.images_dir.join(file_name);
            match fs::OpenOptions::new().write(true).create_new(true).open(&dest) {
                Ok(file) => {
                    fill_new_file(&dest, file, bytes)?;
                    return Ok(dest);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// 复制资源到私有存储（在阻塞线程池执行）
    pub async fn import(&self, locator: &str) -> AppResult<ImportedResource> {
        let importer = self.clone();
        let locator = locator.to_string();
        tokio::task::spawn_blocking(move || importer.import_blocking(&locator))
            .await
            .map_err(|e| AppError::General(format!("导入任务失败: {}", e)))?
    }

    /// 删除私有副本，忽略不属于私有存储的定位符
    ///
    /// 尽力而为：失败只记录日志，返回实际删除数
    pub async fn remove_copies(&self, locators: Vec<String>) -> usize {
        let importer = self.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut removed = 0;
            for locator in locators.iter().filter(|l| importer.owns(l)) {
                match fs::remove_file(Self::resolve_locator(locator)) {
                    Ok(()) => removed += 1,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => tracing::warn!("无法删除私有副本 {}: {}", locator, e),
                }
            }
            removed
        })
        .await;

        result.unwrap_or_else(|e| {
            tracing::warn!("清理私有副本任务失败: {}", e);
            0
        })
    }
}

/// 写入刚创建的文件；写入失败时删除残缺文件
fn fill_new_file<W: Write>(dest: &Path, mut file: W, bytes: &[u8]) -> io::Result<()> {
    if let Err(e) = file.write_all(bytes) {
        drop(file);
        if let Err(rm) = fs::remove_file(dest) {
            tracing::warn!("无法删除残缺副本 {:?}: {}", dest, rm);
        }
        return Err(e);
    }
    Ok(())
}

/// 区分"资源不可访问"与一般 IO 错误
fn access_error(locator: &str, e: io::Error) -> AppError {
    match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
            AppError::ResourceAccess(format!("{}: {}", locator, e))
        }
        _ => AppError::Io(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ResourceImporter) {
        let tmp = TempDir::new().unwrap();
        let importer = ResourceImporter::new(tmp.path().join("Images")).unwrap();
        (tmp, importer)
    }

    #[tokio::test]
    async fn test_import_copies_into_private_dir() {
        let (tmp, importer) = setup();
        let source = tmp.path().join("picked.PNG");
        fs::write(&source, b"fake image bytes").unwrap();

        let imported = importer
            .import(&format!("file://{}", source.display()))
            .await
            .unwrap();

        assert!(importer.owns(&imported.locator));
        assert!(imported.locator.ends_with(".png"));
        assert_eq!(imported.size, 16);
        assert_eq!(fs::read(&imported.locator).unwrap(), b"fake image bytes");
        // 原文件保持不变
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_import_missing_source_is_resource_access_error() {
        let (tmp, importer) = setup();
        let missing = tmp.path().join("gone.jpg");

        let result = importer.import(&missing.display().to_string()).await;
        assert!(matches!(result, Err(AppError::ResourceAccess(_))));
        assert_eq!(fs::read_dir(importer.images_dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_same_content_gets_distinct_copies() {
        let (tmp, importer) = setup();
        let source = tmp.path().join("same.jpg");
        fs::write(&source, b"same").unwrap();
        let locator = source.display().to_string();

        let copies: Vec<String> = (0..3)
            .map(|_| importer.import_blocking(&locator).unwrap().locator)
            .collect();
        assert_ne!(copies[0], copies[1]);
        assert_ne!(copies[1], copies[2]);
        assert_ne!(copies[0], copies[2]);
    }

    #[test]
    fn test_failed_write_leaves_no_partial_copy() {
        let (_tmp, importer) = setup();
        let dest = importer.images_dir().join("image_1_0000000000000000.jpg");
        fs::write(&dest, b"").unwrap();

        // 只读句柄，写入必然失败
        let read_only = fs::File::open(&dest).unwrap();
        assert!(fill_new_file(&dest, read_only, b"payload").is_err());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_remove_copies_only_touches_private_files() {
        let (tmp, importer) = setup();
        let outside = tmp.path().join("outside.jpg");
        fs::write(&outside, b"x").unwrap();
        fs::write(tmp.path().join("a.jpg"), b"a").unwrap();

        let copy = importer
            .import(&tmp.path().join("a.jpg").display().to_string())
            .await
            .unwrap();

        let removed = importer
            .remove_copies(vec![
                copy.locator.clone(),
                outside.display().to_string(),
                copy.locator.clone(),
            ])
            .await;

        assert_eq!(removed, 1);
        assert!(!Path::new(&copy.locator).exists());
        assert!(outside.exists());
    }
}
