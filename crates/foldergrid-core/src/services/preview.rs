//! 预览图渲染服务
//!
//! 解码图片并生成缓存缩略图；完成结果以 future 返回而不是回调

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use serde::Serialize;
use thiserror::Error;

use crate::models::{Image, PreviewSettings};
use crate::services::importer::ResourceImporter;
use crate::utils::error::{AppError, AppResult};

/// 显示选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// 淡入效果
    pub crossfade: bool,
    /// 加载中显示占位图
    pub placeholder_on_pending: bool,
    /// 加载失败显示占位图
    pub placeholder_on_error: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            crossfade: true,
            placeholder_on_pending: true,
            placeholder_on_error: true,
        }
    }
}

impl From<&PreviewSettings> for RenderOptions {
    fn from(settings: &PreviewSettings) -> Self {
        Self {
            crossfade: settings.crossfade,
            placeholder_on_pending: settings.placeholder_on_pending,
            placeholder_on_error: settings.placeholder_on_error,
        }
    }
}

/// 渲染失败原因
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "locator", rename_all = "camelCase")]
pub enum RenderError {
    /// 无权访问定位符
    #[error("无权访问: {0}")]
    PermissionDenied(String),

    /// 资源不存在
    #[error("资源不存在: {0}")]
    NotFound(String),

    /// 解码或编码失败
    #[error("解码失败: {0}")]
    Decode(String),
}

impl From<RenderError> for AppError {
    fn from(e: RenderError) -> Self {
        match e {
            RenderError::PermissionDenied(_) | RenderError::NotFound(_) => {
                AppError::ResourceAccess(e.to_string())
            }
            RenderError::Decode(msg) => AppError::General(format!("预览解码失败: {}", msg)),
        }
    }
}

/// 渲染结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Preview {
    /// 尚未完成，视图按选项决定是否显示占位图
    Pending { show_placeholder: bool },
    /// 缩略图已就绪
    Ready {
        path: PathBuf,
        width: u32,
        height: u32,
        crossfade: bool,
        hit_cache: bool,
    },
    /// 失败但按选项显示占位图
    Placeholder { cause: RenderError },
}

/// 预览图服务
#[derive(Debug, Clone)]
pub struct PreviewService {
    /// 缓存目录
    cache_dir: PathBuf,
    /// 最长边（像素）
    edge: u32,
}

impl PreviewService {
    /// 创建预览服务，确保缓存目录存在
    pub fn new(cache_dir: PathBuf, edge: u32) -> AppResult<Self> {
        if edge == 0 {
            return Err(AppError::Config("预览尺寸必须大于 0".to_string()));
        }
        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir)?;
            tracing::info!("创建预览缓存目录: {:?}", cache_dir);
        }
        Ok(Self { cache_dir, edge })
    }

    /// 获取缓存路径
    pub fn cache_path(&self, image_id: i64) -> PathBuf {
        self.cache_dir.join(format!("{}_{}.png", image_id, self.edge))
    }

    /// 渲染开始前视图应显示的状态
    pub fn pending(options: &RenderOptions) -> Preview {
        Preview::Pending {
            show_placeholder: options.placeholder_on_pending,
        }
    }

    /// 渲染预览图（阻塞）
    pub fn render_blocking(
        &self,
        image: &Image,
        options: &RenderOptions,
    ) -> Result<Preview, RenderError> {
        match self.generate(image, options) {
            Ok(preview) => Ok(preview),
            Err(cause) => {
                tracing::warn!("预览渲染失败 (id={}): {}", image.id, cause);
                if options.placeholder_on_error {
                    Ok(Preview::Placeholder { cause })
                } else {
                    Err(cause)
                }
            }
        }
    }

    /// 渲染预览图（在阻塞线程池执行）
    pub async fn render(
        &self,
        image: Image,
        options: RenderOptions,
    ) -> Result<Preview, RenderError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.render_blocking(&image, &options))
            .await
            .unwrap_or_else(|e| Err(RenderError::Decode(format!("渲染任务失败: {}", e))))
    }

    /// 删除图片对应的缓存，返回删除数
    pub fn evict(&self, image_ids: &[i64]) -> usize {
        image_ids
            .iter()
            .filter(|id| fs::remove_file(self.cache_path(**id)).is_ok())
            .count()
    }

    fn generate(&self, image: &Image, options: &RenderOptions) -> Result<Preview, RenderError> {
        let cache_path = self.cache_path(image.id);

        if cache_path.exists() {
            let (width, height) = image::image_dimensions(&cache_path)
                .map_err(|e| RenderError::Decode(e.to_string()))?;
            tracing::debug!("预览缓存命中: {:?}", cache_path);
            return Ok(Preview::Ready {
                path: cache_path,
                width,
                height,
                crossfade: options.crossfade,
                hit_cache: true,
            });
        }

        let source = ResourceImporter::resolve_locator(&image.source_uri);
        let decoded = image::open(&source).map_err(|e| classify(&source, e))?;
        let thumb = decoded.resize(self.edge, self.edge, FilterType::Triangle);
        thumb
            .save(&cache_path)
            .map_err(|e| RenderError::Decode(e.to_string()))?;

        tracing::debug!("生成预览: {:?} -> {:?}", source, cache_path);

        Ok(Preview::Ready {
            path: cache_path,
            width: thumb.width(),
            height: thumb.height(),
            crossfade: options.crossfade,
            hit_cache: false,
        })
    }
}

fn classify(source: &Path, e: image::ImageError) -> RenderError {
    let locator = source.display().to_string();
    match e {
        image::ImageError::IoError(io) => match io.kind() {
            io::ErrorKind::NotFound => RenderError::NotFound(locator),
            io::ErrorKind::PermissionDenied => RenderError::PermissionDenied(locator),
            _ => RenderError::Decode(io.to_string()),
        },
        other => RenderError::Decode(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    fn image_record(id: i64, path: &Path) -> Image {
        Image {
            id,
            title: "t".to_string(),
            source_uri: path.display().to_string(),
            description: None,
            folder_id: Some(1),
            created_at: 0,
        }
    }

    fn write_png(path: &Path, w: u32, h: u32) {
        let buf: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(w, h, Rgb([200, 10, 10]));
        buf.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_render_and_cache() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.png");
        write_png(&source, 40, 20);

        let service = PreviewService::new(tmp.path().join("Previews"), 10).unwrap();
        let options = RenderOptions::default();

        let first = service
            .render(image_record(7, &source), options)
            .await
            .unwrap();
        match first {
            Preview::Ready {
                width,
                height,
                hit_cache,
                crossfade,
                ..
            } => {
                assert_eq!((width, height), (10, 5));
                assert!(!hit_cache);
                assert!(crossfade);
            }
            other => panic!("unexpected preview: {other:?}"),
        }

        let second = service
            .render(image_record(7, &source), options)
            .await
            .unwrap();
        assert!(matches!(second, Preview::Ready { hit_cache: true, .. }));

        assert_eq!(service.evict(&[7, 8]), 1);
        assert!(!service.cache_path(7).exists());
    }

    #[tokio::test]
    async fn test_missing_source_reports_not_found() {
        let tmp = TempDir::new().unwrap();
        let service = PreviewService::new(tmp.path().join("Previews"), 10).unwrap();
        let options = RenderOptions {
            placeholder_on_error: false,
            ..RenderOptions::default()
        };

        let result = service
            .render(image_record(1, &tmp.path().join("none.png")), options)
            .await;
        assert!(matches!(result, Err(RenderError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_corrupt_source_yields_placeholder() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("broken.png");
        fs::write(&source, b"not an image").unwrap();

        let service = PreviewService::new(tmp.path().join("Previews"), 10).unwrap();
        let preview = service
            .render(image_record(2, &source), RenderOptions::default())
            .await
            .unwrap();
        assert!(matches!(
            preview,
            Preview::Placeholder {
                cause: RenderError::Decode(_)
            }
        ));
    }

    #[test]
    fn test_pending_follows_options() {
        let options = RenderOptions {
            placeholder_on_pending: false,
            ..RenderOptions::default()
        };
        assert_eq!(
            PreviewService::pending(&options),
            Preview::Pending {
                show_placeholder: false
            }
        );
    }

    #[test]
    fn test_zero_edge_rejected() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            PreviewService::new(tmp.path().to_path_buf(), 0),
            Err(AppError::Config(_))
        ));
    }
}
