//! Folder-scoped view controller.
//!
//! Owns the two displayed sequences (folder grid and image list) and the
//! current view mode. Gestures come in as method calls; persistence goes
//! through the injected [`GalleryStore`], and every visible change goes out
//! through the [`EventSink`](crate::events::EventSink).
//!
//! The in-memory sequence is only touched after the store call it depends on
//! has completed successfully. Failures are logged, surfaced as a `notice`
//! event and returned to the caller; none of them poison the controller.

use std::collections::HashMap;
use std::sync::Arc;

use crate::events::{
    EventSinkExt, ListChange, ListChangedPayload, ListKind, NoticeLevel, NoticePayload,
    SelectionPayload, SharedEventSink, ViewModePayload, EVENT_LIST_CHANGED, EVENT_NOTICE,
    EVENT_SELECTION_CHANGED, EVENT_VIEW_MODE_CHANGED,
};
use crate::models::{AppSettings, CreateImage, Folder, FolderWithCount, Image};
use crate::paths::PathProvider;
use crate::selection::{SelectionList, TapOutcome};
use crate::services::{Preview, PreviewService, RenderOptions, ResourceImporter};
use crate::store::GalleryStore;
use crate::utils::error::{AppError, AppResult};
use crate::utils::sanitize::normalize_folder_name;

/// Which collection is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    FolderList,
    ImageList { folder_id: i64 },
}

impl ViewMode {
    fn kind(self) -> ListKind {
        match self {
            ViewMode::FolderList => ListKind::Folders,
            ViewMode::ImageList { .. } => ListKind::Images,
        }
    }
}

/// Result of the add-image gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddImageOutcome {
    /// Recorded in `folder_id`.
    Added { image_id: i64, folder_id: i64 },
    /// No folder is open: the caller must pick one of these and call
    /// [`GalleryController::add_image_to_folder`].
    ChooseFolder(Vec<Folder>),
}

/// Result of a tap on a displayed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapAction {
    /// A folder was opened and its images are now displayed.
    OpenedFolder(i64),
    /// An image row was opened.
    OpenedImage(Image),
    /// Selection toggled while in multi-select mode.
    Toggled,
    /// Stale index.
    Ignored,
}

pub struct GalleryController {
    store: Arc<GalleryStore>,
    importer: ResourceImporter,
    previews: PreviewService,
    events: SharedEventSink,
    settings: AppSettings,
    mode: ViewMode,
    active_folder: Option<Folder>,
    folders: SelectionList<FolderWithCount>,
    images: SelectionList<Image>,
    counts: HashMap<i64, i64>,
}

impl GalleryController {
    pub fn new(
        store: Arc<GalleryStore>,
        importer: ResourceImporter,
        previews: PreviewService,
        events: SharedEventSink,
        settings: AppSettings,
    ) -> Self {
        Self {
            store,
            importer,
            previews,
            events,
            settings,
            mode: ViewMode::FolderList,
            active_folder: None,
            folders: SelectionList::new(),
            images: SelectionList::new(),
            counts: HashMap::new(),
        }
    }

    /// Build the file services from the app-private directories.
    pub fn with_provider(
        store: Arc<GalleryStore>,
        provider: &dyn PathProvider,
        events: SharedEventSink,
        settings: AppSettings,
    ) -> AppResult<Self> {
        let importer = ResourceImporter::new(provider.images_dir())?;
        let previews = PreviewService::new(provider.previews_dir(), settings.preview.edge)?;
        Ok(Self::new(store, importer, previews, events, settings))
    }

    // ==================== Read-only state ====================

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn active_folder(&self) -> Option<&Folder> {
        self.active_folder.as_ref()
    }

    pub fn folders(&self) -> &[FolderWithCount] {
        self.folders.items()
    }

    pub fn images(&self) -> &[Image] {
        self.images.items()
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Cached image count from the last folder-list load.
    pub fn cached_count(&self, folder_id: i64) -> Option<i64> {
        self.counts.get(&folder_id).copied()
    }

    pub fn is_selecting(&self) -> bool {
        match self.mode {
            ViewMode::FolderList => self.folders.is_selecting(),
            ViewMode::ImageList { .. } => self.images.is_selecting(),
        }
    }

    /// Selected positions in the current list, ascending.
    pub fn selected(&self) -> Vec<usize> {
        match self.mode {
            ViewMode::FolderList => self.folders.selected().iter().copied().collect(),
            ViewMode::ImageList { .. } => self.images.selected().iter().copied().collect(),
        }
    }

    /// Header shown above the current list, e.g. `/home/Trip`.
    pub fn title(&self) -> String {
        let root = &self.settings.view.root_label;
        match &self.active_folder {
            Some(folder) => format!("{}/{}", root.trim_end_matches('/'), folder.name),
            None => root.clone(),
        }
    }

    // ==================== Navigation ====================

    /// Enter the folder list: reload folders and recompute every count.
    pub async fn show_folders(&mut self) -> AppResult<()> {
        let result = self.load_folders().await;
        self.report(result)
    }

    async fn load_folders(&mut self) -> AppResult<()> {
        let folders = self.store.list_folders().await?;

        let mut counts = HashMap::with_capacity(folders.len());
        let mut rows = Vec::with_capacity(folders.len());
        for folder in folders {
            let image_count = self.store.count_images(folder.id).await?;
            counts.insert(folder.id, image_count);
            rows.push(FolderWithCount { folder, image_count });
        }

        tracing::debug!("loaded {} folders", rows.len());

        self.counts = counts;
        self.mode = ViewMode::FolderList;
        self.active_folder = None;
        self.images.replace(Vec::new());
        let changes = self.folders.replace(rows);

        self.emit_view_mode();
        self.emit_list(ListKind::Folders, changes);
        Ok(())
    }

    /// Open the folder at a displayed position.
    pub async fn open_folder(&mut self, index: usize) -> AppResult<()> {
        if self.mode != ViewMode::FolderList {
            tracing::debug!("open_folder: folder list is not displayed");
            return Ok(());
        }
        let Some(row) = self.folders.get(index) else {
            tracing::debug!("open_folder: stale index {}", index);
            return Ok(());
        };
        let folder_id = row.folder.id;
        self.open_folder_id(folder_id).await
    }

    /// Enter the image list for `folder_id`.
    pub async fn open_folder_id(&mut self, folder_id: i64) -> AppResult<()> {
        let result = self.load_folder(folder_id).await;
        self.report(result)
    }

    async fn load_folder(&mut self, folder_id: i64) -> AppResult<()> {
        let folder = self
            .store
            .find_folder_by_id(folder_id)
            .await?
            .ok_or(AppError::FolderNotFound(folder_id))?;
        let images = self.store.list_images_in_folder(folder_id).await?;

        tracing::debug!("opened folder {} with {} images", folder_id, images.len());

        self.counts.insert(folder_id, images.len() as i64);
        self.folders.cancel();
        self.mode = ViewMode::ImageList { folder_id };
        self.active_folder = Some(folder);
        let changes = self.images.replace(images);

        self.emit_view_mode();
        self.emit_list(ListKind::Images, changes);
        Ok(())
    }

    /// Back navigation. Returns `false` when already at the folder list.
    pub async fn back(&mut self) -> AppResult<bool> {
        match self.mode {
            ViewMode::FolderList => Ok(false),
            ViewMode::ImageList { .. } => {
                self.show_folders().await?;
                Ok(true)
            }
        }
    }

    /// Reload whatever is on screen.
    pub async fn refresh(&mut self) -> AppResult<()> {
        match self.mode {
            ViewMode::FolderList => self.show_folders().await,
            ViewMode::ImageList { folder_id } => self.open_folder_id(folder_id).await,
        }
    }

    // ==================== Folders ====================

    /// Create a folder and put it at the top of the folder list.
    ///
    /// The name check and the insert are separate store calls, so two
    /// concurrent creates of the same name can both succeed.
    pub async fn create_folder(&mut self, name: &str) -> AppResult<Folder> {
        let result = self.try_create_folder(name).await;
        self.report(result)
    }

    async fn try_create_folder(&mut self, name: &str) -> AppResult<Folder> {
        let name = normalize_folder_name(name)?;
        if self.store.find_folder_by_name(&name).await?.is_some() {
            return Err(AppError::DuplicateName(name));
        }

        let id = self.store.insert_folder(&name).await?;
        let folder = self
            .store
            .find_folder_by_id(id)
            .await?
            .ok_or(AppError::FolderNotFound(id))?;

        tracing::info!("created folder {} ({})", folder.name, folder.id);

        self.counts.insert(id, 0);
        if self.mode == ViewMode::FolderList {
            let changes = self.folders.insert_front(FolderWithCount {
                folder: folder.clone(),
                image_count: 0,
            });
            self.emit_list(ListKind::Folders, changes);
        }
        self.notify(format!("文件夹 \"{}\" 已创建", folder.name));
        Ok(folder)
    }

    // ==================== Images ====================

    /// Add a picked resource.
    ///
    /// With a folder open the image is filed there directly. At the folder
    /// list the caller gets the folders to choose from, even when there is
    /// only one.
    pub async fn add_image(&mut self, locator: &str) -> AppResult<AddImageOutcome> {
        match self.mode {
            ViewMode::ImageList { folder_id } => {
                let image_id = self.add_image_to_folder(locator, folder_id).await?;
                Ok(AddImageOutcome::Added {
                    image_id,
                    folder_id,
                })
            }
            ViewMode::FolderList => {
                let result = match self.store.list_folders().await {
                    Ok(folders) if folders.is_empty() => Err(AppError::NoFolders),
                    Ok(folders) => Ok(AddImageOutcome::ChooseFolder(folders)),
                    Err(e) => Err(e),
                };
                self.report(result)
            }
        }
    }

    /// File a picked resource into `folder_id`. Returns the new image id.
    pub async fn add_image_to_folder(&mut self, locator: &str, folder_id: i64) -> AppResult<i64> {
        let result = self.try_add_image(locator, folder_id).await;
        self.report(result)
    }

    async fn try_add_image(&mut self, locator: &str, folder_id: i64) -> AppResult<i64> {
        if self.store.find_folder_by_id(folder_id).await?.is_none() {
            return Err(AppError::FolderNotFound(folder_id));
        }

        let import = &self.settings.import;
        let recorded = if import.copy_to_private_storage {
            self.importer.import(locator).await?.locator
        } else {
            locator.to_string()
        };

        let create = CreateImage::in_folder(
            import.default_title.clone(),
            recorded.clone(),
            import.default_description.clone(),
            folder_id,
        );
        let image_id = match self.store.insert_image(create).await {
            Ok(id) => id,
            Err(e) => {
                self.importer.remove_copies(vec![recorded]).await;
                return Err(e);
            }
        };

        tracing::info!("added image {} to folder {}", image_id, folder_id);

        *self.counts.entry(folder_id).or_insert(0) += 1;
        match self.mode {
            ViewMode::ImageList { folder_id: open } if open == folder_id => {
                // the record is saved; a failed read-back only costs a reload
                match self.store.find_image_by_id(image_id).await {
                    Ok(Some(image)) => {
                        let changes = self.images.insert_front(image);
                        self.emit_list(ListKind::Images, changes);
                    }
                    Ok(None) => self.reload_after_add(folder_id).await,
                    Err(e) => {
                        tracing::warn!("read-back of image {} failed: {}", image_id, e);
                        self.reload_after_add(folder_id).await;
                    }
                }
            }
            ViewMode::FolderList => {
                let position = self
                    .folders
                    .items()
                    .iter()
                    .position(|row| row.folder.id == folder_id);
                let count = self.counts.get(&folder_id).copied().unwrap_or(0);
                if let Some(change) =
                    position.and_then(|i| self.folders.update_at(i, |row| row.image_count = count))
                {
                    self.emit_list(ListKind::Folders, vec![change]);
                }
            }
            ViewMode::ImageList { .. } => {}
        }

        self.notify("图片已添加".to_string());
        Ok(image_id)
    }

    async fn reload_after_add(&mut self, folder_id: i64) {
        if let Err(e) = self.load_folder(folder_id).await {
            tracing::warn!("reload of folder {} failed: {}", folder_id, e);
        }
    }

    /// Render the preview for the image at a displayed position.
    pub async fn preview(&self, index: usize) -> AppResult<Preview> {
        let Some(image) = self.images.get(index).cloned() else {
            return Ok(self.pending_preview());
        };
        let options = RenderOptions::from(&self.settings.preview);
        let result = self.previews.render(image, options).await.map_err(AppError::from);
        self.report(result)
    }

    /// What the view shows while a render is in flight.
    pub fn pending_preview(&self) -> Preview {
        PreviewService::pending(&RenderOptions::from(&self.settings.preview))
    }

    // ==================== Selection ====================

    /// Long-press: enter multi-select mode on the current list.
    pub fn long_press(&mut self, index: usize) {
        let kind = self.mode.kind();
        let changes = match self.mode {
            ViewMode::FolderList => self.folders.long_press(index),
            ViewMode::ImageList { .. } => self.images.long_press(index),
        };
        if !changes.is_empty() {
            self.emit_list(kind, changes);
            self.emit_selection();
        }
    }

    /// Tap: toggle while selecting, otherwise open the row.
    pub async fn tap(&mut self, index: usize) -> AppResult<TapAction> {
        let kind = self.mode.kind();
        let outcome = match self.mode {
            ViewMode::FolderList => self.folders.tap(index),
            ViewMode::ImageList { .. } => self.images.tap(index),
        };

        match outcome {
            TapOutcome::Ignored => Ok(TapAction::Ignored),
            TapOutcome::Toggled(change) => {
                self.emit_list(kind, vec![change]);
                self.emit_selection();
                Ok(TapAction::Toggled)
            }
            TapOutcome::Open(i) => match self.mode {
                ViewMode::FolderList => {
                    let Some(folder_id) = self.folders.get(i).map(|row| row.folder.id) else {
                        return Ok(TapAction::Ignored);
                    };
                    self.open_folder_id(folder_id).await?;
                    Ok(TapAction::OpenedFolder(folder_id))
                }
                ViewMode::ImageList { .. } => Ok(self
                    .images
                    .get(i)
                    .cloned()
                    .map_or(TapAction::Ignored, TapAction::OpenedImage)),
            },
        }
    }

    /// Leave multi-select mode without deleting.
    pub fn cancel_selection(&mut self) {
        let kind = self.mode.kind();
        let was_selecting = self.is_selecting();
        let changes = match self.mode {
            ViewMode::FolderList => self.folders.cancel(),
            ViewMode::ImageList { .. } => self.images.cancel(),
        };
        self.emit_list(kind, changes);
        if was_selecting {
            self.emit_selection();
        }
    }

    // ==================== Deletion ====================

    /// Delete the selected rows of the current list.
    ///
    /// Folders cascade to their images. Rows leave the displayed sequence
    /// only after the store delete has completed; on failure nothing changes
    /// and the selection is kept. Returns the number of rows removed.
    pub async fn delete_selected(&mut self) -> AppResult<usize> {
        let result = match self.mode {
            ViewMode::FolderList => self.delete_selected_folders().await,
            ViewMode::ImageList { folder_id } => self.delete_selected_images(folder_id).await,
        };
        self.report(result)
    }

    async fn delete_selected_images(&mut self, folder_id: i64) -> AppResult<usize> {
        let positions: Vec<usize> = self.images.selected().iter().copied().collect();
        if positions.is_empty() {
            self.cancel_selection();
            return Ok(0);
        }

        let doomed: Vec<&Image> = self.images.selected_items();
        let ids: Vec<i64> = doomed.iter().map(|image| image.id).collect();
        let locators: Vec<String> = doomed.iter().map(|image| image.source_uri.clone()).collect();

        let removed = self.store.delete_images(ids.iter().copied()).await?;
        tracing::info!("deleted {} images from folder {}", removed, folder_id);

        let changes = self.images.finish_delete(positions.iter().copied());
        if let Some(count) = self.counts.get_mut(&folder_id) {
            *count = (*count - removed as i64).max(0);
        }
        self.emit_list(ListKind::Images, changes);
        self.emit_selection();

        self.importer.remove_copies(locators).await;
        self.previews.evict(&ids);

        self.notify(format!("已删除 {} 张图片", positions.len()));
        Ok(positions.len())
    }

    async fn delete_selected_folders(&mut self) -> AppResult<usize> {
        let positions: Vec<usize> = self.folders.selected().iter().copied().collect();
        if positions.is_empty() {
            self.cancel_selection();
            return Ok(0);
        }

        let folder_ids: Vec<i64> = self
            .folders
            .selected_items()
            .iter()
            .map(|row| row.folder.id)
            .collect();

        // cascade takes the rows; their files are collected first
        let mut doomed = Vec::new();
        for &folder_id in &folder_ids {
            doomed.extend(self.store.list_images_in_folder(folder_id).await?);
        }

        let removed = self.store.delete_folders(folder_ids.iter().copied()).await?;
        tracing::info!(
            "deleted {} folders ({} images by cascade)",
            removed,
            doomed.len()
        );

        let changes = self.folders.finish_delete(positions.iter().copied());
        for folder_id in &folder_ids {
            self.counts.remove(folder_id);
        }
        self.emit_list(ListKind::Folders, changes);
        self.emit_selection();

        let image_ids: Vec<i64> = doomed.iter().map(|image| image.id).collect();
        let locators: Vec<String> = doomed.into_iter().map(|image| image.source_uri).collect();
        self.importer.remove_copies(locators).await;
        self.previews.evict(&image_ids);

        self.notify(format!("已删除 {} 个文件夹", positions.len()));
        Ok(positions.len())
    }

    // ==================== Events ====================

    fn emit_view_mode(&self) {
        let (folder_id, grid_columns) = match self.mode {
            ViewMode::FolderList => (None, self.settings.view.folder_grid_columns),
            ViewMode::ImageList { folder_id } => (Some(folder_id), 1),
        };
        self.events.emit_typed(
            EVENT_VIEW_MODE_CHANGED,
            &ViewModePayload {
                list: self.mode.kind(),
                folder_id,
                title: self.title(),
                grid_columns,
            },
        );
    }

    fn emit_list(&self, list: ListKind, changes: Vec<ListChange>) {
        if changes.is_empty() {
            return;
        }
        let len = match list {
            ListKind::Folders => self.folders.len(),
            ListKind::Images => self.images.len(),
        };
        self.events.emit_typed(
            EVENT_LIST_CHANGED,
            &ListChangedPayload { list, len, changes },
        );
    }

    fn emit_selection(&self) {
        self.events.emit_typed(
            EVENT_SELECTION_CHANGED,
            &SelectionPayload {
                list: self.mode.kind(),
                selecting: self.is_selecting(),
                selected: self.selected(),
            },
        );
    }

    fn notify(&self, message: String) {
        self.events.emit_typed(
            EVENT_NOTICE,
            &NoticePayload {
                level: NoticeLevel::Info,
                message,
                code: None,
            },
        );
    }

    /// Log and surface a failure, then hand it back unchanged.
    fn report<T>(&self, result: AppResult<T>) -> AppResult<T> {
        if let Err(e) = &result {
            match e {
                AppError::Database(_) | AppError::Io(_) | AppError::General(_) => {
                    tracing::error!("{}", e)
                }
                _ => tracing::warn!("{}", e),
            }
            self.events.emit_typed(
                EVENT_NOTICE,
                &NoticePayload {
                    level: NoticeLevel::Error,
                    message: e.to_string(),
                    code: Some(e.code().to_string()),
                },
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ChannelEventSink, EmittedEvent};
    use tempfile::TempDir;
    use tokio::sync::mpsc::UnboundedReceiver;

    struct Fixture {
        _tmp: TempDir,
        controller: GalleryController,
        events: UnboundedReceiver<EmittedEvent>,
        source: String,
    }

    async fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(GalleryStore::in_memory().unwrap());
        let importer = ResourceImporter::new(tmp.path().join("Images")).unwrap();
        let previews = PreviewService::new(tmp.path().join("Previews"), 16).unwrap();
        let (sink, events) = ChannelEventSink::new();

        let source = tmp.path().join("picked.jpg");
        std::fs::write(&source, b"jpeg bytes").unwrap();

        let mut controller = GalleryController::new(
            store,
            importer,
            previews,
            Arc::new(sink),
            AppSettings::default(),
        );
        controller.show_folders().await.unwrap();

        Fixture {
            _tmp: tmp,
            controller,
            events,
            source: source.display().to_string(),
        }
    }

    fn drain(rx: &mut UnboundedReceiver<EmittedEvent>) -> Vec<EmittedEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[tokio::test]
    async fn test_create_folder_prepends_with_zero_count() {
        let mut fx = fixture().await;
        fx.controller.create_folder("Old").await.unwrap();
        let folder = fx.controller.create_folder("  Trip  ").await.unwrap();

        assert_eq!(folder.name, "Trip");
        let rows = fx.controller.folders();
        assert_eq!(rows[0].folder.name, "Trip");
        assert_eq!(rows[0].image_count, 0);
        assert_eq!(rows[1].folder.name, "Old");
    }

    #[tokio::test]
    async fn test_duplicate_and_blank_names_rejected() {
        let mut fx = fixture().await;
        fx.controller.create_folder("X").await.unwrap();
        drain(&mut fx.events);

        let err = fx.controller.create_folder("X").await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateName(_)));
        assert!(matches!(
            fx.controller.create_folder("   ").await,
            Err(AppError::InvalidName(_))
        ));
        assert_eq!(fx.controller.folders().len(), 1);

        let notices: Vec<NoticePayload> = drain(&mut fx.events)
            .into_iter()
            .filter(|e| e.name == EVENT_NOTICE)
            .map(|e| e.decode().unwrap())
            .collect();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].code.as_deref(), Some("E_DUPLICATE_NAME"));
        assert_eq!(notices[1].code.as_deref(), Some("E_INVALID_NAME"));
    }

    #[tokio::test]
    async fn test_add_without_folders_is_rejected() {
        let mut fx = fixture().await;
        let source = fx.source.clone();
        assert!(matches!(
            fx.controller.add_image(&source).await,
            Err(AppError::NoFolders)
        ));
    }

    #[tokio::test]
    async fn test_add_at_folder_list_offers_choice_even_for_one_folder() {
        let mut fx = fixture().await;
        let folder = fx.controller.create_folder("Only").await.unwrap();
        let source = fx.source.clone();

        match fx.controller.add_image(&source).await.unwrap() {
            AddImageOutcome::ChooseFolder(choices) => assert_eq!(choices, vec![folder.clone()]),
            other => panic!("unexpected outcome: {other:?}"),
        }

        fx.controller
            .add_image_to_folder(&source, folder.id)
            .await
            .unwrap();
        assert_eq!(fx.controller.folders()[0].image_count, 1);
        assert_eq!(fx.controller.cached_count(folder.id), Some(1));
    }

    #[tokio::test]
    async fn test_add_with_open_folder_files_into_it() {
        let mut fx = fixture().await;
        let folder = fx.controller.create_folder("Trip").await.unwrap();
        fx.controller.open_folder(0).await.unwrap();
        assert_eq!(fx.controller.title(), "/home/Trip");

        let source = fx.source.clone();
        let outcome = fx.controller.add_image(&source).await.unwrap();
        let AddImageOutcome::Added { image_id, folder_id } = outcome else {
            panic!("expected image to be filed directly");
        };
        assert_eq!(folder_id, folder.id);

        let images = fx.controller.images();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].id, image_id);
        assert_eq!(images[0].folder_id, Some(folder.id));
        assert_eq!(images[0].title, "新图片");
        assert_ne!(images[0].source_uri, source);
    }

    #[tokio::test]
    async fn test_unreadable_source_records_nothing() {
        let mut fx = fixture().await;
        let folder = fx.controller.create_folder("Trip").await.unwrap();
        fx.controller.open_folder_id(folder.id).await.unwrap();

        let err = fx.controller.add_image("/no/such/file.jpg").await.unwrap_err();
        assert!(matches!(err, AppError::ResourceAccess(_)));
        assert!(fx.controller.images().is_empty());
    }

    #[tokio::test]
    async fn test_tap_opens_then_back_returns() {
        let mut fx = fixture().await;
        let folder = fx.controller.create_folder("Trip").await.unwrap();

        let action = fx.controller.tap(0).await.unwrap();
        assert_eq!(action, TapAction::OpenedFolder(folder.id));
        assert_eq!(fx.controller.mode(), ViewMode::ImageList { folder_id: folder.id });

        assert!(fx.controller.back().await.unwrap());
        assert_eq!(fx.controller.mode(), ViewMode::FolderList);
        assert!(fx.controller.active_folder().is_none());
        assert!(!fx.controller.back().await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_selected_images() {
        let mut fx = fixture().await;
        let folder = fx.controller.create_folder("Trip").await.unwrap();
        fx.controller.open_folder_id(folder.id).await.unwrap();
        let source = fx.source.clone();
        for _ in 0..3 {
            fx.controller.add_image(&source).await.unwrap();
        }
        let kept = fx.controller.images()[1].id;

        fx.controller.long_press(0);
        assert_eq!(fx.controller.tap(2).await.unwrap(), TapAction::Toggled);
        assert_eq!(fx.controller.selected(), vec![0, 2]);

        let removed = fx.controller.delete_selected().await.unwrap();
        assert_eq!(removed, 2);
        assert!(!fx.controller.is_selecting());
        assert_eq!(fx.controller.images().len(), 1);
        assert_eq!(fx.controller.images()[0].id, kept);
        assert_eq!(fx.controller.cached_count(folder.id), Some(1));
    }

    #[tokio::test]
    async fn test_delete_selected_folders_cascades() {
        let mut fx = fixture().await;
        let a = fx.controller.create_folder("A").await.unwrap();
        fx.controller.create_folder("B").await.unwrap();
        let source = fx.source.clone();
        fx.controller.add_image_to_folder(&source, a.id).await.unwrap();

        // rows: [B, A]
        fx.controller.long_press(1);
        assert_eq!(fx.controller.delete_selected().await.unwrap(), 1);

        let names: Vec<&str> = fx
            .controller
            .folders()
            .iter()
            .map(|row| row.folder.name.as_str())
            .collect();
        assert_eq!(names, vec!["B"]);
        assert!(fx.controller.store.list_images().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_selection_keeps_rows() {
        let mut fx = fixture().await;
        fx.controller.create_folder("A").await.unwrap();
        fx.controller.long_press(0);
        assert!(fx.controller.is_selecting());

        fx.controller.cancel_selection();
        assert!(!fx.controller.is_selecting());
        assert!(fx.controller.selected().is_empty());
        assert_eq!(fx.controller.folders().len(), 1);
    }

    #[tokio::test]
    async fn test_open_missing_folder_reports_notice() {
        let mut fx = fixture().await;
        drain(&mut fx.events);

        let err = fx.controller.open_folder_id(42).await.unwrap_err();
        assert!(matches!(err, AppError::FolderNotFound(42)));
        assert_eq!(fx.controller.mode(), ViewMode::FolderList);

        let events = drain(&mut fx.events);
        assert_eq!(events.len(), 1);
        let notice: NoticePayload = events[0].decode().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
    }

    fn install_trigger(fx: &Fixture, sql: &str) {
        let conn = fx.controller.store.database().connection().unwrap();
        conn.execute_batch(sql).unwrap();
    }

    #[tokio::test]
    async fn test_failed_image_delete_keeps_rows_and_selection() {
        let mut fx = fixture().await;
        let folder = fx.controller.create_folder("Trip").await.unwrap();
        fx.controller.open_folder_id(folder.id).await.unwrap();
        let source = fx.source.clone();
        for _ in 0..3 {
            fx.controller.add_image(&source).await.unwrap();
        }
        let before: Vec<i64> = fx.controller.images().iter().map(|i| i.id).collect();

        install_trigger(
            &fx,
            "CREATE TRIGGER block_image_delete BEFORE DELETE ON images
             BEGIN SELECT RAISE(ABORT, 'images are locked'); END;",
        );

        fx.controller.long_press(0);
        fx.controller.tap(2).await.unwrap();
        assert!(matches!(
            fx.controller.delete_selected().await,
            Err(AppError::Database(_))
        ));

        let after: Vec<i64> = fx.controller.images().iter().map(|i| i.id).collect();
        assert_eq!(after, before);
        assert_eq!(fx.controller.selected(), vec![0, 2]);
        assert!(fx.controller.is_selecting());
        assert_eq!(fx.controller.cached_count(folder.id), Some(3));
        assert_eq!(fx.controller.store.count_images(folder.id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_failed_folder_delete_keeps_rows_and_selection() {
        let mut fx = fixture().await;
        let a = fx.controller.create_folder("A").await.unwrap();
        fx.controller.create_folder("B").await.unwrap();
        let source = fx.source.clone();
        fx.controller.add_image_to_folder(&source, a.id).await.unwrap();

        install_trigger(
            &fx,
            "CREATE TRIGGER block_folder_delete BEFORE DELETE ON folders
             BEGIN SELECT RAISE(ABORT, 'folders are locked'); END;",
        );

        // rows: [B, A]
        fx.controller.long_press(1);
        assert!(fx.controller.delete_selected().await.is_err());

        let names: Vec<&str> = fx
            .controller
            .folders()
            .iter()
            .map(|row| row.folder.name.as_str())
            .collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(fx.controller.selected(), vec![1]);
        assert!(fx.controller.is_selecting());
        assert_eq!(fx.controller.cached_count(a.id), Some(1));
        assert_eq!(fx.controller.store.list_folders().await.unwrap().len(), 2);
        assert_eq!(fx.controller.store.count_images(a.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_add_succeeds_when_read_back_fails() {
        let mut fx = fixture().await;
        let folder = fx.controller.create_folder("Trip").await.unwrap();
        fx.controller.open_folder_id(folder.id).await.unwrap();

        // stored rows no longer map to Image
        install_trigger(
            &fx,
            "CREATE TRIGGER garble_timestamp AFTER INSERT ON images
             BEGIN UPDATE images SET timestamp = 'not-a-number' WHERE id = NEW.id; END;",
        );

        let source = fx.source.clone();
        let outcome = fx.controller.add_image(&source).await.unwrap();
        assert!(matches!(outcome, AddImageOutcome::Added { folder_id, .. } if folder_id == folder.id));
        assert_eq!(fx.controller.store.count_images(folder.id).await.unwrap(), 1);
        assert_eq!(fx.controller.cached_count(folder.id), Some(1));
    }

    #[tokio::test]
    async fn test_open_folder_ignored_outside_folder_list() {
        let mut fx = fixture().await;
        let a = fx.controller.create_folder("A").await.unwrap();
        fx.controller.create_folder("B").await.unwrap();
        fx.controller.open_folder_id(a.id).await.unwrap();

        // index 0 is "B" in the hidden folder list
        fx.controller.open_folder(0).await.unwrap();
        assert_eq!(fx.controller.mode(), ViewMode::ImageList { folder_id: a.id });
        assert_eq!(fx.controller.active_folder().map(|f| f.id), Some(a.id));
    }
}
