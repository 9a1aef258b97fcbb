//! FolderGrid Core Library
//!
//! Core of a folder-organized photo gallery: a SQLite store of Folders and
//! Images with cascade delete, list/selection state with multi-select
//! delete, and a folder-scoped view controller. It does not draw anything;
//! a frontend drives the controller and redraws from its events.
//!
//! # Architecture
//!
//! - `models`: Data structures (Folder, Image, Settings)
//! - `db`: SQLite database layer with DAOs and schema migrations
//! - `store`: Async facade over the database
//! - `selection`: Displayed sequence plus selected indices and mode
//! - `controller`: Folder list / image list view modes and gesture flows
//! - `services`: Resource importer, preview renderer, settings
//! - `events`: Event emission abstraction (EventSink trait)
//! - `paths`: Path provider abstraction (PathProvider trait)
//! - `utils`: Error handling and utilities
//!
//! # Example
//!
//! ```no_run
//! use foldergrid_core::{FolderGridCore, events::LoggingEventSink, paths::AppPathProvider};
//! use std::sync::Arc;
//!
//! # async fn demo() -> foldergrid_core::AppResult<()> {
//! let core = FolderGridCore::new(Arc::new(AppPathProvider::new()), Arc::new(LoggingEventSink))?;
//! let mut controller = core.controller()?;
//! controller.show_folders().await?;
//! controller.create_folder("Trip").await?;
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod db;
pub mod events;
pub mod models;
pub mod paths;
pub mod selection;
pub mod services;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use controller::{AddImageOutcome, GalleryController, TapAction, ViewMode};
pub use db::{Database, DatabaseStats};
pub use events::{
    ChannelEventSink, EventSink, LoggingEventSink, NoOpEventSink, SharedEventSink,
};
pub use models::{AppSettings, CreateImage, Folder, FolderWithCount, Image};
pub use paths::{AppPathProvider, PathProvider, SharedPathProvider};
pub use selection::{SelectionList, SelectionMode, TapOutcome};
pub use services::{
    Preview, PreviewService, RenderError, RenderOptions, ResourceImporter, SettingsManager,
};
pub use store::GalleryStore;
pub use utils::{AppError, AppResult, CommandError};

use std::sync::Arc;

/// FolderGrid core application context.
///
/// Opens the database once and hands out controllers that share it.
pub struct FolderGridCore {
    /// Store shared by every controller
    pub store: Arc<GalleryStore>,
    /// Path provider for resolving application paths
    pub path_provider: SharedPathProvider,
    /// Event sink for emitting events to the frontend
    pub event_sink: SharedEventSink,
    /// Settings loaded at startup
    pub settings: AppSettings,
    settings_manager: SettingsManager,
}

impl FolderGridCore {
    /// Open (and migrate) the database and load settings.
    pub fn new(path_provider: SharedPathProvider, event_sink: SharedEventSink) -> AppResult<Self> {
        let db = Database::open_with_provider(path_provider.as_ref())?;
        db.init()?;
        let store = Arc::new(GalleryStore::new(Arc::new(db)));

        let settings_manager = SettingsManager::new(path_provider.as_ref())?;
        let settings = settings_manager.load()?;

        tracing::info!(
            "FolderGrid core ready at {:?}",
            path_provider.app_data_dir()
        );

        Ok(Self {
            store,
            path_provider,
            event_sink,
            settings,
            settings_manager,
        })
    }

    /// Build a controller over the shared store.
    pub fn controller(&self) -> AppResult<GalleryController> {
        GalleryController::with_provider(
            self.store.clone(),
            self.path_provider.as_ref(),
            self.event_sink.clone(),
            self.settings.clone(),
        )
    }

    /// Get the store reference.
    pub fn store(&self) -> &Arc<GalleryStore> {
        &self.store
    }

    /// Get the path provider reference.
    pub fn paths(&self) -> &SharedPathProvider {
        &self.path_provider
    }

    pub fn settings_manager(&self) -> &SettingsManager {
        &self.settings_manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_foldergrid_core_creation() {
        let tmp = TempDir::new().unwrap();
        let path_provider = Arc::new(AppPathProvider::with_base_dir(tmp.path().to_path_buf()));
        let event_sink: SharedEventSink = Arc::new(NoOpEventSink);

        let core = FolderGridCore::new(path_provider, event_sink).unwrap();
        assert_eq!(core.settings, AppSettings::default());

        let stats = core.store().stats().await.unwrap();
        assert_eq!(stats.folder_count, 0);
        assert_eq!(stats.image_count, 0);

        let mut controller = core.controller().unwrap();
        controller.show_folders().await.unwrap();
        assert!(controller.folders().is_empty());
        assert!(tmp.path().join("Images").exists());
        assert!(tmp.path().join("Previews").exists());
    }
}
