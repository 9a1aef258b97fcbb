//! Path provider abstraction.
//!
//! Resolves the app-private directories (database, imported image copies,
//! preview cache, settings, logs) without tying the core to one frontend.

use std::path::PathBuf;
use std::sync::Arc;

/// Trait for providing application data paths.
pub trait PathProvider: Send + Sync {
    /// Get the root application data directory.
    fn app_data_dir(&self) -> PathBuf;

    /// Get the database directory.
    fn database_dir(&self) -> PathBuf {
        self.app_data_dir().join("Database")
    }

    /// Private storage for copies of picked images.
    fn images_dir(&self) -> PathBuf {
        self.app_data_dir().join("Images")
    }

    /// Get the preview (thumbnail) cache directory.
    fn previews_dir(&self) -> PathBuf {
        self.app_data_dir().join("Previews")
    }

    /// Get the settings file path.
    fn settings_path(&self) -> PathBuf {
        self.app_data_dir().join("Config").join("settings.json")
    }

    /// Get the logs directory.
    fn logs_dir(&self) -> PathBuf {
        self.app_data_dir().join("Logs")
    }

    /// Get the database file path.
    fn database_path(&self) -> PathBuf {
        self.database_dir().join("image_database.db")
    }
}

/// Shared reference to a PathProvider implementation.
pub type SharedPathProvider = Arc<dyn PathProvider>;

/// Default path provider rooted at `<data_dir>/FolderGrid`.
#[derive(Debug, Clone)]
pub struct AppPathProvider {
    app_data_dir: PathBuf,
}

impl AppPathProvider {
    /// Create a provider under the platform data directory.
    pub fn new() -> Self {
        let app_data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("FolderGrid");
        Self { app_data_dir }
    }

    /// Create a provider with a custom base directory.
    ///
    /// Useful for testing.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self {
            app_data_dir: base_dir,
        }
    }
}

impl Default for AppPathProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PathProvider for AppPathProvider {
    fn app_data_dir(&self) -> PathBuf {
        self.app_data_dir.clone()
    }
}
