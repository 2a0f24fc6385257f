use crate::config::Config;
use crate::credentials::CredentialsManager;
use crate::error::AppResult;
use crate::settings::AppSettings;
use crate::storage::Storage;

/// Shared state for CLI commands
pub struct App {
    pub config: Config,
    pub settings: AppSettings,
    pub storage: Storage,
}

impl App {
    /// Create the data directory, load settings and open the database
    pub fn open(config: Config) -> AppResult<Self> {
        config.ensure_dirs()?;
        let settings = AppSettings::load(&config.settings_path())?.with_overrides(&config);
        let storage = Storage::new(&config.db_path)?;

        let health = storage.health()?;
        if !health.is_healthy {
            tracing::warn!(
                schema = health.schema_version,
                missing = ?health.missing_tables,
                "database schema incomplete"
            );
        }
        tracing::debug!(
            data_dir = %config.data_dir.display(),
            db = %config.db_path.display(),
            attempts = health.row_counts.get("attempts").copied().unwrap_or(0),
            "app opened"
        );
        Ok(Self {
            config,
            settings,
            storage,
        })
    }

    pub fn with_storage(config: Config, settings: AppSettings, storage: Storage) -> Self {
        Self {
            config,
            settings,
            storage,
        }
    }

    pub fn save_settings(&self) -> AppResult<()> {
        self.settings.save(&self.config.settings_path())?;
        Ok(())
    }

    /// Credentials manager over the configured directory, probing the OS keyring
    pub fn credentials(&self, password: Option<String>) -> AppResult<CredentialsManager> {
        let manager = CredentialsManager::open(&self.config.credentials_dir)?.with_password(password);
        Ok(manager)
    }
}
