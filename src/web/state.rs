use std::sync::Arc;

use crate::report::ReportSettings;
use crate::storage::Storage;

use super::config::{Config, ConfigError};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: Arc<Storage>,
    pub report: Arc<ReportSettings>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let report = config.report.settings()?;
        let storage = Storage::new(config.storage.base_folder.clone());
        Ok(AppState {
            config: Arc::new(config),
            storage: Arc::new(storage),
            report: Arc::new(report),
        })
    }
}
