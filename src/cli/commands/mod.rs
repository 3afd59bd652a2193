pub mod browse;
pub mod cities;
pub mod config;
pub mod list;
pub mod version;

use std::sync::Arc;

use crate::api::{CitizenSource, HttpCitizenSource};
use crate::config::Config;
use crate::error::Result;

/// Build the HTTP data source from the loaded configuration
pub(crate) fn connect(config: &Config) -> Result<Arc<dyn CitizenSource>> {
    let source = HttpCitizenSource::new(config.client_config())?;
    Ok(Arc::new(source))
}
