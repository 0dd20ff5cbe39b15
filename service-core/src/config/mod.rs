//! Layered configuration loading shared by all services.
//!
//! Settings come from `<service>/config/base.yaml`, overridden by
//! `APP_`-prefixed environment variables using `__` as the nesting separator
//! (`APP_DATABASE__URL` sets `database.url`).

use crate::error::AppError;
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Resolve the configuration directory for `service_name`.
///
/// Works both when started from the workspace root and from inside the
/// service directory.
pub fn configuration_directory(base_path: &Path, service_name: &str) -> PathBuf {
    if base_path.ends_with(service_name) {
        base_path.join("config")
    } else {
        base_path.join(service_name).join("config")
    }
}

/// Load settings for `service_name` into `T`.
pub fn load<T: DeserializeOwned>(service_name: &str) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let base_path = std::env::current_dir()?;
    let configuration_directory = configuration_directory(&base_path, service_name);

    let settings = Config::builder()
        .add_source(File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<T>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_from_workspace_root() {
        let dir = configuration_directory(Path::new("/srv/app"), "invoicing-service");
        assert_eq!(dir, PathBuf::from("/srv/app/invoicing-service/config"));
    }

    #[test]
    fn resolves_from_service_directory() {
        let dir = configuration_directory(Path::new("/srv/app/invoicing-service"), "invoicing-service");
        assert_eq!(dir, PathBuf::from("/srv/app/invoicing-service/config"));
    }
}
