pub mod app_config;
pub mod categories;
pub mod config;
pub mod products;

pub use app_config::{AdminCredentials, AppConfig};
pub use categories::{build_category_path, CategoryError, CategoryIndex, CategoryNode};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{
    derive_handle, price_to_minor_units, ProductCreateRequest, ProductError, ProductRow,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error(
        "no admin credentials configured: set MEDUSA_ADMIN_TOKEN or both MEDUSA_ADMIN_EMAIL and MEDUSA_ADMIN_PASSWORD"
    )]
    MissingCredentials,
}
