pub mod config;
pub mod credentials;
pub mod logger;

pub use config::{AppConfig, PackagePaths, load_config};
pub use credentials::{SearchCredentials, SslSettings, load_credentials, ssl_settings};
pub use logger::{Colors, setup_logging};
