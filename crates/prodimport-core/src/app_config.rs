use std::path::PathBuf;

/// How the importer authenticates against the admin API.
#[derive(Clone, PartialEq, Eq)]
pub enum AdminCredentials {
    /// A pre-issued admin API token, sent in the `x-medusa-access-token` header.
    Token(String),
    /// Email and password exchanged for a bearer token at startup.
    Password { email: String, password: String },
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdminCredentials::Token(_) => f.debug_tuple("Token").field(&"[redacted]").finish(),
            AdminCredentials::Password { email, .. } => f
                .debug_struct("Password")
                .field("email", email)
                .field("password", &"[redacted]")
                .finish(),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub credentials: AdminCredentials,
    pub products_path: PathBuf,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub category_page_size: u32,
    pub max_concurrent_rows: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("backend_url", &self.backend_url)
            .field("credentials", &self.credentials)
            .field("products_path", &self.products_path)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field("category_page_size", &self.category_page_size)
            .field("max_concurrent_rows", &self.max_concurrent_rows)
            .finish()
    }
}
