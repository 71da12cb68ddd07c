use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("admin API rejected credentials for {url}")]
    Unauthorized { url: String },

    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("pagination limit reached for {resource}: exceeded {max_pages} pages")]
    PaginationLimit {
        resource: &'static str,
        max_pages: usize,
    },

    #[error("invalid backend URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
