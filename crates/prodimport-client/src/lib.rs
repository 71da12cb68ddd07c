pub mod client;
pub mod error;
pub mod pagination;
mod retry;
pub mod types;

pub use client::MedusaClient;
pub use error::ClientError;
pub use types::ProductSummary;
