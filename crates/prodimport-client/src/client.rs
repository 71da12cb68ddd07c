use std::time::Duration;

use prodimport_core::{AdminCredentials, CategoryNode, ProductCreateRequest};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ClientError;
use crate::pagination::next_offset;
use crate::retry::{retry_with_backoff, Idempotency};
use crate::types::{
    CategoryListResponse, ProductListResponse, ProductResponse, ProductSummary, TokenRequest,
    TokenResponse,
};

/// Maximum number of category pages to fetch before returning an error.
/// Prevents infinite loops on a backend that never reports the end.
const MAX_PAGES: usize = 500;

/// Error bodies longer than this are truncated before being attached to
/// [`ClientError::UnexpectedStatus`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Header carrying a pre-issued admin API token.
const API_TOKEN_HEADER: &str = "x-medusa-access-token";

#[derive(Clone)]
enum Session {
    /// JWT obtained from `POST /admin/auth/token`.
    Bearer(String),
    /// Pre-issued API token.
    ApiToken(String),
}

/// HTTP client for the Medusa admin REST API.
///
/// Wraps `reqwest` with admin authentication, typed responses, and retry of
/// transient failures (429, network errors, and 5xx on idempotent requests)
/// with exponential backoff up to `max_retries` additional attempts.
pub struct MedusaClient {
    client: Client,
    base_url: Url,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
    session: Option<Session>,
}

impl MedusaClient {
    /// Creates an unauthenticated client for the backend at `base_url`.
    ///
    /// `max_retries` is the number of additional attempts after the first
    /// failure for retriable errors. Set to `0` to disable retries.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidBaseUrl`] if `base_url` is not an absolute
    ///   `http`/`https` URL.
    /// - [`ClientError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ClientError> {
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url,
            max_retries,
            backoff_base_secs,
            session: None,
        })
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Establishes an admin session used by every later call.
    ///
    /// Email/password credentials are exchanged for a JWT via
    /// `POST /admin/auth/token`. A pre-issued token is verified with
    /// `GET /admin/auth` so a bad token fails here rather than on the first row.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Unauthorized`] if the backend rejects the credentials.
    /// - Any transport, status, or decoding error from the auth call.
    pub async fn authenticate(&mut self, credentials: &AdminCredentials) -> Result<(), ClientError> {
        match credentials {
            AdminCredentials::Password { email, password } => {
                let body = TokenRequest {
                    email: email.as_str(),
                    password: password.as_str(),
                };
                let token: TokenResponse = self
                    .send_json(
                        Method::POST,
                        "admin/auth/token",
                        &[],
                        Some(&body),
                        Idempotency::Idempotent,
                        "admin auth token",
                    )
                    .await?;
                self.session = Some(Session::Bearer(token.access_token));
            }
            AdminCredentials::Token(token) => {
                self.session = Some(Session::ApiToken(token.clone()));
                let verified: Result<serde_json::Value, ClientError> =
                    self.get_json("admin/auth", &[], "admin session").await;
                if let Err(e) = verified {
                    self.session = None;
                    return Err(e);
                }
            }
        }

        tracing::info!(base_url = %self.base_url, "authenticated against admin API");
        Ok(())
    }

    /// Fetches one page of product categories with their parent embedded.
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and decoding errors.
    pub async fn list_categories_page(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<CategoryListResponse, ClientError> {
        let limit_str = limit.to_string();
        let offset_str = offset.to_string();
        self.get_json(
            "admin/product-categories",
            &[
                ("limit", limit_str.as_str()),
                ("offset", offset_str.as_str()),
                ("expand", "parent_category"),
            ],
            &format!("product categories (offset={offset})"),
        )
        .await
    }

    /// Fetches every product category by following offset pagination until
    /// the backend reports no more pages.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::list_categories_page`]. Returns
    /// [`ClientError::PaginationLimit`] if the listing exceeds [`MAX_PAGES`].
    pub async fn list_all_categories(&self, page_size: u32) -> Result<Vec<CategoryNode>, ClientError> {
        let page_size = page_size.max(1);
        let mut all: Vec<CategoryNode> = Vec::new();
        let mut offset = 0u32;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(ClientError::PaginationLimit {
                    resource: "product categories",
                    max_pages: MAX_PAGES,
                });
            }

            let page = self.list_categories_page(page_size, offset).await?;
            let page_len = page.product_categories.len();
            all.extend(page.product_categories);

            tracing::debug!(offset, page_len, total = ?page.count, "fetched category page");

            match next_offset(offset, page_size, page_len, page.count) {
                Some(next) => offset = next,
                None => break,
            }
        }

        Ok(all)
    }

    /// Lists products whose handle matches `handle`.
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and decoding errors.
    pub async fn find_products_by_handle(
        &self,
        handle: &str,
    ) -> Result<Vec<ProductSummary>, ClientError> {
        let response: ProductListResponse = self
            .get_json(
                "admin/products",
                &[("handle", handle)],
                &format!("products (handle={handle})"),
            )
            .await?;
        Ok(response.products)
    }

    /// Returns `true` if the backend already holds any product with `handle`.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::find_products_by_handle`].
    pub async fn products_exist_with_handle(&self, handle: &str) -> Result<bool, ClientError> {
        let matches = self.find_products_by_handle(handle).await?;
        Ok(!matches.is_empty())
    }

    /// Creates a product. Not retried on timeouts or 5xx, since the backend
    /// may already have created it.
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and decoding errors. Validation failures
    /// reported by the backend surface as [`ClientError::UnexpectedStatus`]
    /// with the response body attached.
    pub async fn create_product(
        &self,
        request: &ProductCreateRequest,
    ) -> Result<ProductSummary, ClientError> {
        let response: ProductResponse = self
            .send_json(
                Method::POST,
                "admin/products",
                &[],
                Some(request),
                Idempotency::NonIdempotent,
                &format!("create product (handle={})", request.handle),
            )
            .await?;
        Ok(response.product)
    }

    async fn get_json<T>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        context: &str,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        self.send_json::<T, ()>(
            Method::GET,
            path,
            query,
            None,
            Idempotency::Idempotent,
            context,
        )
        .await
    }

    /// Sends one admin API request with retry, mapping non-2xx statuses to
    /// typed errors and decoding the JSON body into `T`.
    async fn send_json<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
        idempotency: Idempotency,
        context: &str,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path, query)?;

        retry_with_backoff(self.max_retries, self.backoff_base_secs, idempotency, || {
            let url = url.clone();
            let method = method.clone();
            async move {
                let mut request = self.client.request(method, url.clone());
                if let Some(body) = body {
                    request = request.json(body);
                }
                let response = self.authorize(request).send().await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ClientError::RateLimited {
                        url: url.to_string(),
                        retry_after_secs,
                    });
                }

                if status == StatusCode::UNAUTHORIZED {
                    return Err(ClientError::Unauthorized {
                        url: url.to_string(),
                    });
                }

                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(ClientError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                        body: truncate_body(&body),
                    });
                }

                let text = response.text().await?;
                serde_json::from_str::<T>(&text).map_err(|e| ClientError::Deserialize {
                    context: context.to_owned(),
                    source: e,
                })
            }
        })
        .await
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.session {
            Some(Session::Bearer(token)) => request.bearer_auth(token),
            Some(Session::ApiToken(token)) => request.header(API_TOKEN_HEADER, token),
            None => request,
        }
    }

    /// Resolves `path` against the base URL and appends percent-encoded
    /// query parameters.
    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

/// Parses and normalises the backend base URL so it ends with exactly one
/// slash; relative endpoint paths then resolve beneath it rather than
/// replacing its last segment.
fn parse_base_url(base_url: &str) -> Result<Url, ClientError> {
    let invalid = |reason: String| ClientError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason,
    };

    let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
    let url = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme \"{}\"", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base".to_owned()));
    }
    Ok(url)
}

fn truncate_body(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(MAX_ERROR_BODY_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
