//! Short-link creation and lookup
//!
//! [`ShortLinkService`] validates input, drives the code generator against
//! the store and owns the bounded collision retry loop. It keeps no copies of
//! records: every read goes through the store.

use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ServiceError, StoreError};
use crate::generator::{draw, CodeGenerator};
use crate::model::{NewShortLink, ShortCode, ShortLinkRecord};
use crate::store::MappingStore;

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Default number of candidates tried before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

pub const MAX_TITLE_LEN: usize = 256;
pub const MAX_URL_LEN: usize = 2048;

#[derive(Clone)]
pub struct ShortLinkService {
    store: Arc<dyn MappingStore>,
    generator: Arc<dyn CodeGenerator>,
    max_attempts: u32,
}

impl ShortLinkService {
    pub fn new(store: Arc<dyn MappingStore>, generator: Arc<dyn CodeGenerator>) -> Self {
        Self {
            store,
            generator,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides the retry bound. At least one attempt is always made.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn store(&self) -> &Arc<dyn MappingStore> {
        &self.store
    }

    /// Creates a new mapping for `original_url` labelled `title`.
    ///
    /// Both inputs are trimmed before validation. Collisions, whether seen by
    /// the membership check or by the store's atomic insert, consume one
    /// attempt each; after `max_attempts` the call fails with
    /// [`ServiceError::GenerationFailure`].
    pub fn create(&self, title: &str, original_url: &str) -> Result<ShortLinkRecord> {
        let title = validate_title(title)?;
        let original_url = validate_url(original_url)?;

        for attempt in 1..=self.max_attempts {
            let Some(code) = draw(self.generator.as_ref(), self.store.as_ref())? else {
                debug!(attempt, "generated code already taken, retrying");
                continue;
            };

            let link = NewShortLink {
                code,
                title: title.clone(),
                original_url: original_url.clone(),
            };

            match self.store.insert(link) {
                Ok(record) => {
                    info!(code = %record.code, attempt, "short link created");
                    return Ok(record);
                }
                Err(StoreError::CodeCollision(code)) => {
                    debug!(%code, attempt, "lost insert race, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }

        warn!(attempts = self.max_attempts, "short code generation exhausted");
        Err(ServiceError::GenerationFailure {
            attempts: self.max_attempts,
        })
    }

    /// All records, oldest first.
    pub fn list(&self) -> Result<Vec<ShortLinkRecord>> {
        Ok(self.store.list_all()?)
    }

    /// Looks up the full record for a code.
    pub fn get(&self, code: &str) -> Result<ShortLinkRecord> {
        let not_found = || ServiceError::NotFound(code.to_string());
        let code = ShortCode::parse(code).ok_or_else(not_found)?;
        self.store.get(&code)?.ok_or_else(not_found)
    }

    /// Maps a code back to its destination URL.
    pub fn resolve(&self, code: &str) -> Result<String> {
        self.get(code).map(|record| record.original_url)
    }
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ServiceError::validation("title", "must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ServiceError::validation(
            "title",
            format!("must be at most {MAX_TITLE_LEN} characters"),
        ));
    }
    Ok(title.to_string())
}

/// Accepts absolute http(s) URLs with a host. The trimmed input is kept as
/// given, not the normalized form, so resolve returns exactly what was sent.
///
/// Only printable ASCII is allowed: the url parser silently drops tabs and
/// newlines, and the stored string must be usable verbatim as a `Location`
/// header. Non-ASCII paths and hosts have to be percent- or punycode-encoded
/// by the caller.
fn validate_url(original_url: &str) -> Result<String> {
    const FIELD: &str = "originalUrl";

    let original_url = original_url.trim();
    if original_url.is_empty() {
        return Err(ServiceError::validation(FIELD, "must not be empty"));
    }
    if original_url.len() > MAX_URL_LEN {
        return Err(ServiceError::validation(
            FIELD,
            format!("must be at most {MAX_URL_LEN} bytes"),
        ));
    }
    if let Some(c) = original_url.chars().find(|c| !c.is_ascii_graphic()) {
        return Err(ServiceError::validation(
            FIELD,
            format!(
                "contains {c:?}; whitespace, control and non-ASCII characters must be percent-encoded"
            ),
        ));
    }

    let parsed = Url::parse(original_url)
        .map_err(|e| ServiceError::validation(FIELD, format!("not an absolute URL ({e})")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ServiceError::validation(
            FIELD,
            format!("scheme must be http or https, got {}", parsed.scheme()),
        ));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ServiceError::validation(FIELD, "must include a host"));
    }

    Ok(original_url.to_string())
}
