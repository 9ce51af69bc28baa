//! Persistent identifier (handle) service trait.

use async_trait::async_trait;

use crate::result::AppResult;

/// Access to the handle server.
#[async_trait]
pub trait HandleService: Send + Sync + std::fmt::Debug + 'static {
    /// Whether the value is syntactically a handle (`hdl:` or a proxy URL).
    fn is_handle(&self, value: &str) -> bool;

    /// Whether the handle is registered with the handle server.
    async fn validate(&self, handle: &str) -> AppResult<bool>;
}
