//! GraphQL wire types.

use serde::{Deserialize, Serialize};

/// Request body for a GraphQL operation.
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: &'a serde_json::Value,
}

/// Response envelope. `data` is kept untyped until errors have been checked,
/// since a failed operation often returns partial or null data.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlErrorBody>>,
}

/// One entry of the `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlErrorBody {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<ErrorExtensions>,
}

impl GraphQlErrorBody {
    /// The message meant for end users, falling back to the raw message.
    pub fn display_message(&self) -> &str {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.user_presentable_message.as_deref())
            .unwrap_or(&self.message)
    }

    pub fn code(&self) -> Option<&str> {
        self.extensions.as_ref().and_then(|ext| ext.code.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorExtensions {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub user_presentable_message: Option<String>,
}

/// A paginated list of nodes.
#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    pub nodes: Vec<T>,
    #[serde(default, rename = "pageInfo")]
    pub page_info: Option<PageInfo>,
}

impl<T> Connection<T> {
    /// Cursor for the next page, if there is one.
    pub fn next_cursor(&self) -> Option<&str> {
        self.page_info
            .as_ref()
            .filter(|info| info.has_next_page)
            .and_then(|info| info.end_cursor.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// Payload shared by delete/archive mutations.
#[derive(Debug, Clone, Deserialize)]
pub struct MutationPayload {
    pub success: bool,
}
