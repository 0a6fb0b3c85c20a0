use serde::{Deserialize, Serialize};

/// Stencil metadata. Several rows may share a `numero`; the one with the
/// highest `id` is the current one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StencilInfo {
    pub id: i64,
    pub numero: String,
    pub model: Option<String>,
}
