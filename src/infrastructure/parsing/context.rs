//! Parsing context for HTML extraction

/// Context information for parsing operations
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// Base URL for resolving relative links
    pub base_url: String,
}

impl ParseContext {
    /// Create new parse context
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}
