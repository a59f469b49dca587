//! Session identity attached to every gateway request.
//!
//! The landing page generates one opaque identifier per visit so the
//! automation workflow can stitch individual turns back into a single
//! conversation. The identifier is created once, when the session context
//! is constructed, and is never regenerated for the lifetime of that
//! context.

use uuid::Uuid;

/// Sentinel section tag used when no page region is identified.
pub const DEFAULT_SECTION: &str = "main";

/// Per-visit correlation context: a stable opaque id plus the page
/// section the chat was opened from.
#[derive(Debug, Clone)]
pub struct SessionContext {
    id: String,
    section: String,
}

impl SessionContext {
    /// Create a fresh session scoped to the given page section.
    pub fn new(section: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            section: section.into(),
        }
    }

    /// The opaque session identifier. Stable for the life of the context.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The page section tag sent alongside every turn.
    pub fn section(&self) -> &str {
        &self.section
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(DEFAULT_SECTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_stable() {
        let session = SessionContext::new("pricing");
        let first = session.id().to_string();
        assert_eq!(session.id(), first);
        assert_eq!(session.section(), "pricing");
    }

    #[test]
    fn test_sessions_are_distinct() {
        let a = SessionContext::default();
        let b = SessionContext::default();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.section(), DEFAULT_SECTION);
    }
}
