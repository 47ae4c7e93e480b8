//! Correlation identifiers for accessor operations
//!
//! Every fetch and update runs under a [`RequestContext`]. Operations that
//! fan out (refresh-all, page mount) share one [`TraceId`] so the parallel
//! round-trips can be grouped in the logs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Time-ordered (UUIDv7) string id with `as_str`, `Display` and
/// transparent serde
macro_rules! correlation_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Wrap an id received from elsewhere
            pub fn from_string(s: String) -> Self {
                Self(s)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

correlation_id!(
    /// Identifier for a single accessor operation
    RequestId
);

correlation_id!(
    /// Identifier shared by a group of related operations
    TraceId
);

/// Context carried through one accessor operation
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub trace_id: Option<TraceId>,
}

impl RequestContext {
    /// Create a new context with a fresh RequestId and no trace
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            trace_id: None,
        }
    }

    /// Create a fresh context that belongs to an existing trace
    pub fn in_trace(trace_id: &TraceId) -> Self {
        Self::new().with_trace_id(trace_id.clone())
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Trace id as a string, empty when the operation is untraced
    pub fn trace_str(&self) -> &str {
        self.trace_id.as_ref().map(TraceId::as_str).unwrap_or("")
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_generation() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();

        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_request_id_display() {
        let id = RequestId::new();
        assert_eq!(format!("{}", id), id.as_str());
    }

    #[test]
    fn test_contexts_in_same_trace_share_trace_id() {
        let trace = TraceId::new();
        let a = RequestContext::in_trace(&trace);
        let b = RequestContext::in_trace(&trace);

        assert_ne!(a.request_id, b.request_id);
        assert_eq!(a.trace_id, b.trace_id);
        assert_eq!(a.trace_str(), trace.as_str());
    }

    #[test]
    fn test_untraced_context_has_empty_trace_str() {
        let ctx = RequestContext::new();
        assert!(ctx.trace_id.is_none());
        assert_eq!(ctx.trace_str(), "");
    }

    #[test]
    fn test_serialization() {
        let id = TraceId::from_string("trace-1".to_string());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"trace-1\"");
        let back: TraceId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
