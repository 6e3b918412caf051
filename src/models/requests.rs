//! Request DTOs for the aggregation cache API
//!
//! Query-string parameters for the cache endpoints; the aggregation
//! request itself travels in the path.

use serde::Deserialize;

/// Query parameters for GET /aggregate/:group_by/:column/:func
#[derive(Debug, Clone, Deserialize)]
pub struct AggregateParams {
    /// Optional TTL override in seconds (uses the configured default if absent)
    #[serde(default)]
    pub ttl: Option<u64>,
}

/// Query parameters for DELETE /clear
#[derive(Debug, Clone, Deserialize)]
pub struct ClearParams {
    /// Glob pattern of keys to remove (default `cache:*`)
    #[serde(default)]
    pub pattern: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_params_default() {
        let params: AggregateParams = serde_json::from_str("{}").unwrap();
        assert!(params.ttl.is_none());
    }

    #[test]
    fn test_aggregate_params_with_ttl() {
        let params: AggregateParams = serde_json::from_str(r#"{"ttl": 60}"#).unwrap();
        assert_eq!(params.ttl, Some(60));
    }

    #[test]
    fn test_clear_params_with_pattern() {
        let params: ClearParams = serde_json::from_str(r#"{"pattern": "cache:mean*"}"#).unwrap();
        assert_eq!(params.pattern.as_deref(), Some("cache:mean*"));
    }
}
