// Lead reference generation

use chrono::Utc;
use uuid::Uuid;

pub const DEFAULT_LEAD_PREFIX: &str = "LEAD";

/// Produces the reference handed to the customer when a session completes.
pub trait LeadIdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// `<prefix>-<unix millis>`.
///
/// Two sessions completing within the same millisecond get the same id.
#[derive(Debug, Clone)]
pub struct TimestampLeadIds {
    prefix: String,
}

impl TimestampLeadIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for TimestampLeadIds {
    fn default() -> Self {
        Self::new(DEFAULT_LEAD_PREFIX)
    }
}

impl LeadIdGenerator for TimestampLeadIds {
    fn next_id(&self) -> String {
        format!("{}-{}", self.prefix, Utc::now().timestamp_millis())
    }
}

/// `<prefix>-<uuid v4>`
#[derive(Debug, Clone)]
pub struct UuidLeadIds {
    prefix: String,
}

impl UuidLeadIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for UuidLeadIds {
    fn default() -> Self {
        Self::new(DEFAULT_LEAD_PREFIX)
    }
}

impl LeadIdGenerator for UuidLeadIds {
    fn next_id(&self) -> String {
        format!("{}-{}", self.prefix, Uuid::new_v4())
    }
}

/// Which generator the engine is configured with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadIdStrategy {
    #[default]
    Timestamp,
    Uuid,
}

impl LeadIdStrategy {
    pub fn build(&self, prefix: &str) -> Box<dyn LeadIdGenerator> {
        match self {
            LeadIdStrategy::Timestamp => Box::new(TimestampLeadIds::new(prefix)),
            LeadIdStrategy::Uuid => Box::new(UuidLeadIds::new(prefix)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_ids_carry_prefix_and_millis() {
        let id = TimestampLeadIds::default().next_id();
        let millis = id.strip_prefix("LEAD-").unwrap();
        assert!(millis.parse::<i64>().unwrap() > 1_600_000_000_000);
    }

    #[test]
    fn uuid_ids_are_unique() {
        let ids = UuidLeadIds::new("DLR");
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(a.starts_with("DLR-"));
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.trim_start_matches("DLR-")).is_ok());
    }

    #[test]
    fn strategy_builds_matching_generator() {
        let id = LeadIdStrategy::Uuid.build("X").next_id();
        assert_eq!(id.len(), "X-".len() + 36);
    }
}
