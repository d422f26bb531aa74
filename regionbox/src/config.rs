//! Event bridge configuration.
//!
//! Configuration can be built in code with [`BridgeConfig::builder`] or read
//! from YAML:
//!
//! ```
//! use regionbox::{BridgeConfig, DeliveryPolicy, Overflow};
//!
//! let config = BridgeConfig::from_yaml(
//!     "delivery:\n  policy: bounded\n  capacity: 16\n  overflow: drop_newest\n",
//! )
//! .unwrap();
//! assert!(matches!(
//!     config.delivery,
//!     DeliveryPolicy::Bounded { overflow: Overflow::DropNewest, .. }
//! ));
//! ```

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Pending event capacity of the default [`DeliveryPolicy`].
pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1024) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

/// What a full bounded queue does with a new event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overflow {
    /// Discard the oldest pending event to make room.
    #[default]
    DropOldest,
    /// Discard the new event.
    DropNewest,
}

/// How events waiting for the host thread are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Keep only the most recent event.
    ///
    /// An event posted before the host thread drained the previous one
    /// replaces it. Callbacks see one event per wakeup at most.
    Latest,
    /// Keep up to `capacity` events in posting order.
    Bounded {
        /// Maximum number of pending events.
        capacity: NonZeroUsize,
        /// Behavior once `capacity` events are pending.
        #[serde(default)]
        overflow: Overflow,
    },
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self::Bounded {
            capacity: DEFAULT_CAPACITY,
            overflow: Overflow::DropOldest,
        }
    }
}

impl DeliveryPolicy {
    /// Short name used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Bounded { .. } => "bounded",
        }
    }
}

/// Configuration of the per-region event bridges created by a
/// [`Cache`](crate::Cache).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Delivery policy of each region's notifier.
    #[serde(default)]
    pub delivery: DeliveryPolicy,
}

impl BridgeConfig {
    /// Create a new builder for BridgeConfig.
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Parses a YAML document.
    pub fn from_yaml(document: &str) -> Result<Self, ConfigError> {
        Ok(serde_saphyr::from_str(document)?)
    }
}

/// Builder for BridgeConfig.
#[derive(Debug, Clone, Default)]
pub struct BridgeConfigBuilder {
    delivery: DeliveryPolicy,
}

impl BridgeConfigBuilder {
    /// Set the delivery policy.
    pub fn delivery(self, delivery: DeliveryPolicy) -> Self {
        Self { delivery }
    }

    /// Keep only the latest pending event.
    pub fn latest(self) -> Self {
        self.delivery(DeliveryPolicy::Latest)
    }

    /// Keep up to `capacity` pending events.
    pub fn bounded(self, capacity: NonZeroUsize, overflow: Overflow) -> Self {
        self.delivery(DeliveryPolicy::Bounded { capacity, overflow })
    }

    /// Build the BridgeConfig.
    pub fn build(self) -> BridgeConfig {
        BridgeConfig {
            delivery: self.delivery,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_bounded_drop_oldest() {
        assert_eq!(
            BridgeConfig::default().delivery,
            DeliveryPolicy::Bounded {
                capacity: DEFAULT_CAPACITY,
                overflow: Overflow::DropOldest,
            }
        );
        assert_eq!(DEFAULT_CAPACITY.get(), 1024);
    }

    #[test]
    fn test_builder() {
        let config = BridgeConfig::builder().latest().build();
        assert_eq!(config.delivery, DeliveryPolicy::Latest);

        let capacity = NonZeroUsize::new(8).unwrap();
        let config = BridgeConfig::builder()
            .bounded(capacity, Overflow::DropNewest)
            .build();
        assert_eq!(
            config.delivery,
            DeliveryPolicy::Bounded {
                capacity,
                overflow: Overflow::DropNewest,
            }
        );
    }

    #[test]
    fn test_yaml_latest() {
        let config = BridgeConfig::from_yaml("delivery:\n  policy: latest\n").unwrap();
        assert_eq!(config.delivery, DeliveryPolicy::Latest);
    }

    #[test]
    fn test_yaml_overflow_defaults_to_drop_oldest() {
        let config =
            BridgeConfig::from_yaml("delivery:\n  policy: bounded\n  capacity: 4\n").unwrap();
        assert_eq!(
            config.delivery,
            DeliveryPolicy::Bounded {
                capacity: NonZeroUsize::new(4).unwrap(),
                overflow: Overflow::DropOldest,
            }
        );
    }

    #[test]
    fn test_yaml_rejects_zero_capacity() {
        let result = BridgeConfig::from_yaml("delivery:\n  policy: bounded\n  capacity: 0\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_yaml_rejects_unknown_policy() {
        let result = BridgeConfig::from_yaml("delivery:\n  policy: everything\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_error_keeps_source() {
        use std::error::Error as _;

        let error = BridgeConfig::from_yaml("delivery: [unterminated\n").unwrap_err();
        let ConfigError::Parse(source) = &error;
        assert!(error.source().is_some());
        assert!(error.to_string().ends_with(&source.to_string()));
    }
}
