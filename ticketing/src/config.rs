//! Configuration management for the platform.
//!
//! Loads configuration from environment variables with sensible defaults.
//! The binary loads a `.env` file with `dotenvy` before calling
//! [`PlatformConfig::from_env`].

use crate::types::{FeePercent, Money, Principal};
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

/// Default minimum organizer withdrawal, in base units
pub const DEFAULT_MIN_WITHDRAWAL: u128 = 1_000_000;

/// Default payment sanity ceiling, in base units
pub const DEFAULT_MAX_PAYMENT: u128 = 1_000_000_000_000_000_000_000;

/// Default notification broadcast capacity
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 256;

/// Platform configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Admin principal of all three components
    pub admin: Principal,
    /// Initial platform fee
    pub platform_fee_percent: FeePercent,
    /// Smallest organizer withdrawal accepted
    pub min_withdrawal: Money,
    /// Largest single payment accepted
    pub max_payment: Money,
    /// Capacity of the notification broadcast channel
    pub notification_capacity: usize,
}

impl PlatformConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `STAGEPASS_ADMIN`: Admin principal as a UUID (default: random)
    /// - `STAGEPASS_PLATFORM_FEE_PERCENT`: Initial fee, 0-20 (default: 5)
    /// - `STAGEPASS_MIN_WITHDRAWAL`: Minimum withdrawal (default: 1000000)
    /// - `STAGEPASS_MAX_PAYMENT`: Payment ceiling (default: 10^21)
    /// - `STAGEPASS_NOTIFICATION_CAPACITY`: Broadcast capacity (default: 256)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unparseable values fall back to the default with a warning.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let admin = lookup("STAGEPASS_ADMIN")
            .and_then(|s| parse_or_warn::<Uuid>("STAGEPASS_ADMIN", &s))
            .map_or_else(Principal::new, Principal::from_uuid);

        let platform_fee_percent = lookup("STAGEPASS_PLATFORM_FEE_PERCENT")
            .and_then(|s| parse_or_warn::<FeePercent>("STAGEPASS_PLATFORM_FEE_PERCENT", &s))
            .unwrap_or_default();

        let min_withdrawal = lookup("STAGEPASS_MIN_WITHDRAWAL")
            .and_then(|s| parse_or_warn::<u128>("STAGEPASS_MIN_WITHDRAWAL", &s))
            .unwrap_or(DEFAULT_MIN_WITHDRAWAL);

        let max_payment = lookup("STAGEPASS_MAX_PAYMENT")
            .and_then(|s| parse_or_warn::<u128>("STAGEPASS_MAX_PAYMENT", &s))
            .unwrap_or(DEFAULT_MAX_PAYMENT);

        let notification_capacity = lookup("STAGEPASS_NOTIFICATION_CAPACITY")
            .and_then(|s| parse_or_warn::<usize>("STAGEPASS_NOTIFICATION_CAPACITY", &s))
            .unwrap_or(DEFAULT_NOTIFICATION_CAPACITY);

        Self {
            admin,
            platform_fee_percent,
            min_withdrawal: Money::from_units(min_withdrawal),
            max_payment: Money::from_units(max_payment),
            notification_capacity,
        }
    }

    /// Default configuration with the given admin
    #[must_use]
    pub fn with_admin(admin: Principal) -> Self {
        Self {
            admin,
            ..Self::default()
        }
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_or_warn<T>(key: &str, raw: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(key, value = raw, %error, "ignoring invalid configuration value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = PlatformConfig::default();
        assert_eq!(config.platform_fee_percent.get(), 5);
        assert_eq!(config.min_withdrawal, Money::from_units(1_000_000));
        assert_eq!(config.max_payment, Money::from_units(DEFAULT_MAX_PAYMENT));
        assert_eq!(config.notification_capacity, 256);
        assert!(!config.admin.is_null());
    }

    #[test]
    fn values_are_read_from_lookup() {
        let admin = Uuid::new_v4();
        let admin_text = admin.to_string();
        let config = PlatformConfig::from_lookup(lookup_from(&[
            ("STAGEPASS_ADMIN", admin_text.as_str()),
            ("STAGEPASS_PLATFORM_FEE_PERCENT", "12"),
            ("STAGEPASS_MIN_WITHDRAWAL", "50"),
        ]));
        assert_eq!(config.admin, Principal::from_uuid(admin));
        assert_eq!(config.platform_fee_percent.get(), 12);
        assert_eq!(config.min_withdrawal, Money::from_units(50));
    }

    #[test]
    fn out_of_range_fee_falls_back() {
        let config = PlatformConfig::from_lookup(lookup_from(&[(
            "STAGEPASS_PLATFORM_FEE_PERCENT",
            "35",
        )]));
        assert_eq!(config.platform_fee_percent, FeePercent::DEFAULT);
    }
}
