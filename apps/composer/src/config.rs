use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Numeric constants that drive normalization and packing.
///
/// `Default` carries the production values. Only `text_weight_cap` is exposed to the
/// environment; the rest are tuned against the A4 templates and rarely change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPolicy {
    /// Maximum weight a single page can carry.
    pub page_capacity: u32,
    /// Weight contributed by an image (or a caption standing in for one).
    pub image_weight: u32,
    /// Body characters per point of text weight.
    pub chars_per_weight: u32,
    /// Upper bound on the text share of a unit's weight. 80 or 50 depending on policy.
    pub text_weight_cap: u32,
    /// First-fragment character budget for a unit that shares its page with an image.
    pub limit_with_image: usize,
    /// Character budget for text-only units and every continuation fragment.
    pub limit_text_only: usize,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        Self {
            page_capacity: 100,
            image_weight: 50,
            chars_per_weight: 20,
            text_weight_cap: 80,
            limit_with_image: 1100,
            limit_text_only: 2200,
        }
    }
}

/// Composer configuration loaded from environment variables.
/// Every variable is optional; missing ones fall back to the documented defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub policy: LayoutPolicy,
    /// Upper bound on a single image metadata lookup before it is treated as unavailable.
    pub image_timeout: Duration,
    /// Maximum number of units resolved concurrently.
    pub max_concurrency: usize,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy: LayoutPolicy::default(),
            image_timeout: Duration::from_millis(2000),
            max_concurrency: 8,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        let text_weight_cap = optional_env("COMPOSER_TEXT_WEIGHT_CAP")
            .map(|v| {
                v.parse::<u32>()
                    .context("COMPOSER_TEXT_WEIGHT_CAP must be a non-negative integer")
            })
            .transpose()?
            .unwrap_or(defaults.policy.text_weight_cap);

        if text_weight_cap > defaults.policy.page_capacity {
            bail!(
                "COMPOSER_TEXT_WEIGHT_CAP ({text_weight_cap}) cannot exceed the page capacity ({})",
                defaults.policy.page_capacity
            );
        }

        let image_timeout_ms = optional_env("COMPOSER_IMAGE_TIMEOUT_MS")
            .map(|v| {
                v.parse::<u64>()
                    .context("COMPOSER_IMAGE_TIMEOUT_MS must be a number of milliseconds")
            })
            .transpose()?;

        let max_concurrency = optional_env("COMPOSER_MAX_CONCURRENCY")
            .map(|v| {
                v.parse::<usize>()
                    .context("COMPOSER_MAX_CONCURRENCY must be a positive integer")
            })
            .transpose()?
            .unwrap_or(defaults.max_concurrency);

        if max_concurrency == 0 {
            bail!("COMPOSER_MAX_CONCURRENCY must be at least 1");
        }

        Ok(Config {
            policy: LayoutPolicy {
                text_weight_cap,
                ..defaults.policy
            },
            image_timeout: image_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.image_timeout),
            max_concurrency,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_values() {
        let policy = LayoutPolicy::default();
        assert_eq!(policy.page_capacity, 100);
        assert_eq!(policy.image_weight, 50);
        assert_eq!(policy.text_weight_cap, 80);
        assert_eq!(policy.limit_with_image, 1100);
        assert_eq!(policy.limit_text_only, 2200);
    }

    #[test]
    fn test_default_config_is_bounded() {
        let config = Config::default();
        assert!(config.max_concurrency >= 1);
        assert_eq!(config.image_timeout, Duration::from_secs(2));
    }
}
