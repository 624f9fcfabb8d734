use serde::Deserialize;
use serde_json::Value;

use crate::logging::LogLevel;
use crate::reveal::{RootMargin, TriggerMode};

pub const CONFIG_ELEMENT_ID: &str = "site-config";
pub const SECTION_SELECTOR: &str = ".section, .hero";

pub const DEFAULT_NAV_OFFSET_PX: u64 = 80;
pub const DEFAULT_NAVBAR_SCROLLED_AFTER_PX: u64 = 50;
pub const DEFAULT_COUNTER_DURATION_MS: u64 = 2_000;
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;
pub const DEFAULT_NOTIFICATION_DISMISS_MS: u64 = 5_000;
pub const DEFAULT_NOTIFICATION_EXIT_MS: u64 = 300;
pub const DEFAULT_SUBMIT_DELAY_MS: u64 = 1_500;
pub const DEFAULT_RIPPLE_DURATION_MS: u64 = 600;
pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const NAV_OFFSET_PX_BOUNDS: (u64, u64) = (0, 400);
const NAVBAR_SCROLLED_AFTER_PX_BOUNDS: (u64, u64) = (0, 1_000);
const COUNTER_DURATION_MS_BOUNDS: (u64, u64) = (1, 60_000);
const FRAME_INTERVAL_MS_BOUNDS: (u64, u64) = (1, 1_000);
const NOTIFICATION_DISMISS_MS_BOUNDS: (u64, u64) = (100, 60_000);
const NOTIFICATION_EXIT_MS_BOUNDS: (u64, u64) = (0, 5_000);
const SUBMIT_DELAY_MS_BOUNDS: (u64, u64) = (0, 60_000);
const RIPPLE_DURATION_MS_BOUNDS: (u64, u64) = (0, 5_000);

#[derive(Clone, Debug, PartialEq)]
pub struct SiteConfig {
    pub nav_offset_px: f64,
    pub navbar_scrolled_after_px: f64,
    pub counter_duration_ms: u64,
    pub frame_interval_ms: u64,
    pub notification_dismiss_ms: u64,
    pub notification_exit_ms: u64,
    pub submit_delay_ms: u64,
    pub ripple_duration_ms: u64,
    pub log_level: LogLevel,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            nav_offset_px: DEFAULT_NAV_OFFSET_PX as f64,
            navbar_scrolled_after_px: DEFAULT_NAVBAR_SCROLLED_AFTER_PX as f64,
            counter_duration_ms: DEFAULT_COUNTER_DURATION_MS,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            notification_dismiss_ms: DEFAULT_NOTIFICATION_DISMISS_MS,
            notification_exit_ms: DEFAULT_NOTIFICATION_EXIT_MS,
            submit_delay_ms: DEFAULT_SUBMIT_DELAY_MS,
            ripple_duration_ms: DEFAULT_RIPPLE_DURATION_MS,
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

/// Result of reading page-embedded overrides. `rejected` lists the keys
/// that were present but unusable so the caller can log them once logging
/// is configured.
pub struct LoadedConfig {
    pub config: SiteConfig,
    pub rejected: Vec<String>,
}

impl SiteConfig {
    /// Builds a config from the JSON text of the `#site-config` script block.
    /// Any field that is missing, of the wrong type or out of bounds keeps
    /// its default.
    pub fn from_json(raw: Option<&str>) -> LoadedConfig {
        let mut rejected = Vec::new();
        let overrides = match raw.map(str::trim).filter(|value| !value.is_empty()) {
            Some(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(map)) => Value::Object(map),
                _ => {
                    rejected.push(CONFIG_ELEMENT_ID.to_string());
                    Value::Null
                }
            },
            None => Value::Null,
        };

        let mut read = |key: &str, default: u64, bounds: (u64, u64)| {
            parse_u64_with_bounds(&overrides, key, default, bounds, &mut rejected)
        };

        let nav_offset_px = read("nav_offset_px", DEFAULT_NAV_OFFSET_PX, NAV_OFFSET_PX_BOUNDS);
        let navbar_scrolled_after_px = read(
            "navbar_scrolled_after_px",
            DEFAULT_NAVBAR_SCROLLED_AFTER_PX,
            NAVBAR_SCROLLED_AFTER_PX_BOUNDS,
        );
        let counter_duration_ms = read(
            "counter_duration_ms",
            DEFAULT_COUNTER_DURATION_MS,
            COUNTER_DURATION_MS_BOUNDS,
        );
        let frame_interval_ms = read(
            "frame_interval_ms",
            DEFAULT_FRAME_INTERVAL_MS,
            FRAME_INTERVAL_MS_BOUNDS,
        );
        let notification_dismiss_ms = read(
            "notification_dismiss_ms",
            DEFAULT_NOTIFICATION_DISMISS_MS,
            NOTIFICATION_DISMISS_MS_BOUNDS,
        );
        let notification_exit_ms = read(
            "notification_exit_ms",
            DEFAULT_NOTIFICATION_EXIT_MS,
            NOTIFICATION_EXIT_MS_BOUNDS,
        );
        let submit_delay_ms = read("submit_delay_ms", DEFAULT_SUBMIT_DELAY_MS, SUBMIT_DELAY_MS_BOUNDS);
        let ripple_duration_ms = read(
            "ripple_duration_ms",
            DEFAULT_RIPPLE_DURATION_MS,
            RIPPLE_DURATION_MS_BOUNDS,
        );
        let log_level = parse_log_level(&overrides, "log_level", DEFAULT_LOG_LEVEL, &mut rejected);

        LoadedConfig {
            config: Self {
                nav_offset_px: nav_offset_px as f64,
                navbar_scrolled_after_px: navbar_scrolled_after_px as f64,
                counter_duration_ms,
                frame_interval_ms,
                notification_dismiss_ms,
                notification_exit_ms,
                submit_delay_ms,
                ripple_duration_ms,
                log_level,
            },
            rejected,
        }
    }
}

fn parse_u64_with_bounds(
    overrides: &Value,
    key: &str,
    default: u64,
    bounds: (u64, u64),
    rejected: &mut Vec<String>,
) -> u64 {
    let Some(raw) = overrides.get(key) else {
        return default;
    };

    match raw.as_u64().filter(|value| (bounds.0..=bounds.1).contains(value)) {
        Some(value) => value,
        None => {
            rejected.push(key.to_string());
            default
        }
    }
}

fn parse_log_level(
    overrides: &Value,
    key: &str,
    default: LogLevel,
    rejected: &mut Vec<String>,
) -> LogLevel {
    let Some(raw) = overrides.get(key) else {
        return default;
    };

    match LogLevel::deserialize(raw) {
        Ok(level) => level,
        Err(_) => {
            rejected.push(key.to_string());
            default
        }
    }
}

/// A set of watched elements that share one visibility rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealPreset {
    pub name: &'static str,
    pub selector: &'static str,
    pub threshold: f64,
    pub root_margin: &'static str,
    /// Class added to the element when it comes into view.
    pub marker: &'static str,
    pub mode: TriggerMode,
    pub starts_counter: bool,
}

impl RevealPreset {
    pub fn margin(&self) -> RootMargin {
        RootMargin::parse(self.root_margin).unwrap_or_default()
    }
}

pub const REVEAL_PRESETS: [RevealPreset; 4] = [
    RevealPreset {
        name: "counters",
        selector: ".stat-number",
        threshold: 0.5,
        root_margin: "0px",
        marker: "counted",
        mode: TriggerMode::OneShot,
        starts_counter: true,
    },
    RevealPreset {
        name: "fade-in",
        selector: ".practice-card, .team-card, .about-text, .contact-item, .blog-card",
        threshold: 0.1,
        root_margin: "0px 0px -50px 0px",
        marker: "fade-in",
        mode: TriggerMode::OneShot,
        starts_counter: false,
    },
    RevealPreset {
        name: "team-cards",
        selector: ".team-card",
        threshold: 0.2,
        root_margin: "0px 0px -50px 0px",
        marker: "animate",
        mode: TriggerMode::OneShot,
        starts_counter: false,
    },
    RevealPreset {
        name: "contact-form",
        selector: "#contactForm",
        threshold: 0.2,
        root_margin: "0px 0px -50px 0px",
        marker: "animate",
        mode: TriggerMode::OneShot,
        starts_counter: false,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_block_yields_defaults() {
        let loaded = SiteConfig::from_json(None);

        assert_eq!(loaded.config, SiteConfig::default());
        assert!(loaded.rejected.is_empty());
    }

    #[test]
    fn valid_overrides_are_applied() {
        let loaded = SiteConfig::from_json(Some(
            r#"{ "nav_offset_px": 64, "submit_delay_ms": 10, "log_level": "debug" }"#,
        ));

        assert_eq!(loaded.config.nav_offset_px, 64.0);
        assert_eq!(loaded.config.submit_delay_ms, 10);
        assert_eq!(loaded.config.log_level, LogLevel::Debug);
        assert_eq!(loaded.config.counter_duration_ms, DEFAULT_COUNTER_DURATION_MS);
        assert!(loaded.rejected.is_empty());
    }

    #[test]
    fn out_of_bounds_and_mistyped_fields_fall_back_individually() {
        let loaded = SiteConfig::from_json(Some(
            r#"{ "nav_offset_px": 9000, "frame_interval_ms": "fast", "ripple_duration_ms": 100, "log_level": "trace" }"#,
        ));

        assert_eq!(loaded.config.nav_offset_px, DEFAULT_NAV_OFFSET_PX as f64);
        assert_eq!(loaded.config.frame_interval_ms, DEFAULT_FRAME_INTERVAL_MS);
        assert_eq!(loaded.config.ripple_duration_ms, 100);
        assert_eq!(loaded.config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(
            loaded.rejected,
            vec![
                "nav_offset_px".to_string(),
                "frame_interval_ms".to_string(),
                "log_level".to_string()
            ]
        );
    }

    #[test]
    fn malformed_json_falls_back_to_defaults() {
        let loaded = SiteConfig::from_json(Some("{ not json"));

        assert_eq!(loaded.config, SiteConfig::default());
        assert_eq!(loaded.rejected, vec![CONFIG_ELEMENT_ID.to_string()]);
    }

    #[test]
    fn presets_carry_parseable_margins() {
        for preset in REVEAL_PRESETS {
            assert!(
                RootMargin::parse(preset.root_margin).is_some(),
                "preset {} should have a valid root margin",
                preset.name
            );
        }
        assert_eq!(REVEAL_PRESETS[1].margin().bottom, -50.0);
    }
}
