//! Gateway-wide constants
//!
//! Single source of truth for model defaults, limits and canned strings.

/// Defaults for the generative backend connection
pub mod defaults {
    /// Base URL of the Generative Language REST API
    pub const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
    /// Model used for every call kind
    pub const MODEL: &str = "gemini-2.5-flash";
    /// Default per-call deadline in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 90;
    /// Reasoning budget for audience and copy generation
    pub const TEXT_THINKING_BUDGET: u32 = 2048;
    /// Reasoning budget for creative analysis
    pub const VISION_THINKING_BUDGET: u32 = 1024;
}

/// Input limits enforced at the gateway boundary
pub mod limits {
    /// Largest attachment accepted for creative analysis (20 MiB)
    pub const MAX_ATTACHMENT_BYTES: u64 = 20 * 1024 * 1024;
}

/// Bounds the model is asked to respect. Advisory only.
pub mod bounds {
    use std::ops::RangeInclusive;

    pub const MATCH_SCORE: RangeInclusive<i64> = 75..=99;
    pub const CREATIVE_SCORE: RangeInclusive<i64> = 1..=100;
    pub const INTERESTS: RangeInclusive<usize> = 7..=10;
    pub const BEHAVIORS: RangeInclusive<usize> = 2..=3;
    pub const EXCLUSIONS: RangeInclusive<usize> = 2..=3;
    /// Results per audience or copy call
    pub const VARIANTS_PER_CALL: usize = 3;
}

/// Environment variables consulted by `GatewayConfig::apply_env`
pub mod env {
    pub const API_BASE: &[&str] = &["ADSBOOT_API_BASE", "GEMINI_API_BASE"];
    pub const API_KEY: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY", "API_KEY"];
    pub const MODEL: &str = "ADSBOOT_MODEL";
}

/// File names and directories
pub mod paths {
    /// Application directory name under the platform config dir
    pub const APP_DIR: &str = "adsboot";
    /// Configuration file name inside the application directory
    pub const CONFIG_FILE: &str = "config.json";
}

/// Marker substituted when the user gives no creative context
pub const NO_CONTEXT_MARKER: &str = "None provided";

/// Reply used when the backend answers a chat turn with no text
pub const EMPTY_CHAT_REPLY: &str = "I couldn't generate a response.";
