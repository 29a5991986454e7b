//! Generative request gateway for AdsBoot
//!
//! Turns short product briefs, creatives and chat messages into prompts for a
//! hosted generative model, enforces a structured-output contract on each
//! reply and returns typed results:
//! - **Audience segments**: three targeting avatars per product
//! - **Ad copy**: three variations in a chosen tone
//! - **Creative analysis**: a scored review of one image or video
//! - **Chat**: multi-turn strategist conversations with optional context
//!
//! # Example
//!
//! ```rust,ignore
//! use adsboot_gateway::{AdGateway, AudienceBrief, CallOptions, GatewayConfig};
//!
//! let mut config = GatewayConfig::load(&dir).await?;
//! config.apply_env();
//!
//! let gateway = AdGateway::gemini(config);
//! let brief = AudienceBrief::new("Smart Yoga Mat", "Tracks posture", "Adults 18-45");
//! let segments = gateway
//!     .request_audience_segments(&brief, &CallOptions::new())
//!     .await?;
//! ```

pub mod backend;
pub mod config;
pub mod constants;
pub mod context;
pub mod decode;
pub mod error;
pub mod gateway;
pub mod prompt;
pub mod schema;
pub mod session;
pub mod thread;
pub mod types;

// Re-exports for convenience
pub use backend::{GeminiBackend, ModelBackend, ModelRequest, TransportError};
pub use config::{ConfigError, GatewayConfig, ModelTuning, TuningProfiles};
pub use context::ChatSurface;
pub use error::{DecodeError, GatewayError, ValidationError};
pub use gateway::{AdGateway, CallOptions, SharedGateway};
pub use prompt::{QuickPrompt, QUICK_PROMPTS};
pub use schema::SchemaContract;
pub use session::{SessionProvider, StaticSession};
pub use thread::{ConversationThread, ConversationTurn, Role};
pub use types::{
    AdCopyVariant, AdTone, Attachment, AudienceBrief, AudienceSegment, CopyBrief,
    CreativeAnalysis, MediaKind, StopScrollPotential,
};
