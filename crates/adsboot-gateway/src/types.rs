//! Domain types exchanged with the gateway

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::bounds;
use crate::schema;

/// One targeting avatar produced by an audience call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceSegment {
    pub segment_name: String,
    /// Targetable interest keywords, broad and niche mixed
    pub interests: Vec<String>,
    pub behaviors: Vec<String>,
    pub exclusions: Vec<String>,
    pub demographics: String,
    pub reasoning: String,
    #[serde(deserialize_with = "whole_i64")]
    pub match_score: i64,
    /// Free-text range such as "1.2M - 1.5M"
    pub estimated_reach: String,
    pub persona_emoji: String,
}

impl AudienceSegment {
    /// Whether every advisory bound the model was asked for holds
    pub fn within_bounds(&self) -> bool {
        bounds::MATCH_SCORE.contains(&self.match_score)
            && bounds::INTERESTS.contains(&self.interests.len())
            && bounds::BEHAVIORS.contains(&self.behaviors.len())
            && bounds::EXCLUSIONS.contains(&self.exclusions.len())
    }
}

/// One ad variation produced by a copy call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdCopyVariant {
    /// Name of the persuasive strategy used
    pub angle: String,
    pub headline: String,
    pub primary_text: String,
    /// CTA line shown next to the button
    pub description: String,
}

/// Quality review of a single uploaded creative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativeAnalysis {
    #[serde(deserialize_with = "whole_i64")]
    pub score: i64,
    pub stop_scroll_potential: StopScrollPotential,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub improvements: Vec<String>,
    pub overall_feedback: String,
}

impl CreativeAnalysis {
    pub fn within_bounds(&self) -> bool {
        bounds::CREATIVE_SCORE.contains(&self.score)
    }
}

/// Categorical rating of how likely a creative stops the scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StopScrollPotential {
    High,
    Medium,
    Low,
}

impl StopScrollPotential {
    pub const ALL: [StopScrollPotential; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for StopScrollPotential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StopScrollPotential {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown stop-scroll rating '{}'", trimmed))
    }
}

impl<'de> Deserialize<'de> for StopScrollPotential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Integer fields arrive as JSON numbers; whole floats like `87.0` are common.
fn whole_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = serde_json::Number::deserialize(deserializer)?;
    schema::whole_i64(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("not a whole number: {}", value)))
}

/// Inputs for an audience call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceBrief {
    pub product_name: String,
    pub product_description: String,
    /// Base geo/demographic, may be empty
    pub base_demographic: String,
}

impl AudienceBrief {
    pub fn new(
        product_name: impl Into<String>,
        product_description: impl Into<String>,
        base_demographic: impl Into<String>,
    ) -> Self {
        Self {
            product_name: product_name.into(),
            product_description: product_description.into(),
            base_demographic: base_demographic.into(),
        }
    }

    /// Required fields are non-blank. Hosts gate the call on this.
    pub fn is_complete(&self) -> bool {
        !self.product_name.trim().is_empty() && !self.product_description.trim().is_empty()
    }
}

/// Inputs for a copy call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyBrief {
    pub product_name: String,
    pub selling_points: String,
    /// Any string is accepted; `AdTone` lists the presets
    pub tone: String,
}

impl CopyBrief {
    pub fn new(product_name: impl Into<String>, selling_points: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            selling_points: selling_points.into(),
            tone: AdTone::default().as_str().to_string(),
        }
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = tone.into();
        self
    }

    pub fn is_complete(&self) -> bool {
        !self.product_name.trim().is_empty() && !self.selling_points.trim().is_empty()
    }
}

/// Tone presets offered for copy generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdTone {
    #[default]
    PersuasiveUrgent,
    FriendlyCasual,
    ProfessionalAuthoritative,
    EmotionalStory,
    WittyHumorous,
}

impl AdTone {
    pub const ALL: [AdTone; 5] = [
        Self::PersuasiveUrgent,
        Self::FriendlyCasual,
        Self::ProfessionalAuthoritative,
        Self::EmotionalStory,
        Self::WittyHumorous,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PersuasiveUrgent => "Persuasive & Urgent",
            Self::FriendlyCasual => "Friendly & Casual",
            Self::ProfessionalAuthoritative => "Professional & Authoritative",
            Self::EmotionalStory => "Emotional & Story-driven",
            Self::WittyHumorous => "Witty & Humorous",
        }
    }
}

impl fmt::Display for AdTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of media a creative attachment carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a MIME type by its top-level type
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let top = mime_type.trim().split('/').next()?.to_ascii_lowercase();
        match top.as_str() {
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Video => "Video",
        }
    }
}

/// Binary media submitted for creative analysis
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn kind(&self) -> Option<MediaKind> {
        MediaKind::from_mime(&self.mime_type)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}
