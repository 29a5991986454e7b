//! Chat surfaces and the auxiliary context each one carries
//!
//! Every tool page hosts its own chat seeded with a greeting and, once results
//! exist, a context block describing those results.

use crate::thread::{ConversationThread, ConversationTurn};
use crate::types::{
    AdCopyVariant, AudienceBrief, AudienceSegment, CopyBrief, CreativeAnalysis, MediaKind,
};

/// Where a conversation lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatSurface {
    /// The standalone strategist chat
    Assistant,
    Audience,
    Copy,
    Creative,
}

impl ChatSurface {
    pub fn title(&self) -> &'static str {
        match self {
            ChatSurface::Assistant => "AdsBoot AI",
            ChatSurface::Audience => "Audience Assistant",
            ChatSurface::Copy => "Copy Assistant",
            ChatSurface::Creative => "Refine this Creative",
        }
    }

    pub fn seed_message(&self) -> &'static str {
        match self {
            ChatSurface::Assistant => {
                "Hello! I am **AdsBoot AI**, your dedicated marketing intelligence unit. \n\n\
                 I'm trained on millions of ad data points to help you scale. We can discuss:\n\
                 • Full-funnel strategy\n\
                 • ROAS optimization\n\
                 • Copywriting & Scripts\n\n\
                 Select a quick prompt below or type your specific challenge."
            }
            ChatSurface::Audience => {
                "I've generated these segments. Want to narrow them down or find a different angle?"
            }
            ChatSurface::Copy => {
                "I've drafted 3 variations based on your inputs. How do they look? \
                 I can make them shorter, punchier, or change the angle for you."
            }
            ChatSurface::Creative => {
                "I've analyzed your creative. I can help you write a brief for your editor \
                 to fix the weak points."
            }
        }
    }

    pub fn seed_turn(&self) -> ConversationTurn {
        ConversationTurn::assistant(self.seed_message())
    }

    /// A thread holding only this surface's greeting
    pub fn new_thread(&self, context: Option<String>) -> ConversationThread {
        match context {
            Some(context) => ConversationThread::with_context(self.seed_turn(), context),
            None => ConversationThread::seeded(self.seed_turn()),
        }
    }
}

pub fn audience_context(brief: &AudienceBrief, results: &[AudienceSegment]) -> String {
    format!(
        "Product: {}\nDescription: {}\nTarget Demographic: {}\nCurrent Generated Audiences: {}",
        brief.product_name,
        brief.product_description,
        brief.base_demographic,
        results_json(results),
    )
}

pub fn copy_context(brief: &CopyBrief, results: &[AdCopyVariant]) -> String {
    format!(
        "Product: {}\nBenefits: {}\nTone: {}\nCurrent Generated Copy: {}",
        brief.product_name,
        brief.selling_points,
        brief.tone,
        results_json(results),
    )
}

pub fn creative_context(kind: MediaKind, analysis: &CreativeAnalysis) -> String {
    format!(
        "Creative Analysis for {}. Score: {}. Feedback: {}",
        kind.label(),
        analysis.score,
        analysis.overall_feedback,
    )
}

fn results_json<T: serde::Serialize>(results: &[T]) -> String {
    serde_json::to_string(results).unwrap_or_else(|_| "[]".to_string())
}
