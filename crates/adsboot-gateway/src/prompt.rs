//! Prompt builders for every call kind
//!
//! All builders are pure string construction. They never validate their
//! inputs: gating on non-empty fields is the host's job (see
//! `AudienceBrief::is_complete`).

use crate::constants::NO_CONTEXT_MARKER;
use crate::types::MediaKind;

/// Persona sent once per conversation as the system instruction
pub const CHAT_SYSTEM_INSTRUCTION: &str = r#"You are AdsBoot AI, a world-class Marketing Strategist & Media Buyer.

Your Capabilities:
- Analyze marketing problems with depth and nuance.
- Provide specific, actionable advice for Facebook/Instagram/TikTok ads.
- Write direct-response copy if asked.
- Suggest detailed audience targeting stacks.

Personality:
- Professional but accessible.
- Results-oriented (ROAS focused).
- Use formatting (bullet points, bold text) to make long answers readable.

When asked about targeting or copy, do not give generic advice. Give specific interests, headlines, and frameworks."#;

/// Build the audience-architect prompt
pub fn build_audience_prompt(
    product_name: &str,
    product_description: &str,
    base_demographic: &str,
) -> String {
    format!(
        r#"Role: World-Class Facebook Ads Media Buyer (ex-Meta algorithm engineer).
Task: Architect 3 separate, high-performance targeting avatars for a campaign.

Product: {product_name}
Deep Analysis: {product_description}
Base Geo/Demo: {base_demographic}

Objective:
- Dig deeper than surface-level interests. Find the "hidden" pockets of buyers.
- Use lateral thinking to find interests that correlate with the buyer persona, even if not directly related to the product.

Required Output Structure (Array of 3 Objects):
1. Segment Name: Catchy internal name for this ad set.
2. Interests: 7-10 specific, targetable interest keywords. Mix of broad and niche.
3. Behaviors: 2-3 purchasing behaviors or digital activities (e.g. "Facebook Payments Users").
4. Exclusions: 2-3 specific audiences to exclude to save money (e.g. "Dropshipping" interests if selling to consumers, or "Unemployed" signals).
5. Demographics: Specific age range, gender, and location nuances.
6. Reasoning: An explanation of *why* this specific combination triggers the algorithm to find buyers.
7. Match Score: A number between 75-99 indicating potential conversion rate.
8. Estimated Reach: A realistic reach range string (e.g. "1.2M - 1.5M").
9. Persona Emoji: A single emoji that best represents this audience avatar.

Strategy for the 3 Segments:
- Segment 1: The "Direct Intent" Layer (People actively looking).
- Segment 2: The "Competitor/Brand" Layer (People following adjacent brands).
- Segment 3: The "Psychographic/Lifestyle" Layer (People whose identity matches the product utility)."#
    )
}

/// Build the direct-response copywriter prompt
pub fn build_copy_prompt(product_name: &str, selling_points: &str, tone: &str) -> String {
    format!(
        r#"Role: Legendary Direct Response Copywriter (Style of Ogilvy meets modern viral marketing).
Task: Write 3 extremely distinct ad variations.

Product: {product_name}
USP/Benefits: {selling_points}
Tone: {tone}

Guidelines:
- Use "Pattern Interrupts" in the first sentence.
- Use psychological triggers: Scarcity, Urgency, Curiosity, Social Proof.
- Format with line breaks for readability (mobile-first).
- Use emojis strategically but not excessively.

Variations:
1. The "Story/Testimonial" Angle: Written from a user's perspective (UGC style).
2. The "Us vs Them" Angle: Why this product kills the competition.
3. The "Direct Benefit/Offer" Angle: Straight to the point, heavy on value proposition.

Output Fields:
- Headline: Max 7 words. Punchy.
- Primary Text: The main caption. 3-5 short paragraphs.
- Description: The CTA line next to the button.
- Angle: Name of the strategy used."#
    )
}

/// Build the creative-strategist prompt sent alongside the attachment
pub fn build_creative_analysis_prompt(kind: MediaKind, user_context: Option<&str>) -> String {
    let context = user_context
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(NO_CONTEXT_MARKER);

    let mut criteria = String::from(
        "1. Stopping Power (Does the hook/visual grab attention immediately?)\n\
         2. Clarity (Is the message/product clear?)\n\
         3. Call to Action (Is it obvious what to do?)",
    );
    if kind == MediaKind::Video {
        criteria.push_str(
            "\n4. Pacing & Engagement (Is the video fast-paced? Does it hold retention?)",
        );
    }

    format!(
        "Act as a Facebook Ads Creative Strategist.\n\
         Analyze the attached ad creative ({kind}).\n\
         Context provided by user: {context}.\n\n\
         Evaluate based on:\n\
         {criteria}\n\n\
         Provide a score from 1-100, a stop-scroll potential of High, Medium, or Low, \
         list strengths, weaknesses, suggested improvements, and an overall verdict.",
        kind = kind.label(),
    )
}

/// The chat persona. Constant; does not depend on any call input.
pub fn build_chat_system_instruction() -> &'static str {
    CHAT_SYSTEM_INSTRUCTION
}

/// Prefix a user message with one-shot auxiliary context
pub fn build_contextual_message(context: &str, user_text: &str) -> String {
    format!("Context: {}\n\nUser Query: {}", context.trim(), user_text)
}

/// A canned assistant question offered before the user types anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickPrompt {
    pub title: &'static str,
    pub description: &'static str,
    pub prompt: &'static str,
}

pub const QUICK_PROMPTS: [QuickPrompt; 4] = [
    QuickPrompt {
        title: "Audience Strategy",
        description: "Plan a testing structure",
        prompt: "I have a $500 budget. Create a Facebook Ads testing strategy for a new high-ticket dropshipping product. Include audience sizes and exclusion layers.",
    },
    QuickPrompt {
        title: "Viral Hooks",
        description: "Stop the scroll instantly",
        prompt: "Write 5 controversy-driven hooks for a skincare ad targeting women over 40. The angle is 'Big Beauty Brands are lying to you'.",
    },
    QuickPrompt {
        title: "Fix Rising CPA",
        description: "Troubleshoot expensive ads",
        prompt: "My CPA has increased by 40% over the last 3 days on a scaling campaign. Frequency is 1.2. What steps should I take to stabilize it?",
    },
    QuickPrompt {
        title: "Creative Concepts",
        description: "UGC video ideas",
        prompt: "Give me 3 UGC video concepts for a dog toy that plays on emotion. Describe the visual sequence and the voiceover for each.",
    },
];
