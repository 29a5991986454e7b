//! Terminal output for gateway results

use adsboot_gateway::{
    AdCopyVariant, AdTone, AudienceSegment, CreativeAnalysis, GatewayError, MediaKind,
    QUICK_PROMPTS,
};

/// What the user should do about a failed call
pub fn hint_for(err: &GatewayError) -> &'static str {
    match err {
        GatewayError::Validation(_) => "Check your input",
        GatewayError::NoSession => "Log in first",
        GatewayError::Cancelled => "Request cancelled",
        GatewayError::Decode(_) => "The model returned an unusable answer, try again",
        err if err.is_retryable() => "The service did not answer, try again",
        _ => "Check your API key and configuration",
    }
}

pub fn quick_prompts() {
    println!("Quick prompts:");
    for (i, quick) in QUICK_PROMPTS.iter().enumerate() {
        println!("  {}. {} - {}", i + 1, quick.title, quick.description);
    }
    println!();
}

pub fn tones() {
    println!("Tone presets:");
    for tone in AdTone::ALL {
        let marker = if tone == AdTone::default() { " (default)" } else { "" };
        println!("  - {}{}", tone, marker);
    }
    println!();
}

pub fn segments(segments: &[AudienceSegment]) {
    for segment in segments {
        println!(
            "{} {}  [match {}, reach {}]",
            segment.persona_emoji,
            segment.segment_name,
            segment.match_score,
            segment.estimated_reach
        );
        println!("   Demographics: {}", segment.demographics);
        println!("   Interests:    {}", segment.interests.join(", "));
        println!("   Behaviors:    {}", segment.behaviors.join(", "));
        println!("   Exclusions:   {}", segment.exclusions.join(", "));
        println!("   Why:          {}\n", segment.reasoning);
        if !segment.within_bounds() {
            log::warn!("Segment '{}' is outside the requested bounds", segment.segment_name);
        }
    }
}

pub fn copy_variants(variants: &[AdCopyVariant]) {
    for (i, variant) in variants.iter().enumerate() {
        println!("--- Variation {}: {} ---", i + 1, variant.angle);
        println!("Headline: {}\n", variant.headline);
        println!("{}\n", variant.primary_text);
        println!("CTA: {}\n", variant.description);
    }
}

pub fn creative(kind: MediaKind, analysis: &CreativeAnalysis) {
    println!(
        "{} score: {}/100  (stop-scroll potential: {})\n",
        kind.label(),
        analysis.score,
        analysis.stop_scroll_potential
    );
    list("Strengths", &analysis.strengths);
    list("Weaknesses", &analysis.weaknesses);
    list("Improvements", &analysis.improvements);
    println!("{}", analysis.overall_feedback);
    if !analysis.within_bounds() {
        log::warn!("Score {} is outside 1-100", analysis.score);
    }
}

fn list(title: &str, items: &[String]) {
    println!("{title}:");
    for item in items {
        println!("  - {item}");
    }
    println!();
}
