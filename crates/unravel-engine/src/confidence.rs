//! Confidence score for a deobfuscation result.

use crate::types::Technique;

pub const MIN_CONFIDENCE: f64 = 0.1;
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Score in `[0.1, 0.95]` estimating how far the output can be trusted.
///
/// ```text
/// 0.3
///   + min(techniques * 0.12, 0.5)
///   - warnings * 0.08
///   + high-confidence techniques * 0.05
///   - 0.15 if vm-protection
///   - 0.05 if control-flow-flattening
///   + 0.1 if complexity < 10
///   - 0.1 if complexity > 100
/// ```
pub fn score_confidence(techniques: &[Technique], warning_count: usize, complexity: u32) -> f64 {
    let high_confidence = techniques
        .iter()
        .filter(|technique| technique.is_high_confidence())
        .count();

    let mut score = 0.3;
    score += (techniques.len() as f64 * 0.12).min(0.5);
    score -= warning_count as f64 * 0.08;
    score += high_confidence as f64 * 0.05;

    if techniques.contains(&Technique::VmProtection) {
        score -= 0.15;
    }
    if techniques.contains(&Technique::ControlFlowFlattening) {
        score -= 0.05;
    }

    if complexity < 10 {
        score += 0.1;
    } else if complexity > 100 {
        score -= 0.1;
    }

    score.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}
