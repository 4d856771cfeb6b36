//! The acceleration curve.
//!
//! Playback opens at [`START_WPM`] and eases in cubically to the peak rate
//! over the first [`ramp_length`] words, then holds the peak.

/// Rate of the first word.
pub const START_WPM: f64 = 120.0;

/// Words needed to reach the peak on long texts.
pub const RAMP_WORDS: usize = 80;

/// Shortest ramp, unless the text itself is shorter.
pub const MIN_RAMP_WORDS: usize = 10;

/// Number of words over which the rate ramps up.
///
/// `max(min(10, total), min(80, floor(total * 0.6)))`: long texts ramp over
/// 80 words, short ones over at most 60% of their length, and no text
/// ramps over fewer than 10 words unless it has fewer.
pub fn ramp_length(total: usize) -> usize {
    let ratio_cap = total.saturating_mul(3) / 5;
    MIN_RAMP_WORDS.min(total).max(RAMP_WORDS.min(ratio_cap))
}

/// Words-per-minute for the word at `index` of `total`.
pub fn rate_for_index(index: usize, total: usize, peak_wpm: f64) -> f64 {
    let ramp = ramp_length(total);
    if index >= ramp {
        return peak_wpm;
    }
    let t = index as f64 / ramp as f64;
    START_WPM + (peak_wpm - START_WPM) * t * t * t
}
