//! Palette helpers for styled terminal text.
//!
//! Nick colors are derived from a stable hash of the nick so the same participant
//! keeps the same color for the whole session and across runs.

use ratatui::style::{Color, Style};
use ratatui::text::Span;

/// Default lower bound for nick colors (skips the 16 system colors and the darkest cube row).
pub const NICK_COLOR_MIN: u8 = 22;
/// Default upper bound for nick colors (stops before the grayscale ramp).
pub const NICK_COLOR_MAX: u8 = 231;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Map `seed` onto a palette index in `min..=max`.
///
/// `min > max` is treated as the single index `min`.
pub fn palette_index(seed: &str, min: u8, max: u8) -> u8 {
    if min >= max {
        return min;
    }
    let hash = seed.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    });
    let span = u64::from(max - min) + 1;
    min + (hash % span) as u8
}

/// Style `text` with the palette entry `index`.
pub fn format(index: u8, text: impl Into<String>) -> Span<'static> {
    Span::styled(text.into(), Style::default().fg(Color::Indexed(index)))
}
