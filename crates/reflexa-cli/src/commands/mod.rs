pub mod config;
pub mod play;
pub mod recall;
pub mod rules;

use reflexa_core::Color;

/// ANSI foreground escape for a colour.
pub(crate) fn ansi(color: Color) -> &'static str {
    match color {
        Color::Red => "\x1b[31m",
        Color::Blue => "\x1b[34m",
        Color::Green => "\x1b[32m",
        Color::Yellow => "\x1b[33m",
        Color::Purple => "\x1b[35m",
        Color::Orange => "\x1b[38;5;208m",
    }
}

pub(crate) const ANSI_RESET: &str = "\x1b[0m";
