//! Tile tint helpers: hex parsing, canonical formatting, and parent blending.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

/// Tint used when a label color cannot be parsed.
pub const FALLBACK_COLOR: &str = "#9e9e9e";

/// Parse `#RGB` or `#RRGGBB` values into RGB channels.
#[must_use]
pub fn parse_hex_rgb(raw: &str) -> Option<(u8, u8, u8)> {
    let hex = raw.trim().strip_prefix('#')?;
    let digits = hex.bytes().map(hex_digit).collect::<Option<Vec<u8>>>()?;
    match digits.as_slice() {
        &[r, g, b] => Some((r * 17, g * 17, b * 17)),
        &[r1, r2, g1, g2, b1, b2] => Some((r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2)),
        _ => None,
    }
}

fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Format channels as canonical lowercase `#rrggbb`.
#[must_use]
pub fn format_hex_rgb((r, g, b): (u8, u8, u8)) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Normalize a color to canonical lowercase `#rrggbb`.
#[must_use]
pub fn normalize_hex_color(value: &str) -> String {
    let fallback = parse_hex_rgb(FALLBACK_COLOR).unwrap_or((158, 158, 158));
    format_hex_rgb(parse_hex_rgb(value).unwrap_or(fallback))
}

/// Component-wise average of two colors, rounding halves up.
///
/// Unparseable inputs are treated as [`FALLBACK_COLOR`].
#[must_use]
pub fn blend_hex_colors(a: &str, b: &str) -> String {
    let fallback = parse_hex_rgb(FALLBACK_COLOR).unwrap_or((158, 158, 158));
    let (ar, ag, ab) = parse_hex_rgb(a).unwrap_or(fallback);
    let (br, bg, bb) = parse_hex_rgb(b).unwrap_or(fallback);
    format_hex_rgb((average(ar, br), average(ag, bg), average(ab, bb)))
}

fn average(a: u8, b: u8) -> u8 {
    let sum = u16::from(a) + u16::from(b) + 1;
    // Sum of two u8 plus one, halved, never exceeds 255.
    u8::try_from(sum / 2).unwrap_or(u8::MAX)
}
