//! Centralized display formatting utilities.
//!
//! Numeric text shown by presenters goes through this module so actor lists,
//! overlay labels and logs agree, including European-style decimals
//! (swapping `.` and `,`).

use crate::filter::Rgb;

/// Apply European number format by swapping `.` and `,` in a formatted string.
fn europeanize(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '.' => result.push(','),
            ',' => result.push('.'),
            _ => result.push(c),
        }
    }
    result
}

#[inline]
fn maybe_eu(s: String, european: bool) -> String {
    if european { europeanize(&s) } else { s }
}

/// Format a distance in game units with one decimal place.
///
/// Unknown distances (no local player) render as `-`.
///
/// # Examples
/// ```
/// use ffradar_types::formatting::format_distance;
/// assert_eq!(format_distance(12.345, false), "12.3");
/// assert_eq!(format_distance(12.345, true), "12,3");
/// assert_eq!(format_distance(f32::INFINITY, false), "-");
/// ```
pub fn format_distance(distance: f32, european: bool) -> String {
    if !distance.is_finite() {
        return "-".to_string();
    }
    maybe_eu(format!("{:.1}", distance), european)
}

/// Format a decimal number with the specified precision.
///
/// # Examples
/// ```
/// use ffradar_types::formatting::format_decimal;
/// assert_eq!(format_decimal(3.5, 1, false), "3.5");
/// assert_eq!(format_decimal(1.234, 3, true), "1,234");
/// ```
pub fn format_decimal(n: f32, precision: usize, european: bool) -> String {
    maybe_eu(format!("{:.prec$}", n, prec = precision), european)
}

/// Format an RGB triple as `#RRGGBB`.
///
/// # Examples
/// ```
/// use ffradar_types::formatting::format_color_hex;
/// assert_eq!(format_color_hex([255, 128, 0]), "#FF8000");
/// ```
pub fn format_color_hex(color: Rgb) -> String {
    format!("#{:02X}{:02X}{:02X}", color[0], color[1], color[2])
}

/// Format a foreign-process address as `0x` + 16 hex digits.
///
/// # Examples
/// ```
/// use ffradar_types::formatting::format_address;
/// assert_eq!(format_address(0x1_4000_0000), "0x0000000140000000");
/// ```
pub fn format_address(address: u64) -> String {
    format!("{:#018x}", address)
}

/// Truncate a name to `max_chars`, adding "..." if truncated
pub fn truncate_name(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        name.to_string()
    } else {
        let truncated: String = name.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
