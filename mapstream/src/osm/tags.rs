//! Tag value parsers.
//!
//! OSM tag values are free-form strings. These helpers accept the common
//! spellings and return `None` for anything they do not understand, so a
//! bad tag only loses one attribute rather than the whole feature.

use std::collections::HashMap;

/// Tag map of a raw element.
pub type Tags = HashMap<String, String>;

const FEET_TO_METERS: f64 = 0.3048;
const INCHES_TO_METERS: f64 = 0.0254;

/// Parses a length in meters.
///
/// Accepts plain numbers (`12`, `12.5`), explicit units (`12 m`, `3.5 ft`,
/// `1.2 km`) and the feet/inches form (`40'`, `6'4"`). A decimal comma is
/// treated as a decimal point.
pub fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim().replace(',', ".");
    if value.is_empty() {
        return None;
    }

    if let Some((feet, rest)) = value.split_once('\'') {
        let feet: f64 = feet.trim().parse().ok()?;
        let inches = rest.trim().trim_end_matches('"').trim();
        let inches: f64 = if inches.is_empty() {
            0.0
        } else {
            inches.parse().ok()?
        };
        return finite(feet * FEET_TO_METERS + inches * INCHES_TO_METERS);
    }

    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number: f64 = number.trim().parse().ok()?;

    let factor = match unit.trim() {
        "" | "m" => 1.0,
        "km" => 1000.0,
        "cm" => 0.01,
        "mm" => 0.001,
        "ft" => FEET_TO_METERS,
        "in" => INCHES_TO_METERS,
        "mi" => 1609.344,
        _ => return None,
    };
    finite(number * factor)
}

/// Parses a non-negative level count such as `building:levels`.
pub fn parse_levels(value: &str) -> Option<f64> {
    let levels: f64 = value.trim().replace(',', ".").parse().ok()?;
    (levels.is_finite() && levels >= 0.0).then_some(levels)
}

/// Parses an unsigned integer such as a lane count.
pub fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}

/// Parses a direction into degrees clockwise from north, in `[0, 360)`.
///
/// Accepts numeric degrees and the 16-wind compass points (`N`, `NNE`, ...).
pub fn parse_direction(value: &str) -> Option<f64> {
    let value = value.trim();
    if let Ok(degrees) = value.parse::<f64>() {
        return degrees.is_finite().then(|| degrees.rem_euclid(360.0));
    }

    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
        "NNW",
    ];
    let upper = value.to_ascii_uppercase();
    POINTS
        .iter()
        .position(|p| *p == upper)
        .map(|i| i as f64 * 22.5)
}

/// Parses a colour into `0xRRGGBB`.
///
/// Accepts `#rgb`, `#rrggbb` (with or without `#`) and a handful of CSS
/// colour names commonly used on buildings.
pub fn parse_color(value: &str) -> Option<u32> {
    let value = value.trim().to_ascii_lowercase();
    let hex = value.strip_prefix('#').unwrap_or(&value);

    if hex.chars().all(|c| c.is_ascii_hexdigit()) {
        match hex.len() {
            6 => return u32::from_str_radix(hex, 16).ok(),
            3 => {
                let short = u32::from_str_radix(hex, 16).ok()?;
                let (r, g, b) = ((short >> 8) & 0xf, (short >> 4) & 0xf, short & 0xf);
                return Some((r * 0x11) << 16 | (g * 0x11) << 8 | (b * 0x11));
            }
            _ => {}
        }
    }

    let named = match value.as_str() {
        "white" => 0xffffff,
        "black" => 0x000000,
        "grey" | "gray" => 0x808080,
        "lightgrey" | "lightgray" => 0xd3d3d3,
        "darkgrey" | "darkgray" => 0xa9a9a9,
        "silver" => 0xc0c0c0,
        "red" => 0xff0000,
        "darkred" => 0x8b0000,
        "maroon" => 0x800000,
        "brown" => 0xa52a2a,
        "orange" => 0xffa500,
        "yellow" => 0xffff00,
        "beige" => 0xf5f5dc,
        "tan" => 0xd2b48c,
        "green" => 0x008000,
        "darkgreen" => 0x006400,
        "olive" => 0x808000,
        "blue" => 0x0000ff,
        "lightblue" => 0xadd8e6,
        "navy" => 0x000080,
        "teal" => 0x008080,
        "pink" => 0xffc0cb,
        "purple" => 0x800080,
        _ => return None,
    };
    Some(named)
}

/// Whether a tag value reads as "yes".
pub fn is_yes(value: Option<&String>) -> bool {
    matches!(value.map(String::as_str), Some("yes" | "true" | "1"))
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Option<f64>, b: f64) -> bool {
        a.map(|a| (a - b).abs() < 1e-9).unwrap_or(false)
    }

    #[test]
    fn test_parse_length_units() {
        assert!(close(parse_length("12"), 12.0));
        assert!(close(parse_length("12 m"), 12.0));
        assert!(close(parse_length("12.5m"), 12.5));
        assert!(close(parse_length("3,5"), 3.5));
        assert!(close(parse_length("1.2 km"), 1200.0));
        assert!(close(parse_length("10 ft"), 3.048));
        assert!(close(parse_length("40'"), 12.192));
        assert!(close(parse_length("6'4\""), 6.0 * 0.3048 + 4.0 * 0.0254));
    }

    #[test]
    fn test_parse_length_rejects_garbage() {
        assert_eq!(parse_length(""), None);
        assert_eq!(parse_length("tall"), None);
        assert_eq!(parse_length("12 parsecs"), None);
    }

    #[test]
    fn test_parse_levels() {
        assert_eq!(parse_levels("4"), Some(4.0));
        assert_eq!(parse_levels("2,5"), Some(2.5));
        assert_eq!(parse_levels("-1"), None);
    }

    #[test]
    fn test_parse_direction() {
        assert_eq!(parse_direction("90"), Some(90.0));
        assert_eq!(parse_direction("-90"), Some(270.0));
        assert_eq!(parse_direction("NE"), Some(45.0));
        assert_eq!(parse_direction("wsw"), Some(247.5));
        assert_eq!(parse_direction("up"), None);
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ff8800"), Some(0xff8800));
        assert_eq!(parse_color("FF8800"), Some(0xff8800));
        assert_eq!(parse_color("#f80"), Some(0xff8800));
        assert_eq!(parse_color("Beige"), Some(0xf5f5dc));
        assert_eq!(parse_color("plaid"), None);
    }
}
