//! Farb-Parsing: Hex-String → RGB8 → RGB565
//!
//! Akzeptiert `#RRGGBB`, `0xRRGGBB`, `0XRRGGBB` und `RRGGBB`. Geparst wird
//! wie `strtoul(s, NULL, 16)`: so viele Hex-Ziffern wie möglich, Abbruch beim
//! ersten ungültigen Zeichen, ohne Ziffern ergibt sich 0.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::RgbColor;
use rgb::RGB8;

/// Parst einen Hex-Farbwert in 8 Bit pro Kanal
///
/// # Beispiele
///
/// ```
/// # use rgb::RGB8;
/// # use esp_core::parse_hex_rgb;
/// assert_eq!(parse_hex_rgb("#FF8000"), RGB8 { r: 255, g: 128, b: 0 });
/// assert_eq!(parse_hex_rgb("0x00ff00"), RGB8 { r: 0, g: 255, b: 0 });
/// ```
pub fn parse_hex_rgb(input: &str) -> RGB8 {
    let packed = parse_hex_prefix(strip_prefix(input.trim_start()));
    RGB8 {
        r: (packed >> 16) as u8,
        g: (packed >> 8) as u8,
        b: packed as u8,
    }
}

/// Quantisiert auf 5-6-5 Bit (obere Bits jedes Kanals)
pub fn rgb_to_rgb565(color: RGB8) -> Rgb565 {
    Rgb565::new(color.r >> 3, color.g >> 2, color.b >> 3)
}

/// Rekonstruiert 8-Bit-Kanäle aus RGB565 (untere Bits = 0)
pub fn rgb565_to_rgb(color: Rgb565) -> RGB8 {
    RGB8 {
        r: color.r() << 3,
        g: color.g() << 2,
        b: color.b() << 3,
    }
}

/// Hex-String direkt zu RGB565
pub fn parse_hex_color(input: &str) -> Rgb565 {
    rgb_to_rgb565(parse_hex_rgb(input))
}

fn strip_prefix(input: &str) -> &str {
    if let Some(rest) = input.strip_prefix('#') {
        rest
    } else if let Some(rest) = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        rest
    } else {
        input
    }
}

// Überlauf sättigt wie bei strtoul auf den Maximalwert
fn parse_hex_prefix(digits: &str) -> u32 {
    let mut packed: u32 = 0;
    for ch in digits.chars() {
        let Some(digit) = ch.to_digit(16) else {
            break;
        };
        match packed.checked_mul(16).and_then(|v| v.checked_add(digit)) {
            Some(next) => packed = next,
            None => return u32::MAX,
        }
    }
    packed
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::IntoStorage;

    #[test]
    fn test_prefix_variants() {
        let expected = RGB8 {
            r: 0x12,
            g: 0x34,
            b: 0x56,
        };
        assert_eq!(parse_hex_rgb("#123456"), expected);
        assert_eq!(parse_hex_rgb("0x123456"), expected);
        assert_eq!(parse_hex_rgb("0X123456"), expected);
        assert_eq!(parse_hex_rgb("123456"), expected);
    }

    #[test]
    fn test_orange_quantization() {
        let color = parse_hex_color("#FF8000");
        assert_eq!(color.into_storage(), 0xFC00);
        assert_eq!(rgb565_to_rgb(color), RGB8 { r: 248, g: 128, b: 0 });
    }

    #[test]
    fn test_partial_parse_stops_at_invalid() {
        // "FF80" gültig, Rest verworfen → 0x00FF80
        assert_eq!(parse_hex_rgb("#FF80zz"), RGB8 { r: 0, g: 0xFF, b: 0x80 });
    }

    #[test]
    fn test_garbage_is_black() {
        assert_eq!(parse_hex_rgb("zzz"), RGB8 { r: 0, g: 0, b: 0 });
        assert_eq!(parse_hex_rgb(""), RGB8 { r: 0, g: 0, b: 0 });
        assert_eq!(parse_hex_rgb("#"), RGB8 { r: 0, g: 0, b: 0 });
    }

    #[test]
    fn test_overflow_saturates() {
        assert_eq!(
            parse_hex_rgb("FFFFFFFFFF"),
            RGB8 {
                r: 255,
                g: 255,
                b: 255
            }
        );
    }

    #[test]
    fn test_white_and_black() {
        assert_eq!(parse_hex_color("#FFFFFF"), Rgb565::WHITE);
        assert_eq!(parse_hex_color("#000000"), Rgb565::BLACK);
    }
}
