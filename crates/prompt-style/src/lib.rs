//! Color/style specification parsing and composition.
//!
//! Styles are written as space-separated tokens (`"bold red on black"`,
//! `"+underline"` to layer onto whatever a lower layer already set) and
//! resolved down to an ANSI escape sequence.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("unknown color name: {0}")]
    UnknownColor(String),
    #[error("invalid hex color: {0}")]
    InvalidHex(String),
    #[error("invalid numeric color: {0}")]
    InvalidNumeric(String),
}

const COLORS: &[(&str, u8)] = &[
    ("black", 0),
    ("red", 1),
    ("green", 2),
    ("yellow", 3),
    ("blue", 4),
    ("magenta", 5),
    ("cyan", 6),
    ("white", 7),
];

const BRIGHT_COLORS: &[(&str, u8)] = &[
    ("black", 8),
    ("red", 9),
    ("green", 10),
    ("yellow", 11),
    ("blue", 12),
    ("magenta", 13),
    ("cyan", 14),
    ("white", 15),
];

/// A resolved color value, in increasing order of how it is encoded on the
/// wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorValue {
    Indexed(u8),
    Rgb(u8, u8, u8),
}

/// A fully or partially specified style. Unset fields are `None` so that
/// [`combine_colors`] can tell "not mentioned" apart from "explicitly unset".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedColor {
    pub fg: Option<ColorValue>,
    pub bg: Option<ColorValue>,
    pub bold: Option<bool>,
    pub underline: Option<bool>,
    pub italic: Option<bool>,
    pub dim: Option<bool>,
    pub blink: Option<bool>,
    pub reverse: Option<bool>,
    pub hidden: Option<bool>,
    pub strikethrough: Option<bool>,
    /// Whether the spec began with `+`: layer onto the existing style rather
    /// than replacing it outright.
    pub combine: bool,
}

impl ParsedColor {
    /// Render as an ANSI SGR escape sequence. Unset attributes are omitted.
    /// A combining style layers onto whatever came before; a non-combining
    /// style leads with a reset so earlier attributes don't bleed through.
    pub fn to_ansi(&self) -> String {
        let mut codes: Vec<String> = Vec::new();

        if !self.combine {
            codes.push("0".to_string());
        }
        if let Some(true) = self.bold {
            codes.push("1".to_string());
        }
        if let Some(true) = self.dim {
            codes.push("2".to_string());
        }
        if let Some(true) = self.italic {
            codes.push("3".to_string());
        }
        if let Some(true) = self.underline {
            codes.push("4".to_string());
        }
        if let Some(true) = self.blink {
            codes.push("5".to_string());
        }
        if let Some(true) = self.reverse {
            codes.push("7".to_string());
        }
        if let Some(true) = self.hidden {
            codes.push("8".to_string());
        }
        if let Some(true) = self.strikethrough {
            codes.push("9".to_string());
        }
        if let Some(fg) = self.fg {
            codes.push(color_to_code(fg, false));
        }
        if let Some(bg) = self.bg {
            codes.push(color_to_code(bg, true));
        }

        if codes.is_empty() {
            String::new()
        } else {
            format!("\x1b[{}m", codes.join(";"))
        }
    }
}

fn color_to_code(color: ColorValue, background: bool) -> String {
    match color {
        ColorValue::Indexed(n) if n < 8 => {
            format!("{}", if background { 40 + n } else { 30 + n })
        }
        ColorValue::Indexed(n) if n < 16 => {
            format!("{}", if background { 100 + (n - 8) } else { 90 + (n - 8) })
        }
        ColorValue::Indexed(n) => {
            format!("{};5;{n}", if background { 48 } else { 38 })
        }
        ColorValue::Rgb(r, g, b) => {
            format!("{};2;{r};{g};{b}", if background { 48 } else { 38 })
        }
    }
}

fn normalize_color_name(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('_', "-")
}

fn named_color(name: &str, bright: bool) -> Option<u8> {
    let table = if bright { BRIGHT_COLORS } else { COLORS };
    let normalized = normalize_color_name(name);
    table
        .iter()
        .find(|(n, _)| *n == normalized)
        .map(|(_, code)| *code)
}

fn parse_color_word(word: &str) -> Result<ColorValue, ColorError> {
    if let Some(hex) = word.strip_prefix('#') {
        if hex.len() != 6 {
            return Err(ColorError::InvalidHex(word.to_string()));
        }
        let r = u8::from_str_radix(&hex[0..2], 16).map_err(|_| ColorError::InvalidHex(word.to_string()))?;
        let g = u8::from_str_radix(&hex[2..4], 16).map_err(|_| ColorError::InvalidHex(word.to_string()))?;
        let b = u8::from_str_radix(&hex[4..6], 16).map_err(|_| ColorError::InvalidHex(word.to_string()))?;
        return Ok(ColorValue::Rgb(r, g, b));
    }

    if word.chars().all(|c| c.is_ascii_digit()) {
        let n: u16 = word
            .parse()
            .map_err(|_| ColorError::InvalidNumeric(word.to_string()))?;
        if n > 255 {
            return Err(ColorError::InvalidNumeric(word.to_string()));
        }
        return Ok(ColorValue::Indexed(n as u8));
    }

    if let Some(code) = named_color(word, false) {
        return Ok(ColorValue::Indexed(code));
    }

    Err(ColorError::UnknownColor(word.to_string()))
}

/// Parses space-separated style specifications into a [`ParsedColor`].
pub struct ColorParser;

impl ColorParser {
    /// Parse a style spec such as `"bold +red on bright black"`.
    ///
    /// - A leading `+` marks the style as a combine/overlay layer.
    /// - `bold`, `italic`, `underline` set the corresponding attribute.
    /// - `on <color>` sets the background; a bare color word sets the
    ///   foreground.
    /// - `bright <color>` selects the bright variant of the following named
    ///   color.
    pub fn parse(spec: &str) -> Result<ParsedColor, ColorError> {
        let mut result = ParsedColor::default();
        let mut spec = spec.trim();

        if let Some(rest) = spec.strip_prefix('+') {
            result.combine = true;
            spec = rest.trim_start();
        }

        let words: Vec<&str> = spec.split_whitespace().collect();
        let mut i = 0;
        let mut target_bg = false;

        while i < words.len() {
            let word = words[i];
            let lower = word.to_ascii_lowercase();

            match lower.as_str() {
                "bold" => {
                    result.bold = Some(true);
                    i += 1;
                }
                "italic" => {
                    result.italic = Some(true);
                    i += 1;
                }
                "underline" => {
                    result.underline = Some(true);
                    i += 1;
                }
                "dim" => {
                    result.dim = Some(true);
                    i += 1;
                }
                "blink" => {
                    result.blink = Some(true);
                    i += 1;
                }
                "reverse" | "inverse" => {
                    result.reverse = Some(true);
                    i += 1;
                }
                "hidden" => {
                    result.hidden = Some(true);
                    i += 1;
                }
                "strikethrough" => {
                    result.strikethrough = Some(true);
                    i += 1;
                }
                "on" => {
                    target_bg = true;
                    i += 1;
                }
                "bright" => {
                    let Some(next) = words.get(i + 1) else {
                        return Err(ColorError::UnknownColor("bright".to_string()));
                    };
                    let code = named_color(next, true).ok_or_else(|| ColorError::UnknownColor(next.to_string()))?;
                    let value = ColorValue::Indexed(code);
                    if target_bg {
                        result.bg = Some(value);
                        target_bg = false;
                    } else {
                        result.fg = Some(value);
                    }
                    i += 2;
                }
                _ => {
                    let value = parse_color_word(word)?;
                    if target_bg {
                        result.bg = Some(value);
                        target_bg = false;
                    } else {
                        result.fg = Some(value);
                    }
                    i += 1;
                }
            }
        }

        Ok(result)
    }
}

/// Parse a style spec, returning an error on malformed input.
pub fn parse_color(spec: &str) -> Result<ParsedColor, ColorError> {
    ColorParser::parse(spec)
}

/// Overlay `overlay` onto `base`: any attribute the overlay sets wins,
/// anything it leaves `None` falls through to `base`.
pub fn combine_colors(base: &ParsedColor, overlay: &ParsedColor) -> ParsedColor {
    ParsedColor {
        fg: overlay.fg.or(base.fg),
        bg: overlay.bg.or(base.bg),
        bold: overlay.bold.or(base.bold),
        underline: overlay.underline.or(base.underline),
        italic: overlay.italic.or(base.italic),
        dim: overlay.dim.or(base.dim),
        blink: overlay.blink.or(base.blink),
        reverse: overlay.reverse.or(base.reverse),
        hidden: overlay.hidden.or(base.hidden),
        strikethrough: overlay.strikethrough.or(base.strikethrough),
        combine: base.combine || overlay.combine,
    }
}

/// Assign one color spec per group, repeating the last spec if there are
/// fewer colors than groups.
pub fn get_colors_for_groups(colors: &[String], group_count: usize) -> Vec<String> {
    if colors.is_empty() || group_count == 0 {
        return Vec::new();
    }

    (0..group_count)
        .map(|i| colors.get(i).cloned().unwrap_or_else(|| colors.last().unwrap().clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_foreground() {
        let parsed = parse_color("red").unwrap();
        assert_eq!(parsed.fg, Some(ColorValue::Indexed(1)));
        assert!(!parsed.combine);
    }

    #[test]
    fn parses_background_and_attributes() {
        let parsed = parse_color("bold red on black").unwrap();
        assert_eq!(parsed.fg, Some(ColorValue::Indexed(1)));
        assert_eq!(parsed.bg, Some(ColorValue::Indexed(0)));
        assert_eq!(parsed.bold, Some(true));
    }

    #[test]
    fn parses_bright_and_combine_prefix() {
        let parsed = parse_color("+bright blue").unwrap();
        assert!(parsed.combine);
        assert_eq!(parsed.fg, Some(ColorValue::Indexed(12)));
    }

    #[test]
    fn parses_hex_and_numeric() {
        assert_eq!(
            parse_color("#ff8800").unwrap().fg,
            Some(ColorValue::Rgb(0xff, 0x88, 0x00))
        );
        assert_eq!(parse_color("214").unwrap().fg, Some(ColorValue::Indexed(214)));
    }

    #[test]
    fn unknown_color_is_an_error() {
        assert!(parse_color("not-a-color").is_err());
    }

    #[test]
    fn combine_overlay_wins_per_attribute() {
        let base = parse_color("bold red on black").unwrap();
        let overlay = parse_color("+blue").unwrap();
        let combined = combine_colors(&base, &overlay);
        assert_eq!(combined.fg, Some(ColorValue::Indexed(4)));
        assert_eq!(combined.bg, Some(ColorValue::Indexed(0)));
        assert_eq!(combined.bold, Some(true));
    }

    #[test]
    fn parses_additional_attributes() {
        let parsed = parse_color("dim blink reverse hidden strikethrough").unwrap();
        assert_eq!(parsed.dim, Some(true));
        assert_eq!(parsed.blink, Some(true));
        assert_eq!(parsed.reverse, Some(true));
        assert_eq!(parsed.hidden, Some(true));
        assert_eq!(parsed.strikethrough, Some(true));
    }

    #[test]
    fn inverse_is_an_alias_for_reverse() {
        let parsed = parse_color("inverse").unwrap();
        assert_eq!(parsed.reverse, Some(true));
    }

    #[test]
    fn bright_colors_use_90_to_97_and_100_to_107_sgr_range() {
        let fg = parse_color("bright black").unwrap();
        assert_eq!(fg.to_ansi(), "\x1b[0;90m");
        let bg = parse_color("on bright black").unwrap();
        assert_eq!(bg.to_ansi(), "\x1b[0;100m");
    }

    #[test]
    fn non_combining_style_emits_leading_reset() {
        let parsed = parse_color("bold").unwrap();
        assert_eq!(parsed.to_ansi(), "\x1b[0;1m");
    }

    #[test]
    fn combining_style_omits_leading_reset() {
        let parsed = parse_color("+bold").unwrap();
        assert_eq!(parsed.to_ansi(), "\x1b[1m");
    }

    #[test]
    fn colors_for_groups_repeats_last() {
        let colors = vec!["red".to_string(), "green".to_string()];
        let assigned = get_colors_for_groups(&colors, 4);
        assert_eq!(
            assigned,
            vec!["red".to_string(), "green".to_string(), "green".to_string(), "green".to_string()]
        );
    }
}
