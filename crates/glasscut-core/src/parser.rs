//! Parsing of free-text piece lists.
//!
//! A list holds one specification per line, or several separated by `,`, `;`
//! or `-` (the compact `100x50-200x30` form). Each specification reads
//! `WIDTH x HEIGHT [x QUANTITY] [MARKER]`, where the separator may be `x`, `X`,
//! `×` or `*` and the optional marker is `r` (rotation allowed) or `f` (fixed
//! orientation).

use crate::types::{ParseError, ParseErrorKind, Piece, StockSheet};
use std::str::FromStr;

/// Parses a piece list, keeping quantities aggregated.
///
/// Pieces without a marker get `default_rotation`. Ids are assigned in input
/// order as `P1`, `P2`, ...
pub fn parse_dimensions(text: &str, default_rotation: bool) -> Result<Vec<Piece>, ParseError> {
    split_specifications(text)
        .iter()
        .enumerate()
        .map(|(index, spec)| parse_piece(spec, index + 1, default_rotation))
        .collect()
}

/// Splits the raw text into trimmed, non-empty specifications.
///
/// A `-` only separates specifications when it follows a complete dimension;
/// anywhere else it stays in the token as a sign.
fn split_specifications(text: &str) -> Vec<String> {
    let mut specs = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        match ch {
            '\n' | '\r' | ',' | ';' => flush(&mut current, &mut specs),
            '-' if ends_dimension(&current) => flush(&mut current, &mut specs),
            _ => current.push(ch),
        }
    }
    flush(&mut current, &mut specs);

    specs
}

fn flush(current: &mut String, specs: &mut Vec<String>) {
    let spec = current.trim();
    if !spec.is_empty() {
        specs.push(spec.to_string());
    }
    current.clear();
}

fn ends_dimension(current: &str) -> bool {
    let current = current.trim_end();
    current.contains(is_separator)
        && current
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_digit() || c == '.' || is_marker(c))
}

fn is_separator(c: char) -> bool {
    matches!(c, 'x' | 'X' | '×' | '*')
}

fn is_marker(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'r' | 'f')
}

fn parse_piece(spec: &str, ordinal: usize, default_rotation: bool) -> Result<Piece, ParseError> {
    let (body, rotation_allowed) = split_marker(spec, default_rotation)?;

    let parts: Vec<&str> = body.split(is_separator).map(str::trim).collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(ParseError::new(spec, ParseErrorKind::Malformed));
    }

    let width = parse_length(parts[0], spec)?;
    let height = parse_length(parts[1], spec)?;
    let quantity = match parts.get(2) {
        Some(raw) => parse_quantity(raw, spec)?,
        None => 1,
    };

    Ok(Piece {
        id: format!("P{ordinal}"),
        width,
        height,
        quantity,
        rotation_allowed,
    })
}

fn split_marker(spec: &str, default_rotation: bool) -> Result<(&str, bool), ParseError> {
    match spec.chars().last() {
        Some(c) if c.is_alphabetic() && !is_separator(c) => {
            let body = spec[..spec.len() - c.len_utf8()].trim_end();
            match c.to_ascii_lowercase() {
                'r' => Ok((body, true)),
                'f' => Ok((body, false)),
                _ => Err(ParseError::new(spec, ParseErrorKind::UnknownMarker(c))),
            }
        }
        _ => Ok((spec, default_rotation)),
    }
}

/// Parses one strictly positive, finite length.
pub(crate) fn parse_length(raw: &str, spec: &str) -> Result<f64, ParseError> {
    if raw.is_empty() {
        return Err(ParseError::new(spec, ParseErrorKind::Malformed));
    }

    let value: f64 = raw
        .parse()
        .map_err(|_| ParseError::new(spec, ParseErrorKind::NotANumber(raw.to_string())))?;

    if !value.is_finite() {
        return Err(ParseError::new(
            spec,
            ParseErrorKind::NotANumber(raw.to_string()),
        ));
    }
    if value <= 0.0 {
        return Err(ParseError::new(spec, ParseErrorKind::NonPositive));
    }

    Ok(value)
}

fn parse_quantity(raw: &str, spec: &str) -> Result<u32, ParseError> {
    match raw.parse::<u32>() {
        Ok(quantity) if quantity >= 1 => Ok(quantity),
        _ => Err(ParseError::new(spec, ParseErrorKind::InvalidQuantity)),
    }
}

impl FromStr for StockSheet {
    type Err = ParseError;

    /// Parses a sheet size such as `321x225`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim();
        let parts: Vec<&str> = spec.split(is_separator).map(str::trim).collect();
        if parts.len() != 2 {
            return Err(ParseError::new(spec, ParseErrorKind::Malformed));
        }

        Ok(StockSheet::new(
            parse_length(parts[0], spec)?,
            parse_length(parts[1], spec)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(pieces: &[Piece]) -> Vec<(f64, f64, u32)> {
        pieces
            .iter()
            .map(|p| (p.width, p.height, p.quantity))
            .collect()
    }

    #[test]
    fn test_parses_comma_separated_list() {
        let pieces = parse_dimensions("500x300, 500x300", true).unwrap();
        assert_eq!(dims(&pieces), vec![(500.0, 300.0, 1), (500.0, 300.0, 1)]);
        assert_eq!(pieces[0].id, "P1");
        assert_eq!(pieces[1].id, "P2");
        assert!(pieces.iter().all(|p| p.rotation_allowed));
    }

    #[test]
    fn test_parses_hyphen_separated_list() {
        let pieces = parse_dimensions("100x50-200x30-80.5x90.2", true).unwrap();
        assert_eq!(
            dims(&pieces),
            vec![(100.0, 50.0, 1), (200.0, 30.0, 1), (80.5, 90.2, 1)]
        );
    }

    #[test]
    fn test_lines_whitespace_and_empty_entries_are_ignored() {
        let text = "\n  500 x 300 x 2  \n\n\t400X200;;\r\n 10×20 , 30*40 ,\n";
        let pieces = parse_dimensions(text, true).unwrap();
        assert_eq!(
            dims(&pieces),
            vec![
                (500.0, 300.0, 2),
                (400.0, 200.0, 1),
                (10.0, 20.0, 1),
                (30.0, 40.0, 1)
            ]
        );
    }

    #[test]
    fn test_order_of_width_and_height_is_kept() {
        let pieces = parse_dimensions("300x500", true).unwrap();
        assert_eq!(pieces[0].width, 300.0);
        assert_eq!(pieces[0].height, 500.0);
    }

    #[test]
    fn test_rotation_markers() {
        let pieces = parse_dimensions("500x300f, 500x300x2 R, 100x100", false).unwrap();
        assert!(!pieces[0].rotation_allowed);
        assert!(pieces[1].rotation_allowed);
        assert_eq!(pieces[1].quantity, 2);
        assert!(!pieces[2].rotation_allowed);
    }

    #[test]
    fn test_marker_before_hyphen_separator() {
        let pieces = parse_dimensions("100x50f-200x30r", true).unwrap();
        assert_eq!(pieces.len(), 2);
        assert!(!pieces[0].rotation_allowed);
        assert!(pieces[1].rotation_allowed);
    }

    #[test]
    fn test_empty_input_gives_no_pieces() {
        assert!(parse_dimensions("  \n , ; ", true).unwrap().is_empty());
    }

    #[test]
    fn test_negative_dimensions_are_rejected() {
        let err = parse_dimensions("500x-300", true).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NonPositive);
        assert_eq!(err.token, "500x-300");

        let err = parse_dimensions("-500x300", true).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NonPositive);

        let err = parse_dimensions("100x50, -500x300", true).unwrap_err();
        assert_eq!(err.token, "-500x300");
    }

    #[test]
    fn test_zero_dimension_is_rejected() {
        let err = parse_dimensions("0x300", true).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NonPositive);
    }

    #[test]
    fn test_malformed_specifications() {
        for text in ["500", "500x", "500x300x2x1", "x300", "r"] {
            let err = parse_dimensions(text, true).unwrap_err();
            assert_eq!(err.kind, ParseErrorKind::Malformed, "input {text:?}");
        }
    }

    #[test]
    fn test_non_numeric_values() {
        let err = parse_dimensions("abcx300", true).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NotANumber("abc".into()));

        let err = parse_dimensions("infx300", true).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NotANumber("inf".into()));
    }

    #[test]
    fn test_invalid_quantities() {
        for text in ["500x300x0", "500x300x1.5", "500x300x-2"] {
            let err = parse_dimensions(text, true).unwrap_err();
            assert_eq!(err.kind, ParseErrorKind::InvalidQuantity, "input {text:?}");
        }
    }

    #[test]
    fn test_unknown_marker() {
        let err = parse_dimensions("500x300q", true).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownMarker('q'));
    }

    #[test]
    fn test_stock_sheet_from_str() {
        let stock: StockSheet = "321x225".parse().unwrap();
        assert_eq!(stock, StockSheet::new(321.0, 225.0));
        assert!("321".parse::<StockSheet>().is_err());
        assert!("0x225".parse::<StockSheet>().is_err());
    }
}
