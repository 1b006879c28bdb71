//! Tooth numbering conversion to canonical FDI codes.
//!
//! Every finding is stored against an FDI two-digit code (quadrant
//! digit + tooth-in-quadrant digit). External generators and manual
//! edits arrive in a mix of notations:
//!
//! - FDI itself: 11–18 / 21–28 / 31–38 / 41–48, primary teeth
//!   51–55 / 61–65 / 71–75 / 81–85
//! - Universal (US) numbering: 1–32, starting at the upper right
//!   third molar and walking the mouth
//! - Quadrant-letter shorthand: "UR3", "ll5"
//! - Dotted quadrant.tooth: "2.3" or "2-3"
//!
//! Unresolvable input is a `None`, which tells the caller to drop the
//! record rather than fail the report.

/// Check whether `n` is a valid FDI code.
///
/// Permanent quadrants 1–4 carry teeth 1–8; primary quadrants 5–8
/// carry teeth 1–5.
pub fn is_valid_fdi(n: u8) -> bool {
    let quadrant = n / 10;
    let tooth = n % 10;
    match quadrant {
        1..=4 => (1..=8).contains(&tooth),
        5..=8 => (1..=5).contains(&tooth),
        _ => false,
    }
}

/// Convert a universal (1–32) code to FDI.
///
/// Universal numbering bands every 8 teeth, mirrored between sides:
/// 1 = upper right third molar (FDI 18), 8 = upper right central
/// incisor (11), 9 = upper left central incisor (21), 16 = upper left
/// third molar (28), 17 = lower left third molar (38), 24 = lower
/// left central incisor (31), 25 = lower right central incisor (41),
/// 32 = lower right third molar (48).
pub fn universal_to_fdi(n: u8) -> Option<u8> {
    match n {
        1..=8 => Some(10 + (9 - n)),
        9..=16 => Some(20 + (n - 8)),
        17..=24 => Some(30 + (25 - n)),
        25..=32 => Some(40 + (n - 24)),
        _ => None,
    }
}

/// Inverse of [`universal_to_fdi`], defined over permanent FDI codes only.
pub fn fdi_to_universal(fdi: u8) -> Option<u8> {
    let quadrant = fdi / 10;
    let tooth = fdi % 10;
    if !(1..=8).contains(&tooth) {
        return None;
    }
    match quadrant {
        1 => Some(9 - tooth),
        2 => Some(8 + tooth),
        3 => Some(25 - tooth),
        4 => Some(24 + tooth),
        _ => None,
    }
}

/// Resolve a numeric tooth reference to FDI.
///
/// Valid FDI codes pass through unchanged; anything in 1–32 is read
/// as universal numbering. The overlap (11–18, 21–28 are valid in
/// both schemes) resolves in FDI's favour.
pub fn numeric_to_fdi(n: i64) -> Option<u8> {
    let n = u8::try_from(n).ok()?;
    if is_valid_fdi(n) {
        return Some(n);
    }
    universal_to_fdi(n)
}

/// Resolve a string tooth reference to FDI.
///
/// Tries quadrant-letter shorthand ("UR3"), then dotted notation
/// ("2.3" / "2-3"), then salvages leading digits from noisy text
/// ("16 distal") and retries the numeric paths.
pub fn text_to_fdi(s: &str) -> Option<u8> {
    let upper = s.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return None;
    }

    if let Some(fdi) = quadrant_letter_to_fdi(&upper) {
        return Some(fdi);
    }
    if let Some(fdi) = dotted_to_fdi(&upper) {
        return Some(fdi);
    }

    let digits: &str = {
        let bytes = upper.as_bytes();
        let end = bytes
            .iter()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(bytes.len());
        &upper[..end]
    };
    digits.parse::<i64>().ok().and_then(numeric_to_fdi)
}

/// Parse "UR3"-style shorthand: quadrant letters then a 1–8 digit.
fn quadrant_letter_to_fdi(upper: &str) -> Option<u8> {
    let rest = upper.get(2..)?;
    let quadrant = match &upper[..2] {
        "UR" => 1,
        "UL" => 2,
        "LL" => 3,
        "LR" => 4,
        _ => return None,
    };
    let tooth = single_tooth_digit(rest)?;
    Some(quadrant * 10 + tooth)
}

/// Parse "2.3" / "2-3" dotted quadrant.tooth notation.
fn dotted_to_fdi(upper: &str) -> Option<u8> {
    let bytes = upper.as_bytes();
    if bytes.len() != 3 || !(bytes[1] == b'.' || bytes[1] == b'-') {
        return None;
    }
    let quadrant = (bytes[0] as char).to_digit(10)? as u8;
    let tooth = (bytes[2] as char).to_digit(10)? as u8;
    if (1..=4).contains(&quadrant) && (1..=8).contains(&tooth) {
        Some(quadrant * 10 + tooth)
    } else {
        None
    }
}

fn single_tooth_digit(s: &str) -> Option<u8> {
    let bytes = s.as_bytes();
    if bytes.len() != 1 {
        return None;
    }
    let d = (bytes[0] as char).to_digit(10)? as u8;
    (1..=8).contains(&d).then_some(d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_fdi_passes_through() {
        for code in [11, 18, 21, 28, 31, 38, 41, 48] {
            assert_eq!(numeric_to_fdi(code), Some(code as u8));
        }
    }

    #[test]
    fn primary_fdi_passes_through() {
        for code in [51, 55, 61, 65, 71, 75, 81, 85] {
            assert_eq!(numeric_to_fdi(code), Some(code as u8));
        }
    }

    #[test]
    fn primary_out_of_range_rejected() {
        for code in [56, 59, 66, 76, 86, 50] {
            assert_eq!(numeric_to_fdi(code), None);
        }
    }

    #[test]
    fn universal_band_boundaries() {
        assert_eq!(universal_to_fdi(1), Some(18));
        assert_eq!(universal_to_fdi(8), Some(11));
        assert_eq!(universal_to_fdi(9), Some(21));
        assert_eq!(universal_to_fdi(16), Some(28));
        assert_eq!(universal_to_fdi(17), Some(38));
        assert_eq!(universal_to_fdi(24), Some(31));
        assert_eq!(universal_to_fdi(25), Some(41));
        assert_eq!(universal_to_fdi(32), Some(48));
    }

    #[test]
    fn universal_round_trips_over_permanent_fdi() {
        for quadrant in 1..=4u8 {
            for tooth in 1..=8u8 {
                let fdi = quadrant * 10 + tooth;
                let universal = fdi_to_universal(fdi).unwrap();
                assert_eq!(
                    universal_to_fdi(universal),
                    Some(fdi),
                    "FDI {fdi} did not round-trip via universal {universal}"
                );
            }
        }
    }

    #[test]
    fn universal_out_of_range() {
        assert_eq!(universal_to_fdi(0), None);
        assert_eq!(universal_to_fdi(33), None);
    }

    #[test]
    fn quadrant_letters() {
        assert_eq!(text_to_fdi("UR3"), Some(13));
        assert_eq!(text_to_fdi("UL1"), Some(21));
        assert_eq!(text_to_fdi("LL8"), Some(38));
        assert_eq!(text_to_fdi("LR5"), Some(45));
    }

    #[test]
    fn quadrant_letters_case_and_whitespace() {
        assert_eq!(text_to_fdi("ur3"), Some(13));
        assert_eq!(text_to_fdi("  lr2 "), Some(42));
    }

    #[test]
    fn quadrant_letters_bad_digit() {
        assert_eq!(text_to_fdi("UR9"), None);
        assert_eq!(text_to_fdi("UR0"), None);
        assert_eq!(text_to_fdi("UR12"), None);
    }

    #[test]
    fn dotted_notation() {
        assert_eq!(text_to_fdi("2.3"), Some(23));
        assert_eq!(text_to_fdi("4-8"), Some(48));
        assert_eq!(text_to_fdi("1.1"), Some(11));
    }

    #[test]
    fn dotted_out_of_range() {
        assert_eq!(text_to_fdi("5.3"), None);
        assert_eq!(text_to_fdi("2.9"), None);
        assert_eq!(text_to_fdi("0.1"), None);
    }

    #[test]
    fn numeric_string() {
        assert_eq!(text_to_fdi("16"), Some(16));
        assert_eq!(text_to_fdi("3"), Some(universal_to_fdi(3).unwrap()));
    }

    #[test]
    fn leading_digit_salvage() {
        assert_eq!(text_to_fdi("16 distal"), Some(16));
        assert_eq!(text_to_fdi("23(mesial)"), Some(23));
    }

    #[test]
    fn unresolvable_is_none() {
        assert_eq!(text_to_fdi(""), None);
        assert_eq!(text_to_fdi("molar"), None);
        assert_eq!(text_to_fdi("99"), None);
        assert_eq!(numeric_to_fdi(0), None);
        assert_eq!(numeric_to_fdi(-4), None);
        assert_eq!(numeric_to_fdi(100), None);
    }
}
