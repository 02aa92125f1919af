//! Odometer extraction heuristic
//!
//! Pure, deterministic best-guess extraction of an odometer reading from OCR
//! text. Candidates are maximal runs of digits interspersed with spaces or
//! commas; after stripping separators a candidate must be exactly 5 to 7
//! digits. The candidate with the most digits wins, ties broken by numeric
//! value. Confidence is coarse and explainable, not learned: 0.8 for 6+
//! digit readings, 0.6 for 5 digits, 0.0 when nothing qualifies.

use regex::Regex;
use std::sync::LazyLock;

static DIGIT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9][0-9 ,]*[0-9]").expect("valid digit-run regex"));

/// Result of the odometer extraction heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OdometerReading {
    /// Extracted reading, if any candidate qualified.
    pub value: Option<u32>,
    /// Confidence in the 0..1 range.
    pub confidence: f64,
}

impl OdometerReading {
    fn none() -> Self {
        OdometerReading {
            value: None,
            confidence: 0.0,
        }
    }
}

/// Extract the most plausible odometer reading from raw OCR text.
///
/// Evaluated once per completion, never retried.
pub fn extract_odometer(raw: &str) -> OdometerReading {
    // (digit count, numeric value) of the best candidate so far
    let mut best: Option<(usize, u32)> = None;

    for m in DIGIT_RUN_RE.find_iter(raw) {
        let cleaned: String = m
            .as_str()
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        if !(5..=7).contains(&cleaned.len()) {
            continue;
        }
        let value: u32 = match cleaned.parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        let digits = cleaned.len();

        let better = match best {
            None => true,
            Some((best_digits, best_value)) => {
                digits > best_digits || (digits == best_digits && value > best_value)
            }
        };
        if better {
            best = Some((digits, value));
        }
    }

    match best {
        Some((digits, value)) => OdometerReading {
            value: Some(value),
            confidence: if digits >= 6 { 0.8 } else { 0.6 },
        },
        None => OdometerReading::none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_six_digit_reading() {
        let reading = extract_odometer("odometer 123456 km");
        assert_eq!(reading.value, Some(123456));
        assert_eq!(reading.confidence, 0.8);
    }

    #[test]
    fn test_strips_comma_separators() {
        let reading = extract_odometer("12,345");
        assert_eq!(reading.value, Some(12345));
        assert_eq!(reading.confidence, 0.6);
    }

    #[test]
    fn test_strips_space_separators() {
        let reading = extract_odometer("123 456 km total");
        assert_eq!(reading.value, Some(123456));
        assert_eq!(reading.confidence, 0.8);
    }

    #[test]
    fn test_no_candidate() {
        let reading = extract_odometer("abc");
        assert_eq!(reading.value, None);
        assert_eq!(reading.confidence, 0.0);
    }

    #[test]
    fn test_rejects_too_short_and_too_long_runs() {
        assert_eq!(extract_odometer("1234").value, None);
        assert_eq!(extract_odometer("12345678").value, None);
    }

    #[test]
    fn test_longer_candidate_wins_regardless_of_value() {
        // 7 digits beats 6 digits even though 999999 > 1000000 is false anyway;
        // use values where the shorter one is numerically larger per digit.
        let reading = extract_odometer("trip 99999 total 1234567");
        assert_eq!(reading.value, Some(1234567));
        assert_eq!(reading.confidence, 0.8);
    }

    #[test]
    fn test_equal_length_tie_broken_by_numeric_value() {
        let reading = extract_odometer("readings: 123456 and 654321");
        assert_eq!(reading.value, Some(654321));
    }

    #[test]
    fn test_leading_zeros_count_as_digits() {
        // "012345" is a 6-digit run, so confidence is 0.8 even though the
        // parsed value only has 5 significant digits.
        let reading = extract_odometer("km 012345");
        assert_eq!(reading.value, Some(12345));
        assert_eq!(reading.confidence, 0.8);
    }

    #[test]
    fn test_joined_runs_are_one_candidate() {
        // A comma-space bridge merges the digits into one 8-digit run,
        // which is rejected; neither half is considered separately.
        let reading = extract_odometer("123456, 78");
        assert_eq!(reading.value, None);
    }

    #[test]
    fn test_empty_input() {
        let reading = extract_odometer("");
        assert_eq!(reading.value, None);
        assert_eq!(reading.confidence, 0.0);
    }
}
