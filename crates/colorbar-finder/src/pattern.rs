//! Target color sequences and appearance scoring.

use crate::sample::{Appearance, SectionAverage, MAX_SECTIONS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three categorical bar colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarColor {
    Red,
    Green,
    Blue,
}

impl BarColor {
    pub fn as_char(self) -> char {
        match self {
            BarColor::Red => 'R',
            BarColor::Green => 'G',
            BarColor::Blue => 'B',
        }
    }

    /// Case-insensitive `R`, `G` or `B`.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'R' => Some(BarColor::Red),
            'G' => Some(BarColor::Green),
            'B' => Some(BarColor::Blue),
            _ => None,
        }
    }

    pub fn from_ascii(byte: u8) -> Option<Self> {
        Self::from_char(char::from(byte))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("bar code pattern is empty")]
    Empty,
    #[error("bar code pattern has {len} colors, at most {max} are supported")]
    TooLong { len: usize, max: usize },
    #[error("unknown bar color {0:?} (expected R, G or B)")]
    UnknownColor(char),
}

/// Ordered color sequence of a marker, `1..=MAX_SECTIONS` long.
///
/// Markers have no polarity, so equality treats a pattern and its reverse as
/// the same marker. `"RGB"` and `"BGR"` compare equal.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BarCodePattern {
    colors: [BarColor; MAX_SECTIONS],
    len: usize,
}

impl BarCodePattern {
    pub fn new(colors: &[BarColor]) -> Result<Self, PatternError> {
        if colors.is_empty() {
            return Err(PatternError::Empty);
        }
        if colors.len() > MAX_SECTIONS {
            return Err(PatternError::TooLong {
                len: colors.len(),
                max: MAX_SECTIONS,
            });
        }
        let mut buf = [BarColor::Red; MAX_SECTIONS];
        buf[..colors.len()].copy_from_slice(colors);
        Ok(Self {
            colors: buf,
            len: colors.len(),
        })
    }

    /// Parse ASCII color codes (`b'R'`, `b'G'`, `b'B'`).
    pub fn from_ascii(codes: &[u8]) -> Result<Self, PatternError> {
        if codes.len() > MAX_SECTIONS {
            return Err(PatternError::TooLong {
                len: codes.len(),
                max: MAX_SECTIONS,
            });
        }
        let mut buf = [BarColor::Red; MAX_SECTIONS];
        for (slot, &code) in buf.iter_mut().zip(codes) {
            *slot = BarColor::from_ascii(code)
                .ok_or(PatternError::UnknownColor(char::from(code)))?;
        }
        Self::new(&buf[..codes.len()])
    }

    #[inline]
    pub fn colors(&self) -> &[BarColor] {
        &self.colors[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false` for a constructed pattern.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn reversed(&self) -> Self {
        let mut out = *self;
        out.colors[..self.len].reverse();
        out
    }

    pub fn is_palindrome(&self) -> bool {
        self.colors().iter().eq(self.colors().iter().rev())
    }
}

impl PartialEq for BarCodePattern {
    fn eq(&self, other: &Self) -> bool {
        self.colors() == other.colors() || self.colors().iter().eq(other.colors().iter().rev())
    }
}

impl Eq for BarCodePattern {}

impl FromStr for BarCodePattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let len = s.chars().count();
        if len > MAX_SECTIONS {
            return Err(PatternError::TooLong {
                len,
                max: MAX_SECTIONS,
            });
        }
        let mut buf = [BarColor::Red; MAX_SECTIONS];
        for (slot, c) in buf.iter_mut().zip(s.chars()) {
            *slot = BarColor::from_char(c).ok_or(PatternError::UnknownColor(c))?;
        }
        Self::new(&buf[..len])
    }
}

impl fmt::Display for BarCodePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.colors() {
            write!(f, "{}", c.as_char())?;
        }
        Ok(())
    }
}

impl TryFrom<String> for BarCodePattern {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BarCodePattern> for String {
    fn from(value: BarCodePattern) -> Self {
        value.to_string()
    }
}

#[inline]
fn section_term(expected: BarColor, section: &SectionAverage) -> f32 {
    let [r, g, b] = section.channels();
    match expected {
        BarColor::Red => r - g - b,
        BarColor::Green => g - r - b,
        BarColor::Blue => b - r - g,
    }
}

/// How well `appearance` reads as `pattern`, in `[0, 1]`.
///
/// Each section adds its expected channel average and subtracts the other
/// two; the sum is normalised by the section count and clamped. The pattern
/// is read both ways along the segment and the higher score wins.
///
/// Panics if the pattern length differs from the appearance section count.
pub fn match_score(pattern: &BarCodePattern, appearance: &Appearance) -> f32 {
    let n = pattern.len();
    assert_eq!(
        n, appearance.section_count,
        "pattern length must equal appearance section count"
    );

    let colors = pattern.colors();
    let mut forward = 0.0f32;
    let mut reverse = 0.0f32;
    // Both sums run in section order so reversing the pattern swaps them
    // exactly.
    for (i, section) in appearance.sections().enumerate() {
        forward += section_term(colors[i], &section);
        reverse += section_term(colors[n - 1 - i], &section);
    }

    let norm = |s: f32| (s / n as f32).clamp(0.0, 1.0);
    norm(forward).max(norm(reverse))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pattern(s: &str) -> BarCodePattern {
        s.parse().expect("pattern")
    }

    fn appearance(sections: &[[f32; 3]]) -> Appearance {
        let mut app = Appearance {
            section_count: sections.len(),
            ..Appearance::default()
        };
        for (i, [r, g, b]) in sections.iter().copied().enumerate() {
            app.red_average[i] = r;
            app.green_average[i] = g;
            app.blue_average[i] = b;
            app.pixel_count[i] = 4;
        }
        app
    }

    #[test]
    fn parses_and_displays() {
        let p = pattern("rgBb");
        assert_eq!(p.to_string(), "RGBB");
        assert_eq!(
            p.colors(),
            &[BarColor::Red, BarColor::Green, BarColor::Blue, BarColor::Blue]
        );
    }

    #[test]
    fn parse_errors() {
        assert_eq!("".parse::<BarCodePattern>().unwrap_err(), PatternError::Empty);
        assert_eq!(
            "RGX".parse::<BarCodePattern>().unwrap_err(),
            PatternError::UnknownColor('X')
        );
        let long = "R".repeat(MAX_SECTIONS + 1);
        assert_eq!(
            long.parse::<BarCodePattern>().unwrap_err(),
            PatternError::TooLong {
                len: 26,
                max: MAX_SECTIONS
            }
        );
        assert!(BarCodePattern::from_ascii(b"RGB").is_ok());
        assert!(BarCodePattern::from_ascii(b"RG?").is_err());
    }

    #[test]
    fn equality_is_palindrome_invariant() {
        assert_eq!(pattern("RGB"), pattern("BGR"));
        assert_ne!(pattern("RGB"), pattern("RBG"));
        assert_ne!(pattern("RG"), pattern("RGR"));
        assert!(pattern("RGR").is_palindrome());
        assert!(!pattern("RGB").is_palindrome());
        assert_eq!(pattern("RGGB").reversed().to_string(), "BGGR");
    }

    #[test]
    fn serde_uses_string_form() {
        let p = pattern("GBR");
        let json = serde_json::to_string(&p).expect("serialize");
        assert_eq!(json, "\"GBR\"");
        let back: BarCodePattern = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.to_string(), "GBR");
        assert!(serde_json::from_str::<BarCodePattern>("\"RQ\"").is_err());
    }

    #[test]
    fn perfect_appearance_scores_one_both_ways() {
        let app = appearance(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        assert_relative_eq!(match_score(&pattern("RGB"), &app), 1.0);
        assert_relative_eq!(match_score(&pattern("BGR"), &app), 1.0);
    }

    #[test]
    fn mismatch_clamps_to_zero() {
        let app = appearance(&[[0.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 0.0]]);
        assert_eq!(match_score(&pattern("RBR"), &app), 0.0);
    }

    #[test]
    fn partial_match_is_fractional() {
        let app = appearance(&[[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]);
        assert_relative_eq!(match_score(&pattern("RGG"), &app), 1.0 / 3.0);
    }

    #[test]
    fn score_is_identical_for_reversed_pattern() {
        let app = appearance(&[
            [0.7, 0.1, 0.2],
            [0.3, 0.6, 0.1],
            [0.05, 0.15, 0.8],
            [0.4, 0.4, 0.2],
        ]);
        for s in ["RGBR", "GGBR", "BBRG", "RRRR"] {
            let p = pattern(s);
            assert_eq!(match_score(&p, &app), match_score(&p.reversed(), &app));
        }
    }

    #[test]
    #[should_panic(expected = "section count")]
    fn length_mismatch_panics() {
        let app = appearance(&[[1.0, 0.0, 0.0]]);
        match_score(&pattern("RG"), &app);
    }
}
