//! Plural rules.
//!
//! CLDR-style categories selected by a locale's language. English has two
//! forms (one, other); Russian three; Arabic and Welsh use all six.

use crate::Locale;
use std::fmt;
use std::str::FromStr;

/// CLDR plural categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    pub const ALL: [PluralCategory; 6] = [
        PluralCategory::Zero,
        PluralCategory::One,
        PluralCategory::Two,
        PluralCategory::Few,
        PluralCategory::Many,
        PluralCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::One => "one",
            Self::Two => "two",
            Self::Few => "few",
            Self::Many => "many",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluralCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// Plural rule families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralRule {
    /// 1 is one, everything else other (Germanic, most Romance)
    OneOther,
    /// 0 and 1 are one (French)
    French,
    /// No plural distinction (Chinese, Japanese, Korean, ...)
    Invariant,
    /// Russian, Ukrainian, Belarusian
    EastSlavic,
    Polish,
    /// Czech and Slovak
    WestSlavic,
    Welsh,
    Arabic,
}

impl PluralRule {
    pub fn for_language(language: &str) -> Self {
        match language {
            "ja" | "ko" | "zh" | "vi" | "th" | "id" | "ms" => Self::Invariant,
            "fr" => Self::French,
            "ru" | "uk" | "be" => Self::EastSlavic,
            "pl" => Self::Polish,
            "cs" | "sk" => Self::WestSlavic,
            "cy" => Self::Welsh,
            "ar" => Self::Arabic,
            _ => Self::OneOther,
        }
    }

    pub fn for_locale(locale: &Locale) -> Self {
        Self::for_language(locale.language())
    }

    /// Category of `n` under this rule.
    pub fn category(&self, n: f64) -> PluralCategory {
        use PluralCategory::*;

        let fractional = n.fract() != 0.0;
        let i = n.abs().trunc() as i64;
        let mod10 = i % 10;
        let mod100 = i % 100;

        match self {
            Self::Invariant => Other,
            Self::OneOther => {
                if i == 1 && !fractional {
                    One
                } else {
                    Other
                }
            }
            Self::French => {
                if i <= 1 && !fractional {
                    One
                } else {
                    Other
                }
            }
            _ if fractional && *self == Self::WestSlavic => Many,
            _ if fractional => Other,
            Self::EastSlavic => {
                if mod10 == 1 && mod100 != 11 {
                    One
                } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
                    Few
                } else {
                    Many
                }
            }
            Self::Polish => {
                if i == 1 {
                    One
                } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
                    Few
                } else {
                    Many
                }
            }
            Self::WestSlavic => match i {
                1 => One,
                2..=4 => Few,
                _ => Other,
            },
            Self::Welsh => match i {
                0 => Zero,
                1 => One,
                2 => Two,
                3 => Few,
                6 => Many,
                _ => Other,
            },
            Self::Arabic => match i {
                0 => Zero,
                1 => One,
                2 => Two,
                _ if (3..=10).contains(&mod100) => Few,
                _ if (11..=99).contains(&mod100) => Many,
                _ => Other,
            },
        }
    }

    /// Categories this rule can produce.
    pub fn categories(&self) -> &'static [PluralCategory] {
        use PluralCategory::*;

        match self {
            Self::Invariant => &[Other],
            Self::OneOther | Self::French => &[One, Other],
            Self::EastSlavic | Self::Polish => &[One, Few, Many, Other],
            Self::WestSlavic => &[One, Few, Many, Other],
            Self::Welsh | Self::Arabic => &PluralCategory::ALL,
        }
    }
}

/// Plural category of `n` in `locale`.
///
/// # Example
///
/// ```
/// use parlance_i18n::{plural_category, Locale, PluralCategory};
///
/// let en = Locale::parse("en").unwrap();
/// assert_eq!(plural_category(1, &en), PluralCategory::One);
/// assert_eq!(plural_category(0, &en), PluralCategory::Other);
/// ```
pub fn plural_category(n: impl Into<f64>, locale: &Locale) -> PluralCategory {
    PluralRule::for_locale(locale).category(n.into())
}
