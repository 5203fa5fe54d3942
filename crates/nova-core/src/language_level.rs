use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Java source language level.
///
/// Several checks are only meaningful from a given level on (generics, annotations, enums,
/// varargs, foreach, static imports, covariant return types all arrived with 5.0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JavaLanguageLevel {
    #[serde(rename = "1.3", alias = "JDK_1_3")]
    Jdk1_3,
    #[serde(rename = "1.4", alias = "JDK_1_4")]
    Jdk1_4,
    #[serde(rename = "1.5", alias = "5", alias = "JDK_1_5")]
    Jdk1_5,
    #[serde(rename = "1.6", alias = "6", alias = "JDK_1_6")]
    Jdk1_6,
    #[serde(rename = "1.7", alias = "7", alias = "JDK_1_7")]
    Jdk1_7,
    #[serde(rename = "1.8", alias = "8", alias = "JDK_1_8")]
    Jdk1_8,
}

impl JavaLanguageLevel {
    pub const HIGHEST: JavaLanguageLevel = JavaLanguageLevel::Jdk1_8;

    #[inline]
    pub fn is_at_least(self, other: JavaLanguageLevel) -> bool {
        self >= other
    }

    /// Generics, annotations, enums, varargs, foreach, static imports and covariant returns.
    #[inline]
    pub fn supports_generics(self) -> bool {
        self.is_at_least(JavaLanguageLevel::Jdk1_5)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JavaLanguageLevel::Jdk1_3 => "1.3",
            JavaLanguageLevel::Jdk1_4 => "1.4",
            JavaLanguageLevel::Jdk1_5 => "1.5",
            JavaLanguageLevel::Jdk1_6 => "1.6",
            JavaLanguageLevel::Jdk1_7 => "1.7",
            JavaLanguageLevel::Jdk1_8 => "1.8",
        }
    }
}

impl Default for JavaLanguageLevel {
    fn default() -> Self {
        Self::HIGHEST
    }
}

impl fmt::Display for JavaLanguageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JavaLanguageLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.trim() {
            "1.3" | "3" => JavaLanguageLevel::Jdk1_3,
            "1.4" | "4" => JavaLanguageLevel::Jdk1_4,
            "1.5" | "5" => JavaLanguageLevel::Jdk1_5,
            "1.6" | "6" => JavaLanguageLevel::Jdk1_6,
            "1.7" | "7" => JavaLanguageLevel::Jdk1_7,
            "1.8" | "8" => JavaLanguageLevel::Jdk1_8,
            other => return Err(format!("unknown Java language level `{other}`")),
        };
        Ok(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(JavaLanguageLevel::Jdk1_4 < JavaLanguageLevel::Jdk1_5);
        assert!(!JavaLanguageLevel::Jdk1_4.supports_generics());
        assert!(JavaLanguageLevel::Jdk1_6.supports_generics());
    }

    #[test]
    fn parses_short_and_dotted_forms() {
        assert_eq!("5".parse::<JavaLanguageLevel>(), Ok(JavaLanguageLevel::Jdk1_5));
        assert_eq!("1.4".parse::<JavaLanguageLevel>(), Ok(JavaLanguageLevel::Jdk1_4));
        assert!("11".parse::<JavaLanguageLevel>().is_err());
    }
}
