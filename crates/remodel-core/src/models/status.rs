//! Status enumerations for steps.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How demanding a step is for a DIY renovator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "Easy", alias = "EASY")]
    Easy,

    #[default]
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,

    #[serde(alias = "Hard", alias = "HARD")]
    Hard,
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(format!("Invalid difficulty: {s}")),
        }
    }
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Difficulty with a consistent icon for display.
    ///
    /// ```rust
    /// use remodel_core::models::Difficulty;
    ///
    /// assert_eq!(Difficulty::Easy.with_icon(), "● Easy");
    /// assert_eq!(Difficulty::Hard.with_icon(), "●●● Hard");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            Difficulty::Easy => "● Easy",
            Difficulty::Medium => "●● Medium",
            Difficulty::Hard => "●●● Hard",
        }
    }
}
