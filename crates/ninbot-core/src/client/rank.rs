use std::str::FromStr;

use crate::error::{Error, Result};

/// Character rank, as configured by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rank {
    AcademyStudent,
    Genin,
    Chuunin,
    Jounin,
    SpecialJounin,
}

impl Rank {
    pub fn label(self) -> &'static str {
        match self {
            Rank::AcademyStudent => "academy student",
            Rank::Genin => "genin",
            Rank::Chuunin => "chuunin",
            Rank::Jounin => "jounin",
            Rank::SpecialJounin => "special jounin",
        }
    }

    /// Page ID of this rank's training grounds.
    pub fn training_page(self) -> Result<u32> {
        match self {
            Rank::AcademyStudent => Ok(18),
            Rank::Genin => Ok(29),
            Rank::Chuunin => Ok(39),
            Rank::Jounin | Rank::SpecialJounin => Err(Error::UnsupportedRank(self)),
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("Invalid rank \"{0}\"")]
pub struct UnknownRank(pub String);

impl FromStr for Rank {
    type Err = UnknownRank;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "academy student" => Ok(Rank::AcademyStudent),
            "genin" => Ok(Rank::Genin),
            "chuunin" => Ok(Rank::Chuunin),
            "jounin" => Ok(Rank::Jounin),
            "special jounin" => Ok(Rank::SpecialJounin),
            _ => Err(UnknownRank(s.to_string())),
        }
    }
}
