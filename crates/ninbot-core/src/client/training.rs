use std::str::FromStr;

/// How many times to train in one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainAmount {
    /// Ask the server for the largest selectable amount first.
    Max,
    Exact(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stance {
    Offensive,
    Defensive,
}

impl Stance {
    /// Value of the `do_train` form field.
    pub fn form_value(self) -> &'static str {
        match self {
            Stance::Offensive => "Offensive",
            Stance::Defensive => "Defensive",
        }
    }
}

/// A stat to train, written `+Stat` (offensive) or `-Stat` (defensive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingStat {
    pub stance: Stance,
    pub stat: String,
}

impl std::fmt::Display for TrainingStat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = match self.stance {
            Stance::Offensive => '+',
            Stance::Defensive => '-',
        };
        write!(f, "{sign}{}", self.stat)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("Invalid training entry \"{0}\": expected +Stat or -Stat")]
pub struct InvalidTrainingStat(pub String);

impl FromStr for TrainingStat {
    type Err = InvalidTrainingStat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let entry = s.trim();
        let stance = match entry.chars().next() {
            Some('+') => Stance::Offensive,
            Some('-') => Stance::Defensive,
            _ => return Err(InvalidTrainingStat(s.to_string())),
        };
        let stat = entry[1..].trim();
        if stat.is_empty() {
            return Err(InvalidTrainingStat(s.to_string()));
        }
        Ok(Self {
            stance,
            stat: stat.to_string(),
        })
    }
}
