use crate::util::FinderError;
use std::fmt;
use std::str::FromStr;

/// How many locations a match call reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// The global best placement, if it clears the threshold.
    #[default]
    Single,
    /// Every placement that clears the threshold, in row-major order.
    Multiple,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multiple => "multiple",
        }
    }
}

impl FromStr for MatchMode {
    type Err = FinderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("single") {
            Ok(Self::Single)
        } else if s.eq_ignore_ascii_case("multiple") {
            Ok(Self::Multiple)
        } else {
            Err(FinderError::InvalidMatchMode {
                mode: s.to_string(),
            })
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
