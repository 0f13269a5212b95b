use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::progress::ProgressError;

/// Which language track the learner practises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Shona,
    #[default]
    Both,
}

impl Language {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Shona => "shona",
            Language::Both => "both",
        }
    }
}

impl FromStr for Language {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "english" => Ok(Language::English),
            "shona" => Ok(Language::Shona),
            "both" => Ok(Language::Both),
            other => Err(ProgressError::UnknownLanguage(other.to_owned())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
