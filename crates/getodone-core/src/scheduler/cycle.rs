use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of one generate-and-notify cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CycleResult {
    /// Preconditions unmet; nothing generated.
    NoData,
    /// A message was generated and handed to the dispatcher.
    NewData,
    Failed,
}

impl CycleResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoData => "no-data",
            Self::NewData => "new-data",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CycleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
