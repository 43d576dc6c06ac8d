// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Trajectory datasets.
//!
//! A dataset holds, for every (batch, initial state) pair, the expectation
//! values of a fixed observable set over a shared time grid:
//!
//! ```text
//! trajectories[(batch · samples_per_batch + sample), time, observable]
//! ```
//!
//! plus a training copy truncated to time points t ≤ cutoff.

pub mod assembler;
pub mod record;
pub mod types;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use assembler::DatasetAssembler;
pub use record::DatasetRecord;
pub use types::{BlochPointCloud, Split, TrajectoryDataset, TrajectorySplit};

/// Which dynamics generated the trajectories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetType {
    /// Unitary evolution
    #[default]
    Closed,
    /// Amplitude-damped evolution via quantum jumps
    Open,
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetType::Closed => write!(f, "closed"),
            DatasetType::Open => write!(f, "open"),
        }
    }
}

impl FromStr for DatasetType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "closed" => Ok(DatasetType::Closed),
            "open" => Ok(DatasetType::Open),
            other => Err(format!("unknown dataset type '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_type_parsing() {
        assert_eq!("closed".parse::<DatasetType>(), Ok(DatasetType::Closed));
        assert_eq!("OPEN".parse::<DatasetType>(), Ok(DatasetType::Open));
        assert!("lindblad".parse::<DatasetType>().is_err());
        assert_eq!(DatasetType::Open.to_string(), "open");
    }
}
