// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Persisted dataset format.
//!
//! A record holds exactly what is needed to rebuild a dataset: the full
//! trajectory tensor, the full time grid and the per-batch parameters. The
//! training subset is re-derived from a caller-supplied cutoff on load.
//! Parameter rows are `[a, b]` for closed datasets and `[a, b, γ]` for open
//! ones, which is also how the dataset type is recovered.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::TrajectoryDataset;
use super::DatasetType;
use crate::error::{Error, Result};
use crate::evolution::TimeGrid;
use crate::hamiltonian::HamiltonianParameters;
use crate::quantum::SystemSize;

/// Serializable dataset record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    /// Shape (trajectories, time_steps, observables)
    pub trajectories: Array3<f64>,
    /// Full time grid
    pub time_steps: Vec<f64>,
    /// Shape (num_batches, 2) closed or (num_batches, 3) open
    pub parameters: Array2<f64>,
}

impl DatasetRecord {
    /// Check every field and its consistency with the others.
    ///
    /// Returns the dataset type implied by the parameter columns.
    pub fn validate(&self) -> Result<DatasetType> {
        let (n, steps, num_observables) = self.trajectories.dim();
        if n == 0 || steps == 0 {
            return Err(Error::SourceData(format!(
                "trajectories must be non-empty, got shape ({}, {}, {})",
                n, steps, num_observables
            )));
        }
        if SystemSize::from_num_observables(num_observables).is_none() {
            return Err(Error::SourceData(format!(
                "trajectories have {} observables; expected 3 (one qubit) or 4 (two qubits)",
                num_observables
            )));
        }
        if self.time_steps.len() != steps {
            return Err(Error::SourceData(format!(
                "time_steps has {} points but trajectories have {}",
                self.time_steps.len(),
                steps
            )));
        }
        TimeGrid::from_points(self.time_steps.clone())
            .map_err(|e| Error::SourceData(format!("time_steps: {}", e)))?;

        let (num_batches, columns) = self.parameters.dim();
        let dataset_type = match columns {
            2 => DatasetType::Closed,
            3 => DatasetType::Open,
            other => {
                return Err(Error::SourceData(format!(
                    "parameters have {} columns; expected 2 (closed) or 3 (open)",
                    other
                )))
            }
        };
        if num_batches == 0 || n % num_batches != 0 {
            return Err(Error::SourceData(format!(
                "{} trajectories do not split evenly into {} batches",
                n, num_batches
            )));
        }

        if self.trajectories.iter().any(|v| !v.is_finite()) {
            return Err(Error::SourceData("trajectories contain non-finite values".into()));
        }
        if self.parameters.iter().any(|v| !v.is_finite()) {
            return Err(Error::SourceData("parameters contain non-finite values".into()));
        }
        Ok(dataset_type)
    }

    /// Write as JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Read from JSON; malformed content is a [`Error::SourceData`].
    pub fn load_json(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        serde_json::from_reader(reader)
            .map_err(|e| Error::SourceData(format!("{}: {}", path.display(), e)))
    }
}

impl TrajectoryDataset {
    /// Persistable record of this dataset.
    pub fn to_record(&self) -> DatasetRecord {
        let columns = match self.dataset_type {
            DatasetType::Closed => 2,
            DatasetType::Open => 3,
        };
        let mut parameters = Array2::zeros((self.parameters.len(), columns));
        for (mut row, params) in parameters.rows_mut().into_iter().zip(&self.parameters) {
            row[0] = params.z;
            row[1] = params.x;
            if columns == 3 {
                row[2] = params.damping_rate.unwrap_or(0.0);
            }
        }
        DatasetRecord {
            trajectories: self.trajectories.clone(),
            time_steps: self.time_grid.points().to_vec(),
            parameters,
        }
    }

    /// Rebuild a dataset from a record, re-deriving the training subset.
    ///
    /// All fields are checked here; nothing is deferred to first access.
    pub fn from_record(record: DatasetRecord, cutoff: f64) -> Result<Self> {
        let dataset_type = record.validate()?;
        let parameters = record
            .parameters
            .rows()
            .into_iter()
            .map(|row| {
                let row = row.to_vec();
                HamiltonianParameters::from_row(&row).ok_or_else(|| {
                    Error::SourceData(format!("malformed parameter row {:?}", row))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let time_grid = TimeGrid::from_points(record.time_steps)
            .map_err(|e| Error::SourceData(format!("time_steps: {}", e)))?;

        let dataset = TrajectoryDataset::from_parts(
            dataset_type,
            record.trajectories,
            time_grid,
            cutoff,
            parameters,
        )?;
        debug!(
            trajectories = dataset.num_trajectories(),
            time_steps = dataset.time_grid().len(),
            train_steps = dataset.train_grid().len(),
            dataset_type = %dataset_type,
            "Loaded dataset record"
        );
        Ok(dataset)
    }

    /// Save as a JSON record.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        self.to_record().save_json(path)
    }

    /// Load a JSON record and derive the training subset for `cutoff`.
    pub fn load_json(path: &Path, cutoff: f64) -> Result<Self> {
        Self::from_record(DatasetRecord::load_json(path)?, cutoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn record() -> DatasetRecord {
        DatasetRecord {
            trajectories: Array3::from_shape_fn((4, 3, 3), |(n, t, o)| {
                0.1 * n as f64 - 0.05 * t as f64 + 0.01 * o as f64
            }),
            time_steps: vec![0.0, 1.0, 2.0],
            parameters: ndarray::array![[1.0, 2.0, 0.02], [1.5, 1.25, 0.04]],
        }
    }

    #[test]
    fn test_record_infers_open_dataset() {
        let ds = TrajectoryDataset::from_record(record(), 1.0).unwrap();
        assert_eq!(ds.dataset_type(), DatasetType::Open);
        assert_eq!(ds.num_batches(), 2);
        assert_eq!(ds.samples_per_batch(), 2);
        assert_eq!(ds.train_trajectories().dim(), (4, 2, 3));
        assert_eq!(ds.parameters()[1].damping_rate, Some(0.04));
        assert_eq!(ds.plot_labels()[0], "H = 1z + 2x decay: 0.02");
    }

    #[test]
    fn test_to_record_restores_fields() {
        let original = record();
        let ds = TrajectoryDataset::from_record(original.clone(), 2.0).unwrap();
        assert_eq!(ds.to_record(), original);
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        let ds = TrajectoryDataset::from_record(record(), 1.0).unwrap();
        ds.save_json(&path).unwrap();

        let loaded = TrajectoryDataset::load_json(&path, 1.0).unwrap();
        assert_eq!(loaded.trajectories(), ds.trajectories());
        assert_eq!(loaded.time_grid(), ds.time_grid());
        assert_eq!(loaded.train_trajectories(), ds.train_trajectories());
        assert_eq!(loaded.parameters(), ds.parameters());
    }

    #[test]
    fn test_inconsistent_records_rejected() {
        let mut bad = record();
        bad.time_steps = vec![0.0, 1.0];
        assert!(matches!(bad.validate(), Err(Error::SourceData(_))));

        let mut bad = record();
        bad.time_steps = vec![0.0, 2.0, 1.0];
        assert!(matches!(bad.validate(), Err(Error::SourceData(_))));

        let mut bad = record();
        bad.parameters = ndarray::array![[1.0], [2.0]];
        assert!(matches!(bad.validate(), Err(Error::SourceData(_))));

        let mut bad = record();
        bad.parameters = ndarray::array![[1.0, 2.0], [1.0, 2.0], [1.0, 2.0]];
        assert!(matches!(bad.validate(), Err(Error::SourceData(_))));

        let mut bad = record();
        bad.trajectories[[0, 0, 0]] = f64::NAN;
        assert!(matches!(bad.validate(), Err(Error::SourceData(_))));

        let mut bad = record();
        bad.trajectories = Array3::zeros((4, 3, 2));
        assert!(matches!(bad.validate(), Err(Error::SourceData(_))));
    }

    #[test]
    fn test_missing_field_is_source_data_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, r#"{{"time_steps": [0.0, 1.0]}}"#).unwrap();
        let result = DatasetRecord::load_json(f.path());
        assert!(matches!(result, Err(Error::SourceData(_))));
    }

    #[test]
    fn test_load_with_cutoff_outside_grid_rejected() {
        let result = TrajectoryDataset::from_record(record(), 5.0);
        assert!(matches!(result, Err(Error::InvalidConfiguration { .. })));
    }
}
