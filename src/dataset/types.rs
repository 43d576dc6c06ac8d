// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-memory dataset and its collection views.

use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3, Axis};

use super::DatasetType;
use crate::error::{Error, Result};
use crate::evolution::TimeGrid;
use crate::hamiltonian::HamiltonianParameters;
use crate::quantum::SystemSize;
use crate::sampling::InitialStateSet;

/// Which copy of the data a view exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    /// Every time point
    Full,
    /// Time points t ≤ cutoff
    Train,
}

/// Bloch coordinates plus normalized colors for point-cloud rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct BlochPointCloud {
    /// (x, y, z) per state, shape (n, 3)
    pub points: Array2<f64>,
    /// Per-axis min-max normalized coordinates, shape (n, 3)
    pub colors: Array2<f64>,
}

/// Simulated (or loaded) trajectory dataset.
#[derive(Debug, Clone)]
pub struct TrajectoryDataset {
    pub(crate) system_size: SystemSize,
    pub(crate) dataset_type: DatasetType,
    pub(crate) trajectories: Array3<f64>,
    pub(crate) train_trajectories: Array3<f64>,
    pub(crate) time_grid: TimeGrid,
    pub(crate) train_grid: TimeGrid,
    pub(crate) cutoff: f64,
    pub(crate) parameters: Vec<HamiltonianParameters>,
    pub(crate) samples_per_batch: usize,
    pub(crate) initial_states: Option<InitialStateSet>,
    pub(crate) validation_states: Option<InitialStateSet>,
}

impl TrajectoryDataset {
    /// Assemble a dataset from a full trajectory tensor.
    ///
    /// Derives the training copy from `cutoff` and checks every shape.
    pub(crate) fn from_parts(
        dataset_type: DatasetType,
        trajectories: Array3<f64>,
        time_grid: TimeGrid,
        cutoff: f64,
        parameters: Vec<HamiltonianParameters>,
    ) -> Result<Self> {
        let (n, steps, num_observables) = trajectories.dim();
        if steps != time_grid.len() {
            return Err(Error::DimensionMismatch {
                context: "trajectory time axis".into(),
                expected: time_grid.len(),
                actual: steps,
            });
        }
        let system_size = SystemSize::from_num_observables(num_observables).ok_or_else(|| {
            Error::DimensionMismatch {
                context: "observable axis".into(),
                expected: SystemSize::OneQubit.num_observables(),
                actual: num_observables,
            }
        })?;
        if parameters.is_empty() || n == 0 || n % parameters.len() != 0 {
            return Err(Error::DimensionMismatch {
                context: "trajectories per batch".into(),
                expected: parameters.len(),
                actual: n,
            });
        }

        let train_grid = time_grid.truncated(cutoff)?;
        let train_trajectories = trajectories.slice(s![.., ..train_grid.len(), ..]).to_owned();
        let samples_per_batch = n / parameters.len();

        Ok(Self {
            system_size,
            dataset_type,
            trajectories,
            train_trajectories,
            time_grid,
            train_grid,
            cutoff,
            parameters,
            samples_per_batch,
            initial_states: None,
            validation_states: None,
        })
    }

    /// Number of trajectories.
    pub fn num_trajectories(&self) -> usize {
        self.trajectories.dim().0
    }

    /// Number of trajectories.
    pub fn len(&self) -> usize {
        self.num_trajectories()
    }

    /// Whether the dataset holds no trajectories.
    pub fn is_empty(&self) -> bool {
        self.num_trajectories() == 0
    }

    /// One or two qubits.
    pub fn system_size(&self) -> SystemSize {
        self.system_size
    }

    /// Closed or open dynamics.
    pub fn dataset_type(&self) -> DatasetType {
        self.dataset_type
    }

    /// Full tensor, shape (trajectories, time_steps, observables).
    pub fn trajectories(&self) -> &Array3<f64> {
        &self.trajectories
    }

    /// Training tensor, shape (trajectories, train_steps, observables).
    pub fn train_trajectories(&self) -> &Array3<f64> {
        &self.train_trajectories
    }

    /// Full time grid.
    pub fn time_grid(&self) -> &TimeGrid {
        &self.time_grid
    }

    /// Training time grid.
    pub fn train_grid(&self) -> &TimeGrid {
        &self.train_grid
    }

    /// Training cutoff.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Sampled parameters, one per batch.
    pub fn parameters(&self) -> &[HamiltonianParameters] {
        &self.parameters
    }

    /// Number of batches.
    pub fn num_batches(&self) -> usize {
        self.parameters.len()
    }

    /// Initial states per batch.
    pub fn samples_per_batch(&self) -> usize {
        self.samples_per_batch
    }

    /// Initial states (absent for loaded datasets).
    pub fn initial_states(&self) -> Option<&InitialStateSet> {
        self.initial_states.as_ref()
    }

    /// Grid-sampled validation states (absent for loaded datasets).
    pub fn validation_states(&self) -> Option<&InitialStateSet> {
        self.validation_states.as_ref()
    }

    /// Collection view over one split.
    pub fn split(&self, split: Split) -> TrajectorySplit<'_> {
        match split {
            Split::Full => TrajectorySplit {
                split,
                data: self.trajectories.view(),
                times: &self.time_grid,
            },
            Split::Train => TrajectorySplit {
                split,
                data: self.train_trajectories.view(),
                times: &self.train_grid,
            },
        }
    }

    /// Trajectories of one batch, shape (samples_per_batch, time_steps, observables).
    pub fn batch(&self, batch: usize, split: Split) -> Option<ArrayView3<'_, f64>> {
        if batch >= self.num_batches() {
            return None;
        }
        let rows = batch * self.samples_per_batch..(batch + 1) * self.samples_per_batch;
        let data = match split {
            Split::Full => &self.trajectories,
            Split::Train => &self.train_trajectories,
        };
        Some(data.slice(s![rows, .., ..]))
    }

    /// One plot title per batch.
    pub fn plot_labels(&self) -> Vec<String> {
        self.parameters.iter().map(ToString::to_string).collect()
    }

    /// Bloch point cloud of the training initial states.
    pub fn bloch_point_cloud(&self) -> Option<BlochPointCloud> {
        point_cloud(self.initial_states.as_ref())
    }

    /// Bloch point cloud of the validation states.
    pub fn validation_point_cloud(&self) -> Option<BlochPointCloud> {
        point_cloud(self.validation_states.as_ref())
    }
}

fn point_cloud(states: Option<&InitialStateSet>) -> Option<BlochPointCloud> {
    let states = states?;
    let bloch = states.bloch.as_ref()?;
    Some(BlochPointCloud {
        points: bloch.cartesian.clone(),
        colors: states.point_colors()?,
    })
}

/// Indexed access to one split of a dataset.
///
/// `item(i)` always returns data from the split the view was created for;
/// the full and training copies are never mixed.
#[derive(Debug, Clone, Copy)]
pub struct TrajectorySplit<'a> {
    split: Split,
    data: ArrayView3<'a, f64>,
    times: &'a TimeGrid,
}

impl<'a> TrajectorySplit<'a> {
    /// Which split this view exposes.
    pub fn kind(&self) -> Split {
        self.split
    }

    /// Number of trajectories.
    pub fn len(&self) -> usize {
        self.data.dim().0
    }

    /// Whether the split is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// i-th trajectory, shape (time_steps, observables).
    pub fn item(&self, i: usize) -> Option<ArrayView2<'a, f64>> {
        if i >= self.len() {
            return None;
        }
        Some(self.data.index_axis_move(Axis(0), i))
    }

    /// Time points matching the trajectory rows.
    pub fn times(&self) -> &'a [f64] {
        self.times.points()
    }

    /// Iterate trajectories in index order.
    pub fn iter(&self) -> impl Iterator<Item = ArrayView2<'a, f64>> + 'a {
        let data = self.data;
        (0..data.dim().0).map(move |i| data.index_axis_move(Axis(0), i))
    }
}
