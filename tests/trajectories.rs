// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end properties of generated trajectory datasets.

use std::f64::consts::PI;

use approx::assert_relative_eq;
use qubit_os_trajectories::evolution::{evolve_master_equation, MonteCarloConfig, Tolerances};
use qubit_os_trajectories::hamiltonian::{amplitude_damping_channels, CouplingConstants};
use qubit_os_trajectories::quantum::pauli;
use qubit_os_trajectories::sampling::bloch_state;
use qubit_os_trajectories::{
    ClosedEvolutionSolver, Config, DatasetAssembler, DatasetType, HamiltonianBuilder,
    MonteCarloSolver, Operator, RandomSource, RngMode, Split, SystemSize, TimeGrid,
    TrajectoryDataset,
};

fn small_config(system: SystemSize, dataset_type: DatasetType) -> Config {
    let mut config = Config::default();
    config.dataset.system = system;
    config.dataset.dataset_type = dataset_type;
    config.dataset.num_batches = 3;
    config.dataset.batched_samples = 2;
    config.dataset.validation_samples = 3;
    config.dataset.time_steps = 26;
    config.dataset.start = 0.0;
    config.dataset.last = 5.0;
    config.dataset.stop = 2.0;
    config.solver.mc_samples = 16;
    config.solver.substeps = 5;
    config.random.seed = Some(1234);
    config
}

fn monte_carlo(num_trajectories: usize, substeps: usize) -> MonteCarloSolver {
    MonteCarloSolver::new(MonteCarloConfig {
        num_trajectories,
        substeps,
        tolerances: Tolerances::default(),
    })
    .unwrap()
}

// =============================================================================
// Concrete scenarios
// =============================================================================

#[test]
fn closed_sigma_z_plus_sigma_x_from_ground_state() {
    let h = Operator::linear_combination(&[(1.0, &pauli::sigma_z()), (1.0, &pauli::sigma_x())])
        .unwrap();
    let psi0 = bloch_state(0.0, 0.0).unwrap();
    let grid = TimeGrid::from_points(vec![0.0, PI]).unwrap();
    let obs = pauli::observables(SystemSize::OneQubit).unwrap();

    let table = ClosedEvolutionSolver::default()
        .evolve(&h, &psi0, &grid, &obs)
        .unwrap();

    assert_eq!(table.dim(), (2, 3));
    assert_relative_eq!(table[[0, 2]], 1.0, epsilon = 1e-12);
    assert!((table[[1, 2]] - 1.0).abs() > 0.1);
}

#[test]
fn amplitude_damping_from_excited_state_decays() {
    // γ = 0.02 and t up to 4/γ: ⟨σz⟩ = 1 − 2e^{−γt} moves from −1 towards +1
    let ops = amplitude_damping_channels(SystemSize::OneQubit, 0.02).unwrap();
    let psi0 = bloch_state(PI, 0.0).unwrap();
    let grid = TimeGrid::linspace(0.0, 200.0, 21).unwrap();
    let mut rng = RandomSource::seeded(2026, RngMode::PerTask);

    let table = monte_carlo(500, 20)
        .evolve_open(
            &Operator::zeros(SystemSize::OneQubit),
            &ops,
            &psi0,
            &grid,
            &[pauli::sigma_z()],
            &mut rng,
        )
        .unwrap();

    let last = grid.len() - 1;
    assert_relative_eq!(table[[0, 0]], -1.0, epsilon = 1e-12);
    assert!(table[[last, 0]] > 0.8, "final ⟨σz⟩ = {}", table[[last, 0]]);
    assert!(table[[last, 0]] > table[[last / 2, 0]]);
}

// =============================================================================
// Open-system statistics
// =============================================================================

#[test]
fn monte_carlo_average_tracks_master_equation() {
    let h = Operator::linear_combination(&[(1.0, &pauli::sigma_z()), (0.5, &pauli::sigma_x())])
        .unwrap();
    let ops = amplitude_damping_channels(SystemSize::OneQubit, 0.4).unwrap();
    let psi0 = bloch_state(PI, 0.0).unwrap();
    let grid = TimeGrid::linspace(0.0, 5.0, 26).unwrap();
    let obs = pauli::observables(SystemSize::OneQubit).unwrap();

    let reference = evolve_master_equation(&h, &ops, &psi0, &grid, &obs, 40).unwrap();
    let mut rng = RandomSource::seeded(99, RngMode::PerTask);
    let averaged = monte_carlo(2000, 40)
        .evolve_open(&h, &ops, &psi0, &grid, &obs, &mut rng)
        .unwrap();

    for ((k, o), &exact) in reference.indexed_iter() {
        let estimate = averaged[[k, o]];
        assert!(
            (estimate - exact).abs() < 0.1,
            "t index {k}, observable {o}: {estimate} vs {exact}"
        );
    }
}

#[test]
fn larger_damping_rate_relaxes_faster() {
    let psi0 = bloch_state(PI, 0.0).unwrap();
    let grid = TimeGrid::linspace(0.0, 2.0, 11).unwrap();
    let h = Operator::zeros(SystemSize::OneQubit);
    let last = grid.len() - 1;

    let relaxed = |gamma: f64| {
        let ops = amplitude_damping_channels(SystemSize::OneQubit, gamma).unwrap();
        let mut rng = RandomSource::seeded(5, RngMode::PerTask);
        let table = monte_carlo(2000, 20)
            .evolve_open(&h, &ops, &psi0, &grid, &[pauli::sigma_z()], &mut rng)
            .unwrap();
        table[[last, 0]]
    };

    // Exact values: −0.637 and 0.101
    let slow = relaxed(0.1);
    let fast = relaxed(0.4);
    assert!(fast > slow + 0.4, "γ=0.1 → {slow}, γ=0.4 → {fast}");
}

#[test]
fn master_equation_relaxation_is_monotone_in_gamma() {
    let psi0 = bloch_state(PI, 0.0).unwrap();
    let grid = TimeGrid::linspace(0.0, 3.0, 7).unwrap();
    let h = Operator::linear_combination(&[(1.5, &pauli::sigma_z())]).unwrap();
    let mut previous: Option<Vec<f64>> = None;

    for gamma in [0.05, 0.1, 0.2, 0.4] {
        let ops = amplitude_damping_channels(SystemSize::OneQubit, gamma).unwrap();
        let table =
            evolve_master_equation(&h, &ops, &psi0, &grid, &[pauli::sigma_z()], 20).unwrap();
        let column: Vec<f64> = table.column(0).to_vec();
        if let Some(prev) = &previous {
            for k in 1..grid.len() {
                assert!(column[k] > prev[k]);
            }
        }
        previous = Some(column);
    }
}

// =============================================================================
// Dataset invariants
// =============================================================================

#[test]
fn dataset_shape_invariant() {
    let cases = [
        (SystemSize::OneQubit, DatasetType::Closed, 4, 3),
        (SystemSize::OneQubit, DatasetType::Open, 4, 3),
        (SystemSize::TwoQubit, DatasetType::Closed, 2, 4),
        (SystemSize::TwoQubit, DatasetType::Open, 2, 4),
    ];
    for (system, dataset_type, samples, observables) in cases {
        let config = small_config(system, dataset_type);
        let ds = DatasetAssembler::new(&config)
            .unwrap()
            .build(&mut config.random_source())
            .unwrap();
        assert_eq!(ds.trajectories().dim(), (3 * samples, 26, observables));
        // Grid step 0.2, cutoff 2.0 keeps 11 points
        assert_eq!(ds.train_trajectories().dim(), (3 * samples, 11, observables));
        assert_eq!(ds.split(Split::Train).len(), ds.len());
    }
}

#[test]
fn closed_trajectories_stay_in_range() {
    let mut config = small_config(SystemSize::OneQubit, DatasetType::Closed);
    config.dataset.batched_samples = 4;
    let ds = DatasetAssembler::new(&config)
        .unwrap()
        .build(&mut config.random_source())
        .unwrap();
    assert!(ds.trajectories().iter().all(|v| v.abs() <= 1.0 + 1e-9));

    // Pure-state Bloch vectors stay on the unit sphere
    for trajectory in ds.split(Split::Full).iter() {
        for row in trajectory.rows() {
            let r2: f64 = row.iter().map(|v| v * v).sum();
            assert_relative_eq!(r2, 1.0, epsilon = 1e-9);
        }
    }
}

#[test]
fn sampled_initial_states_lie_on_bloch_sphere() {
    let config = small_config(SystemSize::OneQubit, DatasetType::Closed);
    let ds = DatasetAssembler::new(&config)
        .unwrap()
        .build(&mut config.random_source())
        .unwrap();
    for cloud in [ds.bloch_point_cloud().unwrap(), ds.validation_point_cloud().unwrap()] {
        for row in cloud.points.rows() {
            let r2: f64 = row.iter().map(|v| v * v).sum();
            assert_relative_eq!(r2, 1.0, epsilon = 1e-12);
        }
        assert!(cloud.colors.iter().all(|c| (0.0..=1.0).contains(c)));
    }
    for state in &ds.initial_states().unwrap().states {
        assert_relative_eq!(state.norm_sqr(), 1.0, epsilon = 1e-12);
    }
}

#[test]
fn round_trip_preserves_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("open.json");

    let config = small_config(SystemSize::OneQubit, DatasetType::Open);
    let built = DatasetAssembler::new(&config)
        .unwrap()
        .build(&mut config.random_source())
        .unwrap();
    built.save_json(&path).unwrap();

    let loaded = TrajectoryDataset::load_json(&path, config.dataset.stop).unwrap();
    assert_eq!(loaded.trajectories(), built.trajectories());
    assert_eq!(loaded.time_grid().points(), built.time_grid().points());
    assert_eq!(loaded.train_trajectories(), built.train_trajectories());
    assert_eq!(loaded.dataset_type(), DatasetType::Open);
    assert_eq!(loaded.plot_labels(), built.plot_labels());
}

#[test]
fn two_qubit_hamiltonians_are_hermitian() {
    let builder =
        HamiltonianBuilder::new(SystemSize::TwoQubit, CouplingConstants::default()).unwrap();
    let mut rng = RandomSource::seeded(17, RngMode::Sequential);
    for _ in 0..100 {
        let params = builder.sample_parameters(&mut rng);
        let h = builder.build(&params).unwrap();
        assert_eq!(h.matrix().dim(), (4, 4));
        assert!(h.hermiticity_deviation() < 1e-12);
    }
}

#[test]
fn rng_modes_are_individually_reproducible() {
    for mode in [RngMode::Sequential, RngMode::PerTask] {
        let mut config = small_config(SystemSize::TwoQubit, DatasetType::Open);
        config.random.mode = mode;
        let assembler = DatasetAssembler::new(&config).unwrap();
        let a = assembler.build(&mut config.random_source()).unwrap();
        let b = assembler.build(&mut config.random_source()).unwrap();
        assert_eq!(a.trajectories(), b.trajectories());
    }
}
