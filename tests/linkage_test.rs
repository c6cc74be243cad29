//! Integration tests for the coupled run.
//!
//! These tests verify:
//! 1. Surface queries on a freshly seeded flat DEM
//! 2. Deposition at a column retags the air below the new surface
//! 3. Checkpoints fire once per interval boundary, in order
//! 4. Solver failures abort the run and report the time reached
//! 5. Configuration and run state survive a trip through TOML
//! 6. The same stable-step sequence gives bit-identical step boundaries

use surface_linkage::error::{ConfigError, LinkageError, SolverStepError};
use surface_linkage::exchange::ColumnChange;
use surface_linkage::grid::ElevationGrid;
use surface_linkage::material::MaterialTag;
use surface_linkage::simulation::{LinkageConfig, LinkageModel};
use surface_linkage::solver::{MechanicsSolver, Particle, SurfaceProcessSolver};
use surface_linkage::time::CouplingState;
use surface_linkage::types::{Bounds3D, CellIndex, GridResolution, ParticleIndex};
use surface_linkage::BoxedSolverError;

const CHECKPOINT_INTERVAL: f64 = 10_000.0;

fn lithosphere() -> Bounds3D {
    Bounds3D::new([0.0, 0.0, -80_000.0], [100_000.0, 100_000.0, 20_000.0])
}

fn config() -> LinkageConfig {
    LinkageConfig::new(lithosphere())
        .with_resolution(GridResolution::square(180))
        .with_checkpoint_interval(CHECKPOINT_INTERVAL)
        .with_initial_elevation(0.0)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

// ============================================================================
// Test solvers
// ============================================================================

/// Mechanics stand-in: a static swarm with a fixed stable step.
struct StaticSwarm {
    particles: Vec<Particle>,
    stable: f64,
    accounted: Vec<ColumnChange>,
}

impl StaticSwarm {
    fn new(particles: Vec<Particle>, stable: f64) -> Self {
        Self {
            particles,
            stable,
            accounted: Vec::new(),
        }
    }
}

impl MechanicsSolver for StaticSwarm {
    fn max_stable_step(&self) -> f64 {
        self.stable
    }

    fn advance(&mut self, requested: f64) -> Result<f64, BoxedSolverError> {
        Ok(requested.min(self.stable))
    }

    fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    fn apply_mass_accounting(&mut self, changes: &[ColumnChange]) {
        self.accounted.extend_from_slice(changes);
    }

    fn name(&self) -> &str {
        "static-swarm"
    }
}

/// Surface stand-in: deposits a fixed thickness at one column on its first step.
struct PointDeposit {
    dem: ElevationGrid,
    target: Option<(f64, f64)>,
    thickness: f64,
    fail_on_call: Option<usize>,
    calls: usize,
}

impl PointDeposit {
    fn idle() -> Self {
        Self {
            dem: ElevationGrid::filled(
                lithosphere().horizontal(),
                GridResolution::square(180),
                0.0,
            ),
            target: None,
            thickness: 0.0,
            fail_on_call: None,
            calls: 0,
        }
    }

    fn at(x: f64, y: f64, thickness: f64) -> Self {
        Self {
            target: Some((x, y)),
            thickness,
            ..Self::idle()
        }
    }
}

impl SurfaceProcessSolver for PointDeposit {
    fn elevation(&self) -> &ElevationGrid {
        &self.dem
    }

    fn load(&mut self, dem: ElevationGrid) {
        self.dem = dem;
    }

    fn step(
        &mut self,
        current: &ElevationGrid,
        _duration: f64,
    ) -> Result<ElevationGrid, BoxedSolverError> {
        self.calls += 1;
        if self.fail_on_call == Some(self.calls) {
            return Err("landscape solver diverged".into());
        }
        let mut next = current.clone();
        if let Some((x, y)) = self.target.take()
            && let Some(cell) = next.nearest_node(x, y)
            && let Some(z) = next.get(cell)
        {
            next.set(cell, z + self.thickness);
        }
        self.dem = next.clone();
        Ok(next)
    }

    fn name(&self) -> &str {
        "point-deposit"
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_flat_dem_elevation_query() {
    init_tracing();
    let model = LinkageModel::new(
        config(),
        StaticSwarm::new(Vec::new(), 1_000.0),
        PointDeposit::idle(),
    )
    .unwrap();

    assert_eq!(model.elevation_at(50_000.0, 50_000.0).unwrap(), 0.0);
    assert_eq!(model.elevation_at(0.0, 100_000.0).unwrap(), 0.0);

    let err = model.elevation_at(150_000.0, 50_000.0).unwrap_err();
    assert!(LinkageError::from(err).is_recoverable());
}

#[test]
fn test_deposition_turns_air_into_sediment() {
    init_tracing();
    let swarm = StaticSwarm::new(
        vec![
            Particle::new([50_000.0, 50_000.0, -0.1], MaterialTag::AIR),
            Particle::new([50_000.0, 50_000.0, 100.0], MaterialTag::AIR),
            Particle::new([10_000.0, 10_000.0, -0.1], MaterialTag::AIR),
        ],
        CHECKPOINT_INTERVAL,
    );
    let mut model = LinkageModel::new(
        config(),
        swarm,
        PointDeposit::at(50_000.0, 50_000.0, 5.0),
    )
    .unwrap();

    let summary = model.run_for(CHECKPOINT_INTERVAL).unwrap();
    assert_eq!(summary.n_exchanges, 1);
    assert_eq!(summary.n_deposited, 1);
    assert_eq!(summary.n_eroded, 0);

    let particles = model.mechanics().particles();
    assert_eq!(particles[0].tag, MaterialTag::SEDIMENT);
    // above the new surface
    assert_eq!(particles[1].tag, MaterialTag::AIR);
    // different column
    assert_eq!(particles[2].tag, MaterialTag::AIR);

    let accounted = &model.mechanics().accounted;
    assert_eq!(accounted.len(), 1);
    assert!(accounted[0].is_deposition());
    assert_eq!(accounted[0].delta, 5.0);
    assert_eq!(accounted[0].deposited, vec![ParticleIndex::new(0)]);

    let cell = model.mapper().column_of(model.surface().elevation(), 50_000.0, 50_000.0).unwrap();
    assert_eq!(accounted[0].cell, cell);
    assert_eq!(model.surface().elevation().get(cell), Some(5.0));
}

#[test]
fn test_checkpoints_every_interval() {
    init_tracing();
    let mut model = LinkageModel::new(
        config(),
        StaticSwarm::new(Vec::new(), 50_000.0),
        PointDeposit::idle(),
    )
    .unwrap();

    let mut fired = Vec::new();
    let summary = model
        .run_for_with(
            100_000.0,
            |mechanics, dt| mechanics.advance(dt),
            |cp| fired.push((cp.sequence, cp.elapsed)),
        )
        .unwrap();

    assert_eq!(fired.len(), 10);
    for (i, &(sequence, elapsed)) in fired.iter().enumerate() {
        assert_eq!(sequence, i as u64 + 1);
        assert_eq!(elapsed, (i + 1) as f64 * CHECKPOINT_INTERVAL);
    }
    // the sync point, not the mechanics limit, bounds every step
    assert_eq!(summary.dt_min, CHECKPOINT_INTERVAL);
    assert_eq!(summary.dt_max, CHECKPOINT_INTERVAL);
}

#[test]
fn test_checkpoints_with_uneven_steps() {
    let mut model = LinkageModel::new(
        config(),
        StaticSwarm::new(Vec::new(), 3_000.0),
        PointDeposit::idle(),
    )
    .unwrap();

    let mut fired = Vec::new();
    model
        .run_for_with(
            55_000.0,
            |mechanics, dt| mechanics.advance(dt * 0.75),
            |cp| fired.push((cp.sequence, cp.elapsed)),
        )
        .unwrap();

    let sequences: Vec<u64> = fired.iter().map(|&(s, _)| s).collect();
    assert_eq!(sequences, vec![1, 2, 3, 4, 5]);
    assert!(fired.windows(2).all(|w| w[0].1 < w[1].1));
    for &(sequence, elapsed) in &fired {
        assert!(elapsed >= sequence as f64 * CHECKPOINT_INTERVAL - 1e-6);
    }
    assert_eq!(model.elapsed(), 55_000.0);
}

#[test]
fn test_surface_failure_reports_elapsed() {
    init_tracing();
    let mut surface = PointDeposit::idle();
    surface.fail_on_call = Some(3);
    let mut model =
        LinkageModel::new(config(), StaticSwarm::new(Vec::new(), 1_000.0), surface).unwrap();

    let err = model.run_for(10_000.0).unwrap_err();
    assert_eq!(err.elapsed(), Some(3_000.0));
    assert!(matches!(
        err,
        LinkageError::SolverStep {
            source: SolverStepError::Surface(_),
            steps: 3,
            ..
        }
    ));
    assert!(err.to_string().contains("diverged"));
}

#[test]
fn test_unregistered_tag_is_configuration_error() {
    let swarm = StaticSwarm::new(
        vec![Particle::new([50_000.0, 50_000.0, -10.0], MaterialTag::new(99))],
        1_000.0,
    );
    let mut model = LinkageModel::new(config(), swarm, PointDeposit::idle()).unwrap();
    assert!(matches!(
        model.run_for(1_000.0),
        Err(LinkageError::Configuration(ConfigError::UnregisteredTag(tag))) if tag == MaterialTag::new(99)
    ));
}

#[test]
fn test_invalid_configuration_rejected_before_run() {
    let config = config().with_checkpoint_interval(-1.0);
    let result = LinkageModel::new(config, StaticSwarm::new(Vec::new(), 1.0), PointDeposit::idle());
    assert!(matches!(
        result,
        Err(ConfigError::NonPositiveInterval { .. })
    ));
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_config_from_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("linkage.toml");
    std::fs::write(
        &path,
        r#"
checkpoint_interval = 10000.0
surface_interval = 2000.0
initial_elevation = 0.0

[mechanics_bounds]
min = [0.0, 0.0, -80000.0]
max = [100000.0, 100000.0, 20000.0]

[resolution]
rows = 180
cols = 180

[materials]
deposited = 3
eroded = 4

[[materials.materials]]
id = 0
name = "air"
class = "air_like"

[[materials.materials]]
id = 1
name = "crust"
class = "sediment_like"

[[materials.materials]]
id = 3
name = "sediment"
class = "sediment_like"

[[materials.materials]]
id = 4
name = "eroded"
class = "air_like"
"#,
    )
    .unwrap();

    let config = LinkageConfig::from_toml_file(&path).unwrap();
    assert_eq!(config.surface_interval, Some(2_000.0));
    assert_eq!(config.materials.len(), 4);
    assert_eq!(config.materials.name_of(MaterialTag::new(1)), Some("crust"));

    let mut model =
        LinkageModel::new(config, StaticSwarm::new(Vec::new(), 500.0), PointDeposit::idle())
            .unwrap();
    let summary = model.run_for(10_000.0).unwrap();
    assert_eq!(summary.n_steps, 20);
    assert_eq!(summary.n_exchanges, 5);
    assert_eq!(summary.n_checkpoints, 1);
}

#[test]
fn test_missing_config_file_is_io_error() {
    assert!(matches!(
        LinkageConfig::from_toml_file("/nonexistent/linkage.toml"),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn test_resume_from_persisted_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.toml");

    let mut model = LinkageModel::new(
        config(),
        StaticSwarm::new(Vec::new(), 4_000.0),
        PointDeposit::idle(),
    )
    .unwrap();
    model
        .run_for_with(
            30_000.0,
            |mechanics, dt| mechanics.advance(dt),
            |cp| {
                if cp.sequence == 2 {
                    let text = toml::to_string(cp.state).unwrap();
                    std::fs::write(&path, text).unwrap();
                }
            },
        )
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let state: CouplingState = toml::from_str(&text).unwrap();
    assert_eq!(state.time, 20_000.0);
    assert_eq!(state.checkpoints.sequence(), 2);

    let mut restarted = LinkageModel::new(
        config(),
        StaticSwarm::new(Vec::new(), 4_000.0),
        PointDeposit::idle(),
    )
    .unwrap();
    restarted.resume(state).unwrap();

    let mut sequences = Vec::new();
    let summary = restarted
        .run_for_with(
            15_000.0,
            |mechanics, dt| mechanics.advance(dt),
            |cp| sequences.push(cp.sequence),
        )
        .unwrap();
    assert_eq!(sequences, vec![3]);
    assert_eq!(summary.final_time, 35_000.0);
    // 3 steps per interval before the save, then 24k, 28k, 30k, 34k, 35k
    assert_eq!(summary.state.steps, 11);
}

#[test]
fn test_seeded_dem_must_match_lattice() {
    let mut model = LinkageModel::new(
        config(),
        StaticSwarm::new(Vec::new(), 1_000.0),
        PointDeposit::idle(),
    )
    .unwrap();
    let coarse = ElevationGrid::filled(lithosphere().horizontal(), GridResolution::square(90), 0.0);
    assert!(matches!(
        model.seed_dem(coarse),
        Err(ConfigError::DemShapeMismatch { .. })
    ));

    let mut raised = ElevationGrid::filled(lithosphere().horizontal(), GridResolution::square(180), 0.0);
    raised.set(CellIndex::new(0, 0), 12.0);
    model.seed_dem(raised).unwrap();
    assert_eq!(model.elevation_at(0.0, 0.0).unwrap(), 12.0);
}

// ============================================================================
// Reproducibility
// ============================================================================

/// Mechanics stand-in whose stable step follows a seeded pseudo-random sequence.
struct JitterSwarm {
    seed: u64,
    stable: f64,
    particles: Vec<Particle>,
}

impl JitterSwarm {
    fn new(seed: u64) -> Self {
        let mut swarm = Self {
            seed,
            stable: 0.0,
            particles: Vec::new(),
        };
        swarm.draw();
        swarm
    }

    fn draw(&mut self) {
        self.seed = self
            .seed
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let unit = (self.seed >> 11) as f64 / (1u64 << 53) as f64;
        self.stable = 3.0 + unit * 37.0;
    }
}

impl MechanicsSolver for JitterSwarm {
    fn max_stable_step(&self) -> f64 {
        self.stable
    }

    fn advance(&mut self, requested: f64) -> Result<f64, BoxedSolverError> {
        let advanced = requested.min(self.stable);
        self.draw();
        Ok(advanced)
    }

    fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }
}

#[derive(Debug, PartialEq)]
struct RunTrace {
    steps: Vec<u64>,
    checkpoints: Vec<(u64, u64, u64, u64)>,
    final_time: u64,
}

fn trace_run(seed: u64) -> RunTrace {
    let config = LinkageConfig::new(lithosphere())
        .with_resolution(GridResolution::square(180))
        .with_checkpoint_interval(100.0)
        .with_surface_interval(75.0);
    let mut model = LinkageModel::new(config, JitterSwarm::new(seed), PointDeposit::idle()).unwrap();

    let mut steps = Vec::new();
    let mut checkpoints = Vec::new();
    let summary = model
        .run_for_with(
            1_000.0,
            |mechanics, dt| {
                steps.push(dt.to_bits());
                mechanics.advance(dt)
            },
            |cp| {
                checkpoints.push((
                    cp.sequence,
                    cp.elapsed.to_bits(),
                    cp.state.steps,
                    cp.state.last_exchange.to_bits(),
                ))
            },
        )
        .unwrap();

    RunTrace {
        steps,
        checkpoints,
        final_time: summary.final_time.to_bits(),
    }
}

#[test]
fn test_step_boundaries_are_reproducible() {
    for seed in [1, 17, 2024] {
        let first = trace_run(seed);
        let second = trace_run(seed);
        assert_eq!(first, second, "seed {}", seed);

        assert_eq!(f64::from_bits(first.final_time), 1_000.0);
        assert_eq!(first.checkpoints.len(), 10);
        for (k, &(sequence, elapsed, _, last_exchange)) in first.checkpoints.iter().enumerate() {
            assert_eq!(sequence, k as u64 + 1);
            // checkpoints and exchanges land exactly on their boundaries
            assert_eq!(f64::from_bits(elapsed), sequence as f64 * 100.0);
            let last_exchange = f64::from_bits(last_exchange);
            assert_eq!(last_exchange, (last_exchange / 75.0).round() * 75.0);
        }
    }
}
