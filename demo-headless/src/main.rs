//! Headless pollution-dispersion demo
//!
//! Stands in for the external traffic simulator: moves a synthetic vehicle
//! fleet around the domain, feeds per-tick snapshots into the solver, and
//! prints grid statistics.

use clap::Parser;
use plume_sim_core::{
    AmbientConditions, DomainBounds, PlumeConfig, PlumeSolver, PollutionGrid, StabilityClass,
    UnknownClassPolicy, VehicleSource,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Vehicle-exhaust dispersion demo with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "plume-sim-demo")]
#[command(about = "Gaussian-plume pollution dispersion demo", long_about = None)]
struct Args {
    /// Number of simulation ticks
    #[arg(short, long, default_value_t = 200)]
    steps: usize,

    /// Number of vehicles in the synthetic fleet
    #[arg(short, long, default_value_t = 40)]
    vehicles: usize,

    /// Wind speed in m/s
    #[arg(short, long, default_value_t = 2.0)]
    wind_speed: f64,

    /// Wind direction in degrees (0 = toward +x, counterclockwise)
    #[arg(long, default_value_t = 0.0)]
    wind_direction: f64,

    /// Atmospheric stability class (A-F; unknown labels fall back to neutral)
    #[arg(long, default_value = "B")]
    stability: String,

    /// Global emission factor
    #[arg(short, long, default_value_t = 0.5)]
    emission_factor: f64,

    /// Grid resolution (cells per side)
    #[arg(short, long, default_value_t = 100)]
    resolution: usize,

    /// Domain side length in meters (square, starting at the origin)
    #[arg(long, default_value_t = 1000.0)]
    domain_size: f64,

    /// Print statistics every N ticks
    #[arg(long, default_value_t = 20)]
    report_every: usize,

    /// RNG seed for the synthetic fleet
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

/// A vehicle of the synthetic fleet: drives in a heading that drifts randomly,
/// bouncing off the domain edges.
struct Vehicle {
    x: f64,
    y: f64,
    heading: f64,
    speed: f64,
}

impl Vehicle {
    fn step(&mut self, bounds: &DomainBounds, rng: &mut StdRng) {
        self.heading += rng.random_range(-0.3..0.3);
        self.speed = (self.speed + rng.random_range(-1.0..1.0)).clamp(0.0, 33.0);
        self.x += self.speed * self.heading.cos();
        self.y += self.speed * self.heading.sin();
        if self.x <= bounds.x_min || self.x >= bounds.x_max {
            self.heading = std::f64::consts::PI - self.heading;
            self.x = self.x.clamp(bounds.x_min, bounds.x_max);
        }
        if self.y <= bounds.y_min || self.y >= bounds.y_max {
            self.heading = -self.heading;
            self.y = self.y.clamp(bounds.y_min, bounds.y_max);
        }
    }

    fn snapshot(&self) -> VehicleSource {
        VehicleSource::new(self.x, self.y, self.speed)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let bounds = DomainBounds::new(0.0, args.domain_size, 0.0, args.domain_size)?;
    let mut grid = PollutionGrid::new(bounds, args.resolution)?;
    let solver = PlumeSolver::new(PlumeConfig::default())?;

    let coefficients = StabilityClass::resolve_coefficients(
        &args.stability,
        UnknownClassPolicy::FallbackNeutral,
    )?;
    let conditions = AmbientConditions::with_coefficients(
        args.wind_speed,
        args.wind_direction.to_radians(),
        args.emission_factor,
        coefficients,
    );

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut fleet: Vec<Vehicle> = (0..args.vehicles)
        .map(|_| Vehicle {
            x: rng.random_range(bounds.x_min..bounds.x_max),
            y: rng.random_range(bounds.y_min..bounds.y_max),
            heading: rng.random_range(0.0..std::f64::consts::TAU),
            speed: rng.random_range(0.0..25.0),
        })
        .collect();

    println!(
        "plume-sim demo: {} vehicles, {}x{} grid over {:.0} m, wind {} m/s at {} deg, class {}",
        args.vehicles,
        args.resolution,
        args.resolution,
        args.domain_size,
        args.wind_speed,
        args.wind_direction,
        args.stability
    );

    for tick in 1..=args.steps {
        for vehicle in &mut fleet {
            vehicle.step(&bounds, &mut rng);
        }
        let sources: Vec<VehicleSource> = fleet.iter().map(Vehicle::snapshot).collect();
        let stats = solver.update(&mut grid, &sources, &conditions)?;

        if tick % args.report_every == 0 || tick == args.steps {
            let field = grid.stats();
            let peak = field
                .peak_cell
                .map(|(ix, iy)| {
                    let (x, y) = grid.cell_center(ix, iy);
                    format!("({x:.0} m, {y:.0} m)")
                })
                .unwrap_or_else(|| "-".to_string());
            println!(
                "tick {tick:>5}: applied {:>3} sources | max {:.4} mean {:.6} | {} polluted cells | peak at {}",
                stats.sources_applied, field.max, field.mean, field.nonzero_cells, peak
            );
        }
    }

    Ok(())
}
