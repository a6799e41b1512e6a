use batch_machine_scheduling::core::{Instance, Job, MachineType, Solver};
use batch_machine_scheduling::data::{self, InstanceReader};
use batch_machine_scheduling::{algo, run_reader};
use clap::{Args, Parser, ValueEnum};
use rand::prelude::*;
use std::io::{BufWriter, Write};
use std::num::NonZero;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug)]
struct Algorithm(usize, &'static str);

impl From<Algorithm> for Box<dyn Solver> {
    fn from(value: Algorithm) -> Box<dyn Solver> {
        algo::SOLVERS[value.0]()
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.1)
    }
}

impl ValueEnum for Algorithm {
    fn value_variants<'a>() -> &'a [Self] {
        static ALGORITHMS: std::sync::LazyLock<Vec<Algorithm>> = std::sync::LazyLock::new(|| {
            let iter = algo::SOLVERS.iter().enumerate();
            iter.map(|(i, init)| {
                let name = init().name().to_owned();
                Algorithm(i, Box::leak(name.into_boxed_str()))
            })
            .collect()
        });

        ALGORITHMS.as_slice()
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.1))
    }
}

/// Limits enforced while reading instances.
#[derive(Clone, Copy, Debug, Args)]
struct Limits {
    /// The maximum number of jobs of an instance.
    #[clap(long, default_value = "1000")]
    max_jobs: usize,
    /// The maximum number of machine types of an instance.
    #[clap(long, default_value = "100")]
    max_machine_types: usize,
}

impl From<Limits> for InstanceReader {
    fn from(limits: Limits) -> Self {
        Self::new()
            .max_jobs(limits.max_jobs)
            .max_machine_types(limits.max_machine_types)
    }
}

/// Application computing minimum-cost batch schedules.
/// The log level is read from the `RUST_LOG` environment variable.
#[derive(Debug, Parser)]
#[command(version, about)]
enum Application {
    /// Solve a single instance file.
    Solve {
        /// The instance file. Use `-` to read from stdin and write to stdout.
        input: PathBuf,
        /// The solution file. Defaults to `solutionNN.txt` for `instanceNN.txt`.
        #[clap(short, long)]
        output: Option<PathBuf>,
        /// The solver to use.
        #[clap(short, long, default_value = "DynamicProgramming")]
        algorithm: Algorithm,
        #[command(flatten)]
        limits: Limits,
    },
    /// Solve every `instanceNN.txt` of a directory into `solutionNN.txt`.
    Batch {
        /// The directory with the instances.
        #[clap(default_value = ".")]
        dir: PathBuf,
        /// The first instance number.
        #[clap(long, default_value = "1")]
        first: u32,
        /// The last instance number.
        #[clap(long, default_value = "99")]
        last: u32,
        /// The solver to use.
        #[clap(short, long, default_value = "DynamicProgramming")]
        algorithm: Algorithm,
        #[command(flatten)]
        limits: Limits,
    },
    /// Run benchmarks on a directory of instances.
    Bench {
        /// The input directory.
        input: PathBuf,
        /// Exclude solvers.
        #[clap(short, long, value_delimiter = ',')]
        exclude: Vec<Algorithm>,
        /// Print the reports as JSON.
        #[clap(long, default_value = "false")]
        json: bool,
        #[command(flatten)]
        limits: Limits,
    },
    /// Generate random instances.
    Gen {
        /// The number of jobs.
        jobs: usize,
        /// The number of machine types.
        machine_types: NonZero<usize>,
        /// The latest release time.
        #[clap(long, default_value = "100")]
        horizon: i64,
        /// The longest time window of a job.
        #[clap(long, default_value = "10")]
        max_window: i64,
        /// The largest machine capacity.
        #[clap(long, default_value = "5")]
        max_capacity: NonZero<usize>,
        /// The largest machine cost.
        #[clap(long, default_value = "10")]
        max_cost: NonZero<u64>,
        /// Number of instances to generate.
        #[clap(short, long, default_value = "1")]
        amount: NonZero<u32>,
        /// Seed of the generator. Random if not given.
        #[clap(short, long)]
        seed: Option<u64>,
        /// Path to output the generated instances. If the directory does not exist, it will be created.
        #[clap(short, long, default_value = "output")]
        output: PathBuf,
    },
}

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn solvers(exclude: &[Algorithm]) -> impl Iterator<Item = Box<dyn Solver>> + '_ {
    let iter = algo::SOLVERS.iter().map(|init| init());
    iter.filter(|solver| !exclude.iter().any(|name| name.1 == solver.name()))
}

fn gen_instance(
    rng: &mut impl Rng,
    jobs: usize,
    machine_types: usize,
    horizon: i64,
    max_window: i64,
    max_capacity: usize,
    max_cost: u64,
) -> Instance {
    let jobs = (1..=jobs)
        .map(|id| {
            let release = rng.gen_range(0..=horizon.max(0));
            let deadline = release + rng.gen_range(0..=max_window.max(0));
            Job::new(id, release, deadline)
        })
        .collect();
    let machines = (0..machine_types)
        .map(|_| MachineType::new(rng.gen_range(1..=max_cost), rng.gen_range(1..=max_capacity)))
        .collect();
    Instance::new(jobs, machines)
}

fn solve(
    input: &Path,
    output: Option<PathBuf>,
    solver: &mut dyn Solver,
    reader: &InstanceReader,
) -> anyhow::Result<()> {
    if input == Path::new("-") {
        let mut writer = BufWriter::new(std::io::stdout().lock());
        let cost = run_reader(solver, reader, &mut std::io::stdin().lock(), &mut writer)?;
        writer.flush()?;
        tracing::info!("Solved stdin instance with cost {cost}");
        return Ok(());
    }

    let output = output.or_else(|| data::solution_path(input)).ok_or_else(|| {
        anyhow::anyhow!("Cannot derive a solution path for {}", input.display())
    })?;

    let entry = data::solve_file(input, &output, reader, solver)?;
    if entry.cost.is_none() {
        anyhow::bail!("No feasible schedule for {}", input.display());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    enable_tracing();

    match Application::parse() {
        Application::Solve {
            input,
            output,
            algorithm,
            limits,
        } => {
            let mut solver = Box::<dyn Solver>::from(algorithm);
            solve(&input, output, solver.as_mut(), &limits.into())
        }
        Application::Batch {
            dir,
            first,
            last,
            algorithm,
            limits,
        } => {
            let mut solver = Box::<dyn Solver>::from(algorithm);
            let report = data::process_dir(&dir, first..=last, &limits.into(), solver.as_mut());
            tracing::info!("Processed {} instances", report.entries().len());
            Ok(())
        }
        Application::Bench {
            input,
            exclude,
            json,
            limits,
        } => {
            let reader = InstanceReader::from(limits);
            let mut reports = Vec::new();
            for mut solver in solvers(&exclude) {
                reports.push(data::run(&input, &reader, solver.as_mut())?);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for report in &reports {
                    print!("{report}");
                }
            }
            Ok(())
        }
        Application::Gen {
            jobs,
            machine_types,
            horizon,
            max_window,
            max_capacity,
            max_cost,
            amount,
            seed,
            output,
        } => {
            if !output.try_exists()? {
                std::fs::create_dir_all(&output)?;
            }

            let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

            for i in 1..=amount.get() {
                let instance = gen_instance(
                    &mut rng,
                    jobs,
                    machine_types.get(),
                    horizon,
                    max_window,
                    max_capacity.get(),
                    max_cost.get(),
                );
                let path = output.join(format!("instance{i:02}.txt"));
                let mut writer = BufWriter::new(std::fs::File::create(&path)?);
                data::write_instance(&mut writer, &instance)?;
                writer.flush()?;
                tracing::info!("Generated {}", path.display());
            }
            Ok(())
        }
    }
}
