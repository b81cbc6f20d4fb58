use clap::{Parser, ValueEnum};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::num::NonZero;
use std::time::{Duration, Instant};
use weighted_job_selection::algo::{self, BranchAndBound};
use weighted_job_selection::core::{Instance, Limit, Solver, VALUE_TOLERANCE};
use weighted_job_selection::data::{self, table, GenConfig};
use weighted_job_selection::{run_instance, run_reader};

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
            iter.map(|(i, init)| Algorithm(i, init().name())).collect()
        });

        ALGORITHMS.as_slice()
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.1))
    }
}

/// Layout of an input instance.
#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum Format {
    /// JSON array of tasks.
    #[default]
    Json,
    /// Course timetable CSV with a header line.
    Timetable,
    /// Flight listing CSV without a header.
    Flights,
}

/// Application selecting a maximum-weight set of compatible tasks.
#[derive(Debug, Parser)]
enum Application {
    /// Run one of the implemented algorithms.
    Run {
        algorithm: Algorithm,
        /// The input file. Reads stdin when omitted.
        #[clap(short, long)]
        input: Option<String>,
        /// Layout of the input.
        #[clap(short, long, value_enum, default_value_t)]
        format: Format,
        /// Stop searching after this many seconds.
        #[clap(short, long)]
        timeout: Option<u64>,
    },
    /// Run every algorithm on one instance and check that they agree.
    Compare {
        /// The input file. Reads stdin when omitted.
        #[clap(short, long)]
        input: Option<String>,
        /// Layout of the input.
        #[clap(short, long, value_enum, default_value_t)]
        format: Format,
        /// Stop each search after this many seconds.
        #[clap(short, long)]
        timeout: Option<u64>,
    },
    /// Run benchmarks on a set of instances.
    Bench {
        /// The input directory.
        input: String,
        /// Exclude solving algorithms.
        #[clap(short, long, value_delimiter = ',')]
        exclude: Vec<Algorithm>,
    },
    /// Generate random instances named after their optimum.
    Gen {
        #[command(flatten)]
        config: GenConfig,
        /// Number of instances to generate.
        #[clap(short, long, default_value = "1")]
        amount: NonZero<u64>,
        /// Path to output the generated instances. If the directory does not exist, it will be created.
        #[clap(short, long, default_value = "output")]
        output: String,
        /// Seed of the random generator. Uses entropy when omitted.
        #[clap(short, long)]
        seed: Option<u64>,
    },
}

fn solvers(exclude: &[Algorithm]) -> impl Iterator<Item = Box<dyn Solver>> + '_ {
    let iter = algo::SOLVERS.iter().map(|init| init());
    iter.filter(|solver| !exclude.iter().any(|name| name.1 == solver.name()))
}

fn open(input: Option<&str>) -> anyhow::Result<Box<dyn BufRead>> {
    Ok(match input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(std::io::stdin().lock()),
    })
}

fn read_instance(input: Option<&str>, format: Format) -> anyhow::Result<Instance> {
    let mut reader = open(input)?;
    Ok(match format {
        Format::Json => data::deserialize(&mut reader)?,
        Format::Timetable => table::read_timetable(reader)?,
        Format::Flights => table::read_flights(reader)?,
    })
}

fn limit(timeout: Option<u64>) -> Limit {
    timeout.map_or_else(Limit::none, |secs| Limit::with_time_limit(Duration::from_secs(secs)))
}

fn compare(instance: &Instance, timeout: Option<u64>) -> anyhow::Result<()> {
    let mut values = Vec::new();

    for mut solver in solvers(&[]) {
        if instance.has_groups() && !solver.supports_groups() {
            info!("{} skipped: instance has groups", solver.name());
            continue;
        }

        solver.set_limit(limit(timeout));
        let time = Instant::now();
        match solver.solve(instance) {
            Ok(selection) => {
                let time = time.elapsed().as_secs_f64();
                println!("{}: {} in {time:.2} sec", solver.name(), selection.value());
                values.push((solver.name(), selection.value()));
            }
            Err(err) => warn!("{} failed: {err}", solver.name()),
        }
    }

    if let Some((name, value)) = values.first() {
        for (other, other_value) in &values[1..] {
            anyhow::ensure!(
                (value - other_value).abs() <= VALUE_TOLERANCE,
                "{name} found {value} but {other} found {other_value}"
            );
        }
    }

    Ok(())
}

fn generate(config: &GenConfig, amount: u64, output: &str, seed: Option<u64>) -> anyhow::Result<()> {
    let output = std::path::Path::new(output);
    if !output.try_exists()? {
        std::fs::create_dir_all(output)?;
    }

    let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    for i in 0..amount {
        let instance = data::generate(config, &mut rng)?;
        let optimum = BranchAndBound::default().solve(&instance)?.value();
        let filename = format!(
            "{optimum}_{i}{}.json",
            if instance.has_groups() { "_grouped" } else { "" }
        );
        std::fs::File::create(output.join(filename))?
            .write_all(data::to_string(&instance)?.as_bytes())?;
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    match Application::parse() {
        Application::Run {
            algorithm,
            input,
            format,
            timeout,
        } => {
            let mut solver = Box::<dyn Solver>::from(algorithm);
            solver.set_limit(limit(timeout));
            match format {
                Format::Json => run_reader(solver.as_mut(), &mut open(input.as_deref())?),
                _ => run_instance(solver.as_mut(), &read_instance(input.as_deref(), format)?),
            }
        }
        Application::Compare {
            input,
            format,
            timeout,
        } => compare(&read_instance(input.as_deref(), format)?, timeout),
        Application::Bench { input, exclude } => {
            for mut solver in solvers(&exclude) {
                println!("{}", data::run(&input, false, solver.as_mut())?);
            }
            Ok(())
        }
        Application::Gen {
            config,
            amount,
            output,
            seed,
        } => generate(&config, amount.get(), &output, seed),
    }
}
