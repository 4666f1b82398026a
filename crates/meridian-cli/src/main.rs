mod logging;
mod selection;

use clap::{Args, Parser, Subcommand, ValueEnum};
use meridian_core::solver::{Solver, SolverConfig, SolverOutput};
use meridian_core::{MetaModel, ModelError};
use meridian_microlp::MicroLpSolver;
use selection::{SelectionProblem, SelectionReport, print_report_table};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Parser, Debug)]
#[command(
    name = "meridian",
    author,
    version,
    about = "Build and solve Meridian selection models"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Time limit in seconds forwarded to the backend
    #[arg(long, global = true)]
    time_limit: Option<f64>,

    /// Log filter, for example `debug` or `meridian_core=trace` (overrides MERIDIAN_TRACE)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve the built-in five-company scenario
    Demo(DemoArgs),
    /// Solve a selection problem described in a JSON file
    Solve(SolveArgs),
}

#[derive(Args, Debug)]
struct DemoArgs {
    /// Minimum total capital of the selection
    #[arg(long, default_value_t = 10.0)]
    min_capital: f64,

    /// Maximum total liability of the selection
    #[arg(long, default_value_t = 5.0)]
    max_liability: f64,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Args, Debug)]
struct SolveArgs {
    /// JSON problem: {"min_capital", "max_liability", "companies": [...]}
    #[arg(long)]
    input: PathBuf,

    /// Print the model in CPLEX LP format instead of solving it
    #[arg(long)]
    lp: bool,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Solve on a worker thread; Ctrl-C cancels the solve
    #[arg(long = "async")]
    use_async: bool,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref())?;

    let mut config = SolverConfig::new();
    if let Some(seconds) = cli.time_limit {
        config = config.with_time_limit(seconds);
    }

    match cli.command {
        Command::Demo(args) => {
            let problem = SelectionProblem::demo(args.min_capital, args.max_liability);
            run_selection(&problem, "demo", &args.run, config)
        }
        Command::Solve(args) => {
            let problem = SelectionProblem::load(&args.input)?;
            let name = args
                .input
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("selection")
                .to_string();
            if args.lp {
                let (mut model, _) = problem.build(&name)?;
                print!("{}", model.snapshot()?.to_lp());
                return Ok(());
            }
            run_selection(&problem, &name, &args.run, config)
        }
    }
}

fn run_selection(
    problem: &SelectionProblem,
    name: &str,
    args: &RunArgs,
    config: SolverConfig,
) -> Result<(), Box<dyn Error>> {
    let (mut model, x) = problem.build(name)?;
    let backend = MicroLpSolver::new();

    debug!(
        component = "cli",
        operation = "solve",
        status = "success",
        model = name,
        companies = problem.companies.len(),
        use_async = args.use_async,
        "Solving selection model"
    );

    let output = if args.use_async {
        solve_on_worker(&mut model, backend, config)?
    } else {
        model.solve(&backend, &config)?
    };

    let report = SelectionReport::new(problem, &model, &x, backend.name(), &output);
    render_output(args.format, &report)?;
    if !output.status.has_solution() {
        return Err(format!("no solution: {}", output.status).into());
    }
    Ok(())
}

fn solve_on_worker(
    model: &mut MetaModel,
    backend: MicroLpSolver,
    config: SolverConfig,
) -> Result<SolverOutput, Box<dyn Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(solve_until_interrupted(model, backend, config))?)
}

async fn solve_until_interrupted(
    model: &mut MetaModel,
    backend: MicroLpSolver,
    config: SolverConfig,
) -> Result<SolverOutput, ModelError> {
    let task = model.solve_async(Arc::new(backend), config)?;
    let canceller = task.canceller();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!(
                component = "cli",
                operation = "solve",
                status = "cancelled",
                "Interrupt received; cancelling solve"
            );
            canceller.cancel();
        }
    });
    let output = task.finish(model).await;
    watcher.abort();
    output
}

fn render_output(format: OutputFormat, report: &SelectionReport) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Table => {
            print_report_table(report);
            Ok(())
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
            Ok(())
        }
    }
}
