use clap::Parser;
use sliding_puzzle_solver::costs::{Algorithm, WeightKind};
use sliding_puzzle_solver::engine::{Dimensions, Goal};
use sliding_puzzle_solver::heuristics::HeuristicKind;
use sliding_puzzle_solver::solver::{
    Outcome, RegressionPolicy, SearchOptions, SearchStats, Solver,
};
use sliding_puzzle_solver::utils::{board_from_str_array, Board};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the board file, one row per line
    board_file: PathBuf,

    /// Path to a goal board file. Defaults to the empty slot first, then 1..N in order
    #[clap(long)]
    goal: Option<PathBuf>,

    #[clap(long, value_enum, default_value_t = WeightKind::Unit)]
    weight: WeightKind,

    #[clap(long, value_enum, default_value_t = HeuristicKind::Manhattan)]
    heuristic: HeuristicKind,

    #[clap(short, long, value_enum, default_value_t = Algorithm::AStar)]
    algorithm: Algorithm,

    /// Seed for breaking ties between equally cheap nodes
    #[clap(short, long)]
    seed: Option<u64>,

    #[clap(long, value_enum, default_value_t = RegressionPolicy::Discard)]
    regression_policy: RegressionPolicy,

    /// Drop successors whose state is already waiting to be expanded
    #[clap(long)]
    suppress_fringe_duplicates: bool,

    /// Print every expanded node
    #[clap(long)]
    trace: bool,
}

fn read_board_file(path: &PathBuf) -> Result<Board, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let lines: Vec<&str> = content
        .lines()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    board_from_str_array(&lines).map_err(|e| format!("Invalid board in {}: {}", path.display(), e))
}

fn read_goal(args: &Args, dimensions: Dimensions) -> Result<Goal, String> {
    let Some(path) = &args.goal else {
        return Ok(Goal::canonical(dimensions));
    };
    let (state, goal_dimensions) = read_board_file(path)?;
    if goal_dimensions != dimensions {
        return Err(format!(
            "Goal is {} but the board is {}",
            goal_dimensions, dimensions
        ));
    }
    Goal::new(state, goal_dimensions).map_err(|e| format!("Invalid goal: {}", e))
}

fn print_stats(stats: &SearchStats) {
    println!("Expanded: {}", stats.expanded);
    println!("Generated: {}", stats.generated);
    println!("Duplicates discarded: {}", stats.duplicates_discarded);
    println!("Fringe duplicates discarded: {}", stats.fringe_duplicates_discarded);
    println!("Peak fringe size: {}", stats.peak_fringe);
    println!("Cost regressions: {}", stats.cost_regressions.len());
    println!("Nodes per depth:");
    for (depth, count) in &stats.nodes_per_depth {
        println!("  {:>4}: {}", depth, count);
    }
}

fn run(args: &Args) -> Result<(), String> {
    let (initial, dimensions) = read_board_file(&args.board_file)?;
    let goal = read_goal(args, dimensions)?;
    let width = goal.width();

    let weight = args.algorithm.uses_weight().then(|| args.weight.build(&goal));
    let heuristic = args
        .algorithm
        .uses_heuristic()
        .then(|| args.heuristic.build(&goal));
    let cost = args.algorithm.build(weight, heuristic).map_err(|e| e.to_string())?;

    let options = SearchOptions {
        seed: args.seed,
        regression_policy: args.regression_policy,
        suppress_fringe_duplicates: args.suppress_fringe_duplicates,
    };

    println!("Loaded {} board from {}\n", dimensions, args.board_file.display());
    println!("Initial board state:\n{}\n", initial.to_grid_string(width));
    println!("Searching with {}...\n", args.algorithm);

    let mut solver = Solver::new(goal, cost, &options);
    let mut search = solver.search(initial).map_err(|e| e.to_string())?;
    let mut printed = 0;
    loop {
        let phase = search.step().map_err(|e| e.to_string())?;
        if args.trace && search.history().len() > printed {
            printed = search.history().len();
            if let Some(action) = search.last_expanded() {
                println!(
                    "#{} {} (cost {}, depth {})\n{}\n",
                    printed - 1,
                    action,
                    action.cost(),
                    action.depth(),
                    action.state().to_grid_string(width)
                );
            }
        }
        if phase.is_terminal() {
            break;
        }
    }

    match search.into_outcome() {
        Outcome::Solved(solution) => {
            println!("Solution found:\n");
            println!("Moves ({}):", solution.len());
            if solution.is_empty() {
                println!("  No moves made.");
            }
            for (i, action) in solution.path().iter().enumerate().skip(1) {
                println!("  Move {}: {}", i, action);
                println!("{}\n", action.state().to_grid_string(width));
            }
            println!("Total cost: {}\n", solution.cost());
            print_stats(solution.stats());
        }
        Outcome::Exhausted(stats) => {
            println!("No solution found.\n");
            print_stats(&stats);
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("{}", e);
        process::exit(1);
    }
}
