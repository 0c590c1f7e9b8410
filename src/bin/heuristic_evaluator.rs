use clap::Parser;
use sliding_puzzle_solver::costs::{Algorithm, WeightKind};
use sliding_puzzle_solver::engine::Goal;
use sliding_puzzle_solver::heuristics::HeuristicKind;
use sliding_puzzle_solver::solver::{Outcome, SearchOptions, Solver};
use sliding_puzzle_solver::utils::boards_from_str;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::process;

const START_SEED: u64 = 0;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Compares heuristics and search flavours on a set of boards", long_about = None)]
struct Args {
    /// Path to a file of boards separated by blank lines
    boards_file: PathBuf,

    /// Base seed for tie-breaking; board `i` is searched with `seed + i`
    #[clap(short, long, default_value_t = START_SEED)]
    seed: u64,
}

type Combination = (HeuristicKind, Algorithm);

fn run(args: &Args) -> Result<(), String> {
    let content = fs::read_to_string(&args.boards_file)
        .map_err(|e| format!("Failed to read {}: {}", args.boards_file.display(), e))?;
    let boards = boards_from_str(&content).map_err(|e| format!("Invalid boards file: {}", e))?;

    let combinations: Vec<Combination> = HeuristicKind::ALL
        .iter()
        .flat_map(|&h| Algorithm::ALL.iter().map(move |&a| (h, a)))
        .collect();

    let mut all_expansions: HashMap<Combination, Vec<usize>> = HashMap::new();
    for combination in &combinations {
        all_expansions.insert(*combination, Vec::new());
    }

    println!("Starting heuristic evaluation for {} boards...", boards.len());

    for (board_idx, (initial, dimensions)) in boards.iter().enumerate() {
        let current_seed = args.seed + board_idx as u64;
        let goal = Goal::canonical(*dimensions);

        println!("\nEvaluating Board {} ({}, Seed: {})", board_idx, dimensions, current_seed);

        for &(heuristic, algorithm) in &combinations {
            let weight = algorithm.uses_weight().then(|| WeightKind::Unit.build(&goal));
            let estimate = algorithm.uses_heuristic().then(|| heuristic.build(&goal));
            let cost = algorithm.build(weight, estimate).map_err(|e| e.to_string())?;

            let options = SearchOptions {
                seed: Some(current_seed),
                ..SearchOptions::default()
            };
            let mut solver = Solver::new(goal.clone(), cost, &options);
            let outcome = solver.solve(initial.clone()).map_err(|e| {
                format!("Board {} cannot be searched: {}", board_idx, e)
            })?;

            let length = match &outcome {
                Outcome::Solved(solution) => solution.len().to_string(),
                Outcome::Exhausted(_) => "unsolvable".to_string(),
            };
            let expanded = outcome.stats().expanded;
            println!(
                "  Heuristic: {:<18} Algorithm: {:<18} Expanded: {:<8} Length: {}",
                heuristic.to_string(),
                algorithm.to_string(),
                expanded,
                length
            );
            if let Some(expansions) = all_expansions.get_mut(&(heuristic, algorithm)) {
                expansions.push(expanded);
            }
        }
    }

    println!("\n--- Evaluation Complete ---");
    println!("Number of boards evaluated: {}", boards.len());
    println!("\n--- Average Expansions ---");

    let mut sorted_averages: Vec<(Combination, f64)> = Vec::new();
    for (combination, expansions) in &all_expansions {
        if expansions.is_empty() {
            continue;
        }
        let total: usize = expansions.iter().sum();
        sorted_averages.push((*combination, total as f64 / expansions.len() as f64));
    }

    // fewest expansions first
    sorted_averages.sort_by(|a, b| a.1.total_cmp(&b.1));

    for ((heuristic, algorithm), average) in sorted_averages {
        println!(
            "{:<18} {:<18}: Average Expansions = {:.2}",
            heuristic.to_string(),
            algorithm.to_string(),
            average
        );
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("{}", e);
        process::exit(1);
    }
}
