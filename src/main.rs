//! Route Tabu Solver - Command Line Interface
//!
//! Tabu-search solver for the TSP and the drone-and-truck delivery problem.

use clap::{Parser, Subcommand};
use route_tabu_solver::d2d::{D2dInstance, FleetConfig};
use route_tabu_solver::search::{solve_d2d, solve_tsp, SearchOptions};
use route_tabu_solver::tabu::DEFAULT_TABU_CAPACITY;
use route_tabu_solver::tsp::TspInstance;

use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "route-tabu-solver")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Tabu-search solver for TSP and drone-and-truck delivery")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a TSPLIB instance
    Tsp {
        /// Path to the TSPLIB instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Number of tabu-search iterations
        #[arg(long, default_value = "100")]
        iterations: usize,

        /// Capacity of each tabu list
        #[arg(long, default_value_t = DEFAULT_TABU_CAPACITY)]
        tabu_capacity: usize,

        /// Output solution to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Solve a drone-and-truck delivery instance
    D2d {
        /// Path to the D2D instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Path to the fleet configuration JSON file
        #[arg(short, long)]
        config: PathBuf,

        /// Number of tabu-search iterations
        #[arg(long, default_value = "100")]
        iterations: usize,

        /// Capacity of each tabu list
        #[arg(long, default_value_t = DEFAULT_TABU_CAPACITY)]
        tabu_capacity: usize,

        /// Output solution to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tsp {
            instance,
            iterations,
            tabu_capacity,
            output,
        } => {
            solve_tsp_instance(&instance, iterations, tabu_capacity, output);
        }

        Commands::D2d {
            instance,
            config,
            iterations,
            tabu_capacity,
            output,
        } => {
            solve_d2d_instance(&instance, &config, iterations, tabu_capacity, output);
        }
    }
}

fn solve_tsp_instance(
    path: &PathBuf,
    iterations: usize,
    tabu_capacity: usize,
    output: Option<PathBuf>,
) {
    println!("Loading instance from {:?}...", path);
    let instance = match TspInstance::from_file(path) {
        Ok(instance) => instance,
        Err(e) => {
            eprintln!("Error loading instance: {}", e);
            std::process::exit(1);
        }
    };

    let options = SearchOptions {
        iterations,
        tabu_capacity,
    };
    let start = Instant::now();
    let best = solve_tsp(&instance, &options);
    let elapsed = start.elapsed();

    println!("\n========== Results ==========");
    println!("Instance: {} (n={})", instance.name, instance.dimension);
    println!("Cost: {:.2}", best.cost(&instance));
    println!("Tour: {:?}", best.get_path());
    println!("Time: {:.4}s", elapsed.as_secs_f64());

    if let Some(out_path) = output {
        write_json(&out_path, &best);
    }
}

fn solve_d2d_instance(
    path: &PathBuf,
    config_path: &PathBuf,
    iterations: usize,
    tabu_capacity: usize,
    output: Option<PathBuf>,
) {
    println!("Loading fleet configuration from {:?}...", config_path);
    let config = match FleetConfig::from_file(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading fleet configuration: {}", e);
            std::process::exit(1);
        }
    };

    println!("Loading instance from {:?}...", path);
    let instance = match D2dInstance::from_file(path, config) {
        Ok(instance) => instance,
        Err(e) => {
            eprintln!("Error loading instance: {}", e);
            std::process::exit(1);
        }
    };

    let options = SearchOptions {
        iterations,
        tabu_capacity,
    };
    let start = Instant::now();
    let best = solve_d2d(&instance, &options);
    let elapsed = start.elapsed();

    println!("\n========== Results ==========");
    println!(
        "Instance: {} ({} customers, {} drones, {} technicians)",
        instance.name, instance.customers_count, instance.drones_count, instance.technicians_count
    );
    println!("Makespan: {:.2}", best.cost());
    println!("Total waiting time: {:.2}", best.total_waiting_time());
    for (drone, paths) in best.drone_paths.iter().enumerate() {
        println!("Drone {}: {:?}", drone, paths);
    }
    for (technician, path) in best.technician_paths.iter().enumerate() {
        println!("Technician {}: {:?}", technician, path);
    }
    println!("Time: {:.4}s", elapsed.as_secs_f64());

    if let Some(out_path) = output {
        write_json(&out_path, &best);
    }
}

fn write_json<T: serde::Serialize>(path: &PathBuf, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => match std::fs::write(path, json) {
            Ok(()) => println!("\nSolution saved to {:?}", path),
            Err(e) => eprintln!("Failed to write output: {}", e),
        },
        Err(e) => eprintln!("Failed to serialize solution: {}", e),
    }
}
