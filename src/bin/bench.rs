//! Benchmark for model construction and solve time on the Large demo.
//!
//! Run with: cargo run --release --bin bench

use medschedulr_engine::availability::AvailabilityIndex;
use medschedulr_engine::calendar::Calendar;
use medschedulr_engine::catalogue::PostCatalogue;
use medschedulr_engine::oracle::BranchAndBoundOracle;
use medschedulr_engine::{demo_data, solve};
use std::time::Instant;

fn main() {
    let request = demo_data::generate(demo_data::DemoData::Large);

    println!("Benchmark: model build + branch-and-bound solve");
    println!("  Doctors: {}", request.doctors.len());
    println!("  Units: {}", request.units.len());
    println!("  Horizon: {} to {}", request.roster_start, request.roster_end);
    println!();

    let build_start = Instant::now();
    let calendar = Calendar::build(request.roster_start, request.roster_end).unwrap();
    let catalogue = PostCatalogue::build(&request.posts_weekday, &request.posts_weekend, &request.units);
    let availability = AvailabilityIndex::build(&request.doctors, &request.units, &calendar, &catalogue, &request.availability);
    println!("Index build: {:?}", build_start.elapsed());

    let oracle = BranchAndBoundOracle::default();
    let solve_start = Instant::now();
    let result = solve::solve(&oracle, &request.doctors, &request.units, &calendar, &catalogue, &availability, &request.solver_config);
    println!("Solve: {:?}", solve_start.elapsed());

    match result {
        Ok(outcome) => {
            println!("Status: {:?}", outcome.outcome.status);
            println!("Objective: {}", outcome.outcome.objective_value);
        }
        Err(e) => println!("Solve failed: {e}"),
    }
}
