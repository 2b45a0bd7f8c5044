//! Two-level solve on a random singular integer system.
//!
//! Level 0 is `H = random 0..=8 integers with one zeroed row`, `f = H·1`; it
//! leaves a one-dimensional null space. Level 1 (`I`, 0.2053202792·1) picks the
//! point along that line. Prints both energies in the `zᵀHz + zᵀf` form.
//!
//! Run: cargo run -p lexmin --example singular_system -- [n] [seed]

use std::time::Instant;

use lexmin::gen::demo_objectives;
use lexmin::LexSolver;

fn main() {
    let mut args = std::env::args().skip(1);
    let n: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(100);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(0);

    let objectives = demo_objectives(n, seed, true);
    let start = Instant::now();
    let sol = LexSolver::default()
        .solve(&objectives, None)
        .expect("demo system is well formed");
    let elapsed = start.elapsed().as_secs_f64() * 1e3;

    println!(
        "n={n} seed={seed} levels={} early_exit={:?} free_dims={}",
        sol.levels.len(),
        sol.early_exit,
        sol.free_dims
    );
    for (i, o) in objectives.iter().enumerate() {
        let z = &sol.x;
        let value = z.dot(&(&o.h * z)) + z.dot(&o.f);
        println!("level {i}: zᵀHz + zᵀf = {value:.6e}  E = {:.6e}", sol.energies[i]);
    }
    println!("solve_time_ms={elapsed:.3}");
}
