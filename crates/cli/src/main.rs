use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use lexmin::gen::{demo_objectives, zeroed_row, DEMO_IDENTITY_SHIFT};
use lexmin::{Bounds, Factorization, LexCfg, LexSolver, NullSpaceCfg, QuadraticObjective, Solution};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod csv_io;
mod provenance;

#[derive(Parser)]
#[command(name = "lexmin-cli")]
#[command(about = "Lexicographic minimization of prioritized quadratic energies")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Solve a problem given as header-less CSV files, most important level first
    Solve {
        /// Quadratic coefficients H of one level (repeat per level)
        #[arg(long = "hessian", required = true)]
        hessians: Vec<PathBuf>,
        /// Linear coefficients f of one level (repeat per level, same order)
        #[arg(long = "linear", required = true)]
        linears: Vec<PathBuf>,
        /// Lower box bound on x
        #[arg(long, requires = "upper")]
        lower: Option<PathBuf>,
        /// Upper box bound on x
        #[arg(long, requires = "lower")]
        upper: Option<PathBuf>,
        #[command(flatten)]
        numerics: Numerics,
        /// JSON result path; a provenance sidecar is written next to it
        #[arg(long)]
        out: PathBuf,
    },
    /// Solve a random singular integer system and print the energies
    Demo {
        #[arg(long, default_value_t = 100)]
        n: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Add the identity level (I, 0.2053202792·1) below the singular one
        #[arg(long)]
        two_level: bool,
        /// Print the full input matrices and the solution vector
        #[arg(long)]
        verbose: bool,
        #[command(flatten)]
        numerics: Numerics,
    },
    /// Print a small provenance JSON block
    Report,
}

#[derive(Args)]
struct Numerics {
    /// Null space factorization: qr, svd, or eigen
    #[arg(long, default_value_t = Factorization::Qr)]
    method: Factorization,
    /// Relative rank threshold
    #[arg(long, default_value_t = lexmin::cfg::RANK_TOL)]
    rank_tol: f64,
}

impl Numerics {
    fn cfg(&self) -> LexCfg {
        LexCfg {
            method: self.method,
            null_space: NullSpaceCfg {
                rank_tol: self.rank_tol,
                ..NullSpaceCfg::default()
            },
        }
    }

    fn params(&self) -> serde_json::Value {
        json!({ "method": self.method.as_str(), "rank_tol": self.rank_tol })
    }
}

#[derive(Serialize)]
struct LevelOut {
    level: usize,
    free_before: usize,
    free_after: usize,
    rank: usize,
    step_norm: f64,
}

#[derive(Serialize)]
struct SolveOutput {
    method: String,
    n: usize,
    x: Vec<f64>,
    energies: Vec<f64>,
    early_exit: Option<usize>,
    free_dims: usize,
    levels: Vec<LevelOut>,
}

impl SolveOutput {
    fn new(method: Factorization, sol: &Solution) -> Self {
        Self {
            method: method.to_string(),
            n: sol.x.len(),
            x: sol.x.iter().copied().collect(),
            energies: sol.energies.clone(),
            early_exit: sol.early_exit,
            free_dims: sol.free_dims,
            levels: sol
                .levels
                .iter()
                .map(|r| LevelOut {
                    level: r.level,
                    free_before: r.free_before,
                    free_after: r.free_after,
                    rank: r.rank,
                    step_norm: r.step_norm,
                })
                .collect(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Solve {
            hessians,
            linears,
            lower,
            upper,
            numerics,
            out,
        } => solve(&hessians, &linears, lower.zip(upper), &numerics, &out),
        Action::Demo {
            n,
            seed,
            two_level,
            verbose,
            numerics,
        } => demo(n, seed, two_level, verbose, &numerics),
        Action::Report => report(),
    }
}

fn load_objectives(hessians: &[PathBuf], linears: &[PathBuf]) -> Result<Vec<QuadraticObjective>> {
    if hessians.len() != linears.len() {
        bail!(
            "got {} --hessian and {} --linear files; one of each per level",
            hessians.len(),
            linears.len()
        );
    }
    hessians
        .iter()
        .zip(linears)
        .enumerate()
        .map(|(i, (h, f))| {
            let h = csv_io::read_matrix(h)?;
            let f = csv_io::read_vector(f)?;
            QuadraticObjective::new(h, f).with_context(|| format!("level {i}"))
        })
        .collect()
}

fn load_bounds(lower: &Path, upper: &Path) -> Result<Bounds> {
    let lo = csv_io::read_vector(lower)?;
    let hi = csv_io::read_vector(upper)?;
    Ok(Bounds::new(lo, hi)?)
}

fn solve(
    hessians: &[PathBuf],
    linears: &[PathBuf],
    bound_paths: Option<(PathBuf, PathBuf)>,
    numerics: &Numerics,
    out: &Path,
) -> Result<()> {
    tracing::info!(levels = hessians.len(), method = %numerics.method, out = %out.display(), "solve");
    let objectives = load_objectives(hessians, linears)?;
    let bounds = bound_paths
        .as_ref()
        .map(|(lo, hi)| load_bounds(lo, hi))
        .transpose()?;
    let sol = LexSolver::new(numerics.cfg())
        .solve(&objectives, bounds.as_ref())
        .context("lexicographic solve failed")?;

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let output = SolveOutput::new(numerics.method, &sol);
    std::fs::write(out, serde_json::to_vec_pretty(&output)?)
        .with_context(|| format!("writing {}", out.display()))?;

    let mut inputs: Vec<&PathBuf> = hessians.iter().chain(linears).collect();
    if let Some((lo, hi)) = &bound_paths {
        inputs.push(lo);
        inputs.push(hi);
    }
    let payload = provenance::Payload::new(numerics.params()).with_inputs(&inputs);
    let prov = provenance::write_sidecar(out, &payload)?;
    tracing::info!(
        free_dims = sol.free_dims,
        early_exit = ?sol.early_exit,
        provenance = %prov.display(),
        "solve_done"
    );
    Ok(())
}

fn demo(n: usize, seed: u64, two_level: bool, verbose: bool, numerics: &Numerics) -> Result<()> {
    if n == 0 {
        bail!("--n must be positive");
    }
    tracing::info!(n, seed, two_level, method = %numerics.method, "demo");
    let objectives = demo_objectives(n, seed, two_level);

    println!("The following inputs define our quadratic energies:");
    println!("\t0.5*x.T*H*x + x.T*f\n");
    println!("H: {n}x{n} random integers in 0..=8, row {} zeroed", zeroed_row(n));
    println!("f: H*ones({n})");
    if two_level {
        println!("level 1: H = I, f = {DEMO_IDENTITY_SHIFT}*ones({n})");
    }
    if verbose {
        for (i, o) in objectives.iter().enumerate() {
            println!("\nlevel {i} H:{}level {i} f:{}", o.h, o.f.transpose());
        }
    }

    let sol = LexSolver::new(numerics.cfg()).solve(&objectives, None)?;
    if verbose {
        println!("\nZ:{}", sol.x.transpose());
    }
    println!(
        "\nlevels processed: {}, early exit: {:?}, free dims: {}",
        sol.levels.len(),
        sol.early_exit,
        sol.free_dims
    );
    for (i, o) in objectives.iter().enumerate() {
        let z = &sol.x;
        println!(
            "level {i}: Z.T*H*Z + Z.T*f = {:.6e}  E = {:.6e}",
            z.dot(&(&o.h * z)) + z.dot(&o.f),
            sol.energies[i]
        );
    }
    Ok(())
}

fn report() -> Result<()> {
    let payload = provenance::Payload::new(json!({}));
    let obj = provenance::document(&payload, &[]);
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
