use std::env;

use cannon::{
    ClusterConfig, Matrix, MatrixSource, Outcome, RandomOperands, RunConfig, demo_operands,
    naive_multiply, run_participant, simulate,
};
use torus_comm::{Rank, TcpTransport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let mode = args.get(1).cloned().unwrap_or_else(|| "local".to_string());

    match mode.as_str() {
        "local" => {
            let n: usize = args.get(2).unwrap_or(&"3".to_string()).parse()?;
            let seed: Option<u64> = args.get(3).map(|s| s.parse()).transpose()?;
            let config = RunConfig::new(n);
            tracing_subscriber::fmt()
                .with_max_level(config.log_level)
                .init();

            let (a, b) = match seed {
                None if n == 3 => demo_operands().operands(n)?,
                None => RandomOperands::new(0).operands(n)?,
                Some(seed) => RandomOperands::new(seed).operands(n)?,
            };

            println!("Multiplying {}x{} matrices on {} workers", n, n, n * n);
            print_matrix("Matrix A", &a);
            print_matrix("Matrix B", &b);

            let product = simulate(&config, &a, &b).await?;
            print_matrix("Result", &product);

            if product == naive_multiply(&a, &b) {
                println!("Result matches the sequential product.");
            } else {
                eprintln!("Result differs from the sequential product!");
                std::process::exit(2);
            }
        }
        "node" => {
            let (Some(path), Some(rank)) = (args.get(2), args.get(3)) else {
                usage(&args);
            };
            let rank: Rank = rank.parse()?;
            let cluster = ClusterConfig::from_path(path)?;
            let config = cluster.run_config()?;
            tracing_subscriber::fmt()
                .with_max_level(config.log_level)
                .init();

            let mut transport = TcpTransport::bind(rank, cluster.peers.clone()).await?;
            tracing::info!(rank, addr = %transport.local_addr(), "node started");

            let outcome = match cluster.seed {
                Some(seed) => {
                    run_participant(&config, &mut transport, &RandomOperands::new(seed)).await?
                }
                None => run_participant(&config, &mut transport, &demo_operands()).await?,
            };

            match outcome {
                Outcome::Product(product) => print_matrix("Result", &product),
                Outcome::Partial(total) => println!("Rank {} done, partial total {}", rank, total),
            }
        }
        _ => usage(&args),
    }

    Ok(())
}

fn print_matrix(title: &str, matrix: &Matrix) {
    println!("{} ({}x{}):", title, matrix.size(), matrix.size());
    for row in matrix.rows() {
        println!("  {:?}", row);
    }
}

fn usage(args: &[String]) -> ! {
    let program = args.first().map(String::as_str).unwrap_or("cannon");
    eprintln!("Usage: {} <mode> [args...]", program);
    eprintln!("Modes:");
    eprintln!("  local [n] [seed]         - Run all n*n+1 participants in this process");
    eprintln!("  node <config.toml> <rank> - Run one participant over TCP");
    std::process::exit(1);
}
