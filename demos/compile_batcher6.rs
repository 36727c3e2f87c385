//! Compiles Batcher's six-input network and prints each stage's plan
//!
//! Run with `LANESORT_TIER=avx2 RUST_LOG=debug cargo run --example compile_batcher6`
//! to see the candidate search for a narrower target.

use lanesort::{
    apply_network, CompilerConfig, ElementType, Network, NetworkCompiler, Permutation,
};

/// Batcher odd-even merge sort over six lanes, highest lane first
const BATCHER_6: [[usize; 6]; 6] = [
    [4, 5, 2, 3, 0, 1],
    [5, 4, 1, 0, 3, 2],
    [5, 4, 3, 1, 2, 0],
    [1, 0, 3, 2, 5, 4],
    [3, 2, 5, 4, 1, 0],
    [5, 3, 4, 1, 2, 0],
];

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();

    let config = match CompilerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Bad configuration: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("Compiling for {}", config.capabilities.tier());

    let stages = BATCHER_6
        .iter()
        .map(|stage| Permutation::new(stage.to_vec()))
        .collect::<Result<Vec<_>, _>>();
    let network = match stages.and_then(|stages| Network::new(6, stages)) {
        Ok(network) => network,
        Err(e) => {
            log::error!("Bad network: {}", e);
            std::process::exit(1);
        }
    };

    let compiler = NetworkCompiler::new(config);
    for element in [ElementType::I8, ElementType::U16, ElementType::I32] {
        let plan = match compiler.compile(&network, element) {
            Ok(plan) => plan,
            Err(e) => {
                log::warn!("{}: {}", element, e);
                continue;
            }
        };

        println!("=== {} ({} stages, total cost {}) ===", element, plan.stages().len(), plan.cost());
        for (i, stage) in plan.stages().iter().enumerate() {
            println!("; stage {}", i);
            print!("{}", stage);
        }

        let input: Vec<i64> = vec![5, 3, 8, 1, 9, 2];
        match element {
            ElementType::I8 => {
                let values: Vec<i8> = input.iter().map(|&v| v as i8).collect();
                println!("sorted: {:?}\n", apply_network(&plan, &values));
            }
            ElementType::U16 => {
                let values: Vec<u16> = input.iter().map(|&v| v as u16).collect();
                println!("sorted: {:?}\n", apply_network(&plan, &values));
            }
            _ => {
                let values: Vec<i32> = input.iter().map(|&v| v as i32).collect();
                println!("sorted: {:?}\n", apply_network(&plan, &values));
            }
        }
    }
}
