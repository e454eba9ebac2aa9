use restaurant_doe::experiment::analyzer::{analyze, EffectTable};
use restaurant_doe::experiment::io::{read_dataset_file, write_dataset_file};
use restaurant_doe::{ConcurrencyMode, ExperimentConfig, ExperimentDesigner, SimError};

const USAGE: &str = "usage: factorial_main run <out.csv> [--parallel] | factorial_main analyze <in.csv>";

fn main() -> Result<(), SimError> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("run") => match args.get(1) {
            Some(path) => run(path, args.iter().any(|arg| arg == "--parallel")),
            None => usage(),
        },
        Some("analyze") => match args.get(1) {
            Some(path) => analyze_file(path),
            None => usage(),
        },
        _ => usage(),
    }
}

fn usage() -> Result<(), SimError> {
    eprintln!("{}", USAGE);
    std::process::exit(2);
}

fn run(path: &str, parallel: bool) -> Result<(), SimError> {
    println!("🍔 Running the restaurant factorial experiment 🍔");

    let mode = if parallel {
        ConcurrencyMode::Rayon
    } else {
        ConcurrencyMode::Sequential
    };
    let designer =
        ExperimentDesigner::reference().with_config(ExperimentConfig::new().with_concurrency(mode));

    println!(
        "{} factors, {} cells, {:.0}s simulated per cell ({:?})",
        designer.factors().len(),
        designer.plan()?.len(),
        designer.config().horizon,
        mode
    );

    let dataset = designer.run()?;
    write_dataset_file(path, &dataset)?;

    println!("✅ Wrote {} rows to '{}'", dataset.len(), path);
    Ok(())
}

fn analyze_file(path: &str) -> Result<(), SimError> {
    let dataset = read_dataset_file(path)?;
    println!(
        "Analyzing {} rows over {} factors from '{}'",
        dataset.len(),
        dataset.factor_names().len(),
        path
    );

    let effects = analyze(&dataset)?;
    print_effects(&effects);
    Ok(())
}

fn print_effects(effects: &EffectTable) {
    println!("\n=== MAIN EFFECTS ===");
    for (factor, effect) in &effects.main_effects {
        println!("{:<24} {:>10.2}", factor, effect);
    }

    println!("\n=== INTERACTION EFFECTS ===");
    for ((first, second), effect) in &effects.interaction_effects {
        println!("{:<24} {:>10.2}", format!("{} x {}", first, second), effect);
    }
}
