//! Evaluation CLI: run labelled questions through the pipeline and report
//! outcome accuracy plus fallback precision / recall.

use anyhow::Context;
use clap::Parser;
use groundrag::{
    eval::{accuracy, fallback_precision, fallback_recall, load_cases, CaseResult},
    Config, RagContext,
};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Evaluation framework: run cases and report metrics.
#[derive(Parser, Debug)]
#[command(name = "eval")]
struct Args {
    /// Path to eval cases JSON (default: eval_cases.json).
    #[arg(long, default_value = "eval_cases.json")]
    cases: PathBuf,

    /// Minimum accuracy (0..=1) for a zero exit status.
    #[arg(long, default_value_t = 0.8)]
    min_accuracy: f32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", "warn")
    ).init();

    let cases = load_cases(&args.cases)
        .with_context(|| format!("Failed to load {}", args.cases.display()))?;

    if cases.is_empty() {
        anyhow::bail!("No cases in {}", args.cases.display());
    }

    let ctx = RagContext::initialize(config).await?;
    let pipeline = ctx.pipeline();

    println!("Running evaluation on {} cases\n", cases.len());

    let mut results = Vec::with_capacity(cases.len());
    for case in cases {
        let interaction = pipeline
            .run(&case.question)
            .await
            .with_context(|| format!("Interaction failed for {:?}", case.question))?;

        let result = CaseResult {
            case,
            outcome: interaction.outcome,
        };
        println!(
            "  [{}] {} ({:?}, {:?})",
            if result.passed() { "PASS" } else { "FAIL" },
            result.case.question,
            result.case.expect,
            interaction.termination
        );
        results.push(result);
    }

    let mut by_category: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for result in &results {
        let entry = by_category.entry(result.case.category.as_str()).or_default();
        entry.1 += 1;
        if result.passed() {
            entry.0 += 1;
        }
    }

    let acc = accuracy(&results);

    println!("\n=== Evaluation Results ===");
    for (category, (passed, total)) in &by_category {
        let name = if category.is_empty() { "(none)" } else { *category };
        println!("  {:<20} {}/{}", name, passed, total);
    }
    println!("Accuracy:           {:.2}%", acc * 100.0);
    println!("Fallback precision: {:.2}%", fallback_precision(&results) * 100.0);
    println!("Fallback recall:    {:.2}%", fallback_recall(&results) * 100.0);

    ctx.shutdown().await?;

    if acc >= args.min_accuracy {
        println!("\nAccuracy meets threshold ({:.0}%).", args.min_accuracy * 100.0);
        Ok(())
    } else {
        println!("\nAccuracy below threshold ({:.0}%).", args.min_accuracy * 100.0);
        std::process::exit(1);
    }
}
