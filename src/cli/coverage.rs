//! Coverage and watch command implementations

use std::process::ExitCode;
use std::sync::Arc;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::cache::SpriteResolver;
use crate::config::TerraConfig;
use crate::coverage::{full_coverage, CoverageReport};
use crate::watch::watch_sprites;

/// Run coverage over all triples, optionally on a sized thread pool.
pub fn run_coverage(
    resolver: &SpriteResolver,
    json: bool,
    strict: bool,
    jobs: Option<usize>,
) -> ExitCode {
    let report = match jobs {
        Some(jobs) => match rayon::ThreadPoolBuilder::new().num_threads(jobs.max(1)).build() {
            Ok(pool) => pool.install(|| full_coverage(resolver)),
            Err(e) => {
                eprintln!("Error: failed to start {} workers: {}", jobs, e);
                return ExitCode::from(EXIT_ERROR);
            }
        },
        None => full_coverage(resolver),
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: failed to serialize report: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        print_report(&report);
    }

    if strict && report.fallback_count() > 0 {
        eprintln!("Error: {} triples have no sprite (strict mode)", report.fallback_count());
        return ExitCode::from(EXIT_ERROR);
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Initial coverage, then a fresh coverage after every hot reload.
pub fn run_watch(resolver: Arc<SpriteResolver>, config: &TerraConfig) -> ExitCode {
    print_report(&full_coverage(&resolver));

    let naming = config.naming();
    let result = watch_sprites(&resolver, &naming, &config.watch, |changed| {
        println!("{} sprite file(s) changed, re-resolving...", changed.len());
        print_report(&full_coverage(&resolver));
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Watch error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn print_report(report: &CoverageReport) {
    for entry in &report.entries {
        match (&entry.sprite, entry.rank) {
            (Some(sprite), Some(rank)) => {
                println!("  {:<44} rank {}  {}", entry.attributes.to_string(), rank, sprite)
            }
            _ => println!("  {:<44} fallback", entry.attributes.to_string()),
        }
    }

    let counts = report.rank_counts();
    let ranks: Vec<String> =
        counts[..6].iter().enumerate().map(|(i, n)| format!("r{}={}", i + 1, n)).collect();
    println!();
    println!(
        "Resolved {} triples: {} | fallback={} | loader calls: {}",
        report.entries.len(),
        ranks.join(" "),
        counts[6],
        report.stats.loader_calls
    );
}
