// 🧭 blueprint - build the symbol registry and run consistency checks
//
// Usage:
//   blueprint [--dir PATH] checks     consistency report (default)
//   blueprint [--dir PATH] registry   full registry as JSON
//   blueprint [--dir PATH] blueprint  raw document bundle as JSON

use anyhow::{Context, Result};
use std::env;
use tracing_subscriber::EnvFilter;

use model_blueprint::{CheckStatus, ConsistencyChecker, DocumentStore, RegistryBuilder, SourceKind};

const DEFAULT_SPECS_DIR: &str = "Deliverables/D0 - Model Specifications";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut dir = DEFAULT_SPECS_DIR.to_string();
    let mut command = "checks".to_string();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dir" => {
                dir = args.next().context("--dir requires a path argument")?;
            }
            "--version" => {
                println!("blueprint {}", model_blueprint::VERSION);
                return Ok(());
            }
            other => command = other.to_string(),
        }
    }

    let store = DocumentStore::new(&dir);
    match command.as_str() {
        "checks" => run_checks(&store)?,
        "registry" => run_registry(&store)?,
        "blueprint" => run_blueprint(&store)?,
        other => anyhow::bail!("unknown command: {} (try checks|registry|blueprint)", other),
    }

    Ok(())
}

fn run_checks(store: &DocumentStore) -> Result<()> {
    let registry = RegistryBuilder::new(store.clone()).build();
    let checker = ConsistencyChecker::new(store.read(SourceKind::Scope));
    let results = checker.run(&registry);

    println!("Consistency report ({} symbols)", registry.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for result in &results {
        let icon = match result.status {
            CheckStatus::Pass => "✓",
            CheckStatus::Warn => "⚠",
            CheckStatus::Fail => "✗",
        };
        println!(
            "{} {:<20} {:>3}  {}",
            icon, result.name, result.score, result.message
        );
    }

    let worst = results
        .iter()
        .map(|r| r.score)
        .min()
        .unwrap_or(100);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Lowest score: {}", worst);
    Ok(())
}

fn run_registry(store: &DocumentStore) -> Result<()> {
    let registry = RegistryBuilder::new(store.clone()).build();
    let json = serde_json::to_string_pretty(&registry).context("serializing registry")?;
    println!("{}", json);
    Ok(())
}

fn run_blueprint(store: &DocumentStore) -> Result<()> {
    let bundle: serde_json::Map<String, serde_json::Value> = store
        .blueprint()
        .into_iter()
        .map(|(k, v)| (k, serde_json::Value::String(v)))
        .collect();
    let json = serde_json::to_string_pretty(&bundle).context("serializing blueprint bundle")?;
    println!("{}", json);
    Ok(())
}
