//! Command-line combat simulator.
use anyhow::Result;
use combat_runtime::{CombatSession, RuntimeConfig, logging};

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = RuntimeConfig::from_env();
    let _guard = logging::init(&config)?;

    let bundle = combat_runtime::load_content(&config)?;
    let scenario = combat_runtime::load_scenario(&config)?;

    let mut session = CombatSession::new(&bundle, &scenario, config.seed);
    if let Some(pattern) = &config.autopilot {
        session = session.with_autopilot(pattern.as_str());
    }
    let report = session.run()?;

    if config.json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    println!("== {} (seed {}) ==", report.scenario, report.seed);
    for line in &report.log {
        println!("{line}");
    }
    if config.show_diagnostics {
        for line in &report.diagnostics {
            println!("[diagnostic] {line}");
        }
    }
    for step in &report.rejected_steps {
        println!("[rejected] {step}");
    }
    println!(
        "Outcome: {} after {} turns ({} rounds), dealt {} / took {}",
        report.result.outcome,
        report.result.turns_elapsed,
        report.result.rounds_completed,
        report.result.damage_dealt,
        report.result.damage_taken,
    );
    println!("Log digest: {}", report.digest);
    Ok(())
}
