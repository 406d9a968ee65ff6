//! `turnstile run`: simulate a model file and print the summary.

use anyhow::Result;
use turnstile_kernel::{ReplicationRunner, Simulation};
use turnstile_model::{compile, load_model};

use crate::style::SemanticStyle;

pub fn run(path: &str, replications: Option<u32>, trace: bool) -> Result<()> {
    let model = load_model(path)?;
    let compiled = compile(&model)?;
    let replications = replications.unwrap_or(compiled.replications);

    if replications > 1 {
        return run_replications(compiled, replications);
    }

    let mut simulation = Simulation::from_compiled(&compiled);
    simulation.kernel_mut().set_tracing(trace);
    let summary = simulation.run_to_completion()?;

    if trace {
        for entry in simulation.kernel().trace_log() {
            eprintln!("{} {} {}", entry.time, entry.kind.muted(), entry.details);
        }
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);

    for diagnostic in &summary.diagnostics {
        eprintln!("{} {diagnostic:?}", "diagnostic:".warning());
    }

    if !simulation.kernel().validate_conservation() {
        anyhow::bail!(
            "conservation violated: created {} != departed {} + live {}",
            summary.simulation.entities_created,
            summary.simulation.entities_departed,
            summary.simulation.entities_in_system
        );
    }
    Ok(())
}

fn run_replications(compiled: turnstile_model::CompiledModel, replications: u32) -> Result<()> {
    let report = ReplicationRunner::new(compiled)
        .with_replications(replications)
        .run();

    println!(
        "{}",
        serde_json::json!({
            "replications": report.runs.len(),
            "tally_means": report.tally_means,
            "time_average_means": report.time_average_means,
        })
    );

    if !report.all_passed() {
        for failure in &report.failures {
            eprintln!(
                "{} replication {} (seed {}): {}",
                "failed:".error(),
                failure.replication,
                failure.seed.to_string().code(),
                failure.error
            );
        }
        anyhow::bail!("{} replication(s) failed", report.failures.len());
    }
    Ok(())
}
