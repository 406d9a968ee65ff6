//! `turnstile validate`: run the analytical oracle scenarios.

use anyhow::Result;
use turnstile_oracle::OracleScenario;

use crate::style::SemanticStyle;

pub fn run(threshold: f64) -> Result<()> {
    let scenarios = OracleScenario::standard();
    println!(
        "Validating {} scenarios against queueing theory (threshold {})...",
        scenarios.len().to_string().header(),
        format!("{:.1}%", threshold * 100.0).code()
    );
    println!();

    let mut failures = 0;
    for scenario in &scenarios {
        let report = scenario.validate(threshold)?;
        if report.all_passed() {
            println!("{} {}", "✓".success(), scenario.name.header());
        } else {
            failures += 1;
            println!("{} {}", "✗".error(), scenario.name.header());
        }
        print!("{report}");
        println!();
    }

    if failures > 0 {
        anyhow::bail!("{failures} scenario(s) disagree with theory");
    }
    println!("{} all scenarios match theory", "✓".success());
    Ok(())
}
