//! `turnstile version`.

use anyhow::Result;

use crate::style::SemanticStyle;

pub fn run() -> Result<()> {
    println!(
        "{} {}",
        "turnstile".header(),
        format!("v{}", env!("CARGO_PKG_VERSION")).muted()
    );
    println!("{}", "discrete-event simulation for queueing networks".muted());
    Ok(())
}
