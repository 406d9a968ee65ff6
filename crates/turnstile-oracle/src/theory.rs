//! Closed-form queueing results.
//!
//! All rates are per minute and all times in minutes, matching the
//! engine's internal units.

/// Steady-state performance figures for a Markovian queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueTheory {
    /// Server utilization.
    pub rho: f64,
    /// Expected number in system.
    pub l: f64,
    /// Expected number in queue.
    pub lq: f64,
    /// Expected time in system, minutes.
    pub w: f64,
    /// Expected time in queue, minutes.
    pub wq: f64,
    /// Probability an arrival waits (Erlang-C); 1-server value equals ρ.
    pub wait_probability: f64,
}

/// M/M/1: `ρ = λ/μ`, `L = ρ/(1−ρ)`, `Lq = ρ²/(1−ρ)`, `W = 1/(μ−λ)`,
/// `Wq = ρ/(μ−λ)`.
///
/// Requires `λ < μ` for a stable queue.
pub fn mm1_theory(lambda: f64, mu: f64) -> QueueTheory {
    let rho = lambda / mu;
    QueueTheory {
        rho,
        l: rho / (1.0 - rho),
        lq: rho * rho / (1.0 - rho),
        w: 1.0 / (mu - lambda),
        wq: rho / (mu - lambda),
        wait_probability: rho,
    }
}

/// Erlang-C: the probability an arriving customer waits in M/M/c.
///
/// `C(c, a) = (a^c / c!) / (Σ_{k<c} a^k/k! + a^c / (c!·(1−ρ)))` with
/// offered traffic `a = λ/μ` and `ρ = a/c`.
pub fn erlang_c(servers: u32, offered: f64) -> f64 {
    let c = f64::from(servers);
    let rho = offered / c;

    // Terms a^k/k! accumulated iteratively to avoid factorial overflow.
    let mut term = 1.0;
    let mut sum = 0.0;
    for k in 0..servers {
        sum += term;
        term *= offered / f64::from(k + 1);
    }
    // After the loop, term = a^c/c!.
    let numerator = term / (1.0 - rho);
    numerator / (sum + numerator)
}

/// M/M/c via Erlang-C: `Lq = C·ρ/(1−ρ)`, `Wq = Lq/λ`, `W = Wq + 1/μ`,
/// `L = λW`.
///
/// Requires `λ < c·μ` for a stable queue.
pub fn mmc_theory(lambda: f64, mu: f64, servers: u32) -> QueueTheory {
    if servers == 1 {
        return mm1_theory(lambda, mu);
    }
    let offered = lambda / mu;
    let rho = offered / f64::from(servers);
    let c_wait = erlang_c(servers, offered);
    let lq = c_wait * rho / (1.0 - rho);
    let wq = lq / lambda;
    let w = wq + 1.0 / mu;
    QueueTheory {
        rho,
        l: lambda * w,
        lq,
        w,
        wq,
        wait_probability: c_wait,
    }
}

// ============================================================================
// Tests
// ============================================================================
