//! End-to-end queueing scenarios.
//!
//! Each test builds a small model, runs it to its horizon, and checks
//! the recovered statistics against known behavior. Conservation and the
//! structural invariants are asserted after every run; the long-horizon
//! comparison against closed-form theory lives in the oracle crate's
//! suite.

use turnstile_kernel::Simulation;
use turnstile_model::ModelDescription;

fn simulate(json: &str) -> (Simulation, turnstile_kernel::StatisticsSummary) {
    let model = ModelDescription::from_json(json).unwrap();
    let mut sim = Simulation::from_model(&model).unwrap();
    let summary = sim.run_to_completion().unwrap();
    assert!(sim.kernel().validate_conservation(), "conservation violated");
    (sim, summary)
}

#[test]
fn mm1_at_half_load_matches_theory() {
    // λ = 30/hr, μ = 60/hr: ρ = 0.5, L = 1.0, Lq = 0.5, W = 2 min,
    // Wq = 1 min.
    let (_, summary) = simulate(
        r#"{
        "system_name": "mm1",
        "entities": [{"name": "Customer", "class": "customer",
            "arrival_pattern": {"kind": "poisson", "rate": 30, "rate_unit": "per_hour"}}],
        "resources": [{"name": "Server", "type": "server", "capacity": 1}],
        "processes": [{"name": "service", "entity_type": "customer",
            "sequence": [
                {"id": "s", "type": "seize", "resource_name": "Server"},
                {"id": "d", "type": "delay",
                 "duration": {"type": "exponential", "parameters": {"mean": 1.0}}},
                {"id": "r", "type": "release", "resource_name": "Server"}]}],
        "simulation_duration": 2000.0,
        "warmup_period": 200.0,
        "random_seed": 31337
    }"#,
    );

    let within = |observed: f64, theory: f64, tolerance: f64| {
        assert!(
            (observed - theory).abs() / theory < tolerance,
            "observed {observed} vs theory {theory}"
        );
    };

    within(summary.resources["server"].utilization_percent / 100.0, 0.5, 0.05);
    within(summary.time_persistent["entities_in_system"].time_average, 1.0, 0.05);
    within(
        summary.time_persistent["resource_server_queue_length"].time_average,
        0.5,
        0.05,
    );
    within(summary.tally["entity_cycle_time"].mean, 2.0, 0.05);
    within(summary.tally["entity_wait_time"].mean, 1.0, 0.05);

    // Throughput over the measurement window approximates λ.
    let measured_hours = (summary.simulation.current_time - 200.0 * 60.0) / 60.0;
    let throughput = summary.tally["entity_cycle_time"].count as f64 / measured_hours;
    within(throughput, 30.0, 0.05);
}

#[test]
fn two_stage_sequential_coffee_shop() {
    // Single-stage analogue: customers at 30/hr, barista exponential
    // with mean 1 min (μ = 60/hr), so W = 1/(μ−λ) = 2 min.
    let (_, summary) = simulate(
        r#"{
        "system_name": "coffee shop",
        "entities": [{"name": "Customer", "class": "customer",
            "arrival_pattern": {"kind": "poisson", "rate": 30, "rate_unit": "per_hour"}}],
        "resources": [{"name": "Barista", "type": "staff", "capacity": 1}],
        "processes": [{"name": "order", "entity_type": "customer",
            "sequence": [
                {"id": "take", "type": "seize", "resource_name": "Barista"},
                {"id": "brew", "type": "delay",
                 "duration": {"type": "exponential", "parameters": {"mean": 1.0}}},
                {"id": "hand_over", "type": "release", "resource_name": "Barista"}]}],
        "simulation_duration": 400.0,
        "warmup_period": 40.0,
        "random_seed": 777
    }"#,
    );

    let w = summary.tally["entity_cycle_time"].mean;
    assert!(
        (w - 2.0).abs() / 2.0 < 0.10,
        "cycle time {w} min too far from 2.0"
    );
    // Conservation holds exactly at termination.
    assert_eq!(
        summary.simulation.entities_created,
        summary.simulation.entities_departed + summary.simulation.entities_in_system
    );
}

#[test]
fn two_stage_constant_services_bound_cycle_time() {
    // Part → Machine1 (2 min) → Machine2 (1.5 min), arrivals 20/hr.
    // Minimum possible cycle is 3.5 min; congestion can only add.
    let (_, summary) = simulate(
        r#"{
        "system_name": "machining line",
        "entities": [{"name": "Part", "class": "part",
            "arrival_pattern": {"kind": "poisson", "rate": 20, "rate_unit": "per_hour"}}],
        "resources": [
            {"name": "Machine 1", "type": "machine", "capacity": 1},
            {"name": "Machine 2", "type": "machine", "capacity": 1}],
        "processes": [{"name": "machining", "entity_type": "part",
            "sequence": [
                {"id": "m1", "type": "seize", "resource_name": "Machine 1"},
                {"id": "cut", "type": "delay",
                 "duration": {"type": "constant", "parameters": {"value": 2.0}}},
                {"id": "m1_done", "type": "release", "resource_name": "Machine 1"},
                {"id": "m2", "type": "seize", "resource_name": "Machine 2"},
                {"id": "polish", "type": "delay",
                 "duration": {"type": "constant", "parameters": {"value": 1.5}}},
                {"id": "m2_done", "type": "release", "resource_name": "Machine 2"}]}],
        "simulation_duration": 6.0,
        "warmup_period": 0.0,
        "random_seed": 2024
    }"#,
    );

    let cycle = &summary.tally["entity_cycle_time"];
    assert!(cycle.count > 0, "no parts completed in six hours");
    assert!(cycle.min >= 3.5 - 1e-9, "cycle below processing floor: {}", cycle.min);
    assert!(
        (3.5..=17.5).contains(&cycle.mean),
        "mean cycle {} outside [3.5, 17.5]",
        cycle.mean
    );

    // Every part that finished visited both machines.
    assert!(summary.resources["machine_2"].total_busy_time > 0.0);
}

#[test]
fn probabilistic_routing_splits_the_flow() {
    // 70% of entities take a second stage, 30% exit directly; both
    // branches must see traffic and conservation must hold.
    let (sim, summary) = simulate(
        r#"{
        "system_name": "triage",
        "entities": [{"name": "Patient", "class": "patient",
            "arrival_pattern": {"kind": "poisson", "rate": 30, "rate_unit": "per_hour"}}],
        "resources": [
            {"name": "Nurse", "type": "staff", "capacity": 2},
            {"name": "Doctor", "type": "staff", "capacity": 1}],
        "processes": [{"name": "visit", "entity_type": "patient",
            "sequence": [
                {"id": "triage", "type": "seize", "resource_name": "Nurse"},
                {"id": "assess", "type": "delay",
                 "duration": {"type": "exponential", "parameters": {"mean": 2.0}}},
                {"id": "triage_done", "type": "release", "resource_name": "Nurse"},
                {"id": "split", "type": "decision", "conditions": [
                    {"probability": 0.7, "next_step_id": "consult"},
                    {"probability": 0.3}]},
                {"id": "consult", "type": "seize", "resource_name": "Doctor"},
                {"id": "examine", "type": "delay",
                 "duration": {"type": "exponential", "parameters": {"mean": 1.0}}},
                {"id": "consult_done", "type": "release", "resource_name": "Doctor"}]}],
        "simulation_duration": 100.0,
        "warmup_period": 0.0,
        "random_seed": 555
    }"#,
    );

    assert!(summary.resources["doctor"].total_busy_time > 0.0);
    let nurse_starts = summary.resources["nurse"].total_busy_time / 2.0;
    let doctor_starts = summary.resources["doctor"].total_busy_time / 1.0;
    // Doctor sees roughly 70% of the nurse's flow (mean service 1 vs 2).
    let ratio = doctor_starts / nurse_starts;
    assert!(
        (0.55..=0.85).contains(&ratio),
        "branch ratio {ratio} inconsistent with a 70/30 split"
    );
    assert!(sim.kernel().diagnostics().is_empty());
}

#[test]
fn nonhomogeneous_windows_shape_the_arrivals() {
    // 0-60 min at 60/hr, 120-180 min at 30/hr, nothing elsewhere on a
    // 240-minute horizon.
    let model = ModelDescription::from_json(
        r#"{
        "system_name": "lunch rush",
        "entities": [{"name": "Guest", "class": "guest",
            "arrival_pattern": {"kind": "non_homogeneous_poisson", "windows": [
                {"start_min": 0, "end_min": 60, "rate_per_hour": 60},
                {"start_min": 120, "end_min": 180, "rate_per_hour": 30}]}}],
        "resources": [{"name": "Counter", "type": "server", "capacity": 4}],
        "processes": [{"name": "serve", "entity_type": "guest",
            "sequence": [
                {"id": "s", "type": "seize", "resource_name": "Counter"},
                {"id": "d", "type": "delay",
                 "duration": {"type": "exponential", "parameters": {"mean": 1.0}}},
                {"id": "r", "type": "release", "resource_name": "Counter"}]}],
        "simulation_duration": 4.0,
        "warmup_period": 0.0,
        "random_seed": 60601
    }"#,
    )
    .unwrap();

    let mut sim = Simulation::from_model(&model).unwrap();
    sim.kernel_mut().set_tracing(true);
    let summary = sim.run_to_completion().unwrap();
    assert!(sim.kernel().validate_conservation());

    // Expected 60 + 30 arrivals; 2σ = 2·√90 ≈ 19.
    let created = summary.simulation.entities_created as f64;
    assert!(
        (71.0..=109.0).contains(&created),
        "{created} arrivals outside 90 ± 2σ"
    );

    // No arrival may land in the dead windows.
    let arrival_times: Vec<f64> = sim
        .kernel()
        .trace_log()
        .iter()
        .filter(|e| e.kind == "dispatch" && e.details.starts_with("arrival"))
        .map(|e| e.time.as_minutes())
        .collect();
    assert_eq!(arrival_times.len(), summary.simulation.entities_created as usize);
    for t in arrival_times {
        let in_first = (0.0..60.0).contains(&t);
        let in_second = (120.0..180.0).contains(&t);
        assert!(in_first || in_second, "arrival at {t} min in a dead window");
    }
}

#[test]
fn empty_arrivals_produce_a_stable_zero_summary() {
    let (sim, summary) = simulate(
        r#"{
        "system_name": "ghost town",
        "entities": [{"name": "Visitor", "class": "visitor"}],
        "resources": [{"name": "Gate", "type": "server", "capacity": 1}],
        "simulation_duration": 8.0,
        "warmup_period": 0.0,
        "random_seed": 1
    }"#,
    );

    assert_eq!(summary.simulation.event_count, 0);
    assert_eq!(summary.simulation.entities_created, 0);
    assert_eq!(summary.simulation.entities_departed, 0);
    assert_eq!(summary.tally["entity_cycle_time"].count, 0);
    assert_eq!(summary.tally["entity_cycle_time"].mean, 0.0);
    assert_eq!(summary.time_persistent["entities_in_system"].time_average, 0.0);
    assert!(sim.kernel().is_complete());
    // The clock never moved.
    assert_eq!(summary.simulation.current_time, 0.0);
}

#[test]
fn scheduled_arrivals_fire_exactly_once_each() {
    let (_, summary) = simulate(
        r#"{
        "system_name": "appointments",
        "entities": [{"name": "Patient", "class": "patient",
            "arrival_pattern": {"kind": "scheduled", "times": [10, 30, 45, 170]}}],
        "resources": [{"name": "Dentist", "type": "staff", "capacity": 1}],
        "processes": [{"name": "checkup", "entity_type": "patient",
            "sequence": [
                {"id": "s", "type": "seize", "resource_name": "Dentist"},
                {"id": "d", "type": "delay",
                 "duration": {"type": "constant", "parameters": {"value": 5.0}}},
                {"id": "r", "type": "release", "resource_name": "Dentist"}]}],
        "simulation_duration": 4.0,
        "warmup_period": 0.0,
        "random_seed": 9
    }"#,
    );

    assert_eq!(summary.simulation.entities_created, 4);
    assert_eq!(summary.simulation.entities_departed, 4);
    assert_eq!(summary.tally["entity_service_time"].count, 4);
    assert_eq!(summary.tally["entity_service_time"].mean, 5.0);
}

#[test]
fn unknown_arrival_pattern_disables_only_that_class() {
    let (sim, summary) = simulate(
        r#"{
        "system_name": "mixed",
        "entities": [
            {"name": "Ghost", "class": "ghost",
             "arrival_pattern": {"kind": "quantum_foam"}},
            {"name": "Customer", "class": "customer",
             "arrival_pattern": {"kind": "scheduled", "times": [5, 15]}}],
        "resources": [{"name": "Desk", "type": "server", "capacity": 1}],
        "processes": [{"name": "serve", "entity_type": "customer",
            "sequence": [
                {"id": "s", "type": "seize", "resource_name": "Desk"},
                {"id": "d", "type": "delay",
                 "duration": {"type": "constant", "parameters": {"value": 1.0}}},
                {"id": "r", "type": "release", "resource_name": "Desk"}]}],
        "simulation_duration": 1.0,
        "warmup_period": 0.0,
        "random_seed": 4
    }"#,
    );

    // The supported class still flows.
    assert_eq!(summary.simulation.entities_created, 2);
    // The unsupported one is reported, not fatal.
    assert!(summary.diagnostics.iter().any(|d| matches!(
        d,
        turnstile_kernel::Diagnostic::ArrivalUnsupported { class, .. } if class == "ghost"
    )));
    assert!(sim.kernel().validate_conservation());
}

#[test]
fn capped_poisson_stops_at_the_limit() {
    let (_, summary) = simulate(
        r#"{
        "system_name": "limited release",
        "entities": [{"name": "Buyer", "class": "buyer",
            "arrival_pattern": {"kind": "poisson", "rate": 600, "rate_unit": "per_hour",
                                "max_arrivals": 25}}],
        "resources": [{"name": "Checkout", "type": "server", "capacity": 3}],
        "processes": [{"name": "buy", "entity_type": "buyer",
            "sequence": [
                {"id": "s", "type": "seize", "resource_name": "Checkout"},
                {"id": "d", "type": "delay",
                 "duration": {"type": "exponential", "parameters": {"mean": 0.5}}},
                {"id": "r", "type": "release", "resource_name": "Checkout"}]}],
        "simulation_duration": 10.0,
        "warmup_period": 0.0,
        "random_seed": 25
    }"#,
    );

    assert_eq!(summary.simulation.entities_created, 25);
    assert_eq!(summary.simulation.entities_departed, 25);
}
