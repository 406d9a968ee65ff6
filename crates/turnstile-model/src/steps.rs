//! Step-type classification for the flow compiler.

use crate::StepSpec;

/// What a process step does, after synonym normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Claims a unit of a resource's capacity.
    Seize,
    /// Holds the entity for a sampled duration.
    Delay,
    /// Returns the claimed capacity unit.
    Release,
    /// Branches on conditions/probabilities.
    Decision,
    /// Ends the entity's flow.
    Exit,
    /// Anything the compiler does not understand.
    Other,
}

/// Lowercases and strips spaces, underscores, and hyphens so
/// `"Non_Homogeneous-Poisson"` and `"nonhomogeneouspoisson"` compare equal.
pub fn normalize_token(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Classifies one step.
///
/// `process` is ambiguous in the wild: editors emit it both as a
/// processing delay and as a terminal "processed, leave" step. A
/// `process` step that carries a duration or names a resource is a
/// Delay; a bare trailing `process` is an Exit.
pub fn classify_step(step: &StepSpec) -> StepKind {
    match normalize_token(&step.step_type).as_str() {
        "seize" | "acquire" | "grab" => StepKind::Seize,
        "delay" | "wait" | "travel" => StepKind::Delay,
        "process" => {
            if step.duration.is_some() || step.resource_name.is_some() {
                StepKind::Delay
            } else {
                StepKind::Exit
            }
        }
        "release" | "free" => StepKind::Release,
        "decision" | "branch" | "choose" | "decide" => StepKind::Decision,
        "exit" | "leave" | "depart" | "dispose" => StepKind::Exit,
        _ => StepKind::Other,
    }
}

// ============================================================================
// Tests
// ============================================================================
