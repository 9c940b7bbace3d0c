//! Human-readable explanation of a completed run.

use std::fmt;

use crate::scenario::{Constraints, State};

use super::engine::SimulationResult;

/// Renders the winning path and score breakdown of `result` as text.
///
/// Pure formatting over the stored record; nothing is re-run or re-checked.
#[must_use]
pub fn explain(result: &SimulationResult) -> String {
    Explanation(result).to_string()
}

struct Explanation<'a>(&'a SimulationResult);

impl fmt::Display for Explanation<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        writeln!(out, "# Simulation Explanation (Run ID: {})", result.run_id)?;
        writeln!(out)?;
        writeln!(out, "## Initial Scenario")?;
        writeln!(out, "Starting state: {}", render_state(&result.scenario.initial_state))?;
        writeln!(out, "Constraints applied: {}", render_constraints(&result.constraints))?;
        writeln!(out)?;
        writeln!(out, "## Search Process")?;
        writeln!(
            out,
            "The beam search explored {} steps,",
            result.intermediate_states.len()
        )?;
        writeln!(
            out,
            "keeping the top {} candidates at each step.",
            result.top_k.len()
        )?;
        writeln!(out)?;
        writeln!(out, "## Winning Path")?;
        for (i, step) in result.best_result.path.iter().enumerate() {
            writeln!(out, "  {i}. {step}")?;
        }
        writeln!(out)?;
        writeln!(out, "## Final Score Breakdown")?;
        for (component, value) in result.score_breakdown.iter() {
            writeln!(out, "  - {component}: {value:.2}")?;
        }
        writeln!(out)?;
        writeln!(out, "**Total Score: {:.2}**", result.best_result.score)?;
        writeln!(out)?;
        writeln!(out, "## Why This Result Won")?;
        writeln!(out, "This result achieved the highest combined score by maximizing")?;
        write!(out, "value contributions while minimizing constraint penalties.")?;
        if !result.constraints.is_empty() {
            let keys: Vec<&str> = result.constraints.keys().map(String::as_str).collect();
            write!(out, "\nConstraints considered: {}.", keys.join(", "))?;
        }
        Ok(())
    }
}

fn render_state(state: &State) -> String {
    let fields: Vec<String> = state.iter().map(|(k, v)| format!("{k}: {v}")).collect();
    format!("{{{}}}", fields.join(", "))
}

fn render_constraints(constraints: &Constraints) -> String {
    if constraints.is_empty() {
        return "None".to_string();
    }
    let entries: Vec<String> = constraints.iter().map(|(k, v)| format!("{k}: {v}")).collect();
    format!("{{{}}}", entries.join(", "))
}
