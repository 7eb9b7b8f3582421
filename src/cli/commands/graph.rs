use anyhow::Result;
use std::process::ExitCode;

use dealer_intake::workflows::graph::{definition, EdgeTarget, Guard, StepGraph};
use dealer_intake::workflows::{back_rule, BackRule, StepId};

use super::{print_json, Command};

pub struct GraphCommand {
    json: bool,
}

impl GraphCommand {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn print_text(&self) {
        for step in StepId::ALL {
            let def = definition(step);
            let marker = if def.terminal { " (terminal)" } else { "" };
            println!("{step} [{}] #{}{marker}", def.component, def.step_number);
            for edge in def.edges {
                let guard = match edge.guard {
                    Guard::Always => "otherwise".to_string(),
                    Guard::Equals { field, value } => format!("{field} == {value}"),
                };
                let target = match edge.target {
                    EdgeTarget::Step(next) => next.to_string(),
                    EdgeTarget::Classify => "classify".to_string(),
                };
                println!("  {guard} -> {target}");
            }
            match back_rule(step) {
                BackRule::None => {}
                BackRule::Single(prev) => println!("  back -> {prev}"),
                BackRule::Ambiguous { candidates, default } => {
                    let names: Vec<_> = candidates.iter().map(StepId::as_str).collect();
                    println!("  back -> {default} (of {})", names.join(", "));
                }
            }
        }
    }
}

impl Command for GraphCommand {
    async fn execute(&self) -> Result<ExitCode> {
        let report = StepGraph::inspect(StepId::IntentSelection);
        if self.json {
            print_json(&report)?;
        } else {
            self.print_text();
            println!();
            println!(
                "{} steps, {} edges, {} terminals",
                report.steps,
                report.edges,
                report.terminals.len()
            );
            for problem in &report.problems {
                println!("problem: {problem}");
            }
        }
        Ok(if report.is_valid() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }
}
