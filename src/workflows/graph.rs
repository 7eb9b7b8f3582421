// Canonical step graph: node definitions, guarded forward edges and load-time validation

use serde::Serialize;
use std::collections::{BTreeSet, VecDeque};
use std::sync::LazyLock;
use tracing::{debug, info};

use super::back_navigation::{self, BackRule};
use super::context::{field_str, FormData, WorkflowContext};
use super::errors::WorkflowError;
use super::resolver::{self, Classification, COMPLETION_OUTCOMES};
use super::step::{StepId, StepNode, StepSpan};
use super::templates;

/// Predicate over the submitted form data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Always,
    Equals {
        field: &'static str,
        value: &'static str,
    },
}

impl Guard {
    pub fn admits(&self, data: &FormData) -> bool {
        match self {
            Guard::Always => true,
            Guard::Equals { field, value } => field_str(data, field) == Some(*value),
        }
    }

    fn field(&self) -> Option<&'static str> {
        match self {
            Guard::Always => None,
            Guard::Equals { field, .. } => Some(field),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeTarget {
    Step(StepId),
    /// Hand over to the completion classifier
    Classify,
}

impl EdgeTarget {
    pub fn possible_steps(&self) -> Vec<StepId> {
        match self {
            EdgeTarget::Step(step) => vec![*step],
            EdgeTarget::Classify => COMPLETION_OUTCOMES.to_vec(),
        }
    }
}

/// A guarded forward edge, plus context markers merged when it is taken
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub guard: Guard,
    pub target: EdgeTarget,
    pub marks: &'static [(&'static str, &'static str)],
}

impl Edge {
    const fn when(field: &'static str, value: &'static str, to: StepId) -> Self {
        Edge {
            guard: Guard::Equals { field, value },
            target: EdgeTarget::Step(to),
            marks: &[],
        }
    }

    const fn otherwise(to: StepId) -> Self {
        Edge {
            guard: Guard::Always,
            target: EdgeTarget::Step(to),
            marks: &[],
        }
    }

    const fn marking(mut self, marks: &'static [(&'static str, &'static str)]) -> Self {
        self.marks = marks;
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StepDefinition {
    pub id: StepId,
    pub component: &'static str,
    pub step_number: u32,
    pub total_steps: StepSpan,
    pub edges: &'static [Edge],
    pub terminal: bool,
}

const NO_EDGES: &[Edge] = &[];
const INTENT_SELECTION: &[Edge] = &[
    Edge::when("intent", "buying", StepId::VehicleKnowledge),
    Edge::when("intent", "selling", StepId::HasBuyer),
];
const VEHICLE_KNOWLEDGE: &[Edge] = &[
    Edge::when("vehicle_knowledge", "knows_vehicle", StepId::VehicleSearch),
    Edge::when("vehicle_knowledge", "needs_help", StepId::CarinAnalytics),
];
const VEHICLE_SEARCH: &[Edge] = &[
    Edge::when("nextStep", "vehicle-valuation-report", StepId::VehicleValuationReport),
    Edge::otherwise(StepId::SearchResults),
];
const CARIN_ANALYTICS: &[Edge] = &[Edge::otherwise(StepId::CarinResults)];
const TO_VEHICLE_SELECTION: &[Edge] = &[Edge::otherwise(StepId::VehicleSelection)];
const VALUATION_REPORT: &[Edge] = &[
    Edge::when("intent", "buying", StepId::VehiclePurchaseConfirmation),
    Edge::when("intent", "dealer-network", StepId::DealerNetwork),
];
const TO_BUYING_COMPLETE: &[Edge] = &[Edge::otherwise(StepId::BuyingComplete)];
const VEHICLE_SELECTION: &[Edge] = &[Edge::otherwise(StepId::BuyingConfirmation)];
const HAS_BUYER: &[Edge] = &[
    Edge::when("has_buyer", "has_buyer", StepId::BuyerType),
    Edge::otherwise(StepId::DealerNetwork),
];
const BUYER_TYPE: &[Edge] = &[
    Edge::when("buyer_type", "private", StepId::PrivateBuyer),
    Edge::otherwise(StepId::SellingConfirmation),
];
const PRIVATE_BUYER: &[Edge] = &[Edge::otherwise(StepId::SellingConfirmation)];
const DEALER_NETWORK: &[Edge] = &[Edge::otherwise(StepId::SellingConfirmation)
    .marking(&[("assistance_type", "dealer_network")])];
const SELLING_CONFIRMATION: &[Edge] = &[Edge::otherwise(StepId::ReplacementCheck)];
const REPLACEMENT_CHECK: &[Edge] = &[
    Edge::when("replacement", "wants_replacement", StepId::VehicleKnowledge)
        .marking(&[("vehicle_context", "replacement_vehicle")]),
    Edge {
        guard: Guard::Equals {
            field: "replacement",
            value: "no_replacement",
        },
        target: EdgeTarget::Classify,
        marks: &[],
    },
];

/// Component name, step number, step span and forward edges of one step
type StepRow = (&'static str, u32, StepSpan, &'static [Edge]);

/// The static definition of a step. Exhaustive over [`StepId`].
pub fn definition(step: StepId) -> StepDefinition {
    use StepId::*;
    let (component, step_number, total_steps, edges): StepRow = match step {
        IntentSelection => ("IntentSelection", 1, StepSpan::Dynamic, INTENT_SELECTION),
        VehicleKnowledge => ("VehicleKnowledge", 2, StepSpan::Range(5, 8), VEHICLE_KNOWLEDGE),
        VehicleSearch => ("VehicleSearch", 3, StepSpan::Range(5, 6), VEHICLE_SEARCH),
        CarinAnalytics => ("CarInAnalytics", 3, StepSpan::Range(6, 8), CARIN_ANALYTICS),
        SearchResults => ("SearchResults", 4, StepSpan::Range(5, 6), TO_VEHICLE_SELECTION),
        CarinResults => ("CarInResults", 4, StepSpan::Range(6, 8), TO_VEHICLE_SELECTION),
        VehicleValuationReport => (
            "VehicleValuationReport",
            4,
            StepSpan::Range(5, 7),
            VALUATION_REPORT,
        ),
        VehiclePurchaseConfirmation => (
            "VehiclePurchaseConfirmation",
            5,
            StepSpan::Fixed(6),
            TO_BUYING_COMPLETE,
        ),
        VehicleSelection => ("VehicleSelection", 5, StepSpan::Range(6, 7), VEHICLE_SELECTION),
        BuyingConfirmation => ("BuyingConfirmation", 6, StepSpan::Fixed(7), TO_BUYING_COMPLETE),
        BuyingComplete => ("BuyingComplete", 7, StepSpan::Fixed(7), NO_EDGES),
        HasBuyer => ("HasBuyer", 2, StepSpan::Range(4, 7), HAS_BUYER),
        BuyerType => ("BuyerType", 3, StepSpan::Range(5, 7), BUYER_TYPE),
        PrivateBuyer => ("PrivateBuyer", 4, StepSpan::Range(6, 7), PRIVATE_BUYER),
        DealerNetwork => ("DealerNetwork", 3, StepSpan::Range(4, 6), DEALER_NETWORK),
        SellingConfirmation => (
            "SellingConfirmation",
            5,
            StepSpan::Fixed(6),
            SELLING_CONFIRMATION,
        ),
        ReplacementCheck => ("ReplacementCheck", 6, StepSpan::Range(7, 10), REPLACEMENT_CHECK),
        FinancingAssistanceComplete => {
            ("FinancingAssistanceComplete", 7, StepSpan::Fixed(7), NO_EDGES)
        }
        DealerNetworkComplete => ("DealerNetworkComplete", 7, StepSpan::Fixed(7), NO_EDGES),
        NoAssistanceNeeded => ("NoAssistanceNeeded", 7, StepSpan::Fixed(7), NO_EDGES),
    };
    StepDefinition {
        id: step,
        component,
        step_number,
        total_steps,
        edges,
        terminal: matches!(
            step,
            BuyingComplete
                | FinancingAssistanceComplete
                | DealerNetworkComplete
                | NoAssistanceNeeded
        ),
    }
}

/// Outcome of resolving a forward edge
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub next: StepId,
    pub marks: Vec<(&'static str, &'static str)>,
    pub classification: Option<Classification>,
}

/// Summary produced by load-time validation
#[derive(Debug, Clone, Serialize)]
pub struct GraphReport {
    pub entry: StepId,
    pub steps: usize,
    pub edges: usize,
    pub terminals: Vec<StepId>,
    pub reachable: BTreeSet<StepId>,
    pub problems: Vec<String>,
}

impl GraphReport {
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }
}

/// The validated, immutable step registry shared by every session.
#[derive(Debug, Clone)]
pub struct StepGraph {
    entry: StepId,
    nodes: BTreeSet<StepId>,
}

static CANONICAL: LazyLock<Result<StepGraph, String>> = LazyLock::new(|| {
    let report = StepGraph::inspect(StepId::IntentSelection);
    if report.is_valid() {
        info!(
            steps = report.steps,
            edges = report.edges,
            "Step graph validated"
        );
        Ok(StepGraph {
            entry: report.entry,
            nodes: report.reachable,
        })
    } else {
        Err(report.problems.join("; "))
    }
});

impl StepGraph {
    /// The shared registry, validated once on first use.
    pub fn canonical() -> Result<&'static StepGraph, WorkflowError> {
        CANONICAL
            .as_ref()
            .map_err(|problems| WorkflowError::InvalidGraph(problems.clone()))
    }

    pub fn entry(&self) -> StepId {
        self.entry
    }

    pub fn contains(&self, step: StepId) -> bool {
        self.nodes.contains(&step)
    }

    pub fn steps(&self) -> impl Iterator<Item = StepId> + '_ {
        self.nodes.iter().copied()
    }

    /// Forward edge resolution. `context` is the accumulated context with
    /// `data` already merged in; `data` alone is the raw payload.
    pub fn next_step(
        &self,
        current: StepId,
        data: &FormData,
        context: &WorkflowContext,
    ) -> Result<Resolution, WorkflowError> {
        let def = definition(current);
        let edge = def
            .edges
            .iter()
            .find(|edge| edge.guard.admits(data))
            .ok_or_else(|| WorkflowError::NoMatchingTransition {
                step: current,
                reason: describe_miss(&def, data),
            })?;

        let resolution = match edge.target {
            EdgeTarget::Step(next) => Resolution {
                next,
                marks: edge.marks.to_vec(),
                classification: None,
            },
            EdgeTarget::Classify => {
                let classification = resolver::classify(data, context);
                Resolution {
                    next: classification.outcome,
                    marks: edge.marks.to_vec(),
                    classification: Some(classification),
                }
            }
        };
        debug!(from = %current, to = %resolution.next, "Resolved forward edge");
        Ok(resolution)
    }

    /// Render a node's display configuration for the given context
    pub fn render(&self, step: StepId, context: &WorkflowContext) -> StepNode {
        let def = definition(step);
        let previous = back_navigation::back_rule(step).default_target();
        StepNode {
            step_id: step,
            component_name: def.component.to_string(),
            data: templates::payload(step, context),
            step_number: def.step_number,
            total_steps: def.total_steps.into(),
            can_go_back: !def.terminal && previous.is_some(),
            previous_step: if def.terminal { None } else { previous },
            workflow_complete: def.terminal,
        }
    }

    /// Validate the registry starting from `entry`.
    pub fn inspect(entry: StepId) -> GraphReport {
        let mut problems = Vec::new();
        let mut edges = 0;

        let mut reachable = BTreeSet::from([entry]);
        let mut queue = VecDeque::from([entry]);
        while let Some(step) = queue.pop_front() {
            for edge in definition(step).edges {
                for next in edge.target.possible_steps() {
                    if reachable.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        for step in StepId::ALL {
            let def = definition(step);
            edges += def.edges.len();

            if !reachable.contains(&step) {
                problems.push(format!("{step} is not reachable from {entry}"));
            }
            if def.terminal && !def.edges.is_empty() {
                problems.push(format!("terminal step {step} has outgoing edges"));
            }
            if !def.terminal && def.edges.is_empty() {
                problems.push(format!("step {step} has no outgoing edges"));
            }

            let rule = back_navigation::back_rule(step);
            match rule {
                BackRule::None if !def.terminal && step != entry => {
                    problems.push(format!("step {step} has no back rule"));
                }
                BackRule::Ambiguous {
                    candidates,
                    default,
                } if !candidates.contains(&default) => {
                    problems.push(format!(
                        "default back target {default} of {step} is not a candidate"
                    ));
                }
                _ => {}
            }
            if def.terminal && rule != BackRule::None {
                problems.push(format!("terminal step {step} has a back rule"));
            }
            for candidate in rule.candidates() {
                if definition(candidate).terminal {
                    problems.push(format!("back target {candidate} of {step} is terminal"));
                }
                let leads_here = definition(candidate)
                    .edges
                    .iter()
                    .any(|edge| edge.target.possible_steps().contains(&step));
                if !leads_here {
                    problems.push(format!(
                        "back target {candidate} of {step} has no forward edge into it"
                    ));
                }
            }
        }

        GraphReport {
            entry,
            steps: StepId::ALL.len(),
            edges,
            terminals: StepId::ALL
                .into_iter()
                .filter(|step| definition(*step).terminal)
                .collect(),
            reachable,
            problems,
        }
    }
}

fn describe_miss(def: &StepDefinition, data: &FormData) -> String {
    match def.edges.iter().find_map(|edge| edge.guard.field()) {
        Some(field) => match data.get(field) {
            Some(value) => format!("unexpected {field}: {value}"),
            None => format!("missing {field}"),
        },
        None => "step has no outgoing edges".to_string(),
    }
}
