// Terminal-outcome classification for sellers who do not want a replacement

use serde::Serialize;
use tracing::debug;

use super::context::{field_str, FormData, WorkflowContext};
use super::step::StepId;

const YES: &str = "yes";

/// Which rule produced a completion outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionRule {
    /// `financing == "yes"` in the raw payload of the replacement question
    PayloadFinancing,
    /// `private_buyer_details.financing == "yes"`
    BuyerDetailsFinancing,
    /// flattened `financing == "yes"`
    FlatFinancing,
    /// `assistance_type == "dealer_network"`
    DealerNetworkAssistance,
    NoAssistance,
}

impl CompletionRule {
    /// Context rules, evaluated in order; the first match wins.
    pub const PRECEDENCE: [CompletionRule; 4] = [
        CompletionRule::BuyerDetailsFinancing,
        CompletionRule::FlatFinancing,
        CompletionRule::DealerNetworkAssistance,
        CompletionRule::NoAssistance,
    ];

    fn matches(&self, context: &WorkflowContext) -> bool {
        match self {
            CompletionRule::PayloadFinancing => false,
            CompletionRule::BuyerDetailsFinancing => {
                context.lookup_nested_str("private_buyer_details", "financing") == Some(YES)
            }
            CompletionRule::FlatFinancing => context.lookup_str("financing") == Some(YES),
            CompletionRule::DealerNetworkAssistance => {
                context.lookup_str("assistance_type") == Some("dealer_network")
            }
            CompletionRule::NoAssistance => true,
        }
    }

    pub fn outcome(&self) -> StepId {
        match self {
            CompletionRule::PayloadFinancing
            | CompletionRule::BuyerDetailsFinancing
            | CompletionRule::FlatFinancing => StepId::FinancingAssistanceComplete,
            CompletionRule::DealerNetworkAssistance => StepId::DealerNetworkComplete,
            CompletionRule::NoAssistance => StepId::NoAssistanceNeeded,
        }
    }
}

/// Every step the classifier can land on.
pub const COMPLETION_OUTCOMES: [StepId; 3] = [
    StepId::FinancingAssistanceComplete,
    StepId::DealerNetworkComplete,
    StepId::NoAssistanceNeeded,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub outcome: StepId,
    pub rule: CompletionRule,
}

/// Raw-payload shortcut: financing requested on the replacement question
/// itself bypasses the context rules entirely.
pub fn short_circuit(payload: &FormData) -> Option<Classification> {
    (field_str(payload, "financing") == Some(YES)).then_some(Classification {
        outcome: StepId::FinancingAssistanceComplete,
        rule: CompletionRule::PayloadFinancing,
    })
}

/// Walk the context rules in precedence order.
pub fn resolve(context: &WorkflowContext) -> Classification {
    let rule = CompletionRule::PRECEDENCE
        .into_iter()
        .find(|rule| rule.matches(context))
        .unwrap_or(CompletionRule::NoAssistance);
    Classification {
        outcome: rule.outcome(),
        rule,
    }
}

/// Full decision for `replacement == "no_replacement"`.
pub fn classify(payload: &FormData, context: &WorkflowContext) -> Classification {
    let classification = short_circuit(payload).unwrap_or_else(|| resolve(context));
    debug!(
        outcome = %classification.outcome,
        rule = ?classification.rule,
        "Classified completion outcome"
    );
    classification
}
