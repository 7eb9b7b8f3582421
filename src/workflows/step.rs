// Step identifiers, workflow types and the rendered node configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::WorkflowError;

/// Every node of the intake wizard.
///
/// The set is closed: adding a step means adding a variant here and a
/// definition row in the graph registry, which is validated on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepId {
    IntentSelection,
    VehicleKnowledge,
    VehicleSearch,
    CarinAnalytics,
    SearchResults,
    CarinResults,
    VehicleValuationReport,
    VehiclePurchaseConfirmation,
    VehicleSelection,
    BuyingConfirmation,
    BuyingComplete,
    HasBuyer,
    BuyerType,
    PrivateBuyer,
    DealerNetwork,
    SellingConfirmation,
    ReplacementCheck,
    FinancingAssistanceComplete,
    DealerNetworkComplete,
    NoAssistanceNeeded,
}

impl StepId {
    pub const ALL: [StepId; 20] = [
        StepId::IntentSelection,
        StepId::VehicleKnowledge,
        StepId::VehicleSearch,
        StepId::CarinAnalytics,
        StepId::SearchResults,
        StepId::CarinResults,
        StepId::VehicleValuationReport,
        StepId::VehiclePurchaseConfirmation,
        StepId::VehicleSelection,
        StepId::BuyingConfirmation,
        StepId::BuyingComplete,
        StepId::HasBuyer,
        StepId::BuyerType,
        StepId::PrivateBuyer,
        StepId::DealerNetwork,
        StepId::SellingConfirmation,
        StepId::ReplacementCheck,
        StepId::FinancingAssistanceComplete,
        StepId::DealerNetworkComplete,
        StepId::NoAssistanceNeeded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::IntentSelection => "intent-selection",
            StepId::VehicleKnowledge => "vehicle-knowledge",
            StepId::VehicleSearch => "vehicle-search",
            StepId::CarinAnalytics => "carin-analytics",
            StepId::SearchResults => "search-results",
            StepId::CarinResults => "carin-results",
            StepId::VehicleValuationReport => "vehicle-valuation-report",
            StepId::VehiclePurchaseConfirmation => "vehicle-purchase-confirmation",
            StepId::VehicleSelection => "vehicle-selection",
            StepId::BuyingConfirmation => "buying-confirmation",
            StepId::BuyingComplete => "buying-complete",
            StepId::HasBuyer => "has-buyer",
            StepId::BuyerType => "buyer-type",
            StepId::PrivateBuyer => "private-buyer",
            StepId::DealerNetwork => "dealer-network",
            StepId::SellingConfirmation => "selling-confirmation",
            StepId::ReplacementCheck => "replacement-check",
            StepId::FinancingAssistanceComplete => "financing-assistance-complete",
            StepId::DealerNetworkComplete => "dealer-network-complete",
            StepId::NoAssistanceNeeded => "no-assistance-needed",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepId {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepId::ALL
            .iter()
            .copied()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| WorkflowError::UnknownStep(s.to_string()))
    }
}

/// The two intake journeys a session can be opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
    Buying,
    Selling,
}

impl WorkflowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowType::Buying => "buying",
            WorkflowType::Selling => "selling",
        }
    }

    /// Both journeys open on the intent question; the answer picks the branch.
    pub fn entry_step(&self) -> StepId {
        StepId::IntentSelection
    }
}

impl fmt::Display for WorkflowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowType {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buying" => Ok(WorkflowType::Buying),
            "selling" => Ok(WorkflowType::Selling),
            other => Err(WorkflowError::UnknownWorkflowType(other.to_string())),
        }
    }
}

/// Step count hint shown to the wizard.
///
/// Later steps depend on the branch taken, so many nodes only know a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSpan {
    Fixed(u32),
    Range(u32, u32),
    Dynamic,
}

/// Serialized form of [`StepSpan`]: a bare number or a string such as `"5-8"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TotalSteps {
    Fixed(u32),
    Open(String),
}

impl From<StepSpan> for TotalSteps {
    fn from(span: StepSpan) -> Self {
        match span {
            StepSpan::Fixed(n) => TotalSteps::Fixed(n),
            StepSpan::Range(lo, hi) => TotalSteps::Open(format!("{lo}-{hi}")),
            StepSpan::Dynamic => TotalSteps::Open("dynamic".to_string()),
        }
    }
}

/// A node configuration rendered for a specific context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepNode {
    pub step_id: StepId,
    pub component_name: String,
    pub data: serde_json::Value,
    pub step_number: u32,
    pub total_steps: TotalSteps,
    pub can_go_back: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_step: Option<StepId>,
    pub workflow_complete: bool,
}
