// Inverse edges for the back button
//
// Back navigation reconstructs the canonical prior node from the static table.
// It never replays a historical payload and never rolls context back.

use super::errors::WorkflowError;
use super::graph::definition;
use super::step::StepId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackRule {
    /// Entry and terminal steps
    None,
    Single(StepId),
    /// Several forward paths lead here. Without a hint the default is used,
    /// so identical input always yields the same answer.
    Ambiguous {
        candidates: &'static [StepId],
        default: StepId,
    },
}

impl BackRule {
    pub fn default_target(&self) -> Option<StepId> {
        match self {
            BackRule::None => None,
            BackRule::Single(step) => Some(*step),
            BackRule::Ambiguous { default, .. } => Some(*default),
        }
    }

    pub fn candidates(&self) -> Vec<StepId> {
        match self {
            BackRule::None => Vec::new(),
            BackRule::Single(step) => vec![*step],
            BackRule::Ambiguous { candidates, .. } => candidates.to_vec(),
        }
    }
}

/// Exhaustive inverse-edge table.
pub fn back_rule(step: StepId) -> BackRule {
    use StepId::*;
    match step {
        IntentSelection => BackRule::None,
        VehicleKnowledge => BackRule::Ambiguous {
            candidates: &[IntentSelection, ReplacementCheck],
            default: IntentSelection,
        },
        VehicleSearch | CarinAnalytics => BackRule::Single(VehicleKnowledge),
        SearchResults => BackRule::Single(VehicleSearch),
        CarinResults => BackRule::Single(CarinAnalytics),
        VehicleValuationReport => BackRule::Single(VehicleSearch),
        VehiclePurchaseConfirmation => BackRule::Single(VehicleValuationReport),
        VehicleSelection => BackRule::Ambiguous {
            candidates: &[SearchResults, CarinResults],
            default: SearchResults,
        },
        BuyingConfirmation => BackRule::Single(VehicleSelection),
        HasBuyer => BackRule::Single(IntentSelection),
        BuyerType => BackRule::Single(HasBuyer),
        PrivateBuyer => BackRule::Single(BuyerType),
        DealerNetwork => BackRule::Ambiguous {
            candidates: &[HasBuyer, VehicleValuationReport],
            default: HasBuyer,
        },
        SellingConfirmation => BackRule::Ambiguous {
            candidates: &[PrivateBuyer, DealerNetwork, BuyerType],
            default: PrivateBuyer,
        },
        ReplacementCheck => BackRule::Single(SellingConfirmation),
        BuyingComplete | FinancingAssistanceComplete | DealerNetworkComplete
        | NoAssistanceNeeded => BackRule::None,
    }
}

/// Resolve the step the back button leads to.
///
/// `came_from` disambiguates steps with several predecessors; it is ignored
/// for steps with exactly one.
pub fn previous_step(current: StepId, came_from: Option<StepId>) -> Result<StepId, WorkflowError> {
    if definition(current).terminal {
        return Err(WorkflowError::BackFromTerminal { step: current });
    }
    match back_rule(current) {
        BackRule::None => Err(WorkflowError::NoPredecessor { step: current }),
        BackRule::Single(step) => Ok(step),
        BackRule::Ambiguous {
            candidates,
            default,
        } => match came_from {
            None => Ok(default),
            Some(hint) if candidates.contains(&hint) => Ok(hint),
            Some(hint) => Err(WorkflowError::InvalidBackHint {
                step: current,
                hint,
            }),
        },
    }
}
