// Lead-intake workflow: step graph, back navigation, completion resolver and
// the engine facade that drives sessions through them

pub mod back_navigation;
pub mod context;
pub mod engine;
pub mod errors;
pub mod graph;
pub mod lead_id;
pub mod resolver;
pub mod response;
pub mod session_lock;
pub mod step;
pub mod templates;

pub use back_navigation::{back_rule, previous_step, BackRule};
pub use context::{FormData, WorkflowContext};
pub use engine::{EngineRequest, WorkflowEngine};
pub use errors::WorkflowError;
pub use graph::{GraphReport, StepGraph};
pub use lead_id::{LeadIdGenerator, LeadIdStrategy, TimestampLeadIds, UuidLeadIds};
pub use resolver::{Classification, CompletionRule};
pub use response::{BackRequest, ResponseStatus, StartRequest, TransitionRequest, WorkflowResponse};
pub use step::{StepId, StepNode, StepSpan, TotalSteps, WorkflowType};
