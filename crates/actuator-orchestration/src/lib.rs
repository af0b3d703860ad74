pub mod pipeline;
pub mod prompt;

pub use pipeline::{ActionPipeline, PipelineResponse, PlanResponse};
pub use prompt::{ACTION_INSTRUCTIONS, PLAN_INSTRUCTIONS};
