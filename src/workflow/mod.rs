pub mod proposal_ctx;
pub mod proposal_flow;

pub use proposal_ctx::ProposalCtx;
pub use proposal_flow::{FlowError, ProcessResult, ProposalFlow, Stage};
