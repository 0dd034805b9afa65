pub mod move_log;
pub mod problem;
pub mod proposal;

pub use move_log::MoveLog;
pub use problem::{NewProblem, Problem};
pub use proposal::{Proposal, ProposalStatus};
