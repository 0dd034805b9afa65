pub mod log_extractor;
pub mod problem_submitter;
pub mod proposal_source;
pub mod session_manager;
pub mod warn_writer;

pub use log_extractor::LogExtractor;
pub use problem_submitter::ProblemSubmitter;
pub use proposal_source::ProposalSource;
pub use session_manager::{RenderedPage, Session, SessionManager, SessionState};
pub use warn_writer::WarnWriter;
