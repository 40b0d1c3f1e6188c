pub mod consensus;
pub mod ledger;
pub mod orchestrator;
pub mod prompts;
pub mod refine;
pub mod service;
pub mod types;
pub mod votes;

pub use consensus::ConsensusAnalyzer;
pub use ledger::{TokenLedger, TokenReport};
pub use orchestrator::AnalysisOrchestrator;
pub use refine::RegionRefiner;
pub use service::{AnalysisRequest, AnalysisService};
pub use types::{AnalysisResult, AnalyzeOptions, Region};
pub use votes::VoteTally;
