//! Release classification of commit batches

pub mod release_analyzer;

pub use release_analyzer::{Analysis, CommitClassification, ReleaseAnalyzer};
