//! Batch entry point: discovers input documents, runs extraction and the
//! retrieval-augmented answerer, and writes the result artifacts.

pub mod batch;
pub mod discover;
pub mod output;

pub use batch::{analyze, run, NO_DOCUMENTS_MESSAGE};
pub use output::{AnalysisRecord, CompletionMarker, OutputPaths};

/// The user's question: all arguments joined by spaces, or `default` when none are given.
pub fn query_from_args<I, S>(args: I, default: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
    if parts.is_empty() { default.to_string() } else { parts.join(" ") }
}
