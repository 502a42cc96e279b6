use std::fs;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use privylex_core::config::Settings;
use privylex_core::{Document, ExtractionError, Generator};
use privylex_rag::RagPipeline;

use crate::discover::{discover, InputFile};
use crate::output::{AnalysisRecord, OutputPaths};

pub const NO_DOCUMENTS_MESSAGE: &str = "No legal documents found or unable to extract text from provided files. Please ensure you've uploaded PDF, DOC, or DOCX files.";

/// Read and extract every file, skipping the ones that fail.
pub fn load_documents(files: &[InputFile], show_progress: bool) -> Vec<Document> {
    let pb = if show_progress { ProgressBar::new(files.len() as u64) } else { ProgressBar::hidden() };
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}") {
        pb.set_style(style.progress_chars("#>-"));
    }

    let mut docs = Vec::with_capacity(files.len());
    for file in files {
        pb.set_message(file.file_name.clone());
        match read_one(file) {
            Ok(text) => {
                let doc = Document { id: file.rel_id.clone(), file_name: file.file_name.clone(), format: file.format, text };
                info!(file = %doc.id, format = doc.format.as_str(), chars = doc.char_len(), "extracted");
                docs.push(doc);
            }
            Err(e) => warn!(file = %file.rel_id, error = %e, "skipping file"),
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    docs
}

fn read_one(file: &InputFile) -> Result<String, ExtractionError> {
    let bytes = fs::read(&file.path)?;
    privylex_extract::extract(&bytes, file.format)
}

/// Discover, extract and analyze. Per-file failures never abort the run.
pub fn analyze(settings: &Settings, query: &str, generator: Option<Box<dyn Generator>>) -> Result<AnalysisRecord> {
    let pipeline = RagPipeline::new(settings, generator).context("invalid pipeline settings")?;
    let input = settings.io.input_path();
    let files = discover(&input);
    info!(input = %input.display(), files = files.len(), "discovered input files");

    let documents = load_documents(&files, settings.io.show_progress);
    let processed: Vec<String> = documents.iter().map(|d| d.file_name.clone()).collect();

    let analysis = if documents.iter().all(|d| d.text.trim().is_empty()) {
        warn!("no document text extracted");
        NO_DOCUMENTS_MESSAGE.to_string()
    } else {
        info!(count = processed.len(), files = %processed.join(", "), "analyzing documents");
        pipeline.analyze(query, &documents)
    };
    Ok(AnalysisRecord::new(query, processed, analysis))
}

/// Run the batch and write every artifact. The completion marker is always
/// written once the output directory is known.
pub fn run(settings: &Settings, query: &str, generator: Option<Box<dyn Generator>>) -> Result<OutputPaths> {
    let out_dir = settings.io.output_path()?;
    let paths = OutputPaths::new(&out_dir, &settings.io);

    let outcome = analyze(settings, query, generator).and_then(|record| paths.write_success(&record));
    match outcome {
        Ok(()) => info!(out = %out_dir.display(), "results written"),
        Err(e) => {
            let message = format!("Error in legal document analysis: {e:#}");
            warn!(error = %message, "analysis failed");
            paths.write_failure(&message)?;
        }
    }
    Ok(paths)
}
