use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde_json::Value;
use zip::write::SimpleFileOptions;

use privylex_cli::{run, NO_DOCUMENTS_MESSAGE};
use privylex_core::config::Settings;
use privylex_core::{GenerationError, GenerationRequest, Generator};

const CLAUSES: &[&str] = &[
    "This Services Agreement is made between Acme Holdings and Northwind Traders.",
    "The Supplier shall deliver the services described in Schedule A on time.",
    "Fees are invoiced monthly and payable within thirty days of the invoice date.",
    "Late payments accrue interest at one percent per month until paid in full.",
    "Termination: either party may terminate this Agreement on ninety days notice.",
    "Either party may terminate immediately if the other commits a material breach.",
    "Confidential information shall not be disclosed to any third party whatsoever.",
    "The Supplier maintains insurance cover of not less than two million dollars.",
    "Liability of each party is capped at the total fees paid in the prior year.",
    "This Agreement is governed by the laws of England and the courts of London.",
];

fn build_pdf(lines: &[String]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 8.into()]),
        Operation::new("Td", vec![30.into(), 810.into()]),
    ];
    for line in lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(line.as_str())]));
        operations.push(Operation::new("Td", vec![0.into(), (-12).into()]));
    }
    operations.push(Operation::new("ET", vec![]));
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs.iter().map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>")).collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file("word/document.xml", SimpleFileOptions::default()).unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

/// Roughly 3000 characters of contract text, four passes over the clauses.
fn contract_lines() -> Vec<String> {
    (0..4).flat_map(|pass| CLAUSES.iter().map(move |c| format!("{}. {c}", pass + 1))).collect()
}

fn settings_for(input: &Path, output: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.io.input_dir = input.display().to_string();
    settings.io.output_dir = Some(output.display().to_string());
    settings.io.show_progress = false;
    settings
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn recording(seen: Arc<Mutex<Vec<String>>>) -> Box<dyn Generator> {
    Box::new(move |req: &GenerationRequest| -> Result<String, GenerationError> {
        seen.lock().unwrap().push(req.user.clone());
        Ok("Either party may terminate on ninety days notice.\n".to_string())
    })
}

#[test]
fn pdf_with_question_produces_all_artifacts() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let lines = contract_lines();
    assert!(lines.iter().map(|l| l.len() + 1).sum::<usize>() >= 3000);
    fs::write(input.path().join("contract.pdf"), build_pdf(&lines)).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let query = "What is the termination clause?";
    let paths = run(&settings_for(input.path(), output.path()), query, Some(recording(Arc::clone(&seen)))).unwrap();

    let analysis = read_json(&paths.analysis);
    assert_eq!(analysis["query"], query);
    assert_eq!(analysis["processed_files"], serde_json::json!(["contract.pdf"]));
    assert_eq!(analysis["analysis"], "Either party may terminate on ninety days notice.");
    assert!(analysis["timestamp"].as_str().unwrap().ends_with('Z'));

    let computed = read_json(&paths.computed);
    assert!(computed["deterministic-output-path"].as_str().unwrap().ends_with("result.txt"));
    assert!(computed["analysis-output-path"].as_str().unwrap().ends_with("analysis.json"));
    assert!(computed.get("error").is_none());
    assert_eq!(fs::read_to_string(&paths.result).unwrap(), "Either party may terminate on ninety days notice.");

    let prompts = seen.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("--- Content from contract.pdf ---"));
    assert!(prompts[0].contains("Termination"));
}

#[test]
fn docx_and_broken_files_in_subdirectories() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::create_dir_all(input.path().join("matters/2024")).unwrap();
    fs::write(input.path().join("matters/2024/nda.docx"), build_docx(&CLAUSES[4..7])).unwrap();
    fs::write(input.path().join("broken.pdf"), b"not a pdf at all").unwrap();
    fs::write(input.path().join("readme.txt"), b"ignored").unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let paths = run(&settings_for(input.path(), output.path()), "confidential disclosure", Some(recording(Arc::clone(&seen)))).unwrap();

    let analysis = read_json(&paths.analysis);
    assert_eq!(analysis["processed_files"], serde_json::json!(["nda.docx"]));
    assert!(seen.lock().unwrap()[0].contains("Confidential information"));
}

#[test]
fn empty_input_writes_fixed_message_and_marker() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let paths = run(&settings_for(input.path(), output.path()), "anything", None).unwrap();

    assert_eq!(fs::read_to_string(&paths.result).unwrap(), NO_DOCUMENTS_MESSAGE);
    let analysis = read_json(&paths.analysis);
    assert_eq!(analysis["processed_files"], serde_json::json!([]));
    assert!(paths.computed.exists());
}

#[test]
fn missing_credential_gives_mock_with_query_and_length() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(input.path().join("lease.docx"), build_docx(&["The Tenant pays rent monthly."])).unwrap();

    let paths = run(&settings_for(input.path(), output.path()), "Who pays rent?", None).unwrap();
    let result = fs::read_to_string(&paths.result).unwrap();
    // header + paragraph + trailing newline from the combined text
    let expected_len = "\n--- Content from lease.docx ---\nThe Tenant pays rent monthly.\n\n".chars().count();
    assert_eq!(
        result,
        format!("Mock Analysis: This would analyze the document for query: 'Who pays rent?'. Document length: {expected_len} characters.")
    );
}

#[test]
fn invalid_settings_still_write_a_marker() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let mut settings = settings_for(input.path(), output.path());
    settings.retrieval.top_n = 0;

    let paths = run(&settings, "q", None).unwrap();
    let computed = read_json(&paths.computed);
    let error = computed["error"].as_str().unwrap();
    assert!(error.starts_with("Error in legal document analysis: "), "{error}");
    assert_eq!(fs::read_to_string(&paths.result).unwrap(), error);
    assert!(!paths.analysis.exists());
}

#[test]
fn missing_output_dir_is_an_error() {
    let input = tempfile::tempdir().unwrap();
    let mut settings = Settings::default();
    settings.io.input_dir = input.path().display().to_string();
    assert!(run(&settings, "q", None).is_err());
}
