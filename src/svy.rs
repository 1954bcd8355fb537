use log::{debug, info, warn};

use survey_dataset::*;
use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod io_common;
pub mod io_responses;
pub mod io_schema;

#[derive(Debug, Snafu)]
pub enum SvyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Malformed CSV structure"))]
    CsvStructure { source: csv::Error },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("The response export carries none of the known timestamp columns"))]
    MissingTimestampColumn {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SvyResult<T> = Result<T, SvyError>;

/// The filter file: question ids mapped to the labels selected for them.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub selections: HashMap<String, Vec<String>>,
}

/// Everything one dataset run needs. Endpoints and paths are always passed
/// in explicitly; nothing is read from ambient state.
#[derive(Debug, Clone, Default)]
pub struct RunSettings {
    pub schema_path: String,
    pub responses_path: String,
    /// JSON object mapping question ids to selected labels.
    pub filter_path: Option<String>,
    /// Output location for the JSON summary. "stdout" or absent prints.
    pub out_path: Option<String>,
    /// Reference summary to compare the computed one against.
    pub reference_path: Option<String>,
    pub redact_pii: bool,
}

/// Loads, normalizes, filters and summarizes one schema + responses pair.
pub fn run_dataset(settings: &RunSettings) -> SvyResult<()> {
    let schema_text = load_text(&settings.schema_path)?;
    let responses_text = load_text(&settings.responses_path)?;

    let questions = io_schema::read_schema(&schema_text)?;
    let responses = io_responses::read_responses(&responses_text)?;
    info!(
        "run_dataset: {} questions, {} responses",
        questions.len(),
        responses.records.len()
    );

    let dataset = normalize_dataset(&questions, &responses);

    let constraints = match &settings.filter_path {
        Some(p) => read_constraints(p)?,
        None => FilterConstraintSet::new(),
    };
    let kept = filter_records(&dataset.questions, &dataset.records, &constraints);
    info!(
        "run_dataset: {} of {} records satisfy the active filters",
        kept.len(),
        dataset.records.len()
    );

    let summary = build_summary_js(&dataset, &kept, settings.redact_pii);
    let pretty = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;
    match settings.out_path.as_deref() {
        None | Some("stdout") => println!("{}", pretty),
        Some(path) => fs::write(path, &pretty).context(WritingFileSnafu { path })?,
    }

    // The reference summary, if provided for comparison.
    if let Some(reference_path) = &settings.reference_path {
        let reference = read_summary(reference_path)?;
        let pretty_reference =
            serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
        if pretty_reference != pretty {
            warn!("Found differences with the reference summary");
            print_diff(pretty_reference.as_str(), pretty.as_ref(), "\n");
            whatever!("Difference detected between computed summary and reference summary");
        }
    }

    Ok(())
}

fn load_text(path: &str) -> SvyResult<String> {
    debug!("load_text: {}", path);
    fs::read_to_string(path).context(OpeningFileSnafu { path })
}

pub fn read_summary(path: &str) -> SvyResult<JSValue> {
    let contents = load_text(path)?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}

/// Reads a filter file. Entries whose label list is empty carry no
/// constraint and are dropped on the way in.
pub fn read_constraints(path: &str) -> SvyResult<FilterConstraintSet> {
    let contents = load_text(path)?;
    let config: FilterConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config
        .selections
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .collect())
}

/// Display policy for the scrubbed table view: a question whose prompt
/// mentions any of these collects personal information.
const PII_KEYWORDS: [&str; 5] = ["name", "email", "phone", "contact", "address"];

pub fn is_pii_question(text: &str) -> bool {
    let t = text.to_lowercase();
    PII_KEYWORDS.iter().any(|k| t.contains(k))
}

fn build_summary_js(
    dataset: &NormalizedDataset,
    kept: &[&ResponseRecord],
    redact_pii: bool,
) -> JSValue {
    let mut questions_js: Vec<JSValue> = Vec::new();
    for q in &dataset.questions {
        if redact_pii && is_pii_question(&q.text) {
            debug!("build_summary_js: redacting question {}", q.id);
            continue;
        }
        questions_js.push(question_to_js(q, dataset, kept));
    }

    let mut dataset_js: JSMap<String, JSValue> = JSMap::new();
    dataset_js.insert("questions".to_string(), json!(dataset.questions.len()));
    dataset_js.insert("responses".to_string(), json!(dataset.records.len()));
    dataset_js.insert("filtered".to_string(), json!(kept.len()));
    if let Some(d) = average_duration_seconds(&dataset.records) {
        dataset_js.insert("averageDurationSeconds".to_string(), json!(d));
    }
    if let Some(r) = completion_rate(&dataset.records) {
        dataset_js.insert("completionRate".to_string(), json!(r));
    }

    json!({ "dataset": dataset_js, "questions": questions_js })
}

fn question_to_js(
    q: &QuestionDefinition,
    dataset: &NormalizedDataset,
    kept: &[&ResponseRecord],
) -> JSValue {
    let total_tally = question_tally(q, &dataset.records);
    let kept_tally: HashMap<String, u64> = question_tally(q, kept.iter().copied())
        .into_iter()
        .collect();

    let mut tally_js: Vec<JSValue> = Vec::new();
    for (label, total) in total_tally {
        let filtered = kept_tally.get(&label).copied().unwrap_or(0);
        tally_js.push(json!({
            "label": label,
            "total": total,
            "filtered": filtered
        }));
    }

    let mut js: JSMap<String, JSValue> = JSMap::new();
    js.insert("id".to_string(), json!(q.id));
    js.insert("text".to_string(), json!(q.text));
    js.insert("type".to_string(), json!(q.decode_kind().as_str()));
    if !q.block.is_empty() {
        js.insert("block".to_string(), json!(q.block));
    }
    if let Some(binding) = dataset.binding(&q.id) {
        js.insert("column".to_string(), json!(binding.column));
        js.insert("oneBasedNull".to_string(), json!(binding.one_based_null));
    }
    if !tally_js.is_empty() {
        js.insert("tally".to_string(), JSValue::Array(tally_js));
    }
    if let Some(mean) = numeric_mean(&q.id, kept.iter().copied()) {
        js.insert("mean".to_string(), json!(mean));
    }
    JSValue::Object(js)
}
