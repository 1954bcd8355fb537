mod decode;
mod detect;
mod filter;
mod model;
mod stats;

pub mod quick_start;

use log::{debug, info};

pub use crate::detect::{detect_one_based_null, MAX_DETECTION_SAMPLES};
pub use crate::filter::{filter_records, FilterConstraintSet};
pub use crate::model::*;
pub use crate::stats::{average_duration_seconds, completion_rate, numeric_mean, question_tally};

/// Maps a question id to the response column holding its values.
///
/// Exact match first. Vendors that append a sub-label to the header (e.g.
/// "Q7 - Other" or "Q7.1") are caught by the prefix rule: the first header,
/// in export order, equal to the id followed by a space or a period.
pub fn resolve_column(question_id: &str, headers: &[String]) -> Option<String> {
    if headers.iter().any(|h| h == question_id) {
        return Some(question_id.to_string());
    }
    headers
        .iter()
        .find(|h| {
            h.strip_prefix(question_id)
                .map_or(false, |rest| rest.starts_with(' ') || rest.starts_with('.'))
        })
        .cloned()
}

struct QuestionPlan<'a> {
    question: &'a QuestionDefinition,
    column: String,
    one_based_null: bool,
}

/// Rewrites every response record into canonical form.
///
/// The run is in two sweeps. The first binds each question to a response
/// column and fixes its index-mode verdict from a bounded sample; both are
/// held immutable for the rest of the run. The second copies each record
/// and rewrites the bound fields. Original metadata fields are never
/// removed or renamed; only question-keyed fields are added or overwritten.
///
/// Questions with no resolvable column are skipped entirely: their fields
/// are simply never populated. Nothing in this pass can fail; undecodable
/// values degrade per-field.
pub fn normalize_dataset(
    questions: &[QuestionDefinition],
    responses: &ResponseSet,
) -> NormalizedDataset {
    info!(
        "normalize_dataset: {} questions over {} records",
        questions.len(),
        responses.records.len()
    );

    let mut plans: Vec<QuestionPlan> = Vec::new();
    for q in questions {
        let column = match resolve_column(&q.id, &responses.headers) {
            Some(c) => c,
            None => {
                debug!("normalize_dataset: no response column for question {}", q.id);
                continue;
            }
        };
        let options = q.options();
        let one_based_null = !options.is_empty()
            && detect_one_based_null(
                options.len(),
                responses
                    .records
                    .iter()
                    .filter_map(|r| r.get(&column))
                    .map(String::as_str),
            );
        if one_based_null {
            debug!(
                "normalize_dataset: question {} uses 1-based codes with 0 as null",
                q.id
            );
        }
        plans.push(QuestionPlan {
            question: q,
            column,
            one_based_null,
        });
    }

    let records: Vec<ResponseRecord> = responses
        .records
        .iter()
        .map(|rec| {
            let mut out = rec.clone();
            for plan in &plans {
                normalize_question(&mut out, plan);
            }
            out
        })
        .collect();

    NormalizedDataset {
        questions: questions.to_vec(),
        bindings: plans
            .iter()
            .map(|p| QuestionBinding {
                question_id: p.question.id.clone(),
                column: p.column.clone(),
                one_based_null: p.one_based_null,
            })
            .collect(),
        records,
    }
}

fn normalize_question(rec: &mut ResponseRecord, plan: &QuestionPlan) {
    let q = plan.question;
    let raw = rec
        .get(&plan.column)
        .map(|v| v.trim().to_string())
        .unwrap_or_default();

    if plan.column != q.id {
        // Mirror the raw value under the canonical id, so consumers find a
        // value there even when decoding recognizes no pattern below.
        rec.insert(q.id.clone(), raw.clone());
    }
    if raw.is_empty() || decode::is_sentinel(&raw) {
        rec.insert(q.id.clone(), String::new());
        return;
    }
    if plan.one_based_null && raw == "0" {
        // In this mode a bare 0 is "no answer", never option index 0.
        rec.insert(q.id.clone(), String::new());
        return;
    }

    let kind = q.decode_kind();
    if kind == QuestionKind::Matrix {
        if let Some(pairs) = decode::parse_key_value_pairs(&raw) {
            decode::decode_key_value_matrix(rec, &q.id, &pairs, &q.columns);
            return;
        }
    }
    let tokens = match decode::numeric_token_list(&raw) {
        Some(t) => t,
        // Not a numeric code list: the raw (or mirrored) value stands.
        None => return,
    };
    match kind {
        QuestionKind::Ranking => {
            decode::decode_ranking(rec, &q.id, &tokens, &q.choices, plan.one_based_null)
        }
        QuestionKind::Matrix => {
            decode::decode_matrix(rec, &q.id, &tokens, &q.columns, plan.one_based_null)
        }
        QuestionKind::Multi => {
            decode::decode_multi(rec, &q.id, &tokens, &q.choices, plan.one_based_null)
        }
        QuestionKind::Single => {
            decode::decode_single(rec, &q.id, &tokens, &q.choices, plan.one_based_null)
        }
        QuestionKind::Verbatim | QuestionKind::Info => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, kind: QuestionKind, choices: &[&str]) -> QuestionDefinition {
        QuestionDefinition {
            id: id.to_string(),
            text: format!("Question {}", id),
            kind,
            choices: choices.iter().map(|s| s.to_string()).collect(),
            rows: vec![],
            columns: vec![],
            block: String::new(),
        }
    }

    fn responses(headers: &[&str], rows: &[&[&str]]) -> ResponseSet {
        let headers: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
        let records = rows
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .cloned()
                    .zip(row.iter().map(|v| v.to_string()))
                    .collect()
            })
            .collect();
        ResponseSet { headers, records }
    }

    #[test]
    fn resolve_prefers_exact_over_prefixed_headers() {
        let headers: Vec<String> = vec!["Q7 - Other".to_string(), "Q7".to_string()];
        assert_eq!(resolve_column("Q7", &headers), Some("Q7".to_string()));
        let headers: Vec<String> = vec!["Q70".to_string(), "Q7.1".to_string()];
        assert_eq!(resolve_column("Q7", &headers), Some("Q7.1".to_string()));
        assert_eq!(resolve_column("Q9", &headers), None);
    }

    #[test]
    fn single_choice_standard_round_trip() {
        let questions = vec![question("Q1", QuestionKind::Single, &["Red", "Green", "Blue"])];
        let rs = responses(&["StartDate", "Q1"], &[&["2023-01-01 10:00", "2"]]);
        let ds = normalize_dataset(&questions, &rs);
        assert_eq!(ds.records[0].get("Q1").map(String::as_str), Some("Green"));
    }

    #[test]
    fn eleven_point_scale_detection_and_decoding() {
        let _ = env_logger::builder().is_test(true).try_init();
        let scale: Vec<String> = (0..=10).map(|n| n.to_string()).collect();
        let scale_refs: Vec<&str> = scale.iter().map(String::as_str).collect();
        let questions = vec![question("Q2", QuestionKind::Single, &scale_refs)];
        let rs = responses(
            &["StartDate", "Q2"],
            &[
                &["t1", "11"],
                &["t2", "0"],
                &["t3", "1"],
            ],
        );
        let ds = normalize_dataset(&questions, &rs);
        assert!(ds.binding("Q2").unwrap().one_based_null);
        assert_eq!(ds.records[0].get("Q2").map(String::as_str), Some("10"));
        assert_eq!(ds.records[1].get("Q2").map(String::as_str), Some(""));
        assert_eq!(ds.records[2].get("Q2").map(String::as_str), Some("0"));
    }

    #[test]
    fn sentinels_blank_the_canonical_field() {
        let questions = vec![question("Q1", QuestionKind::Single, &["A", "B"])];
        let rs = responses(&["StartDate", "Q1"], &[&["t1", ".Timeout."], &["t2", ".empty."]]);
        let ds = normalize_dataset(&questions, &rs);
        assert_eq!(ds.records[0].get("Q1").map(String::as_str), Some(""));
        assert_eq!(ds.records[1].get("Q1").map(String::as_str), Some(""));
    }

    #[test]
    fn fuzzy_column_mirrors_raw_value() {
        let questions = vec![question("Q4", QuestionKind::Verbatim, &[])];
        let rs = responses(&["StartDate", "Q4 - Comments"], &[&["t1", "  free text  "]]);
        let ds = normalize_dataset(&questions, &rs);
        assert_eq!(ds.records[0].get("Q4").map(String::as_str), Some("free text"));
        // The original column survives untouched.
        assert_eq!(
            ds.records[0].get("Q4 - Comments").map(String::as_str),
            Some("  free text  ")
        );
    }

    #[test]
    fn unresolvable_questions_are_skipped() {
        let questions = vec![question("Q9", QuestionKind::Single, &["A"])];
        let rs = responses(&["StartDate", "Q1"], &[&["t1", "1"]]);
        let ds = normalize_dataset(&questions, &rs);
        assert!(ds.binding("Q9").is_none());
        assert!(ds.records[0].get("Q9").is_none());
    }

    #[test]
    fn matrix_key_value_values_decode_per_row() {
        let mut q = question("Q3", QuestionKind::Matrix, &[]);
        q.rows = vec!["Service".to_string(), "Price".to_string()];
        q.columns = vec!["Low".to_string(), "High".to_string()];
        let rs = responses(&["StartDate", "Q3"], &[&["t1", "1:2,2:1"]]);
        let ds = normalize_dataset(&vec![q], &rs);
        assert_eq!(ds.records[0].get("Q3_1").map(String::as_str), Some("High"));
        assert_eq!(ds.records[0].get("Q3_2").map(String::as_str), Some("Low"));
    }

    #[test]
    fn normalization_is_idempotent_on_canonical_fields() {
        let questions = vec![
            question("Q1", QuestionKind::Single, &["Red", "Green", "Blue"]),
            question("Q2", QuestionKind::Multi, &["A", "B", "C"]),
        ];
        let rs = responses(
            &["StartDate", "Q1", "Q2"],
            &[&["t1", "2", "1;3"], &["t2", "3", "2"]],
        );
        let first = normalize_dataset(&questions, &rs);

        // Feed the normalized records back in, synthetic fields included.
        let mut headers = rs.headers.clone();
        for key in ["Q2_1", "Q2_2"] {
            headers.push(key.to_string());
        }
        let again = normalize_dataset(
            &questions,
            &ResponseSet {
                headers,
                records: first.records.clone(),
            },
        );
        for (a, b) in first.records.iter().zip(again.records.iter()) {
            assert_eq!(a.get("Q1"), b.get("Q1"));
            assert_eq!(a.get("Q2"), b.get("Q2"));
        }
    }

    #[test]
    fn ranking_prompt_overrides_vendor_kind() {
        let mut q = question("Q6", QuestionKind::Multi, &["Apples", "Pears"]);
        q.text = "Rank the fruit".to_string();
        let rs = responses(&["StartDate", "Q6"], &[&["t1", "2,1"]]);
        let ds = normalize_dataset(&vec![q], &rs);
        assert_eq!(
            ds.records[0].get("Q6").map(String::as_str),
            Some("Apples (#2); Pears (#1)")
        );
    }
}
