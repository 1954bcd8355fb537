// Aggregation helpers for the downstream rendering layer: per-question
// tallies, numeric means and session-level metrics. They all consume the
// normalized record shape and never look at raw vendor encodings.

use std::collections::HashMap;

use crate::decode::strip_currency;
use crate::model::{QuestionDefinition, ResponseRecord};

/// Metadata fields that may carry the session duration, in seconds.
const DURATION_FIELDS: [&str; 2] = ["Duration (in seconds)", "Duration"];

/// Metadata fields that may carry the finish flag.
const FINISH_FIELDS: [&str; 2] = ["Finished", "Finish"];

/// Counts, per canonical label, how many records carry that label for the
/// question. Multi-shaped questions contribute every semicolon-split token
/// of their canonical field.
///
/// The result lists the question's options first, in option order and
/// including zero counts, then any stray labels in sorted order. The stable
/// ordering keeps summaries diffable.
pub fn question_tally<'a, I>(question: &QuestionDefinition, records: I) -> Vec<(String, u64)>
where
    I: IntoIterator<Item = &'a ResponseRecord>,
{
    let mut counts: HashMap<String, u64> = HashMap::new();
    let multi = question.is_multi_shaped();
    for rec in records {
        let Some(value) = rec.get(&question.id) else {
            continue;
        };
        if multi {
            for token in value.split(';') {
                let token = token.trim();
                if !token.is_empty() {
                    *counts.entry(token.to_string()).or_insert(0) += 1;
                }
            }
        } else if !value.is_empty() {
            *counts.entry(value.clone()).or_insert(0) += 1;
        }
    }

    let mut out: Vec<(String, u64)> = Vec::new();
    for opt in question.options() {
        let count = counts.remove(opt).unwrap_or(0);
        out.push((opt.clone(), count));
    }
    let mut extras: Vec<(String, u64)> = counts.into_iter().collect();
    extras.sort();
    out.extend(extras);
    out
}

/// Mean of the canonical values that parse as numbers, after currency
/// stripping. None when no record carries a numeric value.
pub fn numeric_mean<'a, I>(question_id: &str, records: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a ResponseRecord>,
{
    let mut sum = 0.0;
    let mut n = 0u64;
    for rec in records {
        let Some(value) = rec.get(question_id) else {
            continue;
        };
        if let Ok(x) = strip_currency(value).parse::<f64>() {
            sum += x;
            n += 1;
        }
    }
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

/// Average session duration in seconds, read from the untouched metadata
/// fields. None when no record carries a parseable duration.
pub fn average_duration_seconds<'a, I>(records: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a ResponseRecord>,
{
    let mut sum = 0.0;
    let mut n = 0u64;
    for rec in records {
        let value = DURATION_FIELDS.iter().find_map(|f| rec.get(*f));
        if let Some(Ok(x)) = value.map(|v| v.trim().parse::<f64>()) {
            sum += x;
            n += 1;
        }
    }
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

/// Share of records whose finish flag is set. None when the export carries
/// no finish flag at all.
pub fn completion_rate<'a, I>(records: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a ResponseRecord>,
{
    let mut finished = 0u64;
    let mut total = 0u64;
    for rec in records {
        let Some(value) = FINISH_FIELDS.iter().find_map(|f| rec.get(*f)) else {
            continue;
        };
        total += 1;
        let v = value.trim();
        if v == "1" || v.eq_ignore_ascii_case("true") {
            finished += 1;
        }
    }
    if total == 0 {
        None
    } else {
        Some(finished as f64 / total as f64)
    }
}
