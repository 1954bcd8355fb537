use std::collections::HashMap;

use crate::model::{QuestionDefinition, ResponseRecord};

/// A mapping from question id to the labels selected for that question.
///
/// A record satisfies the set when, for every entry with a non-empty label
/// list, at least one of the record's resolved labels for that question is
/// selected. An empty label list is no constraint (callers should drop such
/// entries once the last value is deselected; they are tolerated here).
pub type FilterConstraintSet = HashMap<String, Vec<String>>;

/// Returns the subset of records satisfying all constraints. Pure: the
/// inputs are untouched and the result borrows from `records`.
pub fn filter_records<'a>(
    questions: &[QuestionDefinition],
    records: &'a [ResponseRecord],
    constraints: &FilterConstraintSet,
) -> Vec<&'a ResponseRecord> {
    let by_id: HashMap<&str, &QuestionDefinition> =
        questions.iter().map(|q| (q.id.as_str(), q)).collect();
    records
        .iter()
        .filter(|rec| satisfies_all(&by_id, rec, constraints))
        .collect()
}

fn satisfies_all(
    by_id: &HashMap<&str, &QuestionDefinition>,
    rec: &ResponseRecord,
    constraints: &FilterConstraintSet,
) -> bool {
    for (question_id, selected) in constraints {
        if selected.is_empty() {
            continue;
        }
        // An id that is not in the schema falls back to a scalar match on
        // the record field of that name, so a typo filters everything out
        // loudly instead of being ignored.
        let multi = by_id
            .get(question_id.as_str())
            .map_or(false, |q| q.is_multi_shaped());
        let hit = if multi {
            multi_question_matches(rec, question_id, selected)
        } else {
            rec.get(question_id)
                .map_or(false, |v| selected.iter().any(|s| s == v))
        };
        if !hit {
            return false;
        }
    }
    true
}

/// Gathers the canonical field and every numeric-suffixed synthetic
/// sub-field of the question, splits each on ";", and looks for one
/// selected token.
fn multi_question_matches(rec: &ResponseRecord, question_id: &str, selected: &[String]) -> bool {
    let prefix = format!("{}_", question_id);
    rec.iter()
        .filter(|(key, _)| key.as_str() == question_id || is_sub_field(key, &prefix))
        .any(|(_, value)| {
            value
                .split(';')
                .map(str::trim)
                .any(|token| !token.is_empty() && selected.iter().any(|s| s == token))
        })
}

fn is_sub_field(key: &str, prefix: &str) -> bool {
    // The numeric-suffix check keeps sibling ids like "Q1_TEXT" (or another
    // question named "Q1_extra") from being swept into Q1's fields.
    key.strip_prefix(prefix)
        .map_or(false, |suffix| {
            !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit())
        })
}
