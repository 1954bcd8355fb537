// ********* Input data structures ***********

use std::collections::HashMap;

/// The question types reported by the supported export vendors.
///
/// `Ranking` is almost never reported directly: it is recovered at decoding
/// time from a non-Single question whose prompt mentions ranking
/// (see [`QuestionDefinition::decode_kind`]).
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum QuestionKind {
    /// A single-select question. At most one choice is recorded.
    Single,
    /// A multi-select question. Any subset of the choices may be recorded.
    Multi,
    /// A grid question: every row item is rated against the same column scale.
    Matrix,
    /// A ranking question: positions map to choices, values map to ranks.
    Ranking,
    /// Free-text answers. No decoding is attempted.
    Verbatim,
    /// An informational block with no recordable answer.
    Info,
}

impl QuestionKind {
    /// Parses a vendor-reported type string.
    ///
    /// The two vendors do not agree on spelling, so this accepts the common
    /// variants. Unknown or empty strings fall back to `Verbatim`, which is
    /// the safe default: verbatim values are carried through untouched.
    pub fn from_vendor(s: &str) -> QuestionKind {
        match s.trim().to_lowercase().as_str() {
            "single" | "singleselect" | "single-select" => QuestionKind::Single,
            "multi" | "multiselect" | "multi-select" => QuestionKind::Multi,
            "matrix" | "likert" | "grid" => QuestionKind::Matrix,
            "ranking" | "rank" | "rankorder" => QuestionKind::Ranking,
            "info" | "descriptive" | "presentation" => QuestionKind::Info,
            _ => QuestionKind::Verbatim,
        }
    }

    /// The vendor-facing name, used in summaries and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Single => "Single",
            QuestionKind::Multi => "Multi",
            QuestionKind::Matrix => "Matrix",
            QuestionKind::Ranking => "Ranking",
            QuestionKind::Verbatim => "Verbatim",
            QuestionKind::Info => "Info",
        }
    }
}

/// One question of the survey, as described by the schema export.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuestionDefinition {
    /// Canonical identifier (e.g. "Q7"). Unique within a schema and stable
    /// across exports of the same survey.
    pub id: String,
    /// Human-readable prompt. HTML-stripped and whitespace-collapsed.
    pub text: String,
    pub kind: QuestionKind,
    /// Answerable options for Single/Multi questions. The order is the index
    /// basis for decoding raw numeric codes.
    pub choices: Vec<String>,
    /// Matrix only: the sub-items being rated.
    pub rows: Vec<String>,
    /// Matrix only: the scale applied to each row.
    pub columns: Vec<String>,
    /// Grouping label. Cosmetic.
    pub block: String,
}

impl QuestionDefinition {
    /// The kind used for decoding raw values.
    ///
    /// Vendors report ranking questions under whatever grid or multi-select
    /// widget was used to collect them; the only reliable signal is the
    /// prompt itself.
    pub fn decode_kind(&self) -> QuestionKind {
        if self.kind != QuestionKind::Single && self.text.to_lowercase().contains("rank") {
            QuestionKind::Ranking
        } else {
            self.kind
        }
    }

    /// The option list that raw codes index into: choices for selection and
    /// ranking questions, the column scale for matrix questions.
    pub fn options(&self) -> &[String] {
        match self.decode_kind() {
            QuestionKind::Single | QuestionKind::Multi | QuestionKind::Ranking => &self.choices,
            QuestionKind::Matrix => &self.columns,
            QuestionKind::Verbatim | QuestionKind::Info => &[],
        }
    }

    /// Whether the question decodes into several values per record, and thus
    /// carries synthetic sub-fields next to its canonical field.
    pub fn is_multi_shaped(&self) -> bool {
        matches!(
            self.decode_kind(),
            QuestionKind::Multi | QuestionKind::Matrix | QuestionKind::Ranking
        )
    }
}

/// One respondent submission: a mapping from column header to raw value.
///
/// After normalization the record additionally carries, for every resolvable
/// question, a canonical field keyed by the question id, plus synthetic
/// sub-fields keyed `"{id}_{n}"` for multi-valued questions.
pub type ResponseRecord = HashMap<String, String>;

/// The parsed response export: the headers in export order, and the records.
///
/// The header order matters to column resolution (the first matching variant
/// header wins), so it is kept separately from the unordered records.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ResponseSet {
    pub headers: Vec<String>,
    pub records: Vec<ResponseRecord>,
}

// ******** Output data structures *********

/// How one question was bound to the response export.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuestionBinding {
    pub question_id: String,
    /// The response column the question resolved to. May differ from the id
    /// when the vendor appended a sub-label to the header.
    pub column: String,
    /// Detection verdict: raw numeric codes are 1-based and a bare "0"
    /// denotes no answer.
    pub one_based_null: bool,
}

/// The result of a normalization run. Fresh on every run; the inputs are
/// never mutated.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NormalizedDataset {
    pub questions: Vec<QuestionDefinition>,
    /// One binding per question that resolved to a response column, in
    /// question order.
    pub bindings: Vec<QuestionBinding>,
    pub records: Vec<ResponseRecord>,
}

impl NormalizedDataset {
    pub fn binding(&self, question_id: &str) -> Option<&QuestionBinding> {
        self.bindings.iter().find(|b| b.question_id == question_id)
    }
}
