/*!

# Quick start

This example walks through normalizing a small export by hand. The same two
artifacts come out of every supported vendor: a schema export describing the
questions, and a raw response export.

Suppose the schema describes one single-select question:

```text
Q#,QText,Type,Choices
Q1,Favorite color,Single,Red;Green;Blue
```

and the response export carries two submissions plus the metadata row that
vendors like to inject below the header:

```text
StartDate,Q1
Start Date,
2023-04-02 09:11,2
2023-04-02 09:14,3
```

After parsing (the `survnorm` binary does this with its CSV readers; any
caller can construct the same structures directly), normalization resolves
columns, sniffs the index convention and rewrites the records:

```
use std::collections::HashMap;
use survey_dataset::*;

let questions = vec![QuestionDefinition {
    id: "Q1".to_string(),
    text: "Favorite color".to_string(),
    kind: QuestionKind::Single,
    choices: vec!["Red".to_string(), "Green".to_string(), "Blue".to_string()],
    rows: vec![],
    columns: vec![],
    block: String::new(),
}];

let mut rec1: HashMap<String, String> = HashMap::new();
rec1.insert("StartDate".to_string(), "2023-04-02 09:11".to_string());
rec1.insert("Q1".to_string(), "2".to_string());
let mut rec2: HashMap<String, String> = HashMap::new();
rec2.insert("StartDate".to_string(), "2023-04-02 09:14".to_string());
rec2.insert("Q1".to_string(), "3".to_string());

let responses = ResponseSet {
    headers: vec!["StartDate".to_string(), "Q1".to_string()],
    records: vec![rec1, rec2],
};

let dataset = normalize_dataset(&questions, &responses);
assert_eq!(dataset.records[0].get("Q1").map(String::as_str), Some("Green"));

// Filtering is a pure function of the normalized shape.
let mut constraints = FilterConstraintSet::new();
constraints.insert("Q1".to_string(), vec!["Green".to_string()]);
let kept = filter_records(&dataset.questions, &dataset.records, &constraints);
assert_eq!(kept.len(), 1);
```

Multi-select, matrix and ranking questions additionally produce synthetic
sub-fields keyed `"{id}_{n}"` next to the canonical field; see the crate
documentation for the decoding rules.

*/
