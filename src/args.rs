use clap::Parser;

/// Normalizes vendor-variant survey exports into a canonical dataset and
/// summarizes it.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The schema export describing the survey questions. Both
    /// supported vendors' column layouts are accepted.
    #[clap(short, long, value_parser)]
    pub schema: String,

    /// (file path) The raw response export for the same survey.
    #[clap(short, long, value_parser)]
    pub responses: String,

    /// (file path, optional) A JSON filter file whose "selections" object
    /// maps question ids to selected labels, e.g.
    /// {"selections": {"Q1": ["Green", "Blue"]}}. Records must match every
    /// entry; within an entry any selected label counts.
    #[clap(short, long, value_parser)]
    pub filter: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the JSON summary of the
    /// normalized dataset. Defaults to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, survnorm
    /// will check that the computed summary matches the reference.
    #[clap(long, value_parser)]
    pub reference: Option<String>,

    /// If passed as an argument, questions whose prompt looks like it
    /// collects personal information (name, email, phone, contact, address)
    /// are removed from the summary.
    #[clap(long, takes_value = false)]
    pub redact_pii: bool,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
