use std::path::PathBuf;

pub enum Command {
    /// Print the query specification for `key=value` parameters.
    Translate { params: Vec<String> },
    /// List questions from NDJSON files with `answersCount` attached.
    List { questions: PathBuf, answers: Option<PathBuf>, params: Vec<String> },
    /// Answers of one question, oldest first.
    Answers { answers: PathBuf, question_id: String },
}
