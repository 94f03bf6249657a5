use forum_query::ForumConfig;
use forum_query::cli::{Command, OutputMode, run};
use std::fs;
use std::io::Write;
use tempfile::tempdir;

const Q1: &str = "c1000000-0000-4000-8000-000000000001";
const Q2: &str = "c1000000-0000-4000-8000-000000000002";

fn lines(out: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8(out.to_vec())
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[tokio::test]
async fn translate_prints_query_spec() {
    let mut out = Vec::new();
    run(
        Command::Translate { params: vec!["filter_tags_in=react_hooks".into(), "sort_score=-1".into()] },
        &ForumConfig::default(),
        OutputMode::Plain,
        &mut out,
    )
    .await
    .unwrap();
    let v = &lines(&out)[0];
    assert_eq!(v["filter"], serde_json::json!({"tags": {"$in": ["react", "hooks"]}}));
    assert_eq!(v["sort"], serde_json::json!({"score": -1, "_id": 1}));
    assert_eq!(v["limit"], 20);
}

#[tokio::test]
async fn list_reads_ndjson_and_attaches_counts() {
    let dir = tempdir().unwrap();
    let questions = dir.path().join("questions.jsonl");
    let answers = dir.path().join("answers.jsonl");
    {
        let mut f = fs::File::create(&questions).unwrap();
        writeln!(f, "{{\"_id\":\"{Q1}\",\"title\":\"Rust ownership\",\"score\":1}}").unwrap();
        writeln!(f, "{{\"_id\":\"{Q2}\",\"title\":\"Rust macros\",\"score\":7}}").unwrap();
        let mut f = fs::File::create(&answers).unwrap();
        writeln!(f, "{{\"questionId\":\"{Q1}\"}}\n{{\"questionId\":\"{Q1}\"}}").unwrap();
    }
    let mut out = Vec::new();
    run(
        Command::List {
            questions,
            answers: Some(answers),
            params: vec!["filter_title=rust".into(), "sort_score=-1".into()],
        },
        &ForumConfig::default(),
        OutputMode::Plain,
        &mut out,
    )
    .await
    .unwrap();
    let docs = lines(&out);
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["_id"], Q2);
    assert_eq!(docs[0]["answersCount"], 0);
    assert_eq!(docs[1]["_id"], Q1);
    assert_eq!(docs[1]["answersCount"], 2);
}

#[tokio::test]
async fn json_mode_prints_one_array() {
    let dir = tempdir().unwrap();
    let questions = dir.path().join("q.jsonl");
    fs::write(&questions, format!("{{\"_id\":\"{Q1}\",\"title\":\"t\"}}\n")).unwrap();
    let mut out = Vec::new();
    run(
        Command::List { questions, answers: None, params: vec![] },
        &ForumConfig::default(),
        OutputMode::Json,
        &mut out,
    )
    .await
    .unwrap();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v.as_array().unwrap().len(), 1);
    assert_eq!(v[0]["answersCount"], 0);
}

#[tokio::test]
async fn answers_command_orders_by_creation() {
    let dir = tempdir().unwrap();
    let answers = dir.path().join("answers.jsonl");
    let row = |id: &str, ts: &str| {
        format!(
            "{{\"_id\":\"{id}\",\"questionId\":\"{Q1}\",\"userId\":\"u\",\"username\":\"ana\",\"content\":\"long enough\",\"createdAt\":\"{ts}\",\"updatedAt\":\"{ts}\"}}\n"
        )
    };
    let body = row("late", "2024-02-01T00:00:00.000Z") + &row("early", "2024-01-01T00:00:00.000Z");
    fs::write(&answers, body).unwrap();
    let mut out = Vec::new();
    run(
        Command::Answers { answers, question_id: Q1.into() },
        &ForumConfig::default(),
        OutputMode::Plain,
        &mut out,
    )
    .await
    .unwrap();
    let got: Vec<String> = lines(&out).iter().map(|v| v["_id"].as_str().unwrap().to_string()).collect();
    assert_eq!(got, vec!["early", "late"]);
}

#[tokio::test]
async fn invalid_parameter_is_reported() {
    let mut out = Vec::new();
    let err = run(
        Command::Translate { params: vec!["limit=0".into()] },
        &ForumConfig::default(),
        OutputMode::Plain,
        &mut out,
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), 400);
    assert!(out.is_empty());
}
