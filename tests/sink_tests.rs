//! Output persistence tests
//!
//! Runs the executor against output files and directories in every format
//! and checks what ends up on disk.

mod common;

use std::fs;
use std::sync::Arc;

use common::*;
use kubekraken::executor::{
    CommandOutput, ExecutorConfig, OutputDestination, OutputFormat, PrintPolicy, RunSummary,
};
use kubekraken::Error;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn mixed_runner() -> Arc<MockRunner> {
    Arc::new(
        MockRunner::new()
            .respond("ok", CommandOutput::success("NAME   READY\npod-a  1/1\n", ""))
            .respond("warn", CommandOutput::success("pod-b\n", "deprecated flag\n"))
            .respond(
                "fail",
                CommandOutput::failure("exit status 1", "partial\n", "connection refused\n"),
            ),
    )
}

fn config(destination: OutputDestination, format: OutputFormat) -> ExecutorConfig {
    ExecutorConfig {
        workers: 2,
        destination,
        format,
        ..ExecutorConfig::default()
    }
}

#[tokio::test]
async fn test_directory_json_round_trip() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("results");
    let console = SharedBuffer::new();

    executor(
        config(OutputDestination::Directory(dir.clone()), OutputFormat::Json),
        mixed_runner(),
        &console,
    )
    .run(targets(&["ok", "warn", "fail"]))
    .await
    .unwrap();

    let read = |name: String| -> Option<String> {
        let path = dir.join(name);
        path.exists()
            .then(|| serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap())
    };

    assert_eq!(
        read(format!("{}.stdout.json", id("ok"))).as_deref(),
        Some("NAME   READY\npod-a  1/1\n")
    );
    assert_eq!(read(format!("{}.stderr.json", id("ok"))), None);
    assert_eq!(read(format!("{}.err.json", id("ok"))), None);

    assert_eq!(
        read(format!("{}.stderr.json", id("warn"))).as_deref(),
        Some("deprecated flag\n")
    );

    assert_eq!(
        read(format!("{}.err.json", id("fail"))).as_deref(),
        Some("exit status 1")
    );
    assert_eq!(
        read(format!("{}.stdout.json", id("fail"))).as_deref(),
        Some("partial\n")
    );
    assert_eq!(
        read(format!("{}.stderr.json", id("fail"))).as_deref(),
        Some("connection refused\n")
    );

    let summary: RunSummary =
        serde_json::from_str(&fs::read_to_string(dir.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary.error_count, 1);
    assert_eq!(summary.warning_count, 1);
    assert_eq!(summary.total_count, 3);
}

#[tokio::test]
async fn test_directory_text_files_are_raw() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("results");
    let console = SharedBuffer::new();

    executor(
        config(OutputDestination::Directory(dir.clone()), OutputFormat::Text),
        mixed_runner(),
        &console,
    )
    .run(targets(&["fail"]))
    .await
    .unwrap();

    assert_eq!(
        fs::read_to_string(dir.join(format!("{}.stderr.txt", id("fail")))).unwrap(),
        "connection refused\n"
    );
    let summary = fs::read_to_string(dir.join("summary.txt")).unwrap();
    assert!(summary.starts_with("SUMMARY:\n"));
    assert!(summary.ends_with("0 successful (0 with warnings), 1 error, 1 total\n"));
}

#[tokio::test]
async fn test_directory_is_reset() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("results");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("stale.txt"), "old run").unwrap();
    let console = SharedBuffer::new();

    executor(
        config(OutputDestination::Directory(dir.clone()), OutputFormat::Text),
        mixed_runner(),
        &console,
    )
    .run(targets(&["ok"]))
    .await
    .unwrap();

    assert!(!dir.join("stale.txt").exists());
    assert!(dir.join("summary.txt").exists());
}

#[tokio::test]
async fn test_text_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("out.txt");
    fs::write(&path, "previous content\n").unwrap();
    let console = SharedBuffer::new();

    let config = ExecutorConfig {
        workers: 1,
        destination: OutputDestination::File(path.clone()),
        format: OutputFormat::Text,
        ..ExecutorConfig::default()
    };

    executor(config, mixed_runner(), &console)
        .run(targets(&["ok", "fail"]))
        .await
        .unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let expected = format!(
        "\n---\nTASK START: {ok} (1/2)\n\
         \nSTDOUT:\nNAME   READY\npod-a  1/1\n\
         \nTASK END: {ok} (1/2)\n\
         \n---\nTASK START: {fail} (2/2)\n\
         \nERROR: exit status 1\n\
         \nSTDERR:\nconnection refused\n\
         \nSTDOUT:\npartial\n\
         \nTASK END: {fail} (2/2)\n\
         ---\nSUMMARY:\n\
         - {fail}: error: exit status 1, stderr:\nconnection refused\n\
         1 successful (0 with warnings), 1 error, 2 total\n",
        ok = id("ok"),
        fail = id("fail"),
    );
    assert_eq!(content, expected);
}

#[tokio::test]
async fn test_yaml_file_masks_unprinted_channels() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("out.yaml");
    let console = SharedBuffer::new();

    let config = ExecutorConfig {
        workers: 1,
        destination: OutputDestination::File(path.clone()),
        format: OutputFormat::Yaml,
        print: PrintPolicy {
            print_stderr: false,
            ..PrintPolicy::default()
        },
        ..ExecutorConfig::default()
    };

    executor(config, mixed_runner(), &console)
        .run(targets(&["warn"]))
        .await
        .unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let documents: Vec<serde_yaml::Value> = content
        .split("---\n")
        .filter(|doc| !doc.trim().is_empty())
        .map(|doc| serde_yaml::from_str(doc).unwrap())
        .collect();

    assert_eq!(documents.len(), 2);
    let task = &documents[0];
    assert_eq!(task["stdout"].as_str(), Some("pod-b\n"));
    assert!(task.get("stderr").is_none());
    assert_eq!(task["hasStderr"].as_bool(), Some(true));
    assert_eq!(task["printStderr"].as_bool(), Some(false));

    let summary = &documents[1];
    assert_eq!(summary["warningCount"].as_u64(), Some(1));
    assert_eq!(summary["totalCount"].as_u64(), Some(1));
}

#[tokio::test]
async fn test_json_file_written_once() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("out.json");
    let console = SharedBuffer::new();

    executor(
        config(OutputDestination::File(path.clone()), OutputFormat::Json),
        mixed_runner(),
        &console,
    )
    .run(targets(&["ok", "warn", "fail"]))
    .await
    .unwrap();

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

    let results = report["results"].as_object().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[&id("fail")]["error"], "exit status 1");
    assert_eq!(report["summary"]["errorCount"], 1);
    assert_eq!(report["summary"]["warningCount"], 1);
    assert_eq!(report["summary"]["totalCount"], 3);
}

#[cfg(unix)]
#[tokio::test]
async fn test_unwritable_destination_is_fatal() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not-a-dir");
    fs::write(&blocker, "file").unwrap();
    let runner = mixed_runner();
    let console = SharedBuffer::new();

    let err = executor(
        config(
            OutputDestination::File(blocker.join("out.txt")),
            OutputFormat::Text,
        ),
        Arc::clone(&runner),
        &console,
    )
    .run(targets(&["ok"]))
    .await
    .unwrap_err();

    assert!(matches!(err, Error::OutputWrite { .. }));
    assert_eq!(runner.call_count(), 0);
}
