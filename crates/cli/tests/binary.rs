use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn index2search() -> Command {
    Command::new(env!("CARGO_BIN_EXE_index2search"))
}

#[test]
fn test_missing_index_exits_non_zero() {
    let dir = tempdir().unwrap();
    let destination = dir.path().join("search.txt");

    let output = index2search()
        .arg(dir.path().join("missing.xml"))
        .arg(&destination)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load index"), "stderr: {stderr}");
    assert!(!destination.exists());
}

#[test]
fn test_successful_export_exits_zero() {
    let dir = tempdir().unwrap();
    let index = dir.path().join("index.xml");
    let destination = dir.path().join("search.txt");
    fs::write(
        &index,
        r#"<index><namespace name="std"><class name="vector" link="vector.html"/></namespace></index>"#,
    )
    .unwrap();

    let status = index2search()
        .arg(&index)
        .arg(&destination)
        .env_remove("DOCINDEX_LOG_DIR")
        .status()
        .unwrap();

    assert!(status.success());
    assert_eq!(
        fs::read_to_string(&destination).unwrap(),
        "std::vector => vector.html\n"
    );
}

#[test]
fn test_missing_arguments_exit_non_zero() {
    let status = index2search().arg("index.xml").status().unwrap();
    assert!(!status.success());
}
