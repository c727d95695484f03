use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn civic_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_civic"))
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    // Exported sources: one valid, one malformed, one absent.
    let ocvote = root.join("data").join("ocvote");
    fs::create_dir_all(&ocvote).unwrap();
    fs::write(
        ocvote.join("index.json"),
        r#"[
  {
    "id": "oc-1",
    "url": "https://ocvote.gov/vote-centers",
    "title": "Vote Centers",
    "text": "Find a vote center near you. Vote centers open 10 days before election day."
  },
  {
    "id": "oc-2",
    "url": "https://ocvote.gov/empty",
    "title": "Empty",
    "text": "   "
  }
]"#,
    )
    .unwrap();

    let iusd = root.join("data").join("iusd");
    fs::create_dir_all(&iusd).unwrap();
    fs::write(iusd.join("index.json"), "{ not json").unwrap();

    let config_content = format!(
        r#"[data]
root = "{}/data"
exported = ["ocvote", "iusd", "cityofirvine"]

[retrieval]
bullet_k = 5
chat_k = 3

[llm]
provider = "disabled"
"#,
        root.display()
    );

    let config_path = config_dir.join("civic.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_civic(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = civic_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("OPENAI_MODEL")
        .env_remove("CIVICLANG_LOCALES")
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run civic binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_sources_reports_each_source() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_civic(&config_path, &["sources"]);
    assert!(success, "sources failed: {}", stderr);

    let line = |name: &str| {
        stdout
            .lines()
            .find(|l| l.starts_with(name))
            .unwrap_or_else(|| panic!("no row for {}: {}", name, stdout))
            .to_string()
    };
    assert!(line("faqs").contains("OK"));
    assert!(line("ocvote").contains("OK"));
    assert!(line("iusd").contains("MALFORMED"));
    assert!(line("cityofirvine").contains("NOT PRESENT"));
    assert!(stdout.contains("total documents:"));
}

#[test]
fn test_search_finds_exported_document() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_civic(&config_path, &["search", "vote center"]);
    assert!(success, "search failed: {}", stderr);
    assert!(stdout.starts_with("1. ["), "unexpected output: {}", stdout);
    assert!(stdout.contains("id: ocvote-oc-1"));
    // Blank-bodied records never reach the corpus.
    assert!(!stdout.contains("ocvote-oc-2"));
}

#[test]
fn test_search_respects_k() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _stderr, success) = run_civic(&config_path, &["search", "the", "--k", "2"]);
    assert!(success);
    let ranked = stdout.lines().filter(|l| l.contains(". [")).count();
    assert!(ranked <= 2, "expected at most 2 results: {}", stdout);
}

#[test]
fn test_search_no_results() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _stderr, success) = run_civic(&config_path, &["search", "zzqxv"]);
    assert!(success);
    assert_eq!(stdout.trim(), "No results.");

    let (stdout, _stderr, success) = run_civic(&config_path, &["search", "?!"]);
    assert!(success);
    assert_eq!(stdout.trim(), "No results.");
}

#[test]
fn test_search_deterministic() {
    let (_tmp, config_path) = setup_test_env();

    let (first, _, _) = run_civic(&config_path, &["search", "trash pickup"]);
    let (second, _, _) = run_civic(&config_path, &["search", "trash pickup"]);
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_context_labeled() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) =
        run_civic(&config_path, &["context", "vote center", "--labeled"]);
    assert!(success, "context failed: {}", stderr);
    assert!(stdout.starts_with("[#1 "), "unexpected output: {}", stdout);
    assert!(!stdout.contains("[#4 "), "chat_k is 3: {}", stdout);
}

#[test]
fn test_context_bullets() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _stderr, success) = run_civic(&config_path, &["context", "vote center"]);
    assert!(success);
    assert!(stdout.lines().next().unwrap_or("").starts_with("- ("));
}

#[test]
fn test_ask_offline_returns_demo_reply() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) =
        run_civic(&config_path, &["ask", "My trash was missed", "--lang", "ko"]);
    assert!(success, "ask failed: {}", stderr);
    assert!(stdout.starts_with("1. Open the city services portal."));
    assert!(stdout.contains("language: ko"));
    assert!(stdout.contains("context:  [#1 faqs]"));
}

#[test]
fn test_explain_rtf_form_offline() {
    let (tmp, config_path) = setup_test_env();
    let form = tmp.path().join("permit.rtf");
    fs::write(&form, r"{\rtf1\ansi Name:\tab ____\par Address:\par}").unwrap();

    let (stdout, stderr, success) = run_civic(
        &config_path,
        &["explain", form.to_str().unwrap(), "--lang", "Spanish"],
    );
    assert!(success, "explain failed: {}", stderr);
    assert!(stdout.starts_with("[DEMO] Steps:"));
}

#[test]
fn test_explain_rejects_unsupported_file() {
    let (tmp, config_path) = setup_test_env();
    let form = tmp.path().join("permit.docx");
    fs::write(&form, b"PK").unwrap();

    let (_stdout, stderr, success) =
        run_civic(&config_path, &["explain", form.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("Unsupported file type"), "stderr: {}", stderr);
}

#[test]
fn test_missing_required_source_fails() {
    let (tmp, config_path) = setup_test_env();
    let mut config = fs::read_to_string(&config_path).unwrap();
    config = config.replace(
        "[data]\n",
        &format!("[data]\nfaqs = \"{}/missing.json\"\n", tmp.path().display()),
    );
    fs::write(&config_path, config).unwrap();

    let (_stdout, stderr, success) = run_civic(&config_path, &["search", "trash"]);
    assert!(!success);
    assert!(stderr.contains("required source 'faqs'"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_config_fails() {
    let (_tmp, config_path) = setup_test_env();
    fs::write(&config_path, "[retrieval]\nbullet_k = 0\n").unwrap();

    let (_stdout, _stderr, success) = run_civic(&config_path, &["sources"]);
    assert!(!success);
}
