use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn csearch_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_csearch"))
}

fn setup_test_env(table: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let config_dir = tmp.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_path = config_dir.join("csearch.toml");
    fs::write(&config_path, format!("[cloudsearch]\n{}", table)).unwrap();

    (tmp, config_path)
}

fn default_table() -> &'static str {
    r#"domain_id = "abc123"
domain_name = "imdb-movies"
search_url = "http://search.example.com/2011-02-01"
"#
}

fn run_csearch(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = csearch_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run csearch binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_url_prints_rendered_url() {
    let (_tmp, config_path) = setup_test_env(default_table());

    let (stdout, stderr, success) = run_csearch(
        &config_path,
        &["url", "star wars", "--field", "title", "--field", "year"],
    );
    assert!(success, "url failed: stdout={}, stderr={}", stdout, stderr);
    assert_eq!(
        stdout.trim(),
        "http://search.example.com/2011-02-01/search?q=star%20wars&size=10&start=0&return-fields=title,year"
    );
}

#[test]
fn test_url_with_boolean_query_and_paging() {
    let (_tmp, config_path) = setup_test_env(default_table());

    let (stdout, stderr, success) = run_csearch(
        &config_path,
        &[
            "url", "--bq", "genre=Action", "--bq", "genre=Sci-Fi", "--size", "4", "--page", "2",
        ],
    );
    assert!(success, "url failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("size=4&start=4"));
    assert!(stdout.contains("bq=(and genre:'Action|Sci-Fi')"));
}

#[test]
fn test_url_negative_page_clamps() {
    let (_tmp, config_path) = setup_test_env(default_table());

    let (stdout, _, success) = run_csearch(&config_path, &["url", "foo", "--page", "-3"]);
    assert!(success);
    assert!(stdout.contains("start=0"));
}

#[test]
fn test_url_derives_endpoint_from_domain() {
    let (_tmp, config_path) =
        setup_test_env("domain_id = \"abc123\"\ndomain_name = \"imdb-movies\"\n");

    let (stdout, _, success) = run_csearch(&config_path, &["url", "foo"]);
    assert!(success);
    assert!(stdout.starts_with(
        "http://search-imdb-movies-abc123.us-east-1.cloudsearch.amazonaws.com/2011-02-01/search?q=foo"
    ));
}

#[test]
fn test_missing_domain_id_fails() {
    let (_tmp, config_path) = setup_test_env("domain_name = \"imdb-movies\"\n");

    let (_, stderr, success) = run_csearch(&config_path, &["url", "foo"]);
    assert!(!success);
    assert!(stderr.contains("Missing 'domain_id' configuration parameter"));
}

#[test]
fn test_missing_query_fails() {
    let (_tmp, config_path) = setup_test_env(default_table());

    let (_, stderr, success) = run_csearch(&config_path, &["url"]);
    assert!(!success);
    assert!(stderr.contains("Insufficient parameters"));
}

#[test]
fn test_invalid_key_value_rejected() {
    let (_tmp, config_path) = setup_test_env(default_table());

    let (_, stderr, success) = run_csearch(&config_path, &["url", "foo", "--bq", "genre"]);
    assert!(!success);
    assert!(stderr.contains("no '=' found"));
}

#[test]
fn test_missing_config_file_fails() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_csearch(&tmp.path().join("nope.toml"), &["url", "foo"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_prints_hits_and_facets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2011-02-01/search"))
        .and(query_param("q", "star wars"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{
                "rank": "-text_relevance",
                "hits": {"found": 1, "start": 0, "hit": [
                    {"id": "tt0076759", "data": {"title": ["Star Wars"]}}
                ]},
                "facets": {"year": {"min": 1977, "max": 1977}}
            }"#,
        ))
        .mount(&server)
        .await;

    let table = format!(
        "domain_id = \"abc123\"\ndomain_name = \"imdb-movies\"\nsearch_url = \"{}/2011-02-01\"\n",
        server.uri()
    );
    let (_tmp, config_path) = setup_test_env(&table);

    let (stdout, stderr, success) = tokio::task::spawn_blocking(move || {
        run_csearch(&config_path, &["search", "star wars", "--facet", "year"])
    })
    .await
    .unwrap();

    assert!(success, "search failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("1 hits (page 1 of 1)"));
    assert!(stdout.contains("1. [tt0076759] title=Star Wars"));
    assert!(stdout.contains("year: 1977..1977"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_reports_service_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            r#"{"error": "info", "messages": [
                {"severity": "fatal", "code": "CS-UnknownFieldInMatchExpression", "message": "Field 'foo' is not defined"}
            ]}"#,
        ))
        .mount(&server)
        .await;

    let table = format!(
        "domain_id = \"abc123\"\ndomain_name = \"imdb-movies\"\nsearch_url = \"{}\"\n",
        server.uri()
    );
    let (_tmp, config_path) = setup_test_env(&table);

    let (_, stderr, success) = tokio::task::spawn_blocking(move || {
        run_csearch(&config_path, &["search", "--bq", "foo=bar"])
    })
    .await
    .unwrap();

    assert!(!success);
    assert!(stderr.contains("HTTP 400"));
    assert!(stderr.contains("CS-UnknownFieldInMatchExpression"));
}
