//! End-to-end tests: model list through live clients against mock APIs.
//!
//! One mock server plays both the Hugging Face Hub and GitHub; their paths
//! do not overlap.

use modelscore_core::report::Cell;
use modelscore_core::{
    parse_model_list, run, run_batch, CheckStatus, GitHubClient, HubClient, RecordProcessor,
    Report, ScoreConfig, Table,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// `alice` is an organization owning `alice/model-x`, whose code lives in
/// `alice-org/model-x-src`.
async fn mock_alice(server: &MockServer) {
    mount_json(
        server,
        "/api/models/alice/model-x",
        json!({"id": "alice/model-x", "author": "alice", "sha": "abc123", "downloads": 42}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/users/alice/overview"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
    mount_json(
        server,
        "/api/organizations/alice/overview",
        json!({"name": "alice", "type": "org", "fullname": "Alice Labs"}),
    )
    .await;
    mount_json(
        server,
        "/api/organizations/alice/members",
        json!([{"user": "a"}, {"user": "b"}]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/models"))
        .and(query_param("author", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "alice/model-x"}])))
        .mount(server)
        .await;
    mount_json(server, "/api/datasets", json!([])).await;
    mount_json(server, "/api/spaces", json!([])).await;

    mount_json(
        server,
        "/repos/alice-org/model-x-src",
        json!({
            "name": "model-x-src",
            "full_name": "alice-org/model-x-src",
            "owner": {"login": "alice-org", "type": "Organization"},
            "default_branch": "main",
            "visibility": "public",
            "archived": false,
            "license": {"key": "apache-2.0", "spdx_id": "Apache-2.0"}
        }),
    )
    .await;
    mount_json(server, "/orgs/alice-org", json!({"login": "alice-org"})).await;
    mount_json(
        server,
        "/repos/alice-org/model-x-src/branches/main",
        json!({"name": "main", "protected": false}),
    )
    .await;
}

fn config_for(server: &MockServer) -> ScoreConfig {
    ScoreConfig::default()
        .with_hub_api_base(server.uri())
        .with_github_api_base(server.uri())
        .with_github_token(None)
}

fn checklist_status(table: &Table, item: &str) -> Option<Cell> {
    let Table::Matrix { rows, .. } = table else {
        return None;
    };
    rows.iter()
        .find(|row| row[0] == Cell::text("Checklist") && row[1] == Cell::text(item))
        .map(|row| row[2].clone())
}

#[tokio::test]
async fn test_org_owned_model_produces_three_tabs() {
    let server = MockServer::start().await;
    mock_alice(&server).await;
    let config = config_for(&server);
    let hub = HubClient::new(&config).unwrap();
    let repos = GitHubClient::new(&config).unwrap();
    let processor = RecordProcessor::new(&hub, &repos);

    let list = parse_model_list("alice/model-x, alice-org/model-x-src\n");
    let mut report = Report::new("modelscore");
    let summary = run_batch(&list, &processor, &mut report).await;

    assert_eq!(report.tab_names(), vec!["1-HF-model", "1-HF-org", "1-GH-repo"]);
    assert_eq!(summary.exit_code(), 0);

    let tabs = report.tabs();
    assert_eq!(tabs[0].table.lookup("sha"), Some(&Cell::text("abc123")));
    assert_eq!(tabs[1].table.lookup("members_count"), Some(&Cell::Number(2.0)));
    assert_eq!(tabs[1].table.lookup("models_count"), Some(&Cell::Number(1.0)));
    assert_eq!(
        tabs[1].table.lookup("overview_fullname"),
        Some(&Cell::text("Alice Labs"))
    );

    // no token: gated items are never Fail
    let unknown = Cell::text(CheckStatus::Unknown.as_str());
    assert_eq!(checklist_status(&tabs[2].table, "two_factor_requirement"), Some(unknown.clone()));
    assert_eq!(checklist_status(&tabs[2].table, "members_without_2fa"), Some(unknown.clone()));
    assert_eq!(checklist_status(&tabs[2].table, "secret_scanning"), Some(unknown));
    assert_eq!(
        checklist_status(&tabs[2].table, "branch_protection"),
        Some(Cell::text("Fail"))
    );
    assert_eq!(
        checklist_status(&tabs[2].table, "license_present"),
        Some(Cell::text("Pass"))
    );
}

#[tokio::test]
async fn test_comment_line_consumes_no_row_index() {
    let server = MockServer::start().await;
    mock_alice(&server).await;
    let config = config_for(&server);
    let hub = HubClient::new(&config).unwrap();
    let repos = GitHubClient::new(&config).unwrap();
    let processor = RecordProcessor::new(&hub, &repos);

    let list = parse_model_list("# comment\n\nalice/model-x, alice-org/model-x-src\n");
    let mut report = Report::new("modelscore");
    run_batch(&list, &processor, &mut report).await;

    assert!(report.tab_names().iter().all(|name| name.starts_with("1-")));
}

#[tokio::test]
async fn test_malformed_repository_id_omits_repo_tab_only() {
    let server = MockServer::start().await;
    mock_alice(&server).await;
    let config = config_for(&server);
    let hub = HubClient::new(&config).unwrap();
    let repos = GitHubClient::new(&config).unwrap();
    let processor = RecordProcessor::new(&hub, &repos);

    let list = parse_model_list("alice/model-x, not-a-repo\n");
    let mut report = Report::new("modelscore");
    let summary = run_batch(&list, &processor, &mut report).await;

    assert_eq!(report.tab_names(), vec!["1-HF-model", "1-HF-org"]);
    assert_eq!(summary.succeeded, 1);
}

#[tokio::test]
async fn test_tab_names_are_deterministic() {
    let server = MockServer::start().await;
    mock_alice(&server).await;
    let config = config_for(&server);
    let hub = HubClient::new(&config).unwrap();
    let repos = GitHubClient::new(&config).unwrap();
    let processor = RecordProcessor::new(&hub, &repos);
    let input = "alice/model-x, alice-org/model-x-src\nalice/missing, alice-org/model-x-src\n";

    let mut first = Report::new("a");
    run_batch(&parse_model_list(input), &processor, &mut first).await;
    let mut second = Report::new("b");
    run_batch(&parse_model_list(input), &processor, &mut second).await;

    assert_eq!(first.tab_names(), second.tab_names());
    assert_eq!(
        first.tab_names(),
        vec!["1-HF-model", "1-HF-org", "1-GH-repo", "2-HF-org", "2-GH-repo"]
    );
}

#[tokio::test]
async fn test_run_writes_workbook() {
    let server = MockServer::start().await;
    mock_alice(&server).await;
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("model_list_map.txt");
    std::fs::write(&input, "alice/model-x, alice-org/model-x-src\n").unwrap();

    let config = config_for(&server)
        .with_model_list(&input)
        .with_output_dir(dir.path().join("model_scores"));
    let hub = HubClient::new(&config).unwrap();
    let repos = GitHubClient::new(&config).unwrap();

    let summary = run(&config, &hub, &repos).await.unwrap();
    assert_eq!(summary.tabs_written, 3);

    let path = summary.report_path.unwrap();
    assert!(path.starts_with(dir.path().join("model_scores")));
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("xlsx"));
    assert!(std::fs::read(&path).unwrap().starts_with(b"PK"));
}
