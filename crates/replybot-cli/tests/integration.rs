#![allow(deprecated)]
use assert_cmd::Command;
use chrono::NaiveDate;
use mockito::Matcher;
use predicates::prelude::*;
use replybot_core::ledger::ReplyLedger;
use replybot_core::paths;
use tempfile::TempDir;

fn replybot(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("replybot").unwrap();
    cmd.current_dir(dir.path())
        .env("REPLYBOT_ROOT", dir.path())
        .env_remove("RUST_LOG");
    cmd
}

fn write(dir: &TempDir, name: &str, contents: &str) {
    std::fs::write(dir.path().join(name), contents).unwrap();
}

fn install(dir: &TempDir, api_base_url: &str) {
    write(dir, paths::SECRETS_FILE, "consumer-key\nconsumer-secret\n");
    write(
        dir,
        paths::ACCESS_TOKEN_FILE,
        "oauth_token: tok\noauth_token_secret: tok-secret\n",
    );
    write(dir, paths::REPLIES_FILE, r#"{"paella": ["¡Qué rica!"]}"#);
    write(dir, paths::IGNORED_ACCOUNTS_FILE, "Spammer\n");
    write(dir, paths::REPLIES_PER_QUERY_FILE, "1\n");
    write(
        dir,
        paths::SETTINGS_FILE,
        &format!("api_base_url: {api_base_url}\n"),
    );
}

fn ledger(dir: &TempDir) -> ReplyLedger {
    ReplyLedger::load(dir.path().join(paths::LEDGER_FILE)).unwrap()
}

fn mock_verify(server: &mut mockito::Server) -> mockito::Mock {
    server
        .mock("GET", "/account/verify_credentials.json")
        .with_status(200)
        .with_body(r#"{"screen_name": "PaellaBot", "followers_count": 12}"#)
        .create()
}

fn mock_search(server: &mut mockito::Server) -> mockito::Mock {
    server
        .mock("GET", "/search/tweets.json")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "paella".into()),
            Matcher::UrlEncoded("lang".into(), "es".into()),
            Matcher::UrlEncoded("geocode".into(), "40.416775,-3.703790,600km".into()),
            Matcher::UrlEncoded("result_type".into(), "recent".into()),
            Matcher::UrlEncoded("count".into(), "100".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"statuses": [
                {"id": 30, "user": {"screen_name": "spammer", "followers_count": 9000}},
                {"id": 29, "user": {"screen_name": "Tiny", "followers_count": 15}},
                {"id": 28, "user": {"screen_name": "Amy", "followers_count": 800}},
                {"id": 27, "user": {"screen_name": "Amy", "followers_count": 800}},
                {"id": 26, "user": {"screen_name": "Bea", "followers_count": 800}}
            ]}"#,
        )
        .create()
}

// ---------------------------------------------------------------------------
// replybot config validate
// ---------------------------------------------------------------------------

#[test]
fn config_validate_reports_installation() {
    let dir = TempDir::new().unwrap();
    install(&dir, "http://127.0.0.1:9");
    replybot(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration OK"))
        .stdout(predicate::str::contains("paella (1 replies)"));
}

#[test]
fn config_validate_fails_without_catalog() {
    let dir = TempDir::new().unwrap();
    install(&dir, "http://127.0.0.1:9");
    std::fs::remove_file(dir.path().join(paths::REPLIES_FILE)).unwrap();
    replybot(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing configuration file"));
}

// ---------------------------------------------------------------------------
// replybot ledger
// ---------------------------------------------------------------------------

#[test]
fn ledger_show_empty() {
    let dir = TempDir::new().unwrap();
    replybot(&dir)
        .args(["ledger", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ledger is empty."));
}

#[test]
fn ledger_show_and_forget() {
    let dir = TempDir::new().unwrap();
    let mut seeded = ReplyLedger::new(dir.path().join(paths::LEDGER_FILE));
    let today = chrono::Local::now().date_naive();
    seeded.record("Amy", today);
    seeded.record("bea", today);
    seeded.persist().unwrap();

    replybot(&dir)
        .args(["ledger", "show", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"handle\": \"amy\""));

    replybot(&dir)
        .args(["ledger", "forget", "AMY"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Forgot AMY."));

    let after = ledger(&dir);
    assert!(after.is_eligible("amy"));
    assert!(!after.is_eligible("bea"));
}

#[test]
fn ledger_prune_drops_stale_entries() {
    let dir = TempDir::new().unwrap();
    let mut seeded = ReplyLedger::new(dir.path().join(paths::LEDGER_FILE));
    seeded.record("old", NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
    seeded.record("fresh", chrono::Local::now().date_naive());
    seeded.persist().unwrap();

    replybot(&dir)
        .args(["ledger", "prune"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pruned 1 entry; 1 remaining."));

    assert_eq!(ledger(&dir).handles().collect::<Vec<_>>(), vec!["fresh"]);
}

// ---------------------------------------------------------------------------
// replybot run
// ---------------------------------------------------------------------------

#[test]
fn run_replies_to_first_qualifying_author() {
    let mut server = mockito::Server::new();
    let verify = mock_verify(&mut server);
    let search = mock_search(&mut server);
    let post = server
        .mock("POST", "/statuses/update.json")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("status".into(), "@Amy ¡Qué rica!".into()),
            Matcher::UrlEncoded("in_reply_to_status_id".into(), "28".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"id": 31, "user": {"screen_name": "PaellaBot"}}"#)
        .expect(1)
        .create();

    let dir = TempDir::new().unwrap();
    install(&dir, &server.url());

    let output = replybot(&dir).args(["run", "--json"]).assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["self_handle"], "PaellaBot");
    assert_eq!(summary["queries"][0]["found"], 5);
    assert_eq!(summary["queries"][0]["eligible"], 4);
    assert_eq!(summary["queries"][0]["replied"], 1);

    verify.assert();
    search.assert();
    post.assert();

    let ledger = ledger(&dir);
    assert_eq!(ledger.handles().collect::<Vec<_>>(), vec!["amy"]);
}

#[test]
fn run_treats_duplicate_status_as_done() {
    let mut server = mockito::Server::new();
    let _verify = mock_verify(&mut server);
    let _search = mock_search(&mut server);
    let _mock = server
        .mock("POST", "/statuses/update.json")
        .with_status(403)
        .with_body(r#"{"errors": [{"code": 187, "message": "Status is a duplicate."}]}"#)
        .create();

    let dir = TempDir::new().unwrap();
    install(&dir, &server.url());

    replybot(&dir)
        .arg("run")
        .assert()
        .success()
        .stderr(predicate::str::contains("duplicate content"));

    assert!(!ledger(&dir).is_eligible("amy"));
}

#[test]
fn run_skips_authors_already_in_ledger() {
    let mut server = mockito::Server::new();
    let _verify = mock_verify(&mut server);
    let _search = mock_search(&mut server);
    let post = server
        .mock("POST", "/statuses/update.json")
        .match_body(Matcher::UrlEncoded("in_reply_to_status_id".into(), "26".into()))
        .with_status(200)
        .with_body(r#"{"id": 32, "user": {"screen_name": "PaellaBot"}}"#)
        .expect(1)
        .create();

    let dir = TempDir::new().unwrap();
    install(&dir, &server.url());
    let mut seeded = ReplyLedger::new(dir.path().join(paths::LEDGER_FILE));
    seeded.record("amy", chrono::Local::now().date_naive());
    seeded.persist().unwrap();

    replybot(&dir).arg("run").assert().success();

    post.assert();
    assert!(!ledger(&dir).is_eligible("bea"));
}

#[test]
fn run_fails_on_authentication_error() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/account/verify_credentials.json")
        .with_status(401)
        .with_body(r#"{"errors": [{"code": 32, "message": "Could not authenticate you."}]}"#)
        .create();

    let dir = TempDir::new().unwrap();
    install(&dir, &server.url());

    replybot(&dir)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: run aborted"))
        .stderr(predicate::str::contains("Could not authenticate you."));

    assert!(!dir.path().join(paths::LEDGER_FILE).exists());
}
