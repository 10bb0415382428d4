use std::process::Output;

use assert_cmd::assert::OutputAssertExt;
use assert_fs::TempDir;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Run nsdiff against `server` on a blocking thread so the mock keeps serving.
async fn nsdiff(dir: &TempDir, server: &MockServer, args: &[&str]) -> Output {
    let mut cmd = std::process::Command::new(env!("CARGO_BIN_EXE_nsdiff"));
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .env_remove("NSDIFF_TOKEN")
        .env_remove("RUST_LOG")
        .env("NSDIFF_PORTAL_URL", server.uri())
        .args(args);
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

async fn mount_json(server: &MockServer, verb: &str, route: &str, body: serde_json::Value) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_identity(server: &MockServer, user: &str, root: bool) {
    mount_json(server, "GET", "/user", json!({"userId": user, "name": user})).await;
    mount_json(server, "GET", "/permissions/root", json!({"hasPermission": root})).await;
}

// ─── Diff ───────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn diff_fetches_every_cluster() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "GET",
        "/apps/shop/envs/DEV/clusters/default/namespaces/application/items",
        json!([{"key": "timeout", "value": "30"}, {"key": "", "comment": "# shared"}]),
    )
    .await;
    mount_json(
        &server,
        "GET",
        "/apps/shop/envs/PRO/clusters/east/namespaces/application/items",
        json!([{"key": "timeout", "value": "90"}]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    nsdiff(
        &dir,
        &server,
        &["diff", "--app", "shop", "--namespace", "application", "--cluster", "DEV", "--cluster", "PRO:east"],
    )
    .await
    .assert()
    .success()
    .stdout(predicate::str::contains("PRO:east:application"))
    .stdout(predicate::str::contains("90"))
    .stdout(predicate::str::contains("0 equal, 1 different"));
}

#[tokio::test(flavor = "multi_thread")]
async fn portal_error_keeps_other_clusters() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "GET",
        "/apps/shop/envs/DEV/clusters/default/namespaces/application/items",
        json!([{"key": "a", "value": "1"}]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/apps/shop/envs/PRO/clusters/default/namespaces/application/items"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "namespace not found"})))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    nsdiff(
        &dir,
        &server,
        &["diff", "--app", "shop", "--namespace", "application", "--cluster", "DEV", "--cluster", "PRO"],
    )
    .await
    .assert()
    .success()
    .stdout(predicate::str::contains("PRO:default:application skipped"))
    .stdout(predicate::str::contains("namespace not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn snapshot_then_diff_offline() {
    let server = MockServer::start().await;
    for env in ["DEV", "PRO"] {
        mount_json(
            &server,
            "GET",
            &format!("/apps/shop/envs/{env}/clusters/default/namespaces/application/items"),
            json!([{"key": "env", "value": env}]),
        )
        .await;
    }

    let dir = TempDir::new().unwrap();
    nsdiff(
        &dir,
        &server,
        &["snapshot", "--app", "shop", "--namespace", "application", "--cluster", "DEV", "--cluster", "PRO", "--out", "snap"],
    )
    .await
    .assert()
    .success();
    assert!(dir.path().join("snap/shop/PRO/default/application.json").is_file());

    nsdiff(
        &dir,
        &server,
        &["diff", "--app", "shop", "--namespace", "application", "--cluster", "DEV", "--cluster", "PRO", "--snapshot", "snap"],
    )
    .await
    .assert()
    .success()
    .stdout(predicate::str::contains("0 equal, 1 different"));
}

// ─── Environments and server config ─────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn envs_are_listed() {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/envs", json!(["DEV", "FAT", "PRO"])).await;

    let dir = TempDir::new().unwrap();
    nsdiff(&dir, &server, &["envs"])
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("FAT"));
}

#[tokio::test(flavor = "multi_thread")]
async fn http_error_message_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/envs"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "db unavailable"})))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    nsdiff(&dir, &server, &["envs"])
        .await
        .assert()
        .failure()
        .stderr(predicate::str::contains("Portal returned 500: db unavailable"));
}

#[tokio::test(flavor = "multi_thread")]
async fn server_config_search() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "GET",
        "/server/portal-db/config/find-all-config",
        json!([
            {"key": "organizations", "value": "[]", "comment": "orgs"},
            {"key": "api.readTimeout", "value": "10000"},
            {"key": "item.value.length.limit", "value": "20000"}
        ]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    nsdiff(&dir, &server, &["server-config", "list", "--search", "LIMIT"])
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("item.value.length.limit"))
        .stdout(predicate::str::contains("organizations").not())
        .stdout(predicate::str::contains("1 of 3 settings shown"));
}

#[tokio::test(flavor = "multi_thread")]
async fn server_config_set_requires_root() {
    let server = MockServer::start().await;
    mount_identity(&server, "bob", false).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    nsdiff(&dir, &server, &["server-config", "set", "k", "v"])
        .await
        .assert()
        .failure()
        .stderr(predicate::str::contains("root permission"));
}

#[tokio::test(flavor = "multi_thread")]
async fn server_config_set_in_env_config_db() {
    let server = MockServer::start().await;
    mount_identity(&server, "admin", true).await;
    Mock::given(method("POST"))
        .and(path("/server/envs/PRO/config-db/config"))
        .and(body_partial_json(json!({"key": "eureka.service.url", "value": "http://eureka"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": "eureka.service.url", "value": "http://eureka", "comment": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    nsdiff(
        &dir,
        &server,
        &["server-config", "set", "eureka.service.url", "http://eureka", "--env", "PRO"],
    )
    .await
    .assert()
    .success()
    .stdout(predicate::str::contains("config DB (PRO)"));
}

// ─── Users ──────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn toggle_disables_active_user() {
    let server = MockServer::start().await;
    mount_identity(&server, "admin", true).await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("keyword", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"userId": "alice2", "name": "Other", "email": "o@x.io", "enabled": 1},
            {"userId": "alice", "name": "Alice", "email": "a@x.io", "enabled": 1}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/users/enabled"))
        .and(body_partial_json(json!({"username": "alice", "enabled": 0})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    nsdiff(&dir, &server, &["users", "toggle", "alice"])
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("User alice is now disabled"));
}

#[tokio::test(flavor = "multi_thread")]
async fn create_user_requires_password_before_any_request() {
    let server = MockServer::start().await;

    let dir = TempDir::new().unwrap();
    nsdiff(
        &dir,
        &server,
        &["users", "create", "dave", "--name", "Dave", "--email", "d@x.io", "--password", ""],
    )
    .await
    .assert()
    .failure()
    .stderr(predicate::str::contains("password is required"));

    assert!(server.received_requests().await.unwrap().is_empty());
}

// ─── Namespaces ─────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn delete_refused_for_non_master() {
    let server = MockServer::start().await;
    mount_identity(&server, "bob", false).await;
    mount_json(
        &server,
        "GET",
        "/apps/shop/role_users",
        json!({"appId": "shop", "masterUsers": [{"userId": "alice"}]}),
    )
    .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    nsdiff(&dir, &server, &["namespace", "delete", "--app", "shop", "datasource"])
        .await
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a master of app 'shop'"))
        .stderr(predicate::str::contains("alice"));
}

async fn mount_linked_in_use(server: &MockServer) {
    mount_identity(server, "alice", false).await;
    mount_json(
        server,
        "GET",
        "/apps/shop/role_users",
        json!({"appId": "shop", "masterUsers": [{"userId": "alice"}]}),
    )
    .await;
    mount_json(
        server,
        "GET",
        "/apps/shop/envs/DEV/clusters/default/linked-namespaces/infra.redis/usage",
        json!([{"namespaceName": "infra.redis", "envName": "DEV", "clusterName": "default",
                "instanceCount": 2, "branchInstanceCount": 0}]),
    )
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_refused_while_in_use() {
    let server = MockServer::start().await;
    mount_linked_in_use(&server).await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    nsdiff(
        &dir,
        &server,
        &["namespace", "delete", "--app", "shop", "infra.redis", "--linked", "DEV"],
    )
    .await
    .assert()
    .failure()
    .stderr(predicate::str::contains("still in use"))
    .stderr(predicate::str::contains("2 instance(s)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn forced_delete_goes_through() {
    let server = MockServer::start().await;
    mount_linked_in_use(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/apps/shop/envs/DEV/clusters/default/linked-namespaces/infra.redis"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    nsdiff(
        &dir,
        &server,
        &["namespace", "delete", "--app", "shop", "infra.redis", "--linked", "DEV", "--force"],
    )
    .await
    .assert()
    .success()
    .stdout(predicate::str::contains("Deleted while in use"))
    .stdout(predicate::str::contains("Deleted shop/DEV:default:infra.redis"));
}

#[tokio::test(flavor = "multi_thread")]
async fn usage_of_unused_app_namespace() {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/apps/shop/namespaces/datasource/usage", json!([])).await;

    let dir = TempDir::new().unwrap();
    nsdiff(&dir, &server, &["namespace", "usage", "--app", "shop", "datasource"])
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("Not in use"));
}

#[tokio::test(flavor = "multi_thread")]
async fn publish_info_lists_dirty_clusters() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "GET",
        "/apps/shop/namespaces/publish_info",
        json!({"DEV": {"default": true, "east": false}, "PRO": {"default": false}}),
    )
    .await;

    let dir = TempDir::new().unwrap();
    nsdiff(&dir, &server, &["namespace", "publish-info", "--app", "shop"])
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("DEV:default has unpublished changes"))
        .stdout(predicate::str::contains("DEV:east").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn show_app_namespace() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "GET",
        "/apps/shop/appnamespaces/datasource.yml",
        json!({"name": "datasource.yml", "appId": "shop", "format": "yml",
               "isPublic": false, "comment": "db pools"}),
    )
    .await;

    let dir = TempDir::new().unwrap();
    nsdiff(&dir, &server, &["namespace", "show", "--app", "shop", "datasource.yml"])
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("Format:  yml"))
        .stdout(predicate::str::contains("db pools"));
}

// ─── Consumers ──────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn consumer_grant_in_every_env() {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/envs", json!(["DEV", "PRO"])).await;
    Mock::given(method("POST"))
        .and(path("/consumers/abc123/assign-role"))
        .and(query_param("type", "NamespaceRole"))
        .and(query_param("envs", "DEV,PRO"))
        .and(body_partial_json(json!({"appId": "shop", "namespaceName": "application"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"consumerId": 7, "roleId": 31},
            {"consumerId": 7, "roleId": 32}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    nsdiff(
        &dir,
        &server,
        &["consumer", "grant", "abc123", "--app", "shop", "--namespace", "application", "--all-envs"],
    )
    .await
    .assert()
    .success()
    .stdout(predicate::str::contains(
        "Granted NamespaceRole on shop/application in DEV, PRO (2 role binding(s))",
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn consumer_grant_rejects_unknown_env() {
    let server = MockServer::start().await;
    mount_json(&server, "GET", "/envs", json!(["DEV", "PRO"])).await;
    Mock::given(method("POST"))
        .and(path("/consumers/abc123/assign-role"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    nsdiff(
        &dir,
        &server,
        &["consumer", "grant", "abc123", "--app", "shop", "--namespace", "application", "--env", "UAT"],
    )
    .await
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown env 'UAT'"));
}

#[tokio::test(flavor = "multi_thread")]
async fn consumer_env_needs_namespace() {
    let server = MockServer::start().await;

    let dir = TempDir::new().unwrap();
    nsdiff(&dir, &server, &["consumer", "grant", "abc123", "--app", "shop", "--env", "DEV"])
        .await
        .assert()
        .failure()
        .stderr(predicate::str::contains("--namespace"));
}
