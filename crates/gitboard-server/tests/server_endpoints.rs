use gitboard_server::{AppConfig, AppState, build_app_with_state};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn repo_item(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "full_name": format!("acme/{name}"),
        "html_url": format!("https://github.com/acme/{name}"),
        "description": "a repo",
        "stargazers_count": 100,
        "forks_count": 5,
        "language": "Rust",
        "owner": { "login": "acme", "avatar_url": "https://example.com/a.png" }
    })
}

fn search_body(items: Vec<Value>) -> Value {
    json!({ "total_count": items.len(), "incomplete_results": false, "items": items })
}

fn test_config(github_base: &str) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.github.api_base = github_base.to_string();
    cfg.jobs.enabled = false;
    cfg
}

async fn start_server(
    github_base: &str,
) -> (String, AppState, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let state = AppState::from_config(&test_config(github_base)).expect("build state");
    let app = build_app_with_state(state.clone());

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), state, tx, server)
}

async fn seed_code(state: &AppState, scene: &str, email: &str, code: &str) {
    state
        .store
        .set_ex(&format!("verify:{scene}:{email}"), code, 300)
        .await
        .unwrap();
}

async fn register_and_login(base: &str, state: &AppState, client: &reqwest::Client) -> Value {
    seed_code(state, "REGISTER", "eve@example.com", "123456").await;

    let resp = client
        .post(format!("{base}/api/auth/register"))
        .json(&json!({
            "username": "eve",
            "password": "secret1",
            "email": "eve@example.com",
            "code": "123456"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({ "account": "eve", "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    body["data"].clone()
}

#[tokio::test]
async fn health_endpoints_work() {
    let github = MockServer::start().await;
    let (base, _state, shutdown_tx, handle) = start_server(&github.uri()).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["service"], "Gitboard API");
    assert_eq!(body["status"], "ok");

    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert!(resp.status().is_success());

    let resp = client.get(format!("{base}/readyz")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["store"], "memory");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn trending_list_defaults_to_the_first_category() {
    let github = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![repo_item(
            1, "hot-repo",
        )])))
        .mount(&github)
        .await;

    let (base, state, shutdown_tx, handle) = start_server(&github.uri()).await;
    let client = reqwest::Client::new();
    let tokens = register_and_login(&base, &state, &client).await;
    let access = tokens["accessToken"].as_str().unwrap();

    let resp = client
        .get(format!("{base}/api/github/trending/list"))
        .bearer_auth(access)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let implicit: Value = resp.json().await.unwrap();
    assert_eq!(implicit["code"], 200);
    assert_eq!(implicit["data"][0]["name"], "hot-repo");

    let resp = client
        .get(format!("{base}/api/github/trending/list?type=trending"))
        .bearer_auth(access)
        .send()
        .await
        .unwrap();
    let explicit: Value = resp.json().await.unwrap();
    assert_eq!(implicit["data"], explicit["data"]);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn unknown_category_is_a_400() {
    let github = MockServer::start().await;
    let (base, state, shutdown_tx, handle) = start_server(&github.uri()).await;
    let client = reqwest::Client::new();
    let tokens = register_and_login(&base, &state, &client).await;
    let access = tokens["accessToken"].as_str().unwrap();

    let resp = client
        .get(format!("{base}/api/github/trending/list?type=bogus"))
        .bearer_auth(access)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], 400);
    assert_eq!(body["success"], false);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn protected_route_rejects_bad_credentials() {
    let github = MockServer::start().await;
    let (base, _state, shutdown_tx, handle) = start_server(&github.uri()).await;
    let client = reqwest::Client::new();
    let url = format!("{base}/api/github/trending/list");

    let resp = client.get(&url).send().await.unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "no token supplied");

    let resp = client
        .get(&url)
        .header("Authorization", "Basic abcdef")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "malformed token");

    let resp = client
        .get(&url)
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "token invalid or expired");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn refresh_exchanges_a_refresh_token_for_an_access_token() {
    let github = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![])))
        .mount(&github)
        .await;

    let (base, state, shutdown_tx, handle) = start_server(&github.uri()).await;
    let client = reqwest::Client::new();
    let tokens = register_and_login(&base, &state, &client).await;
    let refresh = tokens["refreshToken"].as_str().unwrap();

    let resp = client
        .post(format!("{base}/api/auth/refresh"))
        .json(&json!({ "refreshToken": refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let new_access = body["data"]["accessToken"].as_str().unwrap();

    // the refreshed token opens protected routes
    let resp = client
        .get(format!("{base}/api/github/trending/list"))
        .bearer_auth(new_access)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // a garbage refresh token is a 401
    let resp = client
        .post(format!("{base}/api/auth/refresh"))
        .json(&json!({ "refreshToken": "garbage" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn send_code_is_throttled_per_scene_and_email() {
    let github = MockServer::start().await;
    let (base, _state, shutdown_tx, handle) = start_server(&github.uri()).await;
    let client = reqwest::Client::new();
    let payload = json!({ "scene": "REGISTER", "email": "fresh@example.com" });

    let resp = client
        .post(format!("{base}/api/auth/send-code"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .post(format!("{base}/api/auth/send-code"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 429);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], 429);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn validation_errors_carry_a_field_hint() {
    let github = MockServer::start().await;
    let (base, _state, shutdown_tx, handle) = start_server(&github.uri()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/auth/register"))
        .json(&json!({
            "username": "eve",
            "password": "secret1",
            "email": "not-an-email",
            "code": "123456"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["field"], "email");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn duplicate_registration_is_a_409_with_field() {
    let github = MockServer::start().await;
    let (base, state, shutdown_tx, handle) = start_server(&github.uri()).await;
    let client = reqwest::Client::new();
    register_and_login(&base, &state, &client).await;

    seed_code(&state, "REGISTER", "other@example.com", "123456").await;
    let resp = client
        .post(format!("{base}/api/auth/register"))
        .json(&json!({
            "username": "eve",
            "password": "secret1",
            "email": "other@example.com",
            "code": "123456"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["field"], "username");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
