use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use anishelf::api::AppState;
use anishelf::config::Config;
use http_body_util::BodyExt;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

const FORM: &str = "application/x-www-form-urlencoded";

struct TestApp {
    app: Router,
    state: Arc<AppState>,
    db_path: PathBuf,
}

async fn spawn_app() -> TestApp {
    let dir = std::env::temp_dir().join(format!("anishelf-api-{}", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.storage.db_path = dir.join("db.json").to_string_lossy().into_owned();
    config.storage.users_path = dir.join("users.json").to_string_lossy().into_owned();
    config.server.public_path = dir.join("public").to_string_lossy().into_owned();
    config.auth.jwt_secret = Some("test-secret".to_string());
    config.security.argon2_memory_cost_kib = 64;
    config.security.argon2_time_cost = 1;
    config.observability.metrics_enabled = false;

    let db_path = PathBuf::from(&config.storage.db_path);
    let state = anishelf::api::create_app_state(config, None)
        .await
        .expect("Failed to create app state");

    TestApp {
        app: anishelf::api::router(state.clone()),
        state,
        db_path,
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    async fn form(&self, method: &str, uri: &str, cookie: &str, body: &str) -> Response {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, FORM)
                .header(header::COOKIE, cookie)
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn get(&self, uri: &str, cookie: &str) -> Response {
        self.send(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Registers `haruka` and returns the session cookie pair.
    async fn register(&self) -> String {
        let response = self
            .form("POST", "/register", "", "username=haruka&password=secret1")
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie(&response).expect("register should set a session cookie")
    }

    async fn document(&self) -> serde_json::Value {
        let raw = tokio::fs::read(&self.db_path).await.unwrap();
        serde_json::from_slice(&raw).unwrap()
    }
}

fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("access_token="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_protected_routes_redirect_to_login() {
    let app = spawn_app().await;

    for uri in ["/protected", "/animes", "/animes/1", "/reviews/new", "/metrics"] {
        let response = app.get(uri, "").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/login");
    }

    let response = app.get("/animes", "access_token=garbage").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app.get("/", "").await;
    assert_eq!(location(&response), "/login");

    let response = app.get("/login", "").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(r#"action="/register""#));
}

#[tokio::test]
async fn test_register_login_and_logout() {
    let app = spawn_app().await;
    let cookie = app.register().await;

    let token = cookie.trim_start_matches("access_token=");
    let identity = app.state.sessions.verify(token).expect("token should verify");
    assert_eq!(identity.username, "haruka");

    let response = app.get("/login", &cookie).await;
    assert_eq!(location(&response), "/animes");

    let response = app.get("/protected", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Welcome, haruka"));
    assert!(body.contains("No anime has been added yet"));

    let response = app
        .form("POST", "/login", "", "username=haruka&password=secret1")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/animes");
    assert!(session_cookie(&response).is_some());

    let response = app.form("POST", "/logout", &cookie, "").await;
    assert_eq!(location(&response), "/login");
    let cleared = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .any(|v| v.to_str().unwrap().starts_with("access_token=;"));
    assert!(cleared);
}

#[tokio::test]
async fn test_credential_failures() {
    let app = spawn_app().await;
    app.register().await;

    let response = app
        .form("POST", "/login", "", "username=haruka&password=wrongpass")
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, "Password is invalid");

    let response = app
        .form("POST", "/login", "", "username=nobody&password=secret1")
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, "Username does not exist");

    let response = app
        .form("POST", "/register", "", "username=haruka&password=another1")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Username already exists");

    let response = app
        .form("POST", "/register", "", "username=yu&password=secret1")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_text(response).await,
        "Username must be at least 3 characters long"
    );
}

#[tokio::test]
async fn test_create_anime_normalizes_input() {
    let app = spawn_app().await;
    let cookie = app.register().await;

    let response = app
        .form(
            "POST",
            "/animes",
            &cookie,
            "title=X&episodes=12&genres=Action%2C+Drama",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/animes/1");

    let doc = app.document().await;
    let anime = &doc["animes"][0];
    assert_eq!(anime["id"], 1);
    assert_eq!(anime["title"], "X");
    assert_eq!(anime["episodes"], 12);
    assert_eq!(anime["genres"], serde_json::json!(["Action", "Drama"]));

    let response = app.get("/animes/1", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Action, Drama"));

    let response = app.get("/protected", &cookie).await;
    assert!(body_text(response).await.contains(r#"href="/animes/1""#));
}

#[tokio::test]
async fn test_create_anime_from_json() {
    let app = spawn_app().await;
    let cookie = app.register().await;

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/animes")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::COOKIE, &cookie)
                .body(Body::from(
                    r#"{"title":"Akira","episodes":"abc","genres":["Sci-Fi"],"year":"1988"}"#,
                ))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let doc = app.document().await;
    assert_eq!(doc["animes"][0]["episodes"], 0);
    assert_eq!(doc["animes"][0]["year"], 1988);
    assert_eq!(doc["animes"][0]["genres"], serde_json::json!(["Sci-Fi"]));
}

#[tokio::test]
async fn test_missing_records_return_404_without_writing() {
    let app = spawn_app().await;
    let cookie = app.register().await;
    let before = tokio::fs::read(&app.db_path).await.unwrap();

    let response = app.form("PUT", "/animes/5", &cookie, "title=Ghost").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Anime not found");

    let response = app.form("DELETE", "/reviews/3", &cookie, "").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/animes/abc", &cookie).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/reviews/7/edit", &cookie).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let after = tokio::fs::read(&app.db_path).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_review_validation() {
    let app = spawn_app().await;
    let cookie = app.register().await;
    app.form("POST", "/animes", &cookie, "title=Mononoke").await;

    let response = app
        .form("POST", "/reviews", &cookie, "animeId=999&title=Great&rating=8")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Invalid anime");

    let response = app
        .form("POST", "/reviews", &cookie, "animeId=1&title=G&rating=8")
        .await;
    assert_eq!(body_text(response).await, "Title too short");

    let response = app
        .form("POST", "/reviews", &cookie, "animeId=1&title=Great&rating=11")
        .await;
    assert_eq!(
        body_text(response).await,
        "Rating must be between 0 and 10"
    );

    assert_eq!(app.document().await["reviews"], serde_json::json!([]));

    let response = app
        .form("POST", "/reviews", &cookie, "animeId=1&title=Great&rating=8")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/reviews/1");

    let doc = app.document().await;
    assert_eq!(doc["reviews"][0]["author"], "Anonymous");
    assert_eq!(doc["reviews"][0]["animeId"], 1);
    assert_eq!(doc["reviews"][0]["rating"], 8);

    let response = app
        .form("PUT", "/reviews/1", &cookie, "animeId=1&rating=-1")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_text(response).await,
        "Rating must be between 0 and 10"
    );

    let response = app
        .form("PUT", "/reviews/1", &cookie, "animeId=1&title=X&rating=7.5")
        .await;
    assert_eq!(location(&response), "/reviews/1");
    let doc = app.document().await;
    assert_eq!(doc["reviews"][0]["title"], "X");
    assert_eq!(doc["reviews"][0]["rating"], 7);
}

#[tokio::test]
async fn test_method_override_from_form_field() {
    let app = spawn_app().await;
    let cookie = app.register().await;
    app.form("POST", "/animes", &cookie, "title=Before&studio=Ghibli")
        .await;

    let response = app
        .form("POST", "/animes/1", &cookie, "_method=PUT&title=After")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/animes/1");

    let doc = app.document().await;
    assert_eq!(doc["animes"][0]["title"], "After");
    assert_eq!(doc["animes"][0]["studio"], "Ghibli");

    let response = app
        .form("POST", "/animes/1?_method=DELETE", &cookie, "")
        .await;
    assert_eq!(location(&response), "/animes");
    assert_eq!(app.document().await["animes"], serde_json::json!([]));
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let app = spawn_app().await;
    let cookie = app.register().await;
    app.form("POST", "/animes", &cookie, "title=Cowboy+Bebop&genres=Space")
        .await;
    app.form("POST", "/animes", &cookie, "title=Clannad&genres=Drama")
        .await;

    let body = body_text(app.get("/animes?q=BEBOP", &cookie).await).await;
    assert!(body.contains("Cowboy Bebop"));
    assert!(!body.contains("Clannad"));

    let body = body_text(app.get("/animes?q=drama", &cookie).await).await;
    assert!(body.contains("Clannad"));
    assert!(!body.contains("Cowboy Bebop"));

    app.form(
        "POST",
        "/reviews",
        &cookie,
        "animeId=2&title=Tearjerker&author=Mai&rating=9",
    )
    .await;

    let body = body_text(app.get("/reviews?q=MAI", &cookie).await).await;
    assert!(body.contains("Tearjerker"));

    let body = body_text(app.get("/reviews?animeId=1", &cookie).await).await;
    assert!(body.contains("No reviews found"));
}

#[tokio::test]
async fn test_deleting_anime_keeps_its_reviews() {
    let app = spawn_app().await;
    let cookie = app.register().await;
    app.form("POST", "/animes", &cookie, "title=Akira").await;
    app.form("POST", "/reviews", &cookie, "animeId=1&title=Loud&rating=7")
        .await;

    let response = app.form("DELETE", "/animes/1", &cookie, "").await;
    assert_eq!(location(&response), "/animes");

    let response = app.get("/reviews/1", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("no longer in the catalog"));
}

#[tokio::test]
async fn test_metrics_disabled_message() {
    let app = spawn_app().await;
    let cookie = app.register().await;

    let response = app.get("/metrics", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Metrics not enabled");
}

#[tokio::test]
async fn test_expired_session_redirects_to_login() {
    let app = spawn_app().await;
    let cookie = app.register().await;

    let identity = app
        .state
        .sessions
        .verify(cookie.trim_start_matches("access_token="))
        .unwrap();
    let two_hours_ago = chrono::Utc::now().timestamp() - 2 * 60 * 60;
    let expired = app.state.sessions.issue_at(&identity, two_hours_ago).unwrap();

    let response = app
        .get("/animes", &format!("access_token={expired}"))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_method_override_from_header() {
    let app = spawn_app().await;
    let cookie = app.register().await;
    app.form("POST", "/animes", &cookie, "title=Akira").await;

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/animes/1")
                .header("X-HTTP-Method-Override", "DELETE")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/animes");
    assert_eq!(app.document().await["animes"], serde_json::json!([]));
}
