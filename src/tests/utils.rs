use crate::app::AppState;
use crate::auth::CredentialStore;
use crate::db::{init_db, Database};
use crate::pipeline::{Pipeline, PipelineConfig};
use crate::router::handle;
use crate::source::{DatasetLoader, InlineTableSource};
use astra::{Body, Request, Response};
use http::Method;
use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Two listings share a pin at 23.01/72.5; the second relies on forward-fill
/// for its project and area.
pub const LISTINGS: &str = "\
Latitude,Longitude,Project Name,Area,BHK,Price (₹),Possession\r
23.01,72.5,Skyline,Bopal,2,50-100,Dec 2027\r
23.01,72.5,,,3,80,Jan 2026\r
23.05,72.6,Orchid,Thaltej,3,200,\r
";

pub const CREDENTIALS: &str = "user,password\nbroker,s3cret\n";

static DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Fresh SQLite file per call so tests never share sessions.
pub fn init_test_db() -> Database {
    let n = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "listing_map_test_{}_{n}.sqlite3",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    let db = Database::new(path.to_string_lossy().into_owned());
    init_db(&db).unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    db
}

/// State with the dataset source wired up but nothing loaded yet.
pub fn unloaded_state(cfg: PipelineConfig) -> AppState {
    let pipeline = Arc::new(Pipeline::new(cfg));
    let loader = Arc::new(DatasetLoader::new(
        Box::new(InlineTableSource(LISTINGS.into())),
        pipeline,
    ));
    AppState::new(
        init_test_db(),
        loader,
        CredentialStore::new(Box::new(InlineTableSource(CREDENTIALS.into()))),
        3600,
        (23.0225, 72.5714),
    )
}

pub fn test_state(cfg: PipelineConfig) -> AppState {
    let state = unloaded_state(cfg);
    assert!(state.loader.load_blocking());
    state
}

pub fn get(uri: &str, token: Option<&str>) -> Request {
    request(Method::GET, uri, token, "")
}

pub fn post_form(uri: &str, token: Option<&str>, body: &str) -> Request {
    request(Method::POST, uri, token, body)
}

fn request(method: Method, uri: &str, token: Option<&str>, body: &str) -> Request {
    let mut builder = http::Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded");
    if let Some(token) = token {
        builder = builder.header("Cookie", format!("session={token}"));
    }
    builder.body(Body::from(body.as_bytes().to_vec())).unwrap()
}

pub fn body_string(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    body
}

pub fn header(resp: &Response, name: &str) -> String {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

/// Logs in as the seeded user and returns the raw session token.
pub fn login(state: &AppState) -> String {
    let resp = handle(
        post_form("/login", None, "username=broker&password=s3cret"),
        state,
    )
    .expect("login failed");
    assert_eq!(resp.status(), 302);

    let cookie = header(&resp, "Set-Cookie");
    cookie
        .strip_prefix("session=")
        .and_then(|rest| rest.split(';').next())
        .expect("no session cookie")
        .to_string()
}

/// Parsed `GET /map/groups` feed.
pub fn feed(state: &AppState, token: &str) -> serde_json::Value {
    let resp = handle(get("/map/groups", Some(token)), state).expect("feed failed");
    assert_eq!(header(&resp, "Content-Type"), "application/json");
    serde_json::from_str(&body_string(resp)).unwrap()
}
