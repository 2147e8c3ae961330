use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::Result;
use axum::extract::{Path as RoutePath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use base64::Engine as _;
use serde_json::{Value, json};

use siteloom::error::StoreError;
use siteloom::model::{PendingEdit, RepositoryRef};
use siteloom::remote::GitHubStore;
use siteloom::store::ContentStore;

// In-process stand-in for the repository host's content/tree/commit API.
// Tree updates only become visible in `files` when the ref moves, like the
// real thing.
#[derive(Default)]
struct GitHost {
    files: HashMap<String, Vec<u8>>,
    blobs: HashMap<String, Vec<u8>>,
    trees: HashMap<String, Vec<Value>>,
    commits: HashMap<String, String>,
    head: String,
    reject_next_update: bool,
    blob_posts: usize,
    forced_updates: usize,
    ref_updates: usize,
}

type Host = Arc<Mutex<GitHost>>;

fn router(host: Host) -> Router {
    Router::new()
        .route("/repos/:owner/:repo/contents/*path", get(get_contents))
        .route("/repos/:owner/:repo/git/trees/:branch", get(get_listing))
        .route("/repos/:owner/:repo/git/trees", post(create_tree))
        .route("/repos/:owner/:repo/git/blobs", post(create_blob))
        .route("/repos/:owner/:repo/git/commits", post(create_commit))
        .route("/repos/:owner/:repo/git/commits/:sha", get(get_commit))
        .route("/repos/:owner/:repo/git/ref/heads/:branch", get(get_ref))
        .route("/repos/:owner/:repo/git/refs/heads/:branch", patch(update_ref))
        .with_state(host)
}

async fn get_contents(
    State(host): State<Host>,
    RoutePath((_owner, _repo, path)): RoutePath<(String, String, String)>,
) -> Response {
    let host = host.lock().unwrap();
    match host.files.get(&path) {
        Some(bytes) => bytes.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn get_listing(State(host): State<Host>) -> Json<Value> {
    let host = host.lock().unwrap();
    let rows: Vec<Value> = host
        .files
        .iter()
        .map(|(path, bytes)| {
            json!({
                "path": path,
                "type": "blob",
                "sha": blake3::hash(bytes).to_hex().to_string(),
                "size": bytes.len(),
            })
        })
        .collect();
    Json(json!({ "tree": rows, "truncated": false }))
}

async fn create_blob(State(host): State<Host>, Json(body): Json<Value>) -> Json<Value> {
    let mut host = host.lock().unwrap();
    let content = body["content"].as_str().unwrap_or_default();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(content)
        .unwrap();
    let sha = blake3::hash(&bytes).to_hex().to_string();
    host.blobs.insert(sha.clone(), bytes);
    host.blob_posts += 1;
    Json(json!({ "sha": sha }))
}

async fn create_tree(State(host): State<Host>, Json(body): Json<Value>) -> Json<Value> {
    let mut host = host.lock().unwrap();
    let rows = body["tree"].as_array().cloned().unwrap_or_default();
    let sha = format!("tree{}", host.trees.len());
    host.trees.insert(sha.clone(), rows);
    Json(json!({ "sha": sha }))
}

async fn create_commit(State(host): State<Host>, Json(body): Json<Value>) -> Json<Value> {
    let mut host = host.lock().unwrap();
    let tree = body["tree"].as_str().unwrap_or_default().to_string();
    let sha = format!("commit{}", host.commits.len() + 1);
    host.commits.insert(sha.clone(), tree);
    Json(json!({ "sha": sha }))
}

async fn get_commit(
    RoutePath((_owner, _repo, sha)): RoutePath<(String, String, String)>,
) -> Json<Value> {
    Json(json!({ "sha": sha, "tree": { "sha": "root" } }))
}

async fn get_ref(State(host): State<Host>) -> Json<Value> {
    let host = host.lock().unwrap();
    Json(json!({ "object": { "sha": host.head } }))
}

async fn update_ref(State(host): State<Host>, Json(body): Json<Value>) -> Response {
    let mut host = host.lock().unwrap();
    let force = body["force"].as_bool().unwrap_or(false);
    if host.reject_next_update && !force {
        host.reject_next_update = false;
        return (StatusCode::CONFLICT, "not a fast forward").into_response();
    }

    let sha = body["sha"].as_str().unwrap_or_default().to_string();
    let Some(tree) = host.commits.get(&sha).cloned() else {
        return StatusCode::UNPROCESSABLE_ENTITY.into_response();
    };
    for row in host.trees.get(&tree).cloned().unwrap_or_default() {
        let path = row["path"].as_str().unwrap_or_default().to_string();
        match row["sha"].as_str() {
            Some(blob) => {
                let bytes = host.blobs.get(blob).cloned().unwrap_or_default();
                host.files.insert(path, bytes);
            }
            None => {
                host.files.remove(&path);
            }
        }
    }
    host.head = sha;
    host.ref_updates += 1;
    if force {
        host.forced_updates += 1;
    }
    Json(json!({})).into_response()
}

struct RemoteFixture {
    host: Host,
    store: GitHubStore,
}

impl RemoteFixture {
    fn seed(&self, path: &str, content: &str) {
        let mut host = self.host.lock().unwrap();
        let sha = blake3::hash(content.as_bytes()).to_hex().to_string();
        host.blobs.insert(sha, content.as_bytes().to_vec());
        host.files.insert(path.to_string(), content.as_bytes().to_vec());
    }
}

fn spawn_host() -> Result<RemoteFixture> {
    let host: Host = Arc::new(Mutex::new(GitHost::default()));
    host.lock().unwrap().head = "commit0".to_string();

    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    listener.set_nonblocking(true)?;

    let app = router(host.clone());
    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    let repo = RepositoryRef::new("acme", "demo-site", "main");
    let store = GitHubStore::new(repo, "dev-token".to_string())?
        .with_base_url(&format!("http://{}", addr));
    Ok(RemoteFixture { host, store })
}

#[test]
fn write_many_lands_through_blob_tree_commit_and_ref() -> Result<()> {
    let fx = spawn_host()?;

    let commit = fx.store.write_many(
        &[
            PendingEdit::new("content/hello.md", "# Hello\n"),
            PendingEdit::new("config.toml", "title = \"Demo\"\n"),
        ],
        "Add pages",
    )?;

    assert_eq!(fx.store.read_file("content/hello.md")?, b"# Hello\n");
    assert_eq!(fx.store.read_file("config.toml")?, b"title = \"Demo\"\n");

    let host = fx.host.lock().unwrap();
    assert_eq!(host.head, commit.sha);
    assert_eq!(host.ref_updates, 1);
    assert_eq!(host.forced_updates, 0);
    Ok(())
}

#[test]
fn missing_file_maps_to_not_found() -> Result<()> {
    let fx = spawn_host()?;
    let err = fx.store.read_file("content/nope.md").unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
    Ok(())
}

#[test]
fn moved_ref_gets_one_forced_retry() -> Result<()> {
    let fx = spawn_host()?;
    fx.seed("config.toml", "title = \"Old\"\n");
    fx.host.lock().unwrap().reject_next_update = true;

    fx.store.write_many(
        &[PendingEdit::new("config.toml", "title = \"New\"\n")],
        "Update title",
    )?;

    assert_eq!(fx.store.read_file("config.toml")?, b"title = \"New\"\n");
    let host = fx.host.lock().unwrap();
    assert_eq!(host.forced_updates, 1);
    assert!(!host.reject_next_update);
    Ok(())
}

#[test]
fn rename_reuses_existing_blobs() -> Result<()> {
    let fx = spawn_host()?;
    fx.seed("content/about.md", "# About\n");

    fx.store.rename_paths(
        &[("content/about.md".to_string(), "content/about-us.md".to_string())],
        false,
        "Rename about",
    )?;

    assert_eq!(fx.store.read_file("content/about-us.md")?, b"# About\n");
    assert!(matches!(
        fx.store.read_file("content/about.md"),
        Err(StoreError::NotFound(_))
    ));

    let host = fx.host.lock().unwrap();
    // The move re-points the existing blob; nothing is re-uploaded.
    assert_eq!(host.blob_posts, 0);
    assert_eq!(host.ref_updates, 1);
    Ok(())
}

#[test]
fn delete_of_missing_path_never_touches_the_ref() -> Result<()> {
    let fx = spawn_host()?;
    fx.seed("content/about.md", "# About\n");

    let err = fx
        .store
        .delete_paths(
            &["content/about.md".to_string(), "content/nope.md".to_string()],
            "Mixed delete",
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    assert_eq!(fx.store.read_file("content/about.md")?, b"# About\n");
    assert_eq!(fx.host.lock().unwrap().ref_updates, 0);
    Ok(())
}
