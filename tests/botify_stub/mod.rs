use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use serde_json::Value;

pub const ORGANIZATION: &str = "acme";
pub const TOKEN: &str = "test-token";

#[derive(Debug, Clone)]
pub struct BotifyStubConfig {
    /// Status returned by `POST /v1/projects`, keyed by project name. Missing = 201.
    pub create_status: HashMap<String, u16>,
    pub launch_status: u16,
}

impl Default for BotifyStubConfig {
    fn default() -> Self {
        Self {
            create_status: HashMap::new(),
            launch_status: 201,
        }
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    #[allow(dead_code)]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body is json")
    }
}

pub struct BotifyStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl BotifyStub {
    pub fn spawn(config: BotifyStubConfig) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start botify stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let header = |name: &'static str| {
                    request
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv(name))
                        .map(|h| h.value.as_str().to_owned())
                };
                let authorization = header("Authorization");
                let content_type = header("Content-Type");

                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);

                let method = request.method().to_string();
                let path = request.url().to_string();
                recorded.lock().expect("lock requests").push(RecordedRequest {
                    method: method.clone(),
                    path: path.clone(),
                    authorization,
                    content_type,
                    body: body.clone(),
                });

                let (status, response_body) = respond(&config, &method, &path, &body);
                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("build header");
                let response = tiny_http::Response::from_string(response_body.to_string())
                    .with_status_code(status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("lock requests").clone()
    }
}

impl Drop for BotifyStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn respond(config: &BotifyStubConfig, method: &str, path: &str, body: &str) -> (u16, Value) {
    if method != "POST" {
        return (405, serde_json::json!({ "detail": "method not allowed" }));
    }

    if path == "/v1/projects" {
        let Ok(parsed) = serde_json::from_str::<Value>(body) else {
            return (400, serde_json::json!({ "detail": "invalid json" }));
        };
        let name = parsed
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_owned();
        let status = config.create_status.get(&name).copied().unwrap_or(201);
        if status != 201 {
            return (status, serde_json::json!({ "detail": "project already exists" }));
        }
        return (
            201,
            serde_json::json!({
                "slug": format!("{name}-123"),
                "name": name,
                "creationDate": "2022-06-29T10:57:07.455074+01:00",
                "settings": { "domains": [], "blacklistedDomains": null },
            }),
        );
    }

    let launch_prefix = format!("/v1/analyses/{ORGANIZATION}/");
    if let Some(rest) = path.strip_prefix(&launch_prefix)
        && rest.ends_with("/create/launch")
    {
        if config.launch_status != 201 {
            return (
                config.launch_status,
                serde_json::json!({ "detail": "launch refused" }),
            );
        }
        return (
            201,
            serde_json::json!({
                "status": 201,
                "analysis_slug": "20220920",
                "message": "Analysis has been created and launched successfully",
            }),
        );
    }

    (404, serde_json::json!({ "detail": "not found" }))
}
