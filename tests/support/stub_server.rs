use std::{
    io::{BufRead, BufReader, Read, Write},
    net::{TcpListener, TcpStream},
    sync::{Arc, Mutex},
    thread,
};

/// A request as the stub saw it.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

#[derive(Clone)]
struct Route {
    method: &'static str,
    path: &'static str,
    status: u16,
    body: String,
    /// Write this much of a reply, then keep the connection open.
    hold: Option<String>,
}

#[derive(Default)]
struct Shared {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<RecordedRequest>>,
    held: Mutex<Vec<TcpStream>>,
}

/// Minimal HTTP/1.1 server answering fixed routes, one connection at a time.
///
/// Routes added later shadow earlier ones for the same method and path.
pub struct StubServer {
    base_url: String,
    shared: Arc<Shared>,
}

impl StubServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let base_url = format!("http://{}", listener.local_addr().expect("stub addr"));
        let shared = Arc::new(Shared::default());
        let thread_shared = shared.clone();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                handle(stream, &thread_shared);
            }
        });
        Self { base_url, shared }
    }

    pub fn route(self, method: &'static str, path: &'static str, status: u16, body: impl Into<String>) -> Self {
        self.shared.routes.lock().unwrap().push(Route {
            method,
            path,
            status,
            body: body.into(),
            hold: None,
        });
        self
    }

    /// Accept requests to `path` but never answer until [`StubServer::answer_held`].
    pub fn hold(self, method: &'static str, path: &'static str) -> Self {
        self.shared.routes.lock().unwrap().push(Route {
            method,
            path,
            status: 0,
            body: String::new(),
            hold: Some(String::new()),
        });
        self
    }

    /// Answer `path` with 200 headers and the start of a body, then stall.
    pub fn stall_body(self, method: &'static str, path: &'static str) -> Self {
        let partial = "{\"full_text\": {";
        self.shared.routes.lock().unwrap().push(Route {
            method,
            path,
            status: 200,
            body: String::new(),
            hold: Some(format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 4096\r\n\r\n{partial}"
            )),
        });
        self
    }

    /// Number of connections currently held open.
    pub fn held_count(&self) -> usize {
        self.shared.held.lock().unwrap().len()
    }

    /// Send a late answer on every held connection and close them.
    pub fn answer_held(&self, status: u16, body: &str) {
        let held: Vec<TcpStream> = self.shared.held.lock().unwrap().drain(..).collect();
        for mut stream in held {
            let _ = stream.write_all(response_text(status, body).as_bytes());
            let _ = stream.flush();
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.shared.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }
}

/// A base URL with nothing listening behind it.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe port");
    let addr = listener.local_addr().expect("probe addr");
    drop(listener);
    format!("http://{addr}")
}

fn handle(stream: TcpStream, shared: &Shared) {
    let Ok(read_half) = stream.try_clone() else { return };
    let mut reader = BufReader::new(read_half);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).is_err() || line == "\r\n" || line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0u8; content_length];
    if reader.read_exact(&mut body).is_err() {
        return;
    }
    shared.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let route = shared
        .routes
        .lock()
        .unwrap()
        .iter()
        .rev()
        .find(|route| route.method == method && route.path == path)
        .cloned();
    let (status, body) = match route {
        Some(Route { hold: Some(prefix), .. }) => {
            let mut stream = stream;
            let _ = stream.write_all(prefix.as_bytes());
            let _ = stream.flush();
            shared.held.lock().unwrap().push(stream);
            return;
        }
        Some(route) => (route.status, route.body),
        None => (404, "{\"error\":\"Not found\"}".to_string()),
    };
    let mut stream = stream;
    let _ = stream.write_all(response_text(status, &body).as_bytes());
    let _ = stream.flush();
}

fn response_text(status: u16, body: &str) -> String {
    format!(
        "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        reason(status),
        body.len()
    )
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
