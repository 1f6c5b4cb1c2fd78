//! NoxX RPC server: JSON-RPC over stdin/stdout for driving a headless shell.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"tabs.create", "params":{"url":"example.com"}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! After each response, notifications produced by the call follow as
//! {"seq":N, "event":"tabs-updated", "data":{...}} lines.

use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use std::time::Instant;

use noxx::app::App;
use noxx::engine::HeadlessEngine;
use noxx::platform;
use noxx::rpc_handler::handle_method;

use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Simple rate limiter: max requests per one-second window.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn emit(out: &mut impl Write, value: &Value) -> io::Result<()> {
    writeln!(out, "{}", value)?;
    out.flush()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("NOXX_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> io::Result<()> {
    init_tracing();

    let data_dir = platform::get_data_dir();
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        warn!(dir = %data_dir.display(), error = %e, "could not create data directory");
    }
    let db_path = data_dir.join("noxx.db");
    let app = match App::new(&db_path, None, HeadlessEngine::default()) {
        Ok(a) => Mutex::new(a),
        Err(e) => {
            error!(path = %db_path.display(), error = %e, "failed to start");
            std::process::exit(1);
        }
    };
    info!(db = %db_path.display(), "rpc server ready");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    emit(&mut out, &json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}))?;

    let mut rate_limiter = RateLimiter::new(200);

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                emit(&mut out, &json!({"id": null, "error": format!("parse error: {}", e)}))?;
                continue;
            }
        };
        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            warn!("rate limit exceeded");
            emit(&mut out, &json!({"id": id, "error": "rate limit exceeded"}))?;
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));
        debug!(method, "request");

        let response = match handle_method(&app, method, &params) {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        emit(&mut out, &response)?;

        let (envelopes, done) = match app.lock() {
            Ok(mut a) => (a.settle(), a.shell.is_shut_down()),
            Err(e) => {
                error!(error = %e, "app state poisoned");
                break;
            }
        };
        for envelope in envelopes {
            match serde_json::to_value(&envelope) {
                Ok(v) => emit(&mut out, &v)?,
                Err(e) => warn!(seq = envelope.seq, error = %e, "notification not serializable"),
            }
        }
        if done {
            info!("shell shut down, exiting");
            break;
        }
    }
    Ok(())
}
