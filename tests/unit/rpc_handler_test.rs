//! Unit tests for the RPC handler: every JSON-RPC method dispatched by
//! `handle_method`, through the same code path the `noxx-rpc` binary uses,
//! with a temporary on-disk SQLite database and settings file.

use std::sync::Mutex;

use serde_json::{json, Value};
use tempfile::TempDir;

use noxx::app::App;
use noxx::engine::HeadlessEngine;
use noxx::rpc_handler::handle_method;

/// Create a fresh App backed by a temp directory.
fn setup() -> (Mutex<App>, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let db_path = tmp.path().join("test.db");
    let settings = tmp.path().join("settings.json").to_string_lossy().to_string();
    let app = App::new(&db_path, Some(settings), HeadlessEngine::default()).expect("Failed to init App");
    (Mutex::new(app), tmp)
}

fn call(app: &Mutex<App>, method: &str, params: Value) -> Value {
    handle_method(app, method, &params).unwrap_or_else(|e| panic!("{} failed: {}", method, e))
}

fn homepage_id(app: &Mutex<App>) -> String {
    let list = call(app, "tabs.list", json!({}));
    list["tabs"][0]["id"].as_str().unwrap().to_string()
}

fn event_names(envelopes: &Value) -> Vec<String> {
    envelopes
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["event"].as_str().unwrap().to_string())
        .collect()
}

// ─── Basics ───

#[test]
fn test_ping() {
    let (app, _tmp) = setup();
    assert_eq!(call(&app, "ping", json!({})), json!({"pong": true}));
}

#[test]
fn test_unknown_method_returns_error() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "nonexistent.method", &json!({}));
    assert!(res.unwrap_err().contains("unknown method"));
}

#[test]
fn test_app_starts_on_homepage() {
    let (app, _tmp) = setup();
    let list = call(&app, "tabs.list", json!({}));
    let tabs = list["tabs"].as_array().unwrap();
    assert_eq!(tabs.len(), 1);
    assert_eq!(tabs[0]["url"], "noxx://homepage");
    assert_eq!(list["activeTabId"], tabs[0]["id"]);
}

// ─── Tabs ───

#[test]
fn test_tabs_create_and_switch() {
    let (app, _tmp) = setup();
    let home = homepage_id(&app);

    let created = call(&app, "tabs.create", json!({"url": "example.com"}));
    assert_eq!(created["ok"], true);
    let id = created["tabId"].as_str().unwrap().to_string();

    let list = call(&app, "tabs.list", json!({}));
    assert_eq!(list["tabs"].as_array().unwrap().len(), 2);
    assert_eq!(list["tabs"][1]["url"], "https://example.com");
    assert_eq!(list["activeTabId"], id.as_str());

    assert_eq!(call(&app, "tabs.switch", json!({"id": home}))["ok"], true);
    assert_eq!(call(&app, "tabs.list", json!({}))["activeTabId"], home.as_str());
    assert_eq!(call(&app, "tabs.switch", json!({"id": "ghost"}))["ok"], false);
}

#[test]
fn test_tabs_reorder_and_close() {
    let (app, _tmp) = setup();
    let home = homepage_id(&app);
    call(&app, "tabs.create", json!({"url": "example.com"}));

    assert_eq!(call(&app, "tabs.reorder", json!({"from": 1, "to": 0}))["ok"], true);
    assert_eq!(call(&app, "tabs.reorder", json!({"from": 5, "to": 0}))["ok"], false);
    assert_eq!(call(&app, "tabs.list", json!({}))["tabs"][1]["id"], home.as_str());

    let closed = call(&app, "tabs.close", json!({"id": home}));
    assert_eq!(closed["close"], "homepage_kept");
    assert!(handle_method(&app, "tabs.close", &json!({})).is_err());
}

#[test]
fn test_closing_last_homepage_shuts_down() {
    let (app, _tmp) = setup();
    let home = homepage_id(&app);
    let closed = call(&app, "tabs.close", json!({"id": home}));
    assert_eq!(closed["close"], "shutdown");

    let envelopes = call(&app, "events.poll", json!({}));
    assert!(event_names(&envelopes).contains(&"shutdown".to_string()));
    assert!(app.lock().unwrap().shell.is_shut_down());
}

#[test]
fn test_intent_dispatch() {
    let (app, _tmp) = setup();
    let res = call(&app, "intent.dispatch", json!({"type": "createTab", "url": "rust-lang.org"}));
    assert_eq!(res["ok"], true);

    let failed = call(&app, "intent.dispatch", json!({"type": "closeTab", "id": "ghost"}));
    assert_eq!(failed["ok"], false);
    assert!(failed["error"].as_str().unwrap().contains("ghost"));

    let err = handle_method(&app, "intent.dispatch", &json!({"type": "explode"})).unwrap_err();
    assert!(err.starts_with("invalid intent"));
}

// ─── Navigation ───

#[test]
fn test_navigation_round_trip() {
    let (app, _tmp) = setup();
    let home = homepage_id(&app);

    let loaded = call(&app, "nav.load", json!({"tab_id": home, "input": "rust-lang.org"}));
    assert_eq!(loaded["url"], "https://rust-lang.org");
    call(&app, "events.poll", json!({}));

    let back = call(&app, "nav.back", json!({"tab_id": home}));
    assert_eq!(back["url"], "noxx://homepage");
    let forward = call(&app, "nav.forward", json!({"tab_id": home}));
    assert_eq!(forward["url"], "https://rust-lang.org");
    assert_eq!(call(&app, "nav.reload", json!({"tab_id": home}))["ok"], true);
}

#[test]
fn test_search_input() {
    let (app, _tmp) = setup();
    let home = homepage_id(&app);
    let loaded = call(&app, "nav.load", json!({"tab_id": home, "input": "openai com"}));
    assert_eq!(loaded["url"], "https://www.google.com/search?q=openai+com");
}

#[test]
fn test_navigation_missing_params() {
    let (app, _tmp) = setup();
    let home = homepage_id(&app);
    assert_eq!(
        handle_method(&app, "nav.load", &json!({"tab_id": home})).unwrap_err(),
        "missing input"
    );
    assert!(handle_method(&app, "nav.back", &json!({})).is_err());
    let unknown = call(&app, "nav.back", json!({"tab_id": "ghost"}));
    assert_eq!(unknown["ok"], false);
}

// ─── Windows ───

#[test]
fn test_detach_and_reattach() {
    let (app, _tmp) = setup();
    let home = homepage_id(&app);
    let id = call(&app, "tabs.create", json!({"url": "example.com"}))["tabId"]
        .as_str()
        .unwrap()
        .to_string();

    assert!(handle_method(&app, "window.detach", &json!({"tab_id": home})).is_err());
    let detached = call(&app, "window.detach", json!({"tab_id": id}));
    assert_eq!(detached["ok"], true);
    assert!(detached["window"].as_u64().unwrap() > 1);

    let list = call(&app, "tabs.detached", json!({}));
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["url"], "https://example.com");

    call(&app, "window.reattach", json!({"tab_id": id}));
    assert!(call(&app, "tabs.detached", json!({})).as_array().unwrap().is_empty());
    assert_eq!(call(&app, "tabs.list", json!({}))["activeTabId"], id.as_str());

    let envelopes = call(&app, "events.poll", json!({}));
    assert!(event_names(&envelopes).contains(&"reattach-tab".to_string()));
}

#[test]
fn test_closing_detached_window_drops_tab() {
    let (app, _tmp) = setup();
    let id = call(&app, "tabs.create", json!({"url": "example.com"}))["tabId"]
        .as_str()
        .unwrap()
        .to_string();
    let window = call(&app, "window.detach", json!({"tab_id": id}))["window"].clone();

    call(&app, "window.close", json!({"window": window}));
    call(&app, "events.poll", json!({}));

    assert!(call(&app, "tabs.detached", json!({})).as_array().unwrap().is_empty());
    assert_eq!(call(&app, "tabs.list", json!({}))["tabs"].as_array().unwrap().len(), 1);
    assert!(handle_method(&app, "window.reattach", &json!({"tab_id": id})).is_err());
}

#[test]
fn test_main_window_close_shuts_down() {
    let (app, _tmp) = setup();
    call(&app, "events.poll", json!({}));
    call(&app, "window.close", json!({"window": 1}));
    let envelopes = call(&app, "events.poll", json!({}));
    assert_eq!(event_names(&envelopes), vec!["shutdown".to_string()]);
}

// ─── Permissions ───

#[test]
fn test_page_permission_request_uses_stored_decisions() {
    let (app, _tmp) = setup();
    let id = call(&app, "tabs.create", json!({"url": "example.com"}))["tabId"]
        .as_str()
        .unwrap()
        .to_string();
    call(&app, "events.poll", json!({}));

    let denied = call(&app, "page.request_permission", json!({"tab_id": id, "permission": "camera"}));
    assert_eq!(denied["granted"], false);

    call(
        &app,
        "permissions.set",
        json!({"site": "example.com", "permission": "camera", "status": "granted"}),
    );
    let granted = call(&app, "page.request_permission", json!({"tab_id": id, "permission": "camera"}));
    assert_eq!(granted["granted"], true);
    assert_ne!(granted["request_id"], denied["request_id"]);
}

#[test]
fn test_permission_store_methods() {
    let (app, _tmp) = setup();
    call(
        &app,
        "permissions.set",
        json!({"site": "example.com", "permission": "geolocation", "status": "denied"}),
    );
    call(
        &app,
        "permissions.set",
        json!({"site": "example.com", "permission": "camera", "status": "granted"}),
    );

    let got = call(&app, "permissions.get", json!({"site": "example.com", "permission": "camera"}));
    assert_eq!(got["status"], "granted");
    let missing = call(&app, "permissions.get", json!({"site": "rust-lang.org", "permission": "camera"}));
    assert_eq!(missing["status"], Value::Null);

    assert_eq!(call(&app, "permissions.list", json!({})).as_array().unwrap().len(), 2);
    assert_eq!(call(&app, "permissions.remove_site", json!({"site": "example.com"}))["removed"], 2);
    call(&app, "permissions.clear", json!({}));
    assert!(call(&app, "permissions.list", json!({})).as_array().unwrap().is_empty());

    assert!(handle_method(
        &app,
        "permissions.set",
        &json!({"site": "example.com", "permission": "telepathy", "status": "granted"})
    )
    .is_err());
}

#[test]
fn test_page_methods_need_a_live_surface() {
    let (app, _tmp) = setup();
    let home = homepage_id(&app);
    let err = handle_method(&app, "page.navigate", &json!({"tab_id": home, "url": "https://example.com"}))
        .unwrap_err();
    assert!(err.contains("has no surface"));
}

// ─── Global history ───

#[test]
fn test_finished_loads_reach_history() {
    let (app, _tmp) = setup();
    let home = homepage_id(&app);
    call(&app, "nav.load", json!({"tab_id": home, "input": "rust-lang.org"}));
    call(&app, "events.poll", json!({}));
    call(&app, "page.navigate", json!({"tab_id": home, "url": "https://example.com/docs"}));
    call(&app, "events.poll", json!({}));

    let recent = call(&app, "history.recent", json!({"limit": 10}));
    assert_eq!(recent.as_array().unwrap().len(), 2);
    let found = call(&app, "history.search", json!({"query": "docs"}));
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["url"], "https://example.com/docs");

    let id = found[0]["id"].as_str().unwrap().to_string();
    call(&app, "history.delete", json!({"id": id}));
    assert_eq!(call(&app, "history.recent", json!({})).as_array().unwrap().len(), 1);
    assert!(handle_method(&app, "history.delete", &json!({"id": id})).is_err());

    call(&app, "history.clear", json!({}));
    assert!(call(&app, "history.recent", json!({})).as_array().unwrap().is_empty());
}

#[test]
fn test_history_recording_can_be_paused() {
    let (app, _tmp) = setup();
    let home = homepage_id(&app);
    let res = call(&app, "history.set_recording", json!({"enabled": false}));
    assert_eq!(res["enabled"], false);

    call(&app, "nav.load", json!({"tab_id": home, "input": "rust-lang.org"}));
    let envelopes = call(&app, "events.poll", json!({}));
    assert!(event_names(&envelopes).contains(&"add-history-item".to_string()));
    assert!(call(&app, "history.recent", json!({})).as_array().unwrap().is_empty());
}

// ─── Settings ───

#[test]
fn test_settings_get_and_set() {
    let (app, _tmp) = setup();
    let settings = call(&app, "settings.get", json!({}));
    assert_eq!(settings["layout"]["chrome_height"], 120);

    call(&app, "settings.set", json!({"key": "general.search_template", "value": "https://duckduckgo.com/?q={query}"}));
    assert_eq!(
        call(&app, "settings.get", json!({}))["general"]["search_template"],
        "https://duckduckgo.com/?q={query}"
    );

    let home = homepage_id(&app);
    let loaded = call(&app, "nav.load", json!({"tab_id": home, "input": "rust book"}));
    assert_eq!(loaded["url"], "https://duckduckgo.com/?q=rust+book");

    assert!(handle_method(&app, "settings.set", &json!({"key": "layout.nope", "value": 1})).is_err());
    assert!(handle_method(&app, "settings.set", &json!({"key": "layout.chrome_height"})).is_err());
}

#[test]
fn test_layout_setting_reaches_shell() {
    let (app, _tmp) = setup();
    call(&app, "settings.set", json!({"key": "layout.chrome_height", "value": 80}));
    assert_eq!(app.lock().unwrap().shell.settings().layout.chrome_height, 80);
}

#[test]
fn test_oversized_inset_is_rejected_and_shell_keeps_working() {
    let (app, _tmp) = setup();
    let home = homepage_id(&app);
    call(&app, "nav.load", json!({"tab_id": home, "input": "example.com"}));

    let result = handle_method(
        &app,
        "settings.set",
        &json!({"key": "layout.inset_left", "value": 4294967295u64}),
    );
    assert!(result.is_err());

    let list = call(&app, "tabs.list", json!({}));
    assert_eq!(list["tabs"].as_array().unwrap().len(), 1);
    assert_eq!(call(&app, "settings.get", json!({}))["layout"]["inset_left"], 8);
}

#[test]
fn test_window_resize_rejects_out_of_range_size() {
    let (app, _tmp) = setup();
    let err = handle_method(
        &app,
        "window.resize",
        &json!({"window": 1, "width": 4294967296u64, "height": 700}),
    )
    .unwrap_err();
    assert!(err.contains("width"));

    assert_eq!(
        call(&app, "window.resize", json!({"window": 1, "width": 1000, "height": 700}))["ok"],
        true
    );
}

// ─── Notifications ───

#[test]
fn test_events_poll_returns_envelopes_in_order() {
    let (app, _tmp) = setup();
    call(&app, "tabs.create", json!({"url": "example.com"}));
    let envelopes = call(&app, "events.poll", json!({}));
    let arr = envelopes.as_array().unwrap();
    assert!(!arr.is_empty());
    let seqs: Vec<u64> = arr.iter().map(|e| e["seq"].as_u64().unwrap()).collect();
    let mut sorted = seqs.clone();
    sorted.sort();
    assert_eq!(seqs, sorted);

    let names = event_names(&envelopes);
    assert!(names.contains(&"tabs-updated".to_string()));
    assert!(names.contains(&"load-finished".to_string()));
    assert!(call(&app, "events.poll", json!({})).as_array().unwrap().is_empty());
}
