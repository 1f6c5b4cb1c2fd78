//! RPC method handler for the NoxX JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested directly. The
//! `handle_method` function maps method names onto shell intents, the
//! headless engine's simulated page activity, and the persistent stores held
//! by [`App`].

use std::sync::Mutex;

use serde_json::{json, Value};

use crate::app::App;
use crate::managers::history_manager::HistoryManagerTrait;
use crate::managers::permission_manager::PermissionManagerTrait;
use crate::managers::tab_registry::TabRegistryTrait;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::intent::{IntentOutcome, UiIntent};
use crate::types::permission::{PermissionStatus, PermissionType};
use crate::types::surface::{SurfaceId, WindowId};
use crate::types::tab::TabId;

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

fn u64_param(params: &Value, key: &str) -> Result<u64, String> {
    params
        .get(key)
        .and_then(|v| v.as_u64())
        .ok_or_else(|| format!("missing {}", key))
}

/// An integer parameter that must fit `T`; out-of-range values are rejected
/// rather than truncated.
fn int_param<T: TryFrom<u64>>(params: &Value, key: &str) -> Result<T, String> {
    let raw = u64_param(params, key)?;
    T::try_from(raw).map_err(|_| format!("invalid {}: {} is out of range", key, raw))
}

fn tab_param(params: &Value, key: &str) -> Result<TabId, String> {
    str_param(params, key).map(TabId::from)
}

fn outcome(o: IntentOutcome) -> Result<Value, String> {
    serde_json::to_value(o).map_err(|e| e.to_string())
}

/// The live surface of a tab, or an error naming the tab.
fn surface_param(app: &App, params: &Value) -> Result<SurfaceId, String> {
    let tab_id = tab_param(params, "tab_id")?;
    app.shell
        .surfaces()
        .surface_of(&tab_id)
        .ok_or_else(|| format!("tab {} has no surface", tab_id))
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
/// Intent methods report operation failures inside the returned outcome
/// (`{"ok": false, "error": ...}`); `Err` is reserved for malformed calls.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Intents ───
        "intent.dispatch" => {
            let intent: UiIntent =
                serde_json::from_value(params.clone()).map_err(|e| format!("invalid intent: {}", e))?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            outcome(a.shell.dispatch(intent))
        }
        "tabs.create" => {
            let url = params.get("url").and_then(|v| v.as_str()).map(str::to_string);
            let mut a = app.lock().map_err(|e| e.to_string())?;
            outcome(a.shell.dispatch(UiIntent::CreateTab { url }))
        }
        "tabs.switch" => {
            let id = tab_param(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            outcome(a.shell.dispatch(UiIntent::SwitchActiveTab { id }))
        }
        "tabs.close" => {
            let id = tab_param(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            outcome(a.shell.dispatch(UiIntent::CloseTab { id }))
        }
        "tabs.reorder" => {
            let from: usize = int_param(params, "from")?;
            let to: usize = int_param(params, "to")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            outcome(a.shell.dispatch(UiIntent::ReorderTabs { from, to }))
        }
        "tabs.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            serde_json::to_value(a.shell.registry().snapshot()).map_err(|e| e.to_string())
        }
        "tabs.detached" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let arr: Vec<Value> = a
                .shell
                .detached()
                .records()
                .map(|r| json!({"id": r.tab_id(), "title": r.tab.title, "url": r.url, "window": r.window.0}))
                .collect();
            Ok(json!(arr))
        }

        // ─── Navigation ───
        "nav.load" => {
            let tab_id = tab_param(params, "tab_id")?;
            let input = str_param(params, "input")?.to_string();
            let mut a = app.lock().map_err(|e| e.to_string())?;
            outcome(a.shell.dispatch(UiIntent::LoadUrl { tab_id, input }))
        }
        "nav.back" => {
            let tab_id = tab_param(params, "tab_id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            outcome(a.shell.dispatch(UiIntent::GoBack { tab_id }))
        }
        "nav.forward" => {
            let tab_id = tab_param(params, "tab_id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            outcome(a.shell.dispatch(UiIntent::GoForward { tab_id }))
        }
        "nav.reload" => {
            let tab_id = tab_param(params, "tab_id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            outcome(a.shell.dispatch(UiIntent::Reload { tab_id }))
        }

        // ─── Windows ───
        "window.detach" => {
            let tab_id = tab_param(params, "tab_id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let window = a.shell.detach(&tab_id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true, "window": window.0}))
        }
        "window.reattach" => {
            let tab_id = tab_param(params, "tab_id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.shell.reattach(&tab_id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "window.close" => {
            let window = WindowId(u64_param(params, "window")?);
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.shell.engine_mut().close_by_user(window);
            Ok(json!({"ok": true}))
        }
        "window.resize" => {
            let window = WindowId(u64_param(params, "window")?);
            let width: u32 = int_param(params, "width")?;
            let height: u32 = int_param(params, "height")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.shell.engine_mut().resize_by_user(window, width, height);
            Ok(json!({"ok": true}))
        }

        // ─── Simulated page activity ───
        "page.navigate" => {
            let url = str_param(params, "url")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let surface = surface_param(&a, params)?;
            a.shell
                .engine_mut()
                .navigate_from_page(surface, url)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "page.request_permission" => {
            let permission: PermissionType = str_param(params, "permission")?.parse()?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let surface = surface_param(&a, params)?;
            let request_id = a
                .shell
                .engine_mut()
                .request_permission(surface, permission)
                .map_err(|e| e.to_string())?;
            a.shell.settle();
            let granted = a
                .shell
                .engine()
                .permission_answers()
                .iter()
                .rev()
                .find(|(id, _)| *id == request_id)
                .map(|(_, g)| *g)
                .unwrap_or(false);
            Ok(json!({"request_id": request_id, "granted": granted}))
        }

        // ─── Site permissions ───
        "permissions.set" => {
            let site = str_param(params, "site")?;
            let permission: PermissionType = str_param(params, "permission")?.parse()?;
            let status: PermissionStatus = str_param(params, "status")?.parse()?;
            let a = app.lock().map_err(|e| e.to_string())?;
            a.permissions()
                .set_permission(site, permission, status)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "permissions.get" => {
            let site = str_param(params, "site")?;
            let permission: PermissionType = str_param(params, "permission")?.parse()?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let status = a.permissions().get_permission(site, permission);
            Ok(json!({"status": status}))
        }
        "permissions.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let perms = a.permissions().list_all_permissions().map_err(|e| e.to_string())?;
            serde_json::to_value(perms).map_err(|e| e.to_string())
        }
        "permissions.remove_site" => {
            let site = str_param(params, "site")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let removed = a.permissions().remove_site(site).map_err(|e| e.to_string())?;
            Ok(json!({"removed": removed}))
        }
        "permissions.clear" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            a.permissions().clear_all().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Global history ───
        "history.search" => {
            let query = str_param(params, "query")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let entries = a.history_manager.search_history(query).map_err(|e| e.to_string())?;
            serde_json::to_value(entries).map_err(|e| e.to_string())
        }
        "history.recent" => {
            let limit: usize = match params.get("limit") {
                Some(_) => int_param(params, "limit")?,
                None => 50,
            };
            let a = app.lock().map_err(|e| e.to_string())?;
            let entries = a.history_manager.list_recent(limit).map_err(|e| e.to_string())?;
            serde_json::to_value(entries).map_err(|e| e.to_string())
        }
        "history.delete" => {
            let id = str_param(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.history_manager.delete_entry(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "history.clear" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.history_manager.clear_all().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "history.set_recording" => {
            let enabled = params
                .get("enabled")
                .and_then(|v| v.as_bool())
                .ok_or("missing enabled")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.history_manager.set_recording_enabled(enabled);
            Ok(json!({"ok": true, "enabled": enabled}))
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            serde_json::to_value(a.settings_engine.get_settings()).map_err(|e| e.to_string())
        }
        "settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.settings_engine.set_value(key, value).map_err(|e| e.to_string())?;
            let settings = a.settings_engine.get_settings().clone();
            a.shell.apply_settings(settings);
            Ok(json!({"ok": true}))
        }

        // ─── Notifications ───
        "events.poll" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let envelopes = a.settle();
            serde_json::to_value(envelopes).map_err(|e| e.to_string())
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
