//! Engine callbacks flowing back into the shell: page metadata, global
//! history notifications, permission routing, window geometry and shutdown.

use std::sync::Arc;

use noxx::database::Database;
use noxx::engine::{HeadlessEngine, RenderEngine};
use noxx::managers::permission_manager::{PermissionDecider, PermissionManager, PermissionManagerTrait};
use noxx::managers::tab_registry::TabRegistryTrait;
use noxx::shell::Shell;
use noxx::types::intent::{Envelope, ShellEvent, UiIntent};
use noxx::types::permission::{PermissionDecision, PermissionStatus, PermissionType};
use noxx::types::settings::{LayoutSettings, ShellSettings};
use noxx::types::surface::{Bounds, SurfaceId};
use noxx::types::tab::TabId;
use tokio::sync::mpsc::UnboundedReceiver;

fn shell() -> (Shell<HeadlessEngine>, UnboundedReceiver<Envelope>) {
    let mut shell = Shell::new(HeadlessEngine::default(), ShellSettings::default());
    let rx = shell.subscribe();
    (shell, rx)
}

fn drain(rx: &mut UnboundedReceiver<Envelope>) -> Vec<Envelope> {
    let mut out = Vec::new();
    while let Ok(e) = rx.try_recv() {
        out.push(e);
    }
    out
}

fn history_items(envelopes: &[Envelope]) -> Vec<(String, String)> {
    envelopes
        .iter()
        .filter_map(|e| match &e.event {
            ShellEvent::AddHistoryItem(item) => Some((item.url.clone(), item.title.clone())),
            _ => None,
        })
        .collect()
}

/// Homepage plus one loaded Web tab, returned with its surface.
fn web_tab(shell: &mut Shell<HeadlessEngine>) -> (TabId, SurfaceId) {
    shell.create_tab(None);
    let id = shell.create_tab(Some("example.com"));
    shell.settle();
    let surface = shell.surfaces().surface_of(&id).unwrap();
    (id, surface)
}

// ─── Page metadata and global history ───

#[test]
fn test_finished_load_updates_title_and_adds_history_item() {
    let (mut shell, mut rx) = shell();
    let (id, _) = web_tab(&mut shell);

    let tab = shell.registry().get(&id).unwrap();
    assert_eq!(tab.title, "example.com");
    assert!(!tab.loading);

    let envelopes = drain(&mut rx);
    assert_eq!(
        history_items(&envelopes),
        vec![("https://example.com".to_string(), "example.com".to_string())]
    );
}

#[test]
fn test_homepage_never_reaches_global_history() {
    let (mut shell, mut rx) = shell();
    let id = shell.create_tab(None);
    shell.load_url(&id, "example.com").unwrap();
    shell.settle();
    shell.go_back(&id).unwrap();
    shell.settle();

    let items = history_items(&drain(&mut rx));
    assert_eq!(items.len(), 1);
    assert!(items.iter().all(|(url, _)| !url.starts_with("noxx://")));
}

#[test]
fn test_events_from_destroyed_surface_are_dropped() {
    let (mut shell, mut rx) = shell();
    shell.create_tab(None);
    let id = shell.create_tab(Some("example.com"));
    shell.close_tab(&id).unwrap();
    drain(&mut rx);

    shell.settle();

    assert!(drain(&mut rx).is_empty());
    assert!(!shell.registry().contains(&id));
}

#[test]
fn test_events_from_replaced_surface_are_dropped() {
    let (mut shell, mut rx) = shell();
    let id = shell.create_tab(None);
    shell.load_url(&id, "example.com").unwrap();
    // Back to the homepage before the first load reports in.
    shell.go_back(&id).unwrap();
    drain(&mut rx);

    shell.settle();

    assert!(history_items(&drain(&mut rx)).is_empty());
    let tab = shell.registry().get(&id).unwrap();
    assert!(tab.is_homepage());
}

#[test]
fn test_in_page_navigation_updates_url_only() {
    let (mut shell, mut rx) = shell();
    let (id, surface) = web_tab(&mut shell);
    drain(&mut rx);

    shell
        .engine_mut()
        .navigate_in_page(surface, "https://example.com/#install")
        .unwrap();
    shell.settle();

    assert_eq!(shell.registry().get(&id).unwrap().url, "https://example.com/#install");
    let envelopes = drain(&mut rx);
    assert!(history_items(&envelopes).is_empty());
    assert!(envelopes
        .iter()
        .any(|e| matches!(e.event, ShellEvent::TabsUpdated(_))));
}

#[test]
fn test_sequence_numbers_increase_without_gaps() {
    let (mut shell, mut rx) = shell();
    web_tab(&mut shell);
    let seqs: Vec<u64> = drain(&mut rx).iter().map(|e| e.seq).collect();
    assert!(!seqs.is_empty());
    for pair in seqs.windows(2) {
        assert_eq!(pair[1], pair[0] + 1);
    }
}

#[test]
fn test_envelope_wire_format() {
    let (mut shell, mut rx) = shell();
    shell.create_tab(None);
    let envelope = drain(&mut rx).remove(0);
    let json = serde_json::to_value(&envelope).unwrap();
    assert_eq!(json["seq"], 1);
    assert_eq!(json["event"], "tabs-updated");
    assert_eq!(json["data"]["tabs"][0]["url"], "noxx://homepage");
    assert!(json["data"]["activeTabId"].is_string());
}

// ─── Permissions ───

struct CameraOnly;

impl PermissionDecider for CameraOnly {
    fn decide(&self, _requesting_url: &str, permission: PermissionType) -> PermissionDecision {
        if permission == PermissionType::Camera {
            PermissionDecision::Grant
        } else {
            PermissionDecision::Deny
        }
    }
}

#[test]
fn test_permission_denied_without_decider() {
    let (mut shell, _rx) = shell();
    let (_, surface) = web_tab(&mut shell);

    let request = shell
        .engine_mut()
        .request_permission(surface, PermissionType::Geolocation)
        .unwrap();
    shell.settle();

    assert_eq!(shell.engine().permission_answers(), &[(request, false)]);
}

#[test]
fn test_permission_follows_installed_decider() {
    let (mut shell, _rx) = shell();
    shell.set_permission_decider(Box::new(CameraOnly));
    let (_, surface) = web_tab(&mut shell);

    let camera = shell
        .engine_mut()
        .request_permission(surface, PermissionType::Camera)
        .unwrap();
    let mic = shell
        .engine_mut()
        .request_permission(surface, PermissionType::Microphone)
        .unwrap();
    shell.settle();

    assert_eq!(shell.engine().permission_answers(), &[(camera, true), (mic, false)]);
}

#[test]
fn test_stored_site_grant_is_honoured() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let mut store = PermissionManager::new(db.clone());
    store
        .set_permission("example.com", PermissionType::Notifications, PermissionStatus::Granted)
        .unwrap();

    let (mut shell, _rx) = shell();
    shell.set_permission_decider(Box::new(PermissionManager::new(db)));
    let (_, surface) = web_tab(&mut shell);

    let granted = shell
        .engine_mut()
        .request_permission(surface, PermissionType::Notifications)
        .unwrap();
    let other = shell
        .engine_mut()
        .request_permission(surface, PermissionType::Camera)
        .unwrap();
    shell.settle();

    assert_eq!(shell.engine().permission_answers(), &[(granted, true), (other, false)]);
}

#[test]
fn test_permission_from_unknown_surface_is_denied() {
    let (mut shell, _rx) = shell();
    shell.set_permission_decider(Box::new(CameraOnly));
    let decision = shell.route_permission(SurfaceId(999), 7, "https://example.com", PermissionType::Camera);
    assert_eq!(decision, PermissionDecision::Deny);
    assert_eq!(shell.engine().permission_answers(), &[(7, false)]);
}

// ─── Geometry ───

#[test]
fn test_main_window_resize_relayouts_surfaces() {
    let (mut shell, _rx) = shell();
    let (_, surface) = web_tab(&mut shell);
    let main = shell.engine().main_window();

    shell.engine_mut().resize_by_user(main, 1000, 700);
    shell.settle();

    assert_eq!(
        shell.engine().surface(surface).unwrap().bounds,
        Bounds::new(8, 120, 984, 580)
    );
}

#[test]
fn test_detached_window_resize_fills_window() {
    let (mut shell, _rx) = shell();
    let (id, _) = web_tab(&mut shell);
    let window = shell.detach(&id).unwrap();
    let surface = shell.surfaces().surface_of(&id).unwrap();

    shell.engine_mut().resize_by_user(window, 900, 600);
    shell.settle();

    assert_eq!(shell.engine().surface(surface).unwrap().bounds, Bounds::new(0, 0, 900, 600));
}

#[test]
fn test_layout_change_moves_surfaces() {
    let (mut shell, _rx) = shell();
    let (_, surface) = web_tab(&mut shell);

    shell.set_layout(LayoutSettings {
        chrome_height: 80,
        ..LayoutSettings::default()
    });

    assert_eq!(
        shell.engine().surface(surface).unwrap().bounds,
        Bounds::new(8, 80, 1264, 720)
    );
}

#[test]
fn test_oversized_layout_collapses_content_area() {
    let (mut shell, _rx) = shell();
    let (_, surface) = web_tab(&mut shell);

    shell.set_layout(LayoutSettings {
        chrome_height: u32::MAX,
        inset_left: u32::MAX,
        inset_right: u32::MAX,
        inset_bottom: u32::MAX,
    });

    assert_eq!(
        shell.engine().surface(surface).unwrap().bounds,
        Bounds::new(i32::MAX, i32::MAX, 0, 0)
    );
    let id = shell.create_tab(Some("rust-lang.org"));
    assert_eq!(shell.registry().active_id(), Some(&id));
    assert_eq!(shell.registry().len(), 2);
}

#[test]
fn test_devtools_setting_applies_to_new_surfaces() {
    let (mut shell, _rx) = shell();
    let (_, first) = web_tab(&mut shell);

    let mut settings = ShellSettings::default();
    settings.general.devtools = true;
    shell.apply_settings(settings);
    let id = shell.create_tab(Some("rust-lang.org"));
    let second = shell.surfaces().surface_of(&id).unwrap();

    assert!(!shell.engine().surface(first).unwrap().config.devtools);
    assert!(shell.engine().surface(second).unwrap().config.devtools);
    assert!(!shell.engine().surface(second).unwrap().config.expose_bridge);
}

// ─── Shutdown ───

#[test]
fn test_main_window_close_shuts_down() {
    let (mut shell, mut rx) = shell();
    web_tab(&mut shell);
    drain(&mut rx);
    let main = shell.engine().main_window();

    shell.engine_mut().close_by_user(main);
    shell.settle();

    assert!(shell.is_shut_down());
    let events: Vec<ShellEvent> = drain(&mut rx).into_iter().map(|e| e.event).collect();
    assert_eq!(events, vec![ShellEvent::Shutdown]);
}

#[test]
fn test_nothing_happens_after_shutdown() {
    let (mut shell, mut rx) = shell();
    let (_, surface) = web_tab(&mut shell);
    shell.shutdown();
    shell.shutdown();
    drain(&mut rx);

    let outcome = shell.dispatch(UiIntent::CreateTab { url: None });
    assert!(!outcome.ok);
    shell.route_permission(surface, 1, "https://example.com", PermissionType::Camera);
    shell.settle();

    assert!(drain(&mut rx).is_empty());
    assert_eq!(shell.engine().surface_count(), 0);
}
