//! Loading, back/forward and reload through the shell, covering the
//! native-first rule and the shadow stacks around the homepage location.

use noxx::engine::{HeadlessEngine, RenderEngine};
use noxx::managers::navigation_history::NavigationHistoryTrait;
use noxx::managers::tab_registry::TabRegistryTrait;
use noxx::shell::Shell;
use noxx::types::errors::ShellError;
use noxx::types::intent::{Envelope, ShellEvent};
use noxx::types::settings::ShellSettings;
use noxx::types::tab::{TabId, TabKind, HOMEPAGE_URL};
use tokio::sync::mpsc::UnboundedReceiver;

const GITHUB: &str = "https://github.com";

fn shell() -> (Shell<HeadlessEngine>, UnboundedReceiver<Envelope>) {
    let mut shell = Shell::new(HeadlessEngine::default(), ShellSettings::default());
    let rx = shell.subscribe();
    (shell, rx)
}

fn events(rx: &mut UnboundedReceiver<Envelope>) -> Vec<ShellEvent> {
    let mut out = Vec::new();
    while let Ok(e) = rx.try_recv() {
        out.push(e.event);
    }
    out
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Homepage tab that navigated to github.com.
fn on_github() -> (Shell<HeadlessEngine>, UnboundedReceiver<Envelope>, TabId) {
    let (mut shell, rx) = shell();
    let id = shell.create_tab(None);
    shell.load_url(&id, "github.com").unwrap();
    shell.settle();
    (shell, rx, id)
}

// ─── Homepage round trip ───

#[test]
fn test_homepage_tab_becomes_web_on_load() {
    let (shell, _rx, id) = on_github();

    let tab = shell.registry().get(&id).unwrap();
    assert_eq!(tab.kind, TabKind::Web);
    assert_eq!(tab.url, GITHUB);
    let surface = shell.surfaces().surface_of(&id).unwrap();
    assert_eq!(shell.engine().current_url(surface).as_deref(), Some(GITHUB));
    assert_eq!(shell.history().back_stack(&id), strings(&[HOMEPAGE_URL, GITHUB]).as_slice());
    assert!(shell.history().forward_stack(&id).is_empty());
}

#[test]
fn test_back_to_homepage_destroys_surface() {
    let (mut shell, _rx, id) = on_github();

    let landed = shell.go_back(&id).unwrap();
    assert_eq!(landed.as_deref(), Some(HOMEPAGE_URL));
    assert!(!shell.surfaces().has_surface(&id));
    assert_eq!(shell.engine().surface_count(), 0);

    let tab = shell.registry().active().unwrap();
    assert_eq!(tab.id, id);
    assert_eq!(tab.kind, TabKind::Homepage);
    assert_eq!(shell.history().forward_stack(&id), strings(&[GITHUB]).as_slice());
    assert_eq!(shell.history().back_stack(&id), strings(&[HOMEPAGE_URL]).as_slice());
}

#[test]
fn test_forward_from_homepage_recreates_surface() {
    let (mut shell, _rx, id) = on_github();
    shell.go_back(&id).unwrap();

    let landed = shell.go_forward(&id).unwrap();
    assert_eq!(landed.as_deref(), Some(GITHUB));
    let surface = shell.surfaces().surface_of(&id).unwrap();
    assert_eq!(shell.engine().current_url(surface).as_deref(), Some(GITHUB));
    assert!(shell.engine().surface(surface).unwrap().visible);
    assert!(shell.history().forward_stack(&id).is_empty());
    assert_eq!(shell.history().back_stack(&id).len(), 2);
    assert_eq!(shell.registry().get(&id).unwrap().kind, TabKind::Web);
}

#[test]
fn test_new_navigation_after_back_clears_forward_stack() {
    let (mut shell, _rx, id) = on_github();
    shell.go_back(&id).unwrap();
    assert!(!shell.history().forward_stack(&id).is_empty());

    shell.load_url(&id, "rust-lang.org").unwrap();
    assert!(shell.history().forward_stack(&id).is_empty());
    assert_eq!(
        shell.history().back_stack(&id),
        strings(&[HOMEPAGE_URL, "https://rust-lang.org"]).as_slice()
    );
}

// ─── Native first ───

#[test]
fn test_back_uses_native_history_when_available() {
    let (mut shell, _rx, id) = on_github();
    shell.load_url(&id, "rust-lang.org").unwrap();
    shell.settle();

    let landed = shell.go_back(&id).unwrap();
    assert_eq!(landed.as_deref(), Some(GITHUB));
    // Shadow stacks are left alone on the native path.
    assert_eq!(shell.history().back_stack(&id).len(), 3);
    assert!(shell.history().forward_stack(&id).is_empty());
    assert!(shell.surfaces().has_surface(&id));

    shell.settle();
    assert_eq!(shell.registry().get(&id).unwrap().url, GITHUB);

    let again = shell.go_forward(&id).unwrap();
    assert_eq!(again.as_deref(), Some("https://rust-lang.org"));
}

#[test]
fn test_nothing_to_go_back_to() {
    let (mut shell, _rx) = shell();
    let id = shell.create_tab(None);
    assert_eq!(shell.go_back(&id).unwrap(), None);
    assert_eq!(shell.go_forward(&id).unwrap(), None);
}

#[test]
fn test_navigation_on_unknown_tab_is_rejected() {
    let (mut shell, _rx) = shell();
    shell.create_tab(None);
    let ghost = TabId::from("ghost");
    assert_eq!(shell.go_back(&ghost), Err(ShellError::UnknownTab(ghost.clone())));
    assert_eq!(shell.go_forward(&ghost), Err(ShellError::UnknownTab(ghost.clone())));
    assert_eq!(shell.reload(&ghost), Err(ShellError::UnknownTab(ghost.clone())));
    assert!(matches!(shell.load_url(&ghost, "example.com"), Err(ShellError::UnknownTab(_))));
}

// ─── Input classification ───

#[test]
fn test_free_text_loads_search_url() {
    let (mut shell, _rx) = shell();
    let id = shell.create_tab(None);
    let url = shell.load_url(&id, "openai com").unwrap();
    assert_eq!(url, "https://www.google.com/search?q=openai+com");
    assert_ne!(url, "https://openai com");
}

#[test]
fn test_url_like_input_gets_https() {
    let (mut shell, _rx) = shell();
    let id = shell.create_tab(None);
    assert_eq!(shell.load_url(&id, "example.com/path").unwrap(), "https://example.com/path");
}

#[test]
fn test_blank_input_is_rejected_before_recording() {
    let (mut shell, _rx) = shell();
    let id = shell.create_tab(None);
    assert!(matches!(shell.load_url(&id, "   "), Err(ShellError::InvalidOperation(_))));
    assert_eq!(shell.history().back_stack(&id).len(), 1);
}

#[test]
fn test_search_template_comes_from_settings() {
    let mut settings = ShellSettings::default();
    settings.general.search_template = "https://duckduckgo.com/?q={query}".to_string();
    let mut shell = Shell::new(HeadlessEngine::default(), settings);
    let id = shell.create_tab(None);
    assert_eq!(
        shell.load_url(&id, "rust ownership").unwrap(),
        "https://duckduckgo.com/?q=rust+ownership"
    );
}

// ─── Homepage singleton ───

#[test]
fn test_second_tab_reaching_homepage_is_parked() {
    let (mut shell, _rx) = shell();
    let home = shell.create_tab(None);
    let web = shell.create_tab(Some("example.com"));

    shell.load_url(&web, HOMEPAGE_URL).unwrap();

    let homepages = shell.registry().tabs().iter().filter(|t| t.is_homepage()).count();
    assert_eq!(homepages, 1);
    let parked = shell.registry().get(&web).unwrap();
    assert!(parked.is_parked());
    assert!(!shell.surfaces().has_surface(&web));
    assert_eq!(shell.registry().active_id(), Some(&home));
}

#[test]
fn test_parked_tab_can_go_back_to_its_page() {
    let (mut shell, _rx) = shell();
    shell.create_tab(None);
    let web = shell.create_tab(Some("example.com"));
    shell.load_url(&web, HOMEPAGE_URL).unwrap();
    shell.switch_active_tab(&web);

    let landed = shell.go_back(&web).unwrap();
    assert_eq!(landed.as_deref(), Some("https://example.com"));
    let tab = shell.registry().get(&web).unwrap();
    assert_eq!(tab.kind, TabKind::Web);
    assert!(!tab.is_parked());
    let surface = shell.surfaces().surface_of(&web).unwrap();
    assert!(shell.engine().surface(surface).unwrap().visible);
}

// ─── Reload and load failures ───

#[test]
fn test_reload_web_tab() {
    let (mut shell, _rx, id) = on_github();
    assert_eq!(shell.reload(&id), Ok(true));
    assert!(shell.registry().get(&id).unwrap().loading);
    let surface = shell.surfaces().surface_of(&id).unwrap();
    assert_eq!(shell.engine().surface(surface).unwrap().reloads, 1);

    shell.settle();
    assert!(!shell.registry().get(&id).unwrap().loading);
}

#[test]
fn test_reload_homepage_does_nothing() {
    let (mut shell, _rx) = shell();
    let id = shell.create_tab(None);
    assert_eq!(shell.reload(&id), Ok(false));
}

#[test]
fn test_failed_load_is_flagged_on_notification() {
    let (mut shell, mut rx) = shell();
    let id = shell.create_tab(None);
    shell.load_url(&id, "noxx://settings").unwrap();
    shell.settle();

    let tab = shell.registry().get(&id).unwrap();
    assert_eq!(tab.url, "noxx://settings");
    assert!(!tab.loading);

    let evs = events(&mut rx);
    let finished = evs
        .iter()
        .find_map(|e| match e {
            ShellEvent::LoadFinished { tab_id, error, .. } if tab_id == &id => Some(error.clone()),
            _ => None,
        })
        .expect("load-finished notification");
    assert_eq!(finished.unwrap().code, "ERR_UNKNOWN_URL_SCHEME");
    assert!(!evs.iter().any(|e| matches!(e, ShellEvent::AddHistoryItem(_))));
}
