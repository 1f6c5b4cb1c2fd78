//! NoxX: a multi-tab desktop browser shell.
//!
//! Entry point: opens the main window and runs the shell on the event loop.
//! When built without the `gui` feature, walks a headless shell through its
//! core behaviours on the console instead.

use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("NOXX_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(feature = "gui")]
fn main() {
    init_tracing();
    noxx::ui::webview_app::run();
}

#[cfg(not(feature = "gui"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    println!();
    println!("NoxX v{} (headless walkthrough)", env!("CARGO_PKG_VERSION"));
    println!();

    let mut app = noxx::app::App::in_memory(None)?;
    demo_tabs(&mut app);
    demo_navigation(&mut app)?;
    demo_detach(&mut app)?;
    demo_history(&mut app)?;
    demo_shutdown(&mut app);

    println!();
    println!("Walkthrough finished.");
    Ok(())
}

#[cfg(not(feature = "gui"))]
fn section(name: &str) {
    println!("--- {} ---", name);
}

#[cfg(not(feature = "gui"))]
fn print_tabs(app: &noxx::app::App) {
    use noxx::managers::tab_registry::TabRegistryTrait;
    let active = app.shell.registry().active_id().cloned();
    for tab in app.shell.registry().tabs() {
        let marker = if Some(&tab.id) == active.as_ref() { "*" } else { " " };
        println!("  {} [{:?}] {} ({})", marker, tab.kind, tab.title, tab.url);
    }
}

#[cfg(not(feature = "gui"))]
fn demo_tabs(app: &mut noxx::app::App) {
    section("Tabs");
    app.shell.create_tab(Some("example.com"));
    app.shell.create_tab(Some("openai com"));
    app.settle();
    print_tabs(app);
    println!();
}

#[cfg(not(feature = "gui"))]
fn demo_navigation(app: &mut noxx::app::App) -> Result<(), noxx::types::errors::ShellError> {
    use noxx::managers::navigation_history::NavigationHistoryTrait;
    use noxx::managers::tab_registry::TabRegistryTrait;
    section("Navigation");
    let Some(id) = app.shell.registry().active_id().cloned() else {
        return Ok(());
    };
    app.shell.load_url(&id, "rust-lang.org")?;
    app.settle();
    println!("  shadow back stack: {:?}", app.shell.history().back_stack(&id));
    let back = app.shell.go_back(&id)?;
    app.settle();
    println!("  back -> {:?}", back);
    let forward = app.shell.go_forward(&id)?;
    app.settle();
    println!("  forward -> {:?}", forward);
    println!();
    Ok(())
}

#[cfg(not(feature = "gui"))]
fn demo_detach(app: &mut noxx::app::App) -> Result<(), noxx::types::errors::ShellError> {
    use noxx::managers::tab_registry::TabRegistryTrait;
    section("Detach and reattach");
    let Some(id) = app.shell.registry().first_web_tab().map(|t| t.id.clone()) else {
        return Ok(());
    };
    let window = app.shell.detach(&id)?;
    app.settle();
    println!("  tab {} now lives in {}", id, window);
    print_tabs(app);
    app.shell.reattach(&id)?;
    app.settle();
    println!("  reattached:");
    print_tabs(app);
    println!();
    Ok(())
}

#[cfg(not(feature = "gui"))]
fn demo_history(app: &mut noxx::app::App) -> Result<(), noxx::types::errors::HistoryError> {
    use noxx::managers::history_manager::HistoryManagerTrait;
    section("Global history");
    for entry in app.history_manager.list_recent(10)? {
        println!("  {} x{} {}", entry.url, entry.visit_count, entry.title);
    }
    println!();
    Ok(())
}

#[cfg(not(feature = "gui"))]
fn demo_shutdown(app: &mut noxx::app::App) {
    section("Shutdown");
    app.shutdown();
    let events = app.pump();
    println!("  shut down: {} (last notification: {:?})", app.shell.is_shut_down(), events.last().map(|e| &e.event));
}
