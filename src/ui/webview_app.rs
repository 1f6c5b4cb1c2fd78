//! Desktop entry point: a `tao` event loop driving the shell through
//! [`WryEngine`].
//!
//! All shell work happens on the event loop thread. Webview callbacks only
//! post [`UserEvent`]s through the loop proxy; the loop applies them, lets
//! the engine build whatever native objects the shell asked for, and
//! forwards notifications to the chrome page.

use tao::dpi::LogicalSize;
use tao::event::{Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy};
use tao::window::{Window, WindowBuilder};
use tracing::{error, info, warn};
use wry::{WebView, WebViewBuilder};

use super::chrome::{deliver, CHROME_HTML};
use super::wry_engine::WryEngine;
use super::UserEvent;
use crate::app::App;
use crate::engine::RenderEngine;
use crate::managers::tab_registry::TabRegistryTrait;
use crate::platform;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::intent::{ShellEvent, UiIntent};
use crate::types::settings::ShellSettings;
use crate::types::surface::EngineEvent;

const WINDOW_TITLE: &str = "NoxX Browser";

fn chrome_rect(width: u32, height: u32) -> wry::Rect {
    wry::Rect {
        position: tao::dpi::LogicalPosition::new(0, 0).into(),
        size: LogicalSize::new(width, height).into(),
    }
}

fn build_chrome(window: &Window, proxy: EventLoopProxy<UserEvent>) -> Result<WebView, wry::Error> {
    let size = window.inner_size().to_logical::<u32>(window.scale_factor());
    WebViewBuilder::new()
        .with_html(CHROME_HTML)
        .with_bounds(chrome_rect(size.width, size.height))
        .with_devtools(cfg!(debug_assertions))
        .with_ipc_handler(move |msg: wry::http::Request<String>| {
            let body = msg.body().as_str();
            let event = match serde_json::from_str::<UiIntent>(body) {
                Ok(intent) => UserEvent::Intent(intent),
                Err(_) if body.contains("\"ready\"") => UserEvent::ChromeReady,
                Err(e) => {
                    warn!(error = %e, "chrome sent an unreadable message");
                    return;
                }
            };
            let _ = proxy.send_event(event);
        })
        .build_as_child(window)
}

/// Settings are read once up front to size the main window.
fn initial_settings() -> ShellSettings {
    let mut engine = SettingsEngine::new(None);
    engine.load().unwrap_or_default()
}

pub fn run() {
    let settings = initial_settings();

    let event_loop: EventLoop<UserEvent> = EventLoopBuilder::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let window = match WindowBuilder::new()
        .with_title(WINDOW_TITLE)
        .with_inner_size(LogicalSize::new(settings.window.width, settings.window.height))
        .with_min_inner_size(LogicalSize::new(settings.window.min_width, settings.window.min_height))
        .build(&event_loop)
    {
        Ok(w) => w,
        Err(e) => {
            error!(error = %e, "main window could not be created");
            return;
        }
    };

    let chrome = match build_chrome(&window, proxy.clone()) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "chrome webview could not be created");
            return;
        }
    };

    let data_dir = platform::get_data_dir();
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        warn!(dir = %data_dir.display(), error = %e, "could not create data directory");
    }
    let engine = WryEngine::new(proxy, window, WINDOW_TITLE);
    let mut app = match App::new(data_dir.join("noxx.db"), None, engine) {
        Ok(a) => a,
        Err(e) => {
            error!(error = %e, "failed to start");
            return;
        }
    };
    info!("noxx started");

    event_loop.run(move |event, target, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent { event: WindowEvent::CloseRequested, window_id, .. } => {
                if let Some(e) = app.shell.engine_mut().close_requested(window_id) {
                    app.shell.handle_engine_event(e);
                }
            }
            Event::WindowEvent { event: WindowEvent::Resized(_), window_id, .. } => {
                if let Some(e) = app.shell.engine_mut().resized(window_id) {
                    if let EngineEvent::WindowResized { window, width, height } = &e {
                        if *window == app.shell.engine().main_window() {
                            let _ = chrome.set_bounds(chrome_rect(*width, *height));
                        }
                    }
                    app.shell.handle_engine_event(e);
                }
            }
            Event::UserEvent(UserEvent::Engine(e)) => {
                app.shell.engine_mut().observe(&e);
                app.shell.handle_engine_event(e);
            }
            Event::UserEvent(UserEvent::Intent(intent)) => {
                let intent_json = serde_json::to_string(&intent).unwrap_or_else(|_| "{}".into());
                let outcome = app.shell.dispatch(intent);
                if let Ok(outcome_json) = serde_json::to_string(&outcome) {
                    let _ = chrome.evaluate_script(&format!(
                        "window.__noxx&&window.__noxx.outcome({},{})",
                        intent_json, outcome_json
                    ));
                }
            }
            Event::UserEvent(UserEvent::ChromeReady) => {
                let chrome_height = app.shell.settings().layout.chrome_height;
                let _ = chrome.evaluate_script(&format!(
                    "window.__noxx&&window.__noxx.layout({})",
                    chrome_height
                ));
                let snapshot = ShellEvent::TabsUpdated(app.shell.registry().snapshot());
                if let Some(js) = deliver("receive", &snapshot) {
                    let _ = chrome.evaluate_script(&js);
                }
            }
            Event::UserEvent(UserEvent::OpenTab(url)) => {
                app.shell.create_tab(Some(&url));
            }
            _ => return,
        }

        app.shell.engine_mut().realize(target);
        for envelope in app.pump() {
            if let Some(js) = deliver("receive", &envelope) {
                let _ = chrome.evaluate_script(&js);
            }
        }
        if app.shell.is_shut_down() {
            info!("shell shut down, exiting");
            *control_flow = ControlFlow::Exit;
        }
    });
}

