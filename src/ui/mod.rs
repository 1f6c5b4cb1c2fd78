//! NoxX desktop front end.
//!
//! Uses `tao` for native windows and `wry` for web content:
//! - Windows: WebView2
//! - Linux: WebKitGTK
//! - macOS: WKWebView
//!
//! The main window carries one chrome webview (tab strip, toolbar, homepage)
//! spanning the window, with page surfaces laid over its content area. The
//! chrome talks to the shell only through serialized intents and
//! notifications; page surfaces get no bridge at all.

pub mod chrome;
pub mod webview_app;
pub mod wry_engine;

use crate::types::intent::UiIntent;
use crate::types::surface::EngineEvent;

/// Everything delivered to the event loop from webview callbacks.
#[derive(Debug)]
pub enum UserEvent {
    /// A surface or window callback, already translated.
    Engine(EngineEvent),
    /// A request posted by the chrome page.
    Intent(UiIntent),
    /// The chrome page finished loading and wants current state.
    ChromeReady,
    /// A page asked for a new window; it opens as a tab instead.
    OpenTab(String),
}
