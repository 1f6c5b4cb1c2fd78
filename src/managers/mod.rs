// NoxX state managers
// Stateful components owned by the shell (tabs, shadow history, surfaces,
// detached windows) and the SQLite-backed collaborators (history, permissions).

pub mod detach_coordinator;
pub mod history_manager;
pub mod navigation_history;
pub mod permission_manager;
pub mod surface_manager;
pub mod tab_registry;
