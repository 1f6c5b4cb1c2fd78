// Noxx shared type definitions
// Plain data exchanged between the shell, its collaborators and the UI.

pub mod errors;
pub mod history;
pub mod intent;
pub mod permission;
pub mod settings;
pub mod surface;
pub mod tab;
