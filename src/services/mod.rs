// NoxX services
// Stateless or file-backed helpers: input classification, settings, and the
// outbound sync channel.

pub mod input_classifier;
pub mod settings_engine;
pub mod sync_channel;
