pub mod autosave;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod connect;
pub mod input;
pub mod mutation;
pub mod session;
pub mod shortcuts;
pub mod tools;

pub use autosave::SaveStatus;
pub use clipboard::{CLIPBOARD_MARKER, ClipboardPayload, PasteRoute};
pub use config::EditorConfig;
pub use input::Modifiers;
pub use session::EditorSession;
