pub mod clipboard;

pub use clipboard::ClipboardPort;
