//! Annotation store backends and the local video library.

pub mod json_file;
pub mod library;
pub mod memory;

pub use json_file::JsonFileAnnotationStore;
pub use library::VideoLibrary;
pub use memory::MemoryAnnotationStore;
