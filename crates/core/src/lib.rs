pub mod annotation;
pub mod binder;
pub mod collection;
pub mod error;
pub mod ffmpeg;
pub mod looping;
pub mod metadata;
pub mod playback;
pub mod range;
pub mod store;
pub mod timing;
pub mod types;
pub mod video;
