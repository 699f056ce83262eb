/// Discrete frame index. Frames are zero-based; negative values only appear
/// transiently (e.g. stepping backwards) and are clamped before use.
pub type FrameIndex = i64;

/// Annotation identifiers are server-assigned UUID strings.
pub type AnnotationId = String;

/// Videos are identified by their file stem.
pub type VideoId = String;
