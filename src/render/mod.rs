//! From scenes to frames.

/// Clip construction and frame streaming.
pub mod assembler;
/// Timeline layout, transitions and global fades.
pub mod compositor;
pub mod frame;
/// Resolved per-clip plan built from scenes and configuration.
pub mod plan;
