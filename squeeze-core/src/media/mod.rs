//! Media information and probing module
//!
//! This module provides the probe tree produced by ffprobe, the prober
//! abstraction used to obtain it, and the typed stream view used by planning.

pub mod info;
pub mod probe;

// Re-export commonly used types
pub use info::{StreamInfo, StreamType, stream_infos};
pub use probe::{FfprobeProber, MediaProbe, ProbeMode, ProbeValue, Prober};
