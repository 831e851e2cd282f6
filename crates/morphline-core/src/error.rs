use thiserror::Error;

/// Failures surfaced by alignment, mapping and timeline resolution.
///
/// Errors are `Clone` so a failed segment plan can be memoized next to the
/// successful ones.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MorphError {
    #[error("vertex count mismatch: start shape has {start} vertices, end shape has {end}; both must share the same vertex resolution")]
    VertexCountMismatch { start: usize, end: usize },

    #[error("vertex loops must have equal length to align (got {start} and {end})")]
    LoopLengthMismatch { start: usize, end: usize },

    #[error("explicit mapping pair ({start}, {end}) is out of range for {start_len} start and {end_len} end items")]
    IndexOutOfRange {
        start: usize,
        end: usize,
        start_len: usize,
        end_len: usize,
    },

    #[error("the {mapper} mapper is unavailable: {remedy}")]
    MapperUnavailable {
        mapper: &'static str,
        remedy: &'static str,
    },

    #[error("a match needs at least one of start or end")]
    EmptyMatch,

    #[error("keystate time {0} is outside [0, 1]")]
    KeystateTime(f64),

    #[error("timeline has no keystates")]
    EmptyTimeline,

    #[error("segment does not fit its time range: {0}")]
    SegmentTiming(&'static str),

    #[error("cached plan at `{0}` does not hold the expected kind of result")]
    PlanMismatch(String),
}
