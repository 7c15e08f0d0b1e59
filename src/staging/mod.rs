//! Client-side staging of writes until an explicit commit.

mod staging_buffer;

pub use staging_buffer::{
    SaveFailure, SaveOptions, SaveReport, StageKey, StagedHandle, StagedOutcome, StagingBuffer,
    StagingEntry,
};
