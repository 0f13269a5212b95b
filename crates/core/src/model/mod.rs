mod ids;
mod language;
mod patch;
mod progress;
mod stats;

pub use ids::UserId;
pub use language::Language;
pub use patch::{ProgressPatch, ProgressPatchDraft};
pub use progress::{DEFAULT_LEVEL, DEFAULT_STARS, Progress, ProgressError};
pub use stats::{ProgressStats, ProgressTotals};
