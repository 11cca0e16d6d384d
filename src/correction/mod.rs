//! Automatic correction of study routines.
//!
//! - **CorrectionTrigger**: threshold policy over tau_neg and the fixed-width
//!   feedback vector
//! - **CorrectionDispatcher**: reads a subject's window and forwards triggered
//!   decisions to a [`RoutineRegenerator`]

pub mod dispatcher;
pub mod trigger;

pub use dispatcher::{
    CorrectionDispatcher, DispatchOutcome, RecordingRegenerator, RoutineRegenerator,
};
pub use trigger::CorrectionTrigger;
