//! Turn/phase state machine and burden bidding.

pub mod machine;

pub use machine::{FellowshipHolder, GamePhase, PhaseError, PhaseMachine, PhaseSignal};
