/// Alert decision, cooldown and message content
pub mod cooldown;
pub mod decision;
pub mod message;

pub use cooldown::Cooldown;
pub use decision::{AlertBand, AlertDecisionEngine, AlertPhase, Decision};
pub use message::AlertMessage;
