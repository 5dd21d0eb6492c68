pub mod correlator;
pub mod delivery;
pub mod typewriter;

pub use correlator::{CorrelatorError, ResponseCorrelator};
pub use delivery::{DeliveryChannel, StreamFrame};
pub use typewriter::Typewriter;
