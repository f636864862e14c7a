pub mod lifetime;
pub mod persistent;
pub mod trait_def;
pub mod windowed;

pub use lifetime::LifetimeTracker;
pub use persistent::PersistentTracker;
pub use trait_def::{Tracker, TrackerError, TrackerResult};
pub use windowed::WindowedTracker;
