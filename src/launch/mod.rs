pub mod controller;
pub mod reset;
pub mod surface;

pub use controller::{LaunchController, LaunchState, Presentation, SharedController};
pub use reset::TapReset;
pub use surface::{LoadEvent, LoadTracker, Presenter, present};
