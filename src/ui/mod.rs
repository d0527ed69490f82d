pub mod icons;
pub mod launch;
pub mod presenter;

pub use launch::LaunchUI;
pub use presenter::ConsolePresenter;
