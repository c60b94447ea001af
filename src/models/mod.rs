pub mod athlete;
pub mod common;
pub mod training;

pub use athlete::Athlete;
pub use training::{Intensity, Training};
