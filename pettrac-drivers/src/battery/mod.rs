//! Battery gauge drivers

pub mod pisugar;

pub use pisugar::PiSugar3;
