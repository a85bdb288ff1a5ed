//! Host system statistics

/// Utilization and temperature of the host
///
/// A metric that could not be read is reported as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SystemStats {
    /// CPU utilization in percent since the previous sample
    pub cpu: f32,
    /// Memory in use, percent of total
    pub memory: f32,
    /// Root filesystem in use, percent of total
    pub disk: f32,
    /// SoC temperature in degrees Celsius
    pub temperature: f32,
}

/// Source of [`SystemStats`]
pub trait SystemStatsSource {
    /// Take one sample
    ///
    /// Takes `&mut self` because CPU utilization is a delta between samples.
    fn sample(&mut self) -> SystemStats;
}
