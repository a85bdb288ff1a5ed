//! Battery monitor
//!
//! Polled once per tick. Alarm transitions are logged once, not on every
//! poll, and the shutdown request is latched so it is issued at most once
//! per process.

use log::{error, info, warn};

use super::policy::{BatteryAlarm, BatteryReading, BatteryThresholds};
use crate::traits::{BatterySensor, ShutdownTrigger, SystemStats, SystemStatsSource};

/// Outcome of one monitor poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryStatus {
    pub reading: BatteryReading,
    /// Alarm level after this poll
    pub alarm: BatteryAlarm,
    /// Alarm level before this poll
    pub previous: BatteryAlarm,
    /// The OS shutdown request was issued during this poll
    pub shutdown_requested: bool,
}

impl BatteryStatus {
    /// Alarm level got worse during this poll
    pub fn worsened(&self) -> bool {
        self.alarm > self.previous
    }
}

/// Battery gauge plus threshold policy
pub struct BatteryMonitor {
    sensor: Box<dyn BatterySensor>,
    stats: Option<Box<dyn SystemStatsSource>>,
    trigger: Box<dyn ShutdownTrigger>,
    thresholds: BatteryThresholds,
    alarm: BatteryAlarm,
    shutdown_requested: bool,
}

impl BatteryMonitor {
    pub fn new(
        sensor: Box<dyn BatterySensor>,
        trigger: Box<dyn ShutdownTrigger>,
        thresholds: BatteryThresholds,
    ) -> Self {
        if !thresholds.is_ordered() {
            warn!(
                "Battery thresholds not ordered (low={} critical={} shutdown={})",
                thresholds.low, thresholds.critical, thresholds.shutdown
            );
        }
        Self {
            sensor,
            stats: None,
            trigger,
            thresholds,
            alarm: BatteryAlarm::None,
            shutdown_requested: false,
        }
    }

    /// Attach a host statistics source
    pub fn with_system_stats(mut self, stats: Box<dyn SystemStatsSource>) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn thresholds(&self) -> BatteryThresholds {
        self.thresholds
    }

    /// Current alarm level
    pub fn alarm(&self) -> BatteryAlarm {
        self.alarm
    }

    /// Read the gauge and apply the threshold policy
    ///
    /// An unknown percentage leaves the alarm level unchanged.
    pub fn read(&mut self) -> BatteryStatus {
        let reading = self.sensor.read();
        let previous = self.alarm;
        let mut requested = false;

        if let Some(percentage) = reading.percentage {
            let alarm = self.thresholds.classify(percentage);
            if alarm != previous {
                log_alarm(alarm, percentage);
            }
            if alarm == BatteryAlarm::Shutdown {
                requested = self.request_shutdown();
            }
            self.alarm = alarm;
        }

        BatteryStatus {
            reading,
            alarm: self.alarm,
            previous,
            shutdown_requested: requested,
        }
    }

    /// Sample host statistics; all zero without a source
    pub fn system_stats(&mut self) -> SystemStats {
        self.stats
            .as_mut()
            .map(|source| source.sample())
            .unwrap_or_default()
    }

    fn request_shutdown(&mut self) -> bool {
        if self.shutdown_requested || !self.thresholds.shutdown_enabled() {
            return false;
        }
        self.shutdown_requested = true;
        error!("Initiating automatic shutdown due to critically low battery");
        if let Err(e) = self.trigger.request_shutdown() {
            error!("Failed to initiate shutdown: {}", e);
        }
        true
    }
}

fn log_alarm(alarm: BatteryAlarm, percentage: u8) {
    match alarm {
        BatteryAlarm::Shutdown => error!("Battery critically low ({}%), shutting down", percentage),
        BatteryAlarm::Critical => error!("Battery critically low ({}%)", percentage),
        BatteryAlarm::Low => warn!("Battery low ({}%)", percentage),
        BatteryAlarm::None => info!("Battery ok ({}%)", percentage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ShutdownError;
    use core::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Gauge replaying a fixed sequence of readings
    struct ScriptedGauge {
        readings: VecDeque<BatteryReading>,
    }

    impl ScriptedGauge {
        fn percentages(values: &[u8]) -> Box<Self> {
            Box::new(Self {
                readings: values
                    .iter()
                    .map(|&p| BatteryReading {
                        percentage: Some(p),
                        voltage_mv: Some(3700),
                        charging: Some(false),
                    })
                    .collect(),
            })
        }
    }

    impl BatterySensor for ScriptedGauge {
        fn read(&mut self) -> BatteryReading {
            self.readings.pop_front().unwrap_or_default()
        }
    }

    #[derive(Clone, Default)]
    struct CountingTrigger {
        calls: Rc<Cell<u32>>,
        fail: bool,
    }

    impl ShutdownTrigger for CountingTrigger {
        fn request_shutdown(&mut self) -> Result<(), ShutdownError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                Err(ShutdownError::Spawn(std::io::Error::from(
                    std::io::ErrorKind::NotFound,
                )))
            } else {
                Ok(())
            }
        }
    }

    struct FixedStats(RefCell<u32>);

    impl SystemStatsSource for FixedStats {
        fn sample(&mut self) -> SystemStats {
            *self.0.borrow_mut() += 1;
            SystemStats {
                cpu: 12.5,
                memory: 40.0,
                disk: 55.0,
                temperature: 48.2,
            }
        }
    }

    #[test]
    fn test_threshold_sequence() {
        let trigger = CountingTrigger::default();
        let mut monitor = BatteryMonitor::new(
            ScriptedGauge::percentages(&[25, 15, 8, 3]),
            Box::new(trigger.clone()),
            BatteryThresholds::default(),
        );

        let alarms: Vec<_> = (0..4).map(|_| monitor.read()).collect();
        assert_eq!(alarms[0].alarm, BatteryAlarm::None);
        assert_eq!(alarms[1].alarm, BatteryAlarm::Low);
        assert_eq!(alarms[2].alarm, BatteryAlarm::Critical);
        assert_eq!(alarms[3].alarm, BatteryAlarm::Shutdown);
        assert!(alarms[3].shutdown_requested);
        assert!(alarms.iter().skip(1).all(|s| s.worsened()));
        assert_eq!(trigger.calls.get(), 1);
    }

    #[test]
    fn test_shutdown_requested_once() {
        let trigger = CountingTrigger {
            fail: true,
            ..Default::default()
        };
        let mut monitor = BatteryMonitor::new(
            ScriptedGauge::percentages(&[4, 3, 2]),
            Box::new(trigger.clone()),
            BatteryThresholds::default(),
        );
        assert!(monitor.read().shutdown_requested);
        assert!(!monitor.read().shutdown_requested);
        assert!(!monitor.read().shutdown_requested);
        assert_eq!(trigger.calls.get(), 1);
    }

    #[test]
    fn test_zero_threshold_never_requests() {
        let trigger = CountingTrigger::default();
        let mut monitor = BatteryMonitor::new(
            ScriptedGauge::percentages(&[0]),
            Box::new(trigger.clone()),
            BatteryThresholds {
                shutdown: 0,
                ..Default::default()
            },
        );
        let status = monitor.read();
        assert_eq!(status.alarm, BatteryAlarm::Shutdown);
        assert!(!status.shutdown_requested);
        assert_eq!(trigger.calls.get(), 0);
    }

    #[test]
    fn test_unknown_percentage_keeps_alarm() {
        let mut gauge = ScriptedGauge::percentages(&[15]);
        gauge.readings.push_back(BatteryReading {
            percentage: None,
            voltage_mv: Some(3600),
            charging: None,
        });
        let mut monitor = BatteryMonitor::new(
            gauge,
            Box::new(CountingTrigger::default()),
            BatteryThresholds::default(),
        );
        monitor.read();
        let status = monitor.read();
        assert_eq!(status.alarm, BatteryAlarm::Low);
        assert!(!status.worsened());
        assert_eq!(status.reading.voltage_mv, Some(3600));
    }

    #[test]
    fn test_recovery_is_not_worsening() {
        let mut monitor = BatteryMonitor::new(
            ScriptedGauge::percentages(&[15, 50]),
            Box::new(CountingTrigger::default()),
            BatteryThresholds::default(),
        );
        monitor.read();
        let status = monitor.read();
        assert_eq!(status.alarm, BatteryAlarm::None);
        assert_eq!(status.previous, BatteryAlarm::Low);
        assert!(!status.worsened());
    }

    #[test]
    fn test_system_stats_default_to_zero() {
        let mut monitor = BatteryMonitor::new(
            ScriptedGauge::percentages(&[]),
            Box::new(CountingTrigger::default()),
            BatteryThresholds::default(),
        );
        assert_eq!(monitor.system_stats(), SystemStats::default());

        let mut monitor = monitor.with_system_stats(Box::new(FixedStats(RefCell::new(0))));
        assert_eq!(monitor.system_stats().cpu, 12.5);
    }
}
