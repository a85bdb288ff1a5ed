//! Host statistics from procfs and sysfs
//!
//! Every metric is read independently; one that fails is reported as zero.

use std::fs;
use std::path::PathBuf;

use log::debug;
use pettrac_core::traits::{SystemStats, SystemStatsSource};

const PROC_STAT: &str = "/proc/stat";
const PROC_MEMINFO: &str = "/proc/meminfo";
const THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Aggregate CPU jiffies from the first line of `/proc/stat`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTimes {
    /// idle + iowait
    pub idle: u64,
    /// user through steal
    pub total: u64,
}

/// Parse the aggregate `cpu` line of `/proc/stat`
pub fn parse_cpu_times(stat: &str) -> Option<CpuTimes> {
    let line = stat.lines().find(|l| l.starts_with("cpu "))?;
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .take(8)
        .map(|f| f.parse().ok())
        .collect::<Option<_>>()?;
    if fields.len() < 4 {
        return None;
    }
    // guest time is already counted in user, so stop at steal
    let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
    let total = fields.iter().sum();
    Some(CpuTimes { idle, total })
}

/// Busy percentage between two samples
pub fn cpu_percent(prev: CpuTimes, cur: CpuTimes) -> f32 {
    let total = cur.total.saturating_sub(prev.total);
    if total == 0 {
        return 0.0;
    }
    let idle = cur.idle.saturating_sub(prev.idle).min(total);
    100.0 * (total - idle) as f32 / total as f32
}

/// Used memory percentage from `/proc/meminfo`
pub fn parse_memory_percent(meminfo: &str) -> Option<f32> {
    let field = |name: &str| -> Option<u64> {
        meminfo
            .lines()
            .find_map(|l| l.strip_prefix(name))?
            .trim_start_matches(':')
            .split_whitespace()
            .next()?
            .parse()
            .ok()
    };
    let total = field("MemTotal")?;
    let available = field("MemAvailable")?;
    if total == 0 {
        return None;
    }
    Some(100.0 * total.saturating_sub(available) as f32 / total as f32)
}

/// Degrees Celsius from a thermal zone reading in millidegrees
pub fn parse_temperature(raw: &str) -> Option<f32> {
    raw.trim().parse::<i64>().ok().map(|m| m as f32 / 1000.0)
}

/// Used space of the root filesystem, percent of what users can reach
#[cfg(target_os = "linux")]
fn disk_percent() -> Option<f32> {
    let stat = nix::sys::statvfs::statvfs("/").ok()?;
    let used = stat.blocks().saturating_sub(stat.blocks_free()) as u64;
    let reachable = used + stat.blocks_available() as u64;
    if reachable == 0 {
        return None;
    }
    Some(100.0 * used as f32 / reachable as f32)
}

#[cfg(not(target_os = "linux"))]
fn disk_percent() -> Option<f32> {
    None
}

/// [`SystemStatsSource`] reading the running kernel
#[derive(Debug)]
pub struct ProcSystemStats {
    stat_path: PathBuf,
    meminfo_path: PathBuf,
    thermal_path: PathBuf,
    prev_cpu: Option<CpuTimes>,
}

impl Default for ProcSystemStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcSystemStats {
    pub fn new() -> Self {
        Self {
            stat_path: PROC_STAT.into(),
            meminfo_path: PROC_MEMINFO.into(),
            thermal_path: THERMAL_ZONE.into(),
            prev_cpu: None,
        }
    }

    fn read(path: &PathBuf) -> Option<String> {
        match fs::read_to_string(path) {
            Ok(s) => Some(s),
            Err(e) => {
                debug!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    fn cpu(&mut self) -> Option<f32> {
        let cur = parse_cpu_times(&Self::read(&self.stat_path)?)?;
        // First sample has no baseline and reports 0
        let percent = self.prev_cpu.map(|prev| cpu_percent(prev, cur));
        self.prev_cpu = Some(cur);
        percent
    }
}

impl SystemStatsSource for ProcSystemStats {
    fn sample(&mut self) -> SystemStats {
        SystemStats {
            cpu: self.cpu().unwrap_or(0.0),
            memory: Self::read(&self.meminfo_path)
                .and_then(|s| parse_memory_percent(&s))
                .unwrap_or(0.0),
            disk: disk_percent().unwrap_or(0.0),
            temperature: Self::read(&self.thermal_path)
                .and_then(|s| parse_temperature(&s))
                .unwrap_or(0.0),
        }
    }
}
