//! Detection performance monitoring
//!
//! Lock-free counters for per-phase timings and operation outcomes. A monitor
//! may be shared between detectors through an `Arc`; it only observes and
//! never influences detection results.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Average operation time above which faster preprocessing is suggested
const SLOW_OPERATION_MS: f64 = 2000.0;

/// Average phase time above which the phase is flagged
const SLOW_PHASE_MS: f64 = 1000.0;

/// Success rate below which parameter tuning is suggested
const LOW_SUCCESS_RATE: f64 = 0.7;

/// Pipeline phases timed by the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionPhase {
    /// Image variant rendering
    Preprocessing,
    /// OCR engine calls
    TextRecognition,
    /// Date span and keyword search
    PatternMatching,
    /// Span to date conversion
    DateParsing,
    /// Dot-matrix region search and template matching
    RegionDetection,
}

impl DetectionPhase {
    pub const ALL: [DetectionPhase; 5] = [
        DetectionPhase::Preprocessing,
        DetectionPhase::TextRecognition,
        DetectionPhase::PatternMatching,
        DetectionPhase::DateParsing,
        DetectionPhase::RegionDetection,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DetectionPhase::Preprocessing => "Preprocessing",
            DetectionPhase::TextRecognition => "TextRecognition",
            DetectionPhase::PatternMatching => "PatternMatching",
            DetectionPhase::DateParsing => "DateParsing",
            DetectionPhase::RegionDetection => "RegionDetection",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for DetectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Timing summary of one phase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseStats {
    pub phase: DetectionPhase,
    pub count: u64,
    pub total_ms: f64,
    pub average_ms: f64,
}

/// Snapshot of all counters
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceStats {
    pub total_operations: u64,
    pub successful_operations: u64,
    /// Successful / total, 0 when nothing ran
    pub success_rate: f64,
    pub average_processing_ms: f64,
    /// Phases that ran at least once
    pub phases: Vec<PhaseStats>,
}

/// Derived hints for tuning
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceInsights {
    pub slowest_phase: Option<DetectionPhase>,
    pub fastest_phase: Option<DetectionPhase>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Default)]
struct PhaseCounter {
    count: AtomicU64,
    total_us: AtomicU64,
}

/// Thread-safe performance monitor
#[derive(Debug, Default)]
pub struct PerformanceMonitor {
    total_operations: AtomicU64,
    successful_operations: AtomicU64,
    total_processing_us: AtomicU64,
    phases: [PhaseCounter; 5],
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one phase execution
    pub fn record_phase(&self, phase: DetectionPhase, elapsed: Duration) {
        let counter = &self.phases[phase.index()];
        counter.count.fetch_add(1, Ordering::Relaxed);
        counter
            .total_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    /// Run `f` and record its duration under `phase`
    pub fn time_phase<T>(&self, phase: DetectionPhase, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        self.record_phase(phase, start.elapsed());
        result
    }

    /// Record a finished detection call
    pub fn record_operation(&self, success: bool, elapsed: Duration) {
        self.total_operations.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_operations.fetch_add(1, Ordering::Relaxed);
        }
        self.total_processing_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    /// Current statistics
    pub fn snapshot(&self) -> PerformanceStats {
        let total = self.total_operations.load(Ordering::Relaxed);
        let successful = self.successful_operations.load(Ordering::Relaxed);
        let total_us = self.total_processing_us.load(Ordering::Relaxed);

        let (success_rate, average_processing_ms) = if total > 0 {
            (
                successful as f64 / total as f64,
                total_us as f64 / total as f64 / 1000.0,
            )
        } else {
            (0.0, 0.0)
        };

        let phases = DetectionPhase::ALL
            .iter()
            .filter_map(|&phase| {
                let counter = &self.phases[phase.index()];
                let count = counter.count.load(Ordering::Relaxed);
                if count == 0 {
                    return None;
                }
                let total_ms = counter.total_us.load(Ordering::Relaxed) as f64 / 1000.0;
                Some(PhaseStats {
                    phase,
                    count,
                    total_ms,
                    average_ms: total_ms / count as f64,
                })
            })
            .collect();

        PerformanceStats {
            total_operations: total,
            successful_operations: successful,
            success_rate,
            average_processing_ms,
            phases,
        }
    }

    /// Slowest/fastest phase and tuning recommendations
    pub fn insights(&self) -> PerformanceInsights {
        let stats = self.snapshot();
        let by_average = |a: &&PhaseStats, b: &&PhaseStats| a.average_ms.total_cmp(&b.average_ms);
        let slowest = stats.phases.iter().max_by(by_average);
        let fastest = stats.phases.iter().min_by(by_average);

        let mut recommendations = Vec::new();
        if stats.average_processing_ms > SLOW_OPERATION_MS {
            recommendations
                .push("Average detection is slow; consider a shorter strategy cascade".to_string());
        }
        if stats.total_operations > 0 && stats.success_rate < LOW_SUCCESS_RATE {
            recommendations
                .push("Low success rate; try adjusting preprocessing parameters".to_string());
        }
        if let Some(slow) = slowest.filter(|s| s.average_ms > SLOW_PHASE_MS) {
            recommendations.push(format!("{} phase is slow", slow.phase));
        }

        PerformanceInsights {
            slowest_phase: slowest.map(|s| s.phase),
            fastest_phase: fastest.map(|s| s.phase),
            recommendations,
        }
    }

    /// Zero every counter
    pub fn reset(&self) {
        self.total_operations.store(0, Ordering::Relaxed);
        self.successful_operations.store(0, Ordering::Relaxed);
        self.total_processing_us.store(0, Ordering::Relaxed);
        for counter in &self.phases {
            counter.count.store(0, Ordering::Relaxed);
            counter.total_us.store(0, Ordering::Relaxed);
        }
    }
}
