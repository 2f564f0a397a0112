use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared between the frame worker and whoever observes it.
#[derive(Debug, Default)]
pub struct WorkerStats {
    cycles: AtomicU64,
    published: AtomicU64,
    skipped_reads: AtomicU64,
    failed_frames: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkerStatsSnapshot {
    pub cycles: u64,
    pub published: u64,
    pub skipped_reads: u64,
    pub failed_frames: u64,
}

impl WorkerStats {
    pub fn record_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_read(&self) {
        self.skipped_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed_frame(&self) {
        self.failed_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> WorkerStatsSnapshot {
        WorkerStatsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
            skipped_reads: self.skipped_reads.load(Ordering::Relaxed),
            failed_frames: self.failed_frames.load(Ordering::Relaxed),
        }
    }
}
