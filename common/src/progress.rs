use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

/// Shared completion counter for long running mesh operations. Cloning it
/// gives another handle to the same counter, so a worker thread can report
/// progress while another thread polls it.
#[derive(Clone)]
pub struct Progress(Arc<ProgressInner>);

struct ProgressInner {
    complete: AtomicU64,
    total: AtomicU64,
    finished: AtomicBool,
}

impl Progress {
    pub fn new() -> Self {
        Self(Arc::new(ProgressInner {
            complete: AtomicU64::new(0),
            total: AtomicU64::new(0),
            finished: AtomicBool::new(false),
        }))
    }

    pub fn progress(&self) -> f32 {
        let total = self.0.total.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }

        self.0.complete.load(Ordering::Relaxed) as f32 / total as f32
    }

    /// True once [`Progress::set_finished`] has been called, even if the
    /// total was never set.
    pub fn complete(&self) -> bool {
        self.0.finished.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.0.total.load(Ordering::Relaxed)
    }

    pub fn completed(&self) -> u64 {
        self.0.complete.load(Ordering::Relaxed)
    }

    pub fn set_total(&self, total: u64) {
        self.0.complete.store(0, Ordering::Relaxed);
        self.0.total.store(total, Ordering::Relaxed);
    }

    pub fn add_complete(&self, count: u64) {
        self.0.complete.fetch_add(count, Ordering::Relaxed);
    }

    pub fn set_finished(&self) {
        let total = self.0.total.load(Ordering::Relaxed);
        self.0.complete.store(total, Ordering::Relaxed);
        self.0.finished.store(true, Ordering::Relaxed);
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_completion_across_clones() {
        let progress = Progress::new();
        let worker = progress.clone();

        assert_eq!(progress.progress(), 0.0);
        worker.set_total(4);
        worker.add_complete(1);
        worker.add_complete(1);
        assert_eq!(progress.completed(), 2);
        assert_eq!(progress.progress(), 0.5);
        assert!(!progress.complete());

        worker.set_finished();
        assert!(progress.complete());
        assert_eq!(progress.completed(), 4);
    }

    #[test]
    fn finished_without_total() {
        let progress = Progress::new();
        progress.set_finished();
        assert!(progress.complete());
        assert_eq!(progress.progress(), 0.0);
    }
}
