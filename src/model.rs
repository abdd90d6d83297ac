/// Фаза жизненного цикла пула
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolPhase {
    Created,
    Running,
    Stopped,
}

/// Снимок счетчиков пула
#[derive(Debug, Clone)]
pub struct PoolMetrics {
    pub queued_tasks: usize,
    pub executed_tasks: usize,
    pub failed_tasks: usize,
    pub idle_workers: usize,
    pub workers_entered: usize,
}

impl PoolMetrics {
    pub fn utilization(&self) -> f64 {
        if self.workers_entered == 0 {
            return 0.0;
        }
        let busy = self.workers_entered.saturating_sub(self.idle_workers);
        busy as f64 / self.workers_entered as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.executed_tasks + self.failed_tasks;
        if total == 0 {
            return 1.0;
        }
        self.executed_tasks as f64 / total as f64
    }
}
