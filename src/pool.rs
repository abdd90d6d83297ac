use super::{
    errors::PoolError,
    model::{PoolMetrics, PoolPhase},
};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use crossbeam::queue::SegQueue;
use tokio::{sync::Notify, task::JoinHandle};
use tokio_util::sync::CancellationToken;

/// Задача: замыкание без аргументов и без результата
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Конфигурация пула воркеров
#[derive(Debug, Clone)]
pub struct Config {
    pub num_workers: usize,
    /// Пауза после спавна воркеров, только для наблюдаемости
    pub start_settle: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            start_settle: None,
        }
    }
}

impl Config {
    pub fn with_workers(num_workers: usize) -> Self {
        Self {
            num_workers,
            ..Default::default()
        }
    }
}

/// Состояние, разделяемое между пулом и его воркерами
struct PoolShared {
    tasks: SegQueue<Task>,
    task_arrived: Notify,
    shutdown: CancellationToken,
    queued_tasks: AtomicUsize,
    executed_tasks: AtomicUsize,
    failed_tasks: AtomicUsize,
    idle_workers: AtomicUsize,
    workers_entered: AtomicUsize,
}

impl PoolShared {
    fn new() -> Self {
        Self {
            tasks: SegQueue::new(),
            task_arrived: Notify::new(),
            shutdown: CancellationToken::new(),
            queued_tasks: AtomicUsize::new(0),
            executed_tasks: AtomicUsize::new(0),
            failed_tasks: AtomicUsize::new(0),
            idle_workers: AtomicUsize::new(0),
            workers_entered: AtomicUsize::new(0),
        }
    }

    #[inline(always)]
    fn push_task(&self, task: Task) {
        self.queued_tasks.fetch_add(1, Ordering::Relaxed);
        self.tasks.push(task);
        // будит максимум одного воркера; если никто не ждет,
        // Notify сохраняет permit и wakeup не теряется
        self.task_arrived.notify_one();
    }

    #[inline]
    fn pop_task(&self) -> Option<Task> {
        self.tasks.pop().map(|task| {
            self.queued_tasks.fetch_sub(1, Ordering::Relaxed);
            task
        })
    }

    /// Паника внутри задачи не должна убить воркера
    fn run_task(&self, task: Task) {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(task)) {
            Ok(()) => {
                self.executed_tasks.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.failed_tasks.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    async fn worker_loop(&self) {
        self.workers_entered.fetch_add(1, Ordering::Release);

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            if let Some(task) = self.pop_task() {
                self.run_task(task);
                continue;
            }

            self.idle_workers.fetch_add(1, Ordering::Release);
            tokio::select! {
                _ = self.task_arrived.notified() => {
                    self.idle_workers.fetch_sub(1, Ordering::Acquire);
                }
                _ = self.shutdown.cancelled() => {
                    self.idle_workers.fetch_sub(1, Ordering::Acquire);
                    break;
                }
            }
        }
    }

    fn snapshot(&self) -> PoolMetrics {
        PoolMetrics {
            queued_tasks: self.queued_tasks.load(Ordering::Relaxed),
            executed_tasks: self.executed_tasks.load(Ordering::Relaxed),
            failed_tasks: self.failed_tasks.load(Ordering::Relaxed),
            idle_workers: self.idle_workers.load(Ordering::Relaxed),
            workers_entered: self.workers_entered.load(Ordering::Relaxed),
        }
    }
}

struct Lifecycle {
    phase: PoolPhase,
    handles: Vec<JoinHandle<()>>,
}

/// Пул воркеров фиксированного размера поверх общей FIFO-очереди.
///
/// Жизненный цикл двухфазный: `start` спавнит воркеров, `stop` гасит их
/// broadcast-сигналом и дожидается выхода каждого. Повторный запуск после
/// остановки не поддерживается.
pub struct WorkerPool {
    config: Config,
    shared: Arc<PoolShared>,
    lifecycle: Mutex<Lifecycle>,
}

impl WorkerPool {
    pub fn new(num_workers: usize) -> Result<Self, PoolError> {
        Self::with_config(Config::with_workers(num_workers))
    }

    pub fn with_config(config: Config) -> Result<Self, PoolError> {
        if config.num_workers == 0 {
            return Err(PoolError::InvalidWorkerCount);
        }
        Ok(Self {
            config,
            shared: Arc::new(PoolShared::new()),
            lifecycle: Mutex::new(Lifecycle {
                phase: PoolPhase::Created,
                handles: Vec::new(),
            }),
        })
    }

    /// Спавнит ровно `num_workers` воркеров. Не ждет, пока они начнут
    /// разбирать очередь.
    pub async fn start(&self) -> Result<(), PoolError> {
        {
            let mut state = self.lifecycle.lock().unwrap();
            match state.phase {
                PoolPhase::Running => return Err(PoolError::AlreadyRunning),
                PoolPhase::Stopped => return Err(PoolError::AlreadyStopped),
                PoolPhase::Created => {}
            }
            for _ in 0..self.config.num_workers {
                let shared = Arc::clone(&self.shared);
                state.handles.push(tokio::spawn(async move {
                    shared.worker_loop().await;
                }));
            }
            state.phase = PoolPhase::Running;
        }

        if let Some(delay) = self.config.start_settle {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    /// Кладет задачу в очередь и будит максимум одного спящего воркера.
    ///
    /// Очередь не ограничена, вызов никогда не блокируется и принимает
    /// задачи в любой фазе пула. Результат задачи назад не возвращается;
    /// задача, заблокировавшаяся навсегда, навсегда занимает своего воркера.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.push_task(Box::new(task));
    }

    /// Гасит пул: broadcast всем спящим воркерам и join каждого хэндла.
    ///
    /// Возвращается только когда ни один воркер уже не жив. Задачи,
    /// оставшиеся в очереди, не выполняются (их число видно в метриках).
    /// Повторный вызов сразу возвращает Ok.
    pub async fn stop(&self) -> Result<(), PoolError> {
        let handles = {
            let mut state = self.lifecycle.lock().unwrap();
            if state.phase == PoolPhase::Stopped {
                return Ok(());
            }
            state.phase = PoolPhase::Stopped;
            std::mem::take(&mut state.handles)
        };

        self.shared.shutdown.cancel();
        let _ = futures::future::join_all(handles).await;
        Ok(())
    }

    pub fn phase(&self) -> PoolPhase {
        self.lifecycle.lock().unwrap().phase
    }

    pub fn is_running(&self) -> bool {
        self.phase() == PoolPhase::Running
    }

    #[inline]
    pub fn metrics(&self) -> PoolMetrics {
        self.shared.snapshot()
    }

    /// Фоновый опрос метрик с callback.
    /// Для остановки мониторинга вызовите token.cancel()
    pub fn start_monitoring<F>(&self, interval: Duration, callback: F) -> CancellationToken
    where
        F: Fn(PoolMetrics) + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        let token = CancellationToken::new();
        let token_clone = token.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        callback(shared.snapshot());
                    }
                    _ = token_clone.cancelled() => {
                        break;
                    }
                }
            }
        });

        token
    }

    pub fn stop_monitoring(token: CancellationToken) {
        token.cancel();
    }
}

impl Drop for WorkerPool {
    /// Воркеры не должны пережить пул: если `stop` не вызвали,
    /// гасим токен и снимаем оставшиеся хэндлы
    fn drop(&mut self) {
        self.shared.shutdown.cancel();
        if let Ok(mut state) = self.lifecycle.lock() {
            state.phase = PoolPhase::Stopped;
            for handle in state.handles.drain(..) {
                handle.abort();
            }
        }
    }
}
