use thiserror::Error;

/// Ошибки жизненного цикла пула
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum PoolError {
    #[error("worker count must be greater than zero")]
    InvalidWorkerCount,
    #[error("pool is already running")]
    AlreadyRunning,
    #[error("pool has already been stopped")]
    AlreadyStopped,
}

/// Ошибка разбора percent-encoded данных
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DecodeError {
    #[error("malformed escape sequence at byte {position}")]
    MalformedEscape { position: usize },
}
