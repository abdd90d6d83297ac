//! Пул воркеров фиксированного размера с кооперативным запуском и остановкой
//!
//! # Features
//! - Общая FIFO-очередь задач без блокировок
//! - Остановка через broadcast: спящие воркеры просыпаются сразу
//! - Изоляция паник внутри задач
//! - Метрики и фоновый мониторинг
//! - Percent-encoding утилита для сетевых строк

pub mod codec;
pub mod errors;
pub mod model;
pub mod pool;

pub use errors::{DecodeError, PoolError};
pub use model::{PoolMetrics, PoolPhase};
pub use pool::{Config, WorkerPool};
