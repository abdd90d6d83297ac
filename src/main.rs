use netpool::{codec, Config, WorkerPool};
use std::time::Duration;

fn main() {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();

    rt.block_on(async {
        let pool = WorkerPool::with_config(Config {
            num_workers: 2,
            start_settle: Some(Duration::from_millis(50)),
        })
        .unwrap();
        pool.start().await.unwrap();
        println!("пул запущен, Ctrl-C для остановки");

        let monitor = pool.start_monitoring(Duration::from_secs(1), |m| {
            println!(
                "[monitor] queued: {}, executed: {}, failed: {}",
                m.queued_tasks, m.executed_tasks, m.failed_tasks
            );
        });

        for name in ["alice", "bob", "carol", "dave", "erin", "frank", "grace"] {
            pool.submit(move || {
                let query = format!("greet={}&from=net pool", name);
                let encoded = codec::encode(query.as_bytes());
                println!(
                    "hello, {} -> {}",
                    name,
                    String::from_utf8_lossy(&encoded)
                );
                std::thread::sleep(Duration::from_millis(200));
            });
        }

        // внешний триггер остановки: сигнал приходит процессу,
        // а пул гасится через обычный stop()
        tokio::signal::ctrl_c().await.unwrap();

        WorkerPool::stop_monitoring(monitor);
        pool.stop().await.unwrap();
        println!("пул остановлен: {:?}", pool.metrics());
    });
}
