use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use drover::WorkPool;
use std::sync::Arc;
use tokio::runtime::Builder;

// Items pushed through the pool per benchmark iteration.
const TOTAL_ITEMS: usize = 4096;

async fn drive_pool(pool: Arc<WorkPool<usize, usize>>) {
    let producer = Arc::clone(&pool);
    tokio::spawn(async move {
        for n in 0..TOTAL_ITEMS {
            producer.enqueue(n).await;
        }
        producer.stop();
    });
    pool.wait().await;
}

fn bench_pool(c: &mut Criterion) {
    let rt = Builder::new_multi_thread().build().expect("tokio runtime");

    let mut group = c.benchmark_group("pool");
    group.throughput(Throughput::Elements(TOTAL_ITEMS as u64));

    group.bench_function(format!("observed/{TOTAL_ITEMS}"), |b| {
        b.to_async(&rt).iter(|| async {
            let pool = Arc::new(WorkPool::new(4, 64).expect("pool config"));
            pool.set_processor(|n: &usize| Ok(n * 10))
                .set_observer(|item, outcome| {
                    black_box((item, outcome));
                })
                .start();
            drive_pool(pool).await;
        });
    });

    group.bench_function(format!("unobserved/{TOTAL_ITEMS}"), |b| {
        b.to_async(&rt).iter(|| async {
            let pool = Arc::new(WorkPool::new(4, 64).expect("pool config"));
            pool.set_processor(|n: &usize| Ok(black_box(n * 10))).start();
            drive_pool(pool).await;
        });
    });

    group.finish();
}

criterion_group!(benches, bench_pool);
criterion_main!(benches);
