//! A bounded work-distribution pool.
//!
//! A [`WorkPool`] accepts a stream of opaque items, fans them out to a fixed
//! number of concurrent workers, and fans the tagged outcomes back in to an
//! optional observer. Every accepted item is processed exactly once; outcome
//! delivery order follows completion order, not submission order.
//!
//! The item queue and the outcome sink are the only shared resources, and
//! both are bounded channels: when either buffer is full, the producer (or
//! worker) suspends. That backpressure is the pool's only flow control.
//!
//! ```
//! use drover::WorkPool;
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//!
//! # #[tokio::main(flavor = "multi_thread")]
//! # async fn main() -> drover::Result<()> {
//! let pool = Arc::new(WorkPool::new(2, 4)?);
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//!
//! pool.set_processor(|n: &u32| Ok(n * 10))
//!     .set_observer(move |item, outcome| sink.lock().push((item, outcome)))
//!     .start();
//!
//! let producer = Arc::clone(&pool);
//! tokio::spawn(async move {
//!     for n in 1..=5u32 {
//!         producer.enqueue(n).await;
//!     }
//!     producer.stop();
//! });
//!
//! pool.wait().await;
//! assert_eq!(seen.lock().len(), 5);
//! # Ok(())
//! # }
//! ```
//!
//! # Non-goals
//!
//! The pool provides no cancellation, no timeouts, no retry, and no ordering
//! guarantees among items. A processor that never returns wedges its worker
//! indefinitely; callers needing deadlines must enforce them inside the
//! processor itself.

mod error;
mod outcome;
mod pool;
mod worker;

pub use crate::error::*;
pub use crate::outcome::*;
pub use crate::pool::*;
