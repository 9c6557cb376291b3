// --- File: crates/slotwise_common/src/services.rs ---
//! Service plumbing shared by the traits that wrap external collaborators
//! (calendar sources, routing providers).
//!
//! Trait methods return [`BoxFuture`] rather than using `async fn` so the
//! traits stay object-safe and can be held as `Arc<dyn Trait>`.

use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;
