//! MaybeAsync: a result that is either available now or still pending.
//!
//! Synchronous wrappers answer `Ready` whenever nothing along the call path
//! suspended, and `Pending` only when the wrapped implementation itself did.
//! Pending work is a boxed `'static` future; dropping it drops the work.

use std::fmt;
use std::future::Future;

use futures::future::{self, BoxFuture, FutureExt};

/// Either a value that is ready now or a future that will produce one.
pub enum MaybeAsync<T> {
    /// Produced synchronously.
    Ready(T),
    /// Produced by awaiting the contained future.
    Pending(BoxFuture<'static, T>),
}

impl<T: Send + 'static> MaybeAsync<T> {
    /// Wrap a value that is already available.
    pub fn ready(value: T) -> Self {
        MaybeAsync::Ready(value)
    }

    /// Wrap a future.
    pub fn pending<F>(fut: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        MaybeAsync::Pending(fut.boxed())
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, MaybeAsync::Ready(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, MaybeAsync::Pending(_))
    }

    /// Take the value if it is ready. A pending future is dropped.
    pub fn into_ready(self) -> Option<T> {
        match self {
            MaybeAsync::Ready(value) => Some(value),
            MaybeAsync::Pending(_) => None,
        }
    }

    /// Wait for the value, awaiting only if it is pending.
    pub async fn resolve(self) -> T {
        match self {
            MaybeAsync::Ready(value) => value,
            MaybeAsync::Pending(fut) => fut.await,
        }
    }

    /// Convert into a future regardless of readiness.
    pub fn into_future(self) -> BoxFuture<'static, T> {
        match self {
            MaybeAsync::Ready(value) => future::ready(value).boxed(),
            MaybeAsync::Pending(fut) => fut,
        }
    }

    /// Transform the eventual value, staying synchronous when possible.
    pub fn map<U, F>(self, f: F) -> MaybeAsync<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        match self {
            MaybeAsync::Ready(value) => MaybeAsync::Ready(f(value)),
            MaybeAsync::Pending(fut) => MaybeAsync::pending(fut.map(f)),
        }
    }

    /// Chain another step that may itself suspend.
    ///
    /// Once a chain goes pending it stays pending.
    pub fn then<U, F>(self, f: F) -> MaybeAsync<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> MaybeAsync<U> + Send + 'static,
    {
        match self {
            MaybeAsync::Ready(value) => f(value),
            MaybeAsync::Pending(fut) => MaybeAsync::pending(async move { f(fut.await).resolve().await }),
        }
    }

    /// Collect many results, in order. Ready only if every item is ready.
    pub fn join_all<I>(items: I) -> MaybeAsync<Vec<T>>
    where
        I: IntoIterator<Item = MaybeAsync<T>>,
    {
        let items: Vec<_> = items.into_iter().collect();
        if items.iter().all(MaybeAsync::is_ready) {
            return MaybeAsync::Ready(items.into_iter().filter_map(MaybeAsync::into_ready).collect());
        }
        let futures: Vec<_> = items.into_iter().map(MaybeAsync::into_future).collect();
        MaybeAsync::pending(future::join_all(futures))
    }
}

impl<T> From<T> for MaybeAsync<T> {
    fn from(value: T) -> Self {
        MaybeAsync::Ready(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for MaybeAsync<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaybeAsync::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            MaybeAsync::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}
