//! Port implemented by endpoint handlers.

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::domain::{Failure, Reply, ValidatedInput};

/// Business logic behind one endpoint.
///
/// Handlers only ever see input that passed the validation gate and never
/// build envelopes themselves; they return a [`Reply`] or a [`Failure`] and
/// the pipeline does the rest.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Handler: Send + Sync {
    /// Execute the operation.
    async fn handle(&self, input: ValidatedInput) -> Result<Reply, Failure>;
}

/// Adapts an async function into a [`Handler`].
///
/// # Examples
/// ```
/// use api_protocol::domain::ports::HandlerFn;
/// use api_protocol::domain::{Reply, ValidatedInput};
/// use serde_json::json;
///
/// let handler = HandlerFn::new(|_input: ValidatedInput| async {
///     Reply::item(&json!({"status": "ok"}))
/// });
/// # let _ = handler;
/// ```
pub struct HandlerFn<F, Fut> {
    func: F,
    _future: PhantomData<fn() -> Fut>,
}

impl<F, Fut> HandlerFn<F, Fut>
where
    F: Fn(ValidatedInput) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Reply, Failure>> + Send,
{
    /// Wrap `func`.
    pub const fn new(func: F) -> Self {
        Self {
            func,
            _future: PhantomData,
        }
    }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F, Fut>
where
    F: Fn(ValidatedInput) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Reply, Failure>> + Send,
{
    async fn handle(&self, input: ValidatedInput) -> Result<Reply, Failure> {
        (self.func)(input).await
    }
}
