//! Callback-style completion for proxy operations.
//!
//! Every proxy operation is an `async fn` returning [`Result`](crate::Result).
//! Front-ends that prefer reacting through handlers wrap the operation future
//! with [`dispatch`]: `on_success` gets the value, `on_exception` gets the
//! error plus its localized message and reports whether it handled it, and
//! `on_complete` runs last in both cases.

use std::future::Future;

use crate::error::AimpError;
use crate::i18n::MessageCatalog;

type SuccessHandler<'a, T> = Box<dyn FnOnce(T) + Send + 'a>;
type ExceptionHandler<'a> = Box<dyn FnOnce(&AimpError, &str) -> bool + Send + 'a>;
type CompleteHandler<'a> = Box<dyn FnOnce(&Completion) + Send + 'a>;

/// How a dispatched operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Succeeded,
    /// `handled` is what the exception handler returned, `false` without one.
    Failed { handled: bool },
}

impl Completion {
    pub fn is_success(&self) -> bool {
        matches!(self, Completion::Succeeded)
    }
}

/// Optional handlers for one operation.
pub struct Callbacks<'a, T> {
    on_success: Option<SuccessHandler<'a, T>>,
    on_exception: Option<ExceptionHandler<'a>>,
    on_complete: Option<CompleteHandler<'a>>,
}

impl<T> Default for Callbacks<'_, T> {
    fn default() -> Self {
        Self {
            on_success: None,
            on_exception: None,
            on_complete: None,
        }
    }
}

impl<'a, T> Callbacks<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success<F>(mut self, handler: F) -> Self
    where
        F: FnOnce(T) + Send + 'a,
    {
        self.on_success = Some(Box::new(handler));
        self
    }

    /// Called with the error and its localized message; returns whether the
    /// failure was handled.
    pub fn on_exception<F>(mut self, handler: F) -> Self
    where
        F: FnOnce(&AimpError, &str) -> bool + Send + 'a,
    {
        self.on_exception = Some(Box::new(handler));
        self
    }

    pub fn on_complete<F>(mut self, handler: F) -> Self
    where
        F: FnOnce(&Completion) + Send + 'a,
    {
        self.on_complete = Some(Box::new(handler));
        self
    }
}

/// Drive `operation` to completion through `callbacks`.
///
/// # Example
///
/// ```rust,no_run
/// use aimp::{dispatch, AimpProxy, Callbacks, ClientConfig};
///
/// # async fn example() -> aimp::Result<()> {
/// let proxy = AimpProxy::connect(&ClientConfig::default())?;
/// let callbacks = Callbacks::new()
///     .on_success(|volume: i64| println!("volume is now {}", volume))
///     .on_exception(|_, message| {
///         eprintln!("Can't set volume level. Reason: {}", message);
///         true
///     });
/// dispatch(proxy.catalog(), proxy.volume(Some(40)), callbacks).await;
/// # Ok(())
/// # }
/// ```
pub async fn dispatch<'a, T, F>(
    catalog: &MessageCatalog,
    operation: F,
    callbacks: Callbacks<'a, T>,
) -> Completion
where
    F: Future<Output = crate::Result<T>>,
{
    let Callbacks {
        on_success,
        on_exception,
        on_complete,
    } = callbacks;

    let completion = match operation.await {
        Ok(value) => {
            if let Some(handler) = on_success {
                handler(value);
            }
            Completion::Succeeded
        }
        Err(err) => {
            let message = err.localized_message(catalog);
            let handled = match on_exception {
                Some(handler) => handler(&err, &message),
                None => {
                    log::warn!("Unhandled failure: {}", message);
                    false
                }
            };
            Completion::Failed { handled }
        }
    };

    if let Some(handler) = on_complete {
        handler(&completion);
    }
    completion
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_code::RpcErrorCode;
    use std::sync::{Arc, Mutex};

    fn fault(code: i64) -> AimpError {
        AimpError::Rpc {
            code: RpcErrorCode::from_code(code),
            message: String::new(),
            localized: crate::error_code::resolve_error(code, &MessageCatalog::english()),
        }
    }

    #[tokio::test]
    async fn test_success_then_complete() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let (a, b) = (events.clone(), events.clone());

        let completion = dispatch(
            &MessageCatalog::english(),
            async { Ok(42) },
            Callbacks::new()
                .on_success(move |value: i32| a.lock().unwrap().push(format!("success {}", value)))
                .on_complete(move |_| b.lock().unwrap().push("complete".to_string())),
        )
        .await;

        assert_eq!(completion, Completion::Succeeded);
        assert_eq!(*events.lock().unwrap(), vec!["success 42", "complete"]);
    }

    #[tokio::test]
    async fn test_exception_receives_localized_message() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();

        let completion = dispatch(
            &MessageCatalog::english(),
            async { Err::<(), _>(fault(15)) },
            Callbacks::new().on_exception(move |_, message| {
                *sink.lock().unwrap() = Some(message.to_string());
                true
            }),
        )
        .await;

        assert_eq!(completion, Completion::Failed { handled: true });
        assert_eq!(
            seen.lock().unwrap().as_deref(),
            Some("Volume level is out of range")
        );
    }

    #[tokio::test]
    async fn test_unknown_code_message() {
        let seen = Arc::new(Mutex::new(String::new()));
        let sink = seen.clone();

        dispatch(
            &MessageCatalog::english(),
            async { Err::<(), _>(fault(99)) },
            Callbacks::new().on_exception(move |_, message| {
                *sink.lock().unwrap() = message.to_string();
                false
            }),
        )
        .await;

        assert_eq!(*seen.lock().unwrap(), "Unknown error 99");
    }

    #[tokio::test]
    async fn test_no_exception_handler_is_not_handled_and_completes() {
        let completed = Arc::new(Mutex::new(false));
        let flag = completed.clone();

        let completion = dispatch(
            &MessageCatalog::english(),
            async { Err::<(), _>(AimpError::Timeout("slow".to_string())) },
            Callbacks::new().on_complete(move |_| *flag.lock().unwrap() = true),
        )
        .await;

        assert_eq!(completion, Completion::Failed { handled: false });
        assert!(*completed.lock().unwrap());
    }
}
