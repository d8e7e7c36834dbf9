//! Early exit from handlers.
//!
//! Handlers return [`HandlerResult`]. The `Err` side is the early-exit
//! channel: any helper, at any call depth, can produce a [`Halt`] and `?`
//! carries it straight up to the dispatcher, which catches it exactly once.
//! A normal `Ok(reply)` is treated exactly like `Err(Halt::Exit(Some(reply)))`.

use crate::server::Reply;
use std::fmt;

/// Result type every handler returns.
pub type HandlerResult = Result<Reply, Halt>;

/// Non-local exit from a handler.
pub enum Halt {
    /// Stop now with an optional reply; `None` keeps whatever was staged.
    Exit(Option<Reply>),
    /// Stop now and answer with the dispatcher's 404 response.
    NotFound,
    /// The handler failed. Propagated to the caller, never turned into a response.
    Failed(anyhow::Error),
}

impl From<anyhow::Error> for Halt {
    fn from(err: anyhow::Error) -> Self {
        Halt::Failed(err)
    }
}

impl fmt::Debug for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Halt::Exit(reply) => f.debug_tuple("Exit").field(reply).finish(),
            Halt::NotFound => f.write_str("NotFound"),
            Halt::Failed(err) => f.debug_tuple("Failed").field(err).finish(),
        }
    }
}

/// Stop the handler and answer with `reply`.
///
/// ```
/// use switchyard::dispatcher::{halt, HandlerResult};
///
/// fn guard(authorized: bool) -> HandlerResult {
///     if !authorized {
///         return halt(401u16);
///     }
///     Ok("welcome".into())
/// }
/// assert!(guard(false).is_err());
/// ```
pub fn halt(reply: impl Into<Reply>) -> HandlerResult {
    Err(Halt::Exit(Some(reply.into())))
}

/// Stop the handler without a reply; the staged response is sent as is.
pub fn halt_empty() -> HandlerResult {
    Err(Halt::Exit(None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_lookup(found: bool) -> Result<u32, Halt> {
        if found {
            Ok(7)
        } else {
            Err(Halt::NotFound)
        }
    }

    fn handler(found: bool) -> HandlerResult {
        let value = nested_lookup(found)?;
        Ok(format!("value {value}").into())
    }

    #[test]
    fn test_question_mark_unwinds_nested_calls() {
        assert!(matches!(handler(true), Ok(Reply::Body(_))));
        assert!(matches!(handler(false), Err(Halt::NotFound)));
    }

    #[test]
    fn test_halt_carries_reply() {
        match halt(204u16) {
            Err(Halt::Exit(Some(Reply::Status(204)))) => {}
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(halt_empty(), Err(Halt::Exit(None))));
    }

    #[test]
    fn test_anyhow_errors_become_failures() {
        fn failing() -> HandlerResult {
            Err::<(), _>(anyhow::anyhow!("disk on fire"))?;
            Ok(Reply::Empty)
        }
        match failing() {
            Err(Halt::Failed(err)) => assert_eq!(err.to_string(), "disk on fire"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
