//! Per-request authentication context.
//!
//! Holds the credentials submitted for the current request, or the
//! authentication that resulted from them, so audit code can resolve who is
//! acting without the identity being passed through every call.
//!
//! Two storage backends share one API:
//! - inside [`AuthenticationContext::scope`] the slot is task-local, so it
//!   follows the request across `.await` points and worker threads;
//! - outside any scope the slot is thread-local, and [`RequestScope`] is the
//!   scoped acquisition that clears it on every exit path.

use std::cell::RefCell;
use std::future::Future;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

use thiserror::Error;

use crate::authentication::Authentication;
use crate::credential::Credential;

/// What is currently bound to the request.
#[derive(Debug, Clone, Default)]
pub enum BoundIdentity {
    #[default]
    Nothing,
    /// Non-empty, in binding order.
    Credentials(Vec<Credential>),
    Authentication(Arc<Authentication>),
}

impl BoundIdentity {
    #[must_use]
    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    /// A request started while a previous request's identity was still bound.
    #[error("stale authentication context detected: previous request did not clear its binding")]
    StaleContextDetected,
}

thread_local! {
    static THREAD_SLOT: RefCell<BoundIdentity> = RefCell::new(BoundIdentity::Nothing);
}

tokio::task_local! {
    static TASK_SLOT: RefCell<BoundIdentity>;
}

fn task_scope_active() -> bool {
    TASK_SLOT.try_with(|_| ()).is_ok()
}

fn with_slot<R>(f: impl FnOnce(&mut BoundIdentity) -> R) -> R {
    if task_scope_active() {
        TASK_SLOT.with(|slot| f(&mut slot.borrow_mut()))
    } else {
        THREAD_SLOT.with(|slot| f(&mut slot.borrow_mut()))
    }
}

/// Read-only access; nested reads from inside `f` are allowed.
fn read_slot<R>(f: impl FnOnce(&BoundIdentity) -> R) -> R {
    if task_scope_active() {
        TASK_SLOT.with(|slot| f(&slot.borrow()))
    } else {
        THREAD_SLOT.with(|slot| f(&slot.borrow()))
    }
}

fn replace(next: BoundIdentity) {
    with_slot(|slot| {
        if !slot.is_nothing() {
            tracing::debug!("replacing identity bound to the current request");
        }
        *slot = next;
    });
}

/// Entry points for binding, reading and clearing the current identity.
pub struct AuthenticationContext;

impl AuthenticationContext {
    /// Run `fut` with its own empty, task-local context.
    ///
    /// The binding lives exactly as long as the future and is dropped when
    /// it completes, is cancelled or panics.
    pub async fn scope<F>(fut: F) -> F::Output
    where
        F: Future,
    {
        TASK_SLOT
            .scope(RefCell::new(BoundIdentity::Nothing), fut)
            .await
    }

    /// Whether the caller runs inside [`AuthenticationContext::scope`].
    ///
    /// Async code that binds an identity and then awaits must hold a task
    /// scope: the thread-local fallback is shared by every task polled on
    /// the same worker thread.
    #[must_use]
    pub fn in_task_scope() -> bool {
        task_scope_active()
    }

    /// Bind one credential, replacing whatever was bound.
    pub fn bind_credential(credential: &Credential) {
        Self::bind_credentials(std::slice::from_ref(credential));
    }

    /// Bind several credentials atomically as one ordered set, replacing
    /// whatever was bound. An empty slice clears the context.
    pub fn bind_credentials(credentials: &[Credential]) {
        if credentials.is_empty() {
            Self::clear();
            return;
        }
        replace(BoundIdentity::Credentials(credentials.to_vec()));
    }

    /// Bind a completed authentication, replacing whatever was bound.
    pub fn bind_authentication(authentication: Arc<Authentication>) {
        replace(BoundIdentity::Authentication(authentication));
    }

    /// Remove any binding.
    pub fn clear() {
        with_slot(|slot| *slot = BoundIdentity::Nothing);
    }

    #[must_use]
    pub fn is_bound() -> bool {
        read_slot(|slot| !slot.is_nothing())
    }

    /// Snapshot of the current binding.
    #[must_use]
    pub fn current() -> BoundIdentity {
        read_slot(BoundIdentity::clone)
    }

    /// Inspect the current binding without cloning it. `f` may read the
    /// context again but must not bind or clear it.
    pub fn with_current<R>(f: impl FnOnce(&BoundIdentity) -> R) -> R {
        read_slot(f)
    }
}

/// Scoped acquisition of the thread-local context for one request.
///
/// Dropping the scope clears the binding, so every exit path of the request
/// (early return, `?`, panic unwinding) leaves the thread clean for the
/// next request. The scope is `!Send`: it belongs to the thread it was
/// started on.
#[derive(Debug)]
#[must_use = "the request context is cleared as soon as the scope is dropped"]
pub struct RequestScope {
    _thread_affine: PhantomData<Rc<()>>,
}

impl RequestScope {
    /// Start a request on the current thread.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::StaleContextDetected`] if an earlier request
    /// left an identity bound. The stale binding is left in place so the
    /// caller can inspect it.
    pub fn begin() -> Result<Self, ContextError> {
        if AuthenticationContext::is_bound() {
            tracing::warn!("request started with a stale authentication context");
            return Err(ContextError::StaleContextDetected);
        }
        Ok(Self {
            _thread_affine: PhantomData,
        })
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        AuthenticationContext::clear();
    }
}
