/// Serial executor - one worker, one driver, one operation at a time
///
/// Operations are queued on an unbounded channel and drained in FIFO order
/// by a single worker task. Each operation runs on Tokio's blocking pool, so
/// callers never wait on database I/O while different connections still
/// proceed in parallel. The driver never leaves the worker.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use crate::core::DatabaseError;
use crate::driver::Driver;

type DriverSlot = Option<Box<dyn Driver>>;
type Job = Box<dyn FnOnce(&mut DriverSlot) + Send>;

/// Handle for submitting operations to a connection's worker.
///
/// Clones share the same queue and the same closed state.
#[derive(Clone)]
pub struct SerialExecutor {
    inner: Arc<Inner>,
}

struct Inner {
    name: String,
    sender: mpsc::UnboundedSender<Job>,
    closed: AtomicBool,
}

impl SerialExecutor {
    /// Starts the worker for `driver` on the given runtime.
    pub fn spawn(name: impl Into<String>, driver: Box<dyn Driver>, runtime: &Handle) -> Self {
        let name = name.into();
        let (sender, receiver) = mpsc::unbounded_channel();
        runtime.spawn(run_worker(name.clone(), driver, receiver));
        Self {
            inner: Arc::new(Inner {
                name,
                sender,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Starts the worker on the runtime of the calling context.
    pub fn spawn_current(name: impl Into<String>, driver: Box<dyn Driver>) -> Result<Self, DatabaseError> {
        let runtime = Handle::try_current()?;
        Ok(Self::spawn(name, driver, &runtime))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// True once `close` has been submitted.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Queues `operation` behind everything submitted before it.
    ///
    /// Never blocks. Fails fast with `ConnectionClosed` once the executor is
    /// closed; an operation that was queued before the close but runs after
    /// it also completes with `ConnectionClosed` and never sees the driver.
    pub fn submit<T, F>(&self, operation: F) -> Completion<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn Driver) -> Result<T, DatabaseError> + Send + 'static,
    {
        if self.is_closed() {
            return Completion::failed(DatabaseError::ConnectionClosed);
        }
        self.enqueue(move |slot| match slot.as_deref_mut() {
            Some(driver) => operation(driver),
            None => Err(DatabaseError::ConnectionClosed),
        })
    }

    /// Queues the final operation, which takes ownership of the driver.
    ///
    /// Only the first call is accepted; later ones fail with
    /// `ConnectionClosed`.
    pub fn close<T, F>(&self, operation: F) -> Completion<T>
    where
        T: Send + 'static,
        F: FnOnce(Box<dyn Driver>) -> Result<T, DatabaseError> + Send + 'static,
    {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Completion::failed(DatabaseError::ConnectionClosed);
        }
        self.enqueue(move |slot| match slot.take() {
            Some(driver) => operation(driver),
            None => Err(DatabaseError::ConnectionClosed),
        })
    }

    fn enqueue<T, F>(&self, operation: F) -> Completion<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut DriverSlot) -> Result<T, DatabaseError> + Send + 'static,
    {
        let (reply, receiver) = oneshot::channel();
        let job: Job = Box::new(move |slot| {
            // The caller may have dropped its completion; the result is discarded then.
            let _ = reply.send(operation(slot));
        });
        match self.inner.sender.send(job) {
            Ok(()) => Completion::pending(receiver),
            Err(_) => Completion::failed(DatabaseError::ConnectionClosed),
        }
    }
}

async fn run_worker(name: String, driver: Box<dyn Driver>, mut receiver: mpsc::UnboundedReceiver<Job>) {
    debug!(executor = %name, "worker started");
    let mut slot: DriverSlot = Some(driver);

    while let Some(job) = receiver.recv().await {
        let mut current = slot.take();
        let outcome = tokio::task::spawn_blocking(move || {
            let panicked = panic::catch_unwind(AssertUnwindSafe(|| job(&mut current))).is_err();
            (current, panicked)
        })
        .await;

        match outcome {
            Ok((returned, panicked)) => {
                if panicked {
                    error!(executor = %name, "operation panicked, its caller sees an aborted operation");
                }
                slot = returned;
            }
            Err(err) => {
                error!(executor = %name, error = %err, "worker lost its driver");
            }
        }
    }

    // Every handle was dropped without an explicit close.
    if let Some(driver) = slot.take() {
        match tokio::task::spawn_blocking(move || driver.close()).await {
            Ok(Ok(())) => debug!(executor = %name, "driver closed on shutdown"),
            Ok(Err(err)) => warn!(executor = %name, error = %err, "failed to close driver on shutdown"),
            Err(err) => warn!(executor = %name, error = %err, "driver close task failed"),
        }
    }
    debug!(executor = %name, "worker stopped");
}

/// Result of a submitted operation, delivered exactly once.
///
/// Await it from async code or call [`Completion::wait`] from a plain
/// thread. Dropping it does not cancel the operation.
#[must_use = "a completion does nothing unless awaited or waited on"]
pub struct Completion<T> {
    state: State<T>,
}

enum State<T> {
    Pending(oneshot::Receiver<Result<T, DatabaseError>>),
    Ready(Option<Result<T, DatabaseError>>),
}

// No structural pinning: the receiver and the ready value are both moved freely.
impl<T> Unpin for Completion<T> {}

impl<T> Completion<T> {
    const fn pending(receiver: oneshot::Receiver<Result<T, DatabaseError>>) -> Self {
        Self {
            state: State::Pending(receiver),
        }
    }

    /// A completion that is already resolved.
    pub const fn ready(result: Result<T, DatabaseError>) -> Self {
        Self {
            state: State::Ready(Some(result)),
        }
    }

    pub const fn failed(error: DatabaseError) -> Self {
        Self::ready(Err(error))
    }

    /// Blocks the current thread until the operation completes.
    ///
    /// Must not be called from inside an async context.
    pub fn wait(self) -> Result<T, DatabaseError> {
        match self.state {
            State::Pending(receiver) => receiver
                .blocking_recv()
                .unwrap_or_else(|_| Err(DatabaseError::OperationAborted)),
            State::Ready(result) => result.unwrap_or(Err(DatabaseError::OperationAborted)),
        }
    }
}

impl<T> Future for Completion<T> {
    type Output = Result<T, DatabaseError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            State::Pending(receiver) => Pin::new(receiver)
                .poll(cx)
                .map(|received| received.unwrap_or_else(|_| Err(DatabaseError::OperationAborted))),
            State::Ready(result) => {
                Poll::Ready(result.take().unwrap_or(Err(DatabaseError::OperationAborted)))
            }
        }
    }
}
