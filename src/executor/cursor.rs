/// Result cursor - row iteration routed through the connection's worker
///
/// The driver-level cursor is not thread-safe, so `next` and `close` are
/// submitted to the same serial executor as every other operation. State
/// transitions that touch the driver happen on the worker.

use std::sync::{Arc, Mutex, PoisonError};

use crate::core::{CursorError, CursorId, DatabaseError, ResultColumn, Row};
use crate::driver::Driver;
use super::serial::{Completion, SerialExecutor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Open,
    /// Every row was returned; the driver-level cursor is already released.
    Exhausted,
    Closed,
}

pub struct Cursor {
    id: CursorId,
    columns: Arc<[ResultColumn]>,
    executor: SerialExecutor,
    state: Arc<Mutex<CursorState>>,
}

impl Cursor {
    pub(crate) fn new(id: CursorId, columns: Vec<ResultColumn>, executor: SerialExecutor) -> Self {
        Self {
            id,
            columns: columns.into(),
            executor,
            state: Arc::new(Mutex::new(CursorState::Open)),
        }
    }

    #[must_use]
    pub const fn id(&self) -> CursorId {
        self.id
    }

    /// Columns of the row set, as reported when the statement ran.
    #[must_use]
    pub fn columns(&self) -> &[ResultColumn] {
        &self.columns
    }

    #[must_use]
    pub fn state(&self) -> CursorState {
        *lock(&self.state)
    }

    /// Fetches the next row; `None` once the row set is exhausted, on every
    /// call after that too.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&self) -> Completion<Option<Row>> {
        let id = self.id;
        let columns = Arc::clone(&self.columns);
        let state = Arc::clone(&self.state);

        self.executor.submit(move |driver| {
            let mut state = lock(&state);
            match *state {
                CursorState::Closed => Err(CursorError::Closed.into()),
                CursorState::Exhausted => Ok(None),
                CursorState::Open => match driver.next_row(id).map_err(cursor_error)? {
                    Some(raw) => Ok(Some(Row::decode(raw, &columns))),
                    None => {
                        *state = CursorState::Exhausted;
                        driver.close_cursor(id).map_err(cursor_error)?;
                        Ok(None)
                    }
                },
            }
        })
    }

    /// Releases the driver-level cursor. Closing twice is a no-op.
    pub fn close(&self) -> Completion<()> {
        if self.state() == CursorState::Closed {
            return Completion::ready(Ok(()));
        }
        if self.executor.is_closed() {
            // The connection took the driver-level cursor down with it.
            *lock(&self.state) = CursorState::Closed;
            return Completion::ready(Ok(()));
        }

        let id = self.id;
        let state = Arc::clone(&self.state);
        self.executor.submit(move |driver| release(driver, id, &state))
    }
}

impl Drop for Cursor {
    fn drop(&mut self) {
        if self.state() != CursorState::Open || self.executor.is_closed() {
            return;
        }
        let id = self.id;
        let state = Arc::clone(&self.state);
        // Best effort: nobody observes the outcome.
        let _ = self.executor.submit(move |driver| release(driver, id, &state));
    }
}

impl std::fmt::Debug for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("id", &self.id)
            .field("columns", &self.columns)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

fn release(driver: &mut dyn Driver, id: CursorId, state: &Mutex<CursorState>) -> Result<(), DatabaseError> {
    let mut state = lock(state);
    let previous = std::mem::replace(&mut *state, CursorState::Closed);
    if previous == CursorState::Open {
        driver.close_cursor(id).map_err(cursor_error)?;
    }
    Ok(())
}

fn cursor_error(err: crate::core::DriverError) -> DatabaseError {
    DatabaseError::Cursor(CursorError::Driver(err))
}

fn lock(state: &Mutex<CursorState>) -> std::sync::MutexGuard<'_, CursorState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
