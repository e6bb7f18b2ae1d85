//! # Task
//!
//! A unit of work running on its own named thread, owning its result until joined.

use std::any::Any;
use std::io;
use std::thread::{self, JoinHandle};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task {0} panicked")]
    Panicked(String),
    #[error("Could not start task {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Handle on background work producing a `T`
#[derive(Debug)]
pub struct Task<T> {
    name: String,
    handle: JoinHandle<T>,
}

impl<T: Send + 'static> Task<T> {
    /// Start `work` on a new thread named `name`
    pub fn spawn<F>(name: impl Into<String>, work: F) -> Result<Self, TaskError>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let name = name.into();
        debug!("Starting task {name}");
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(work)
            .map_err(|source| TaskError::Spawn {
                name: name.clone(),
                source,
            })?;
        Ok(Self { name, handle })
    }
}

impl<T> Task<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the work is over; `join` won't block then
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the work to end and take its result
    pub fn join(self) -> Result<T, TaskError> {
        let name = self.name;
        self.handle.join().map_err(move |payload| {
            error!("Task {name} panicked: {}", panic_message(payload.as_ref()));
            TaskError::Panicked(name)
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause")
}
