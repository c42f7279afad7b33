//! Presentation callbacks.
//!
//! Controllers never render. They report collection changes and errors here,
//! and the presentation layer drains them with `process_events()`.
//!
//! # Thread Safety
//!
//! 1. Events can be emitted from any thread or task
//! 2. Events are queued until `process_events()` is called
//! 3. Callbacks only run on the thread that registered the first callback
//!
//! so UI code never has to synchronize inside a callback.

use goal_digger_core::{List, SyncError, SyncResult, Task};
use std::sync::{mpsc, Mutex};
use std::thread::{self, ThreadId};
use strum::Display;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    TasksChanged,
    ListsChanged,
    Error,
    SessionStarted,
    SignedOut,
}

/// Which part of the interface an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorScope {
    Tasks,
    Lists,
    Profile,
    Session,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// The task collection was replaced or mutated; carries the new collection.
    TasksChanged { tasks: Vec<Task> },
    /// The list collection was replaced or mutated; carries the new collection.
    ListsChanged { lists: Vec<List> },
    Error { scope: ErrorScope, message: String },
    SessionStarted { user_id: Uuid },
    SignedOut,
}

impl SyncEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            SyncEvent::TasksChanged { .. } => EventType::TasksChanged,
            SyncEvent::ListsChanged { .. } => EventType::ListsChanged,
            SyncEvent::Error { .. } => EventType::Error,
            SyncEvent::SessionStarted { .. } => EventType::SessionStarted,
            SyncEvent::SignedOut => EventType::SignedOut,
        }
    }
}

struct CallbackEntry {
    callback: Box<dyn Fn(SyncEvent) + Send>,
    event_filter: Option<EventType>,
}

pub struct EventDispatcher {
    callbacks: Mutex<Vec<CallbackEntry>>,
    event_queue: Mutex<mpsc::Receiver<SyncEvent>>,
    event_sender: mpsc::Sender<SyncEvent>,
    callback_thread_id: Mutex<Option<ThreadId>>,
}

fn lock_error(what: &str) -> SyncError {
    SyncError::InvalidState(format!("failed to acquire lock: {}", what))
}

impl EventDispatcher {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            callbacks: Mutex::new(Vec::new()),
            event_queue: Mutex::new(receiver),
            event_sender: sender,
            callback_thread_id: Mutex::new(None),
        }
    }

    fn ensure_callback_thread(&self) -> SyncResult<()> {
        let mut thread_id = self
            .callback_thread_id
            .lock()
            .map_err(|_| lock_error("thread ID"))?;
        if thread_id.is_none() {
            *thread_id = Some(thread::current().id());
            tracing::debug!(
                "Event callbacks will be processed on thread: {:?}",
                thread::current().id()
            );
        }
        Ok(())
    }

    /// Register a callback for every event.
    pub fn register_callback<F>(&self, callback: F) -> SyncResult<()>
    where
        F: Fn(SyncEvent) + Send + 'static,
    {
        self.push_callback(Box::new(callback), None)
    }

    /// Register a callback that only receives events of `event_filter`'s type.
    pub fn register_callback_filtered<F>(&self, callback: F, event_filter: EventType) -> SyncResult<()>
    where
        F: Fn(SyncEvent) + Send + 'static,
    {
        self.push_callback(Box::new(callback), Some(event_filter))
    }

    fn push_callback(
        &self,
        callback: Box<dyn Fn(SyncEvent) + Send>,
        event_filter: Option<EventType>,
    ) -> SyncResult<()> {
        self.ensure_callback_thread()?;
        self.callbacks
            .lock()
            .map_err(|_| lock_error("callbacks"))?
            .push(CallbackEntry {
                callback,
                event_filter,
            });
        Ok(())
    }

    pub fn emit_tasks_changed(&self, tasks: &[Task]) {
        self.queue_event(SyncEvent::TasksChanged {
            tasks: tasks.to_vec(),
        });
    }

    pub fn emit_lists_changed(&self, lists: &[List]) {
        self.queue_event(SyncEvent::ListsChanged {
            lists: lists.to_vec(),
        });
    }

    pub fn emit_error(&self, scope: ErrorScope, message: &str) {
        self.queue_event(SyncEvent::Error {
            scope,
            message: message.to_string(),
        });
    }

    pub fn emit_session_started(&self, user_id: Uuid) {
        self.queue_event(SyncEvent::SessionStarted { user_id });
    }

    pub fn emit_signed_out(&self) {
        self.queue_event(SyncEvent::SignedOut);
    }

    fn queue_event(&self, event: SyncEvent) {
        if self.event_sender.send(event).is_err() {
            tracing::error!("Failed to queue event - receiver may have been dropped");
        }
    }

    /// Deliver all queued events. Must be called on the registration thread.
    pub fn process_events(&self) -> SyncResult<usize> {
        {
            let thread_id = self
                .callback_thread_id
                .lock()
                .map_err(|_| lock_error("thread ID"))?;
            match *thread_id {
                Some(expected) if thread::current().id() != expected => {
                    return Err(SyncError::InvalidState(
                        "process_events() must be called on the registration thread".into(),
                    ));
                }
                Some(_) => {}
                None => {
                    return Err(SyncError::InvalidState("no callbacks registered yet".into()));
                }
            }
        }

        let callbacks = self.callbacks.lock().map_err(|_| lock_error("callbacks"))?;
        let receiver = self
            .event_queue
            .lock()
            .map_err(|_| lock_error("event queue"))?;

        let mut processed_count = 0;
        while let Ok(event) = receiver.try_recv() {
            let event_type = event.event_type();
            for entry in callbacks.iter() {
                if let Some(filter) = entry.event_filter {
                    if filter != event_type {
                        continue;
                    }
                }
                (entry.callback)(event.clone());
            }
            processed_count += 1;
        }

        Ok(processed_count)
    }

    /// Remove and return queued events without invoking callbacks.
    pub fn drain(&self) -> SyncResult<Vec<SyncEvent>> {
        let receiver = self
            .event_queue
            .lock()
            .map_err(|_| lock_error("event queue"))?;
        Ok(receiver.try_iter().collect())
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
