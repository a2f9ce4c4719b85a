//! Lifecycle events for module registries.
//!
//! Registries can report registrations and module creation to an
//! [`EventStream`]. Sending never blocks: events are dropped if the
//! stream is full or its receiver is gone.

use std::pin::Pin;

use futures_core::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Type alias for a boxed async stream of events.
pub type EventStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

/// Events emitted by a [`Registry`](crate::Registry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleEvent {
    /// A builder was registered
    Registered { category: String, key: String },
    /// A module was created from a reader
    Created { category: String, key: String },
    /// Creating a module failed
    CreateFailed {
        category: String,
        key: String,
        message: String,
    },
}

/// A sender for events in an async stream.
///
/// This wraps a tokio mpsc sender and provides convenience methods
/// for sending events.
#[derive(Debug)]
pub struct EventSender<T> {
    tx: mpsc::Sender<T>,
}

impl<T> EventSender<T> {
    /// Create a new event sender from an mpsc sender.
    pub fn new(tx: mpsc::Sender<T>) -> Self {
        Self { tx }
    }

    /// Send an event.
    ///
    /// Returns `Ok(())` if the event was sent, or `Err(event)` if the
    /// receiver was dropped.
    pub async fn send(&self, event: T) -> Result<(), T> {
        self.tx.send(event).await.map_err(|e| e.0)
    }

    /// Try to send an event without waiting.
    ///
    /// Returns `Ok(())` if the event was sent, or `Err(event)` if the
    /// channel is full or closed.
    pub fn try_send(&self, event: T) -> Result<(), T> {
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(v) => v,
            mpsc::error::TrySendError::Closed(v) => v,
        })
    }

    /// Check if the receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<T> Clone for EventSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Builder for creating event streams.
///
/// # Example
///
/// ```rust
/// use hmc_modules::{ModuleEvent, StreamBuilder};
///
/// let (sender, _stream) = StreamBuilder::<ModuleEvent>::new()
///     .buffer_size(16)
///     .build();
///
/// sender
///     .try_send(ModuleEvent::Registered {
///         category: "gauge".into(),
///         key: "Wilson".into(),
///     })
///     .unwrap();
/// ```
pub struct StreamBuilder<T> {
    buffer_size: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Send + 'static> StreamBuilder<T> {
    /// Create a new stream builder with default settings.
    pub fn new() -> Self {
        Self {
            buffer_size: 100,
            _marker: std::marker::PhantomData,
        }
    }

    /// Set the buffer size for the underlying channel.
    ///
    /// Default is 100.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Build the stream and sender.
    pub fn build(self) -> (EventSender<T>, EventStream<T>) {
        let (tx, rx) = mpsc::channel(self.buffer_size);
        let sender = EventSender::new(tx);
        let stream: EventStream<T> = Box::pin(ReceiverStream::new(rx));
        (sender, stream)
    }
}

impl<T: Send + 'static> Default for StreamBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Create an event stream with the default buffer size.
pub fn create_stream<T: Send + 'static>() -> (EventSender<T>, EventStream<T>) {
    StreamBuilder::<T>::new().build()
}
