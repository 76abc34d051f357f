use super::channel::InputChannel;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// Input source fed through an mpsc queue.
///
/// Each poll hands at most one queued item to the handler. The source
/// closes once every sender is dropped and the queue has drained.
pub struct QueueInput<T, F> {
    receiver: Mutex<Receiver<T>>,
    handler: Mutex<F>,
    closed: AtomicBool,
}

impl<T, F> QueueInput<T, F>
where
    T: Send,
    F: FnMut(T) + Send,
{
    /// Creates the source and the sender that feeds it
    pub fn channel(handler: F) -> (Sender<T>, Self) {
        let (sender, receiver) = mpsc::channel();
        let input = Self {
            receiver: Mutex::new(receiver),
            handler: Mutex::new(handler),
            closed: AtomicBool::new(false),
        };
        (sender, input)
    }
}

impl<T, F> InputChannel for QueueInput<T, F>
where
    T: Send,
    F: FnMut(T) + Send,
{
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn poll_next(&self) -> bool {
        let item = match self.receiver.lock().try_recv() {
            Ok(item) => item,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                self.closed.store(true, Ordering::Release);
                return false;
            }
        };
        let mut handler = self.handler.lock();
        (*handler)(item);
        true
    }
}
