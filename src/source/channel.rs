use crate::error::{Result, StreamError};
use crate::stream::ReadStream;
use std::sync::mpsc;

/// Blocking receive endpoint consumed by [`ChannelSource`].
///
/// `recv` blocks until an item is available and returns `None` once the
/// channel is closed.
pub trait ChannelReceiver {
    /// Item carried by the channel.
    type Item;

    /// Receive the next item, or `None` when every sender is gone.
    fn recv(&mut self) -> Option<Self::Item>;
}

impl<T> ChannelReceiver for mpsc::Receiver<T> {
    type Item = T;

    fn recv(&mut self) -> Option<T> {
        mpsc::Receiver::recv(self).ok()
    }
}

/// A stream fed by an independent producer through a channel.
///
/// `advance` blocks the calling thread until the producer sends an item or
/// hangs up. Hanging up is clean exhaustion, never a failure.
///
/// ```
/// use pullflow::{ChannelSource, consume};
/// use std::sync::mpsc;
///
/// let (tx, rx) = mpsc::channel();
/// std::thread::spawn(move || {
///     for i in 0..3 {
///         tx.send(i).unwrap();
///     }
/// });
/// let mut s = ChannelSource::new(rx);
/// assert_eq!(consume(&mut s).unwrap(), vec![0, 1, 2]);
/// ```
pub struct ChannelSource<R: ChannelReceiver> {
    rx: Option<R>,
    current: Option<R::Item>,
    err: Option<StreamError>,
}

impl<R: ChannelReceiver> ChannelSource<R> {
    /// Wrap a receive endpoint.
    pub fn new(rx: R) -> Self {
        Self {
            rx: Some(rx),
            current: None,
            err: None,
        }
    }
}

impl<R> ReadStream for ChannelSource<R>
where
    R: ChannelReceiver,
    R::Item: Clone + Default,
{
    type Item = R::Item;

    fn advance(&mut self) -> bool {
        self.current = None;
        if self.err.is_some() {
            return false;
        }
        let Some(rx) = self.rx.as_mut() else {
            return false;
        };
        match rx.recv() {
            Some(item) => {
                self.current = Some(item);
                true
            }
            None => {
                self.err = Some(StreamError::Eof);
                false
            }
        }
    }

    fn current(&self) -> Self::Item {
        self.current.clone().unwrap_or_default()
    }

    fn error(&self) -> Option<&StreamError> {
        self.err.as_ref()
    }

    fn close(&mut self) -> Result<()> {
        if self.rx.take().is_some() {
            self.current = None;
            tracing::trace!("channel source closed");
        }
        Ok(())
    }
}
