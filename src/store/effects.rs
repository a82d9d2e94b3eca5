//! Unicast effect delivery.

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::sync::{mpsc, Mutex};

/// Consumer side of the store's bounded effect channel.
///
/// Every clone shares the one receiver: each effect goes to exactly one
/// `recv` call, whichever clone makes it. Effects emitted while nobody is
/// listening stay buffered up to the channel's capacity, after which the
/// store's drain loop waits for room.
pub struct EffectStream<E> {
    receiver: Arc<Mutex<mpsc::Receiver<E>>>,
}

impl<E> Clone for EffectStream<E> {
    fn clone(&self) -> Self {
        Self {
            receiver: Arc::clone(&self.receiver),
        }
    }
}

impl<E: Send + 'static> EffectStream<E> {
    pub(crate) fn new(receiver: mpsc::Receiver<E>) -> Self {
        Self {
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    /// Take the next effect, waiting if none is buffered. Returns `None`
    /// once the store is torn down and the buffer is empty.
    pub async fn recv(&self) -> Option<E> {
        self.receiver.lock().await.recv().await
    }

    /// Take a buffered effect without waiting.
    ///
    /// Returns `None` while another clone is parked in [`recv`](Self::recv),
    /// even if effects are buffered; that clone will get them.
    pub fn try_recv(&self) -> Option<E> {
        let mut receiver = self.receiver.try_lock().ok()?;
        receiver.try_recv().ok()
    }

    /// Adapt into a `Stream` of effects.
    pub fn into_stream(self) -> BoxStream<'static, E> {
        futures::stream::unfold(self, |effects| async move {
            let effect = effects.recv().await?;
            Some((effect, effects))
        })
        .boxed()
    }
}
