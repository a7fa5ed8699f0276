//! Lock-free parameter delivery
//!
//! Control threads never touch processor state directly. They push typed
//! update messages into a wait-free SPSC ring buffer (rtrb) and the audio
//! thread drains the queue at block boundaries, so every block sees one
//! coherent parameter set and no sample is processed mid-update.

use rtrb::{Consumer, Producer, RingBuffer};

use crate::eq::BandParameters;
use crest_core::{CrestError, CrestResult};

/// Default queue capacity (power of 2 for efficiency)
pub const PARAM_QUEUE_SIZE: usize = 256;

/// Parameter updates addressed to the EQ engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineUpdate {
    /// Replace one band's parameter snapshot
    Band {
        index: usize,
        params: BandParameters,
    },
    OversamplingFactor(usize),
    AnalyzerEnabled(bool),
}

/// Parameter updates addressed to the broadband compressor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompressorUpdate {
    Enabled(bool),
    DeltaMonitor(bool),
    ThresholdDb(f64),
    Ratio(f64),
    AttackMs(f64),
    ReleaseMs(f64),
    MakeupDb(f64),
    KneeDb(f64),
}

/// Single-producer single-consumer update queue
///
/// Build one per processor, then [`split`](ParamQueue::split) it: the sender
/// stays with the control thread, the receiver moves into the processor.
pub struct ParamQueue<T> {
    producer: Producer<T>,
    consumer: Consumer<T>,
}

impl<T> ParamQueue<T> {
    pub fn new(capacity: usize) -> Self {
        let (producer, consumer) = RingBuffer::new(capacity);
        Self { producer, consumer }
    }

    /// Split into the control-thread and audio-thread endpoints.
    pub fn split(self) -> (ParamSender<T>, ParamReceiver<T>) {
        (
            ParamSender {
                producer: self.producer,
            },
            ParamReceiver {
                consumer: self.consumer,
            },
        )
    }
}

impl<T> Default for ParamQueue<T> {
    fn default() -> Self {
        Self::new(PARAM_QUEUE_SIZE)
    }
}

/// Control-thread endpoint
pub struct ParamSender<T> {
    producer: Producer<T>,
}

impl<T> ParamSender<T> {
    /// Push one update (non-blocking). Fails with
    /// [`CrestError::QueueFull`] when the audio thread has fallen behind.
    #[inline]
    pub fn send(&mut self, update: T) -> CrestResult<()> {
        self.producer
            .push(update)
            .map_err(|_| CrestError::QueueFull)
    }

    #[inline]
    pub fn has_space(&self) -> bool {
        !self.producer.is_full()
    }

    /// Free slots left in the queue.
    #[inline]
    pub fn slots(&self) -> usize {
        self.producer.slots()
    }
}

/// Audio-thread endpoint
#[derive(Debug)]
pub struct ParamReceiver<T> {
    consumer: Consumer<T>,
}

impl<T> ParamReceiver<T> {
    /// Pop the oldest pending update, if any (wait-free).
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.consumer.pop().ok()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_updates_arrive_in_order() {
        let (mut tx, mut rx) = ParamQueue::new(8).split();

        tx.send(CompressorUpdate::ThresholdDb(-24.0)).unwrap();
        tx.send(CompressorUpdate::Ratio(4.0)).unwrap();
        tx.send(CompressorUpdate::Enabled(false)).unwrap();

        assert_eq!(rx.pop(), Some(CompressorUpdate::ThresholdDb(-24.0)));
        assert_eq!(rx.pop(), Some(CompressorUpdate::Ratio(4.0)));
        assert_eq!(rx.pop(), Some(CompressorUpdate::Enabled(false)));
        assert_eq!(rx.pop(), None);
        assert!(rx.is_empty());
    }

    #[test]
    fn test_full_queue_rejects_send() {
        let (mut tx, mut rx) = ParamQueue::new(2).split();

        assert!(tx.send(EngineUpdate::OversamplingFactor(2)).is_ok());
        assert!(tx.send(EngineUpdate::OversamplingFactor(4)).is_ok());
        assert!(!tx.has_space());
        assert_eq!(tx.slots(), 0);
        assert!(matches!(
            tx.send(EngineUpdate::OversamplingFactor(8)),
            Err(CrestError::QueueFull)
        ));

        // Draining frees slots again
        assert_eq!(rx.pop(), Some(EngineUpdate::OversamplingFactor(2)));
        assert!(tx.has_space());
        assert!(tx.send(EngineUpdate::OversamplingFactor(8)).is_ok());
    }

    #[test]
    fn test_sender_moves_across_threads() {
        let (mut tx, mut rx) = ParamQueue::new(64).split();

        let writer = std::thread::spawn(move || {
            for i in 0..32 {
                tx.send(EngineUpdate::OversamplingFactor(i)).unwrap();
            }
        });
        writer.join().unwrap();

        let mut received = Vec::new();
        while let Some(EngineUpdate::OversamplingFactor(i)) = rx.pop() {
            received.push(i);
        }
        assert_eq!(received, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn test_band_update_carries_snapshot() {
        let (mut tx, mut rx) = ParamQueue::new(4).split();

        let params = BandParameters {
            active: true,
            frequency: 250.0,
            gain_db: -3.0,
            ..BandParameters::default()
        };
        tx.send(EngineUpdate::Band { index: 3, params }).unwrap();

        match rx.pop() {
            Some(EngineUpdate::Band { index, params: got }) => {
                assert_eq!(index, 3);
                assert_eq!(got, params);
            }
            other => panic!("unexpected update: {other:?}"),
        }
    }
}
