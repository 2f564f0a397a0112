//! Single-slot, latest-wins handoff between the frame worker and the game loop.
//!
//! Publishing replaces whatever is in the slot, read or not. Reading never blocks: it takes the
//! freshest value if one arrived since the last read, otherwise reports `HandoffError::Empty`.
//! Values move whole, so a reader can't observe a partially written snapshot.

use tokio::sync::watch;

use crate::error::HandoffError;

pub fn channel<T: Clone>() -> (Publisher<T>, Reader<T>) {
    let (tx, rx) = watch::channel(None);
    (Publisher { tx }, Reader { rx })
}

pub struct Publisher<T> {
    tx: watch::Sender<Option<T>>,
}

impl<T> Publisher<T> {
    /// Overwrites the slot. Succeeds even when no reader is left.
    pub fn publish(&self, value: T) {
        self.tx.send_replace(Some(value));
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub struct Reader<T> {
    rx: watch::Receiver<Option<T>>,
}

impl<T: Clone> Reader<T> {
    pub fn try_take(&mut self) -> Result<T, HandoffError> {
        match self.rx.has_changed() {
            Ok(true) => self.rx.borrow_and_update().clone().ok_or(HandoffError::Empty),
            Ok(false) => Err(HandoffError::Empty),
            Err(_) => Err(HandoffError::Closed),
        }
    }

    /// Discards any unread value.
    pub fn drain(&mut self) {
        self.rx.borrow_and_update();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_until_first_publish() {
        let (_publisher, mut reader) = channel::<u32>();
        assert_eq!(reader.try_take(), Err(HandoffError::Empty));
    }

    #[test]
    fn latest_value_wins() {
        let (publisher, mut reader) = channel();
        publisher.publish("A");
        publisher.publish("B");

        assert_eq!(reader.try_take(), Ok("B"));
        assert_eq!(reader.try_take(), Err(HandoffError::Empty));
    }

    #[test]
    fn drain_discards_unread_value() {
        let (publisher, mut reader) = channel();
        publisher.publish(7);
        reader.drain();
        assert_eq!(reader.try_take(), Err(HandoffError::Empty));

        publisher.publish(8);
        assert_eq!(reader.try_take(), Ok(8));
    }

    #[test]
    fn closed_when_publisher_dropped() {
        let (publisher, mut reader) = channel::<u8>();
        drop(publisher);
        assert_eq!(reader.try_take(), Err(HandoffError::Closed));
    }

    #[test]
    fn publisher_survives_reader_drop() {
        let (publisher, reader) = channel();
        drop(reader);
        assert!(publisher.is_closed());
        publisher.publish(1);
    }

    #[test]
    fn reader_sees_monotonic_values_across_threads() {
        let (publisher, mut reader) = channel::<u64>();
        let producer = std::thread::spawn(move || {
            for value in 1..=5_000 {
                publisher.publish(value);
            }
        });

        let mut last = 0;
        while !producer.is_finished() {
            if let Ok(value) = reader.try_take() {
                assert!(value > last, "{} after {}", value, last);
                last = value;
            }
        }
        producer.join().expect("producer panicked");
        if let Ok(value) = reader.try_take() {
            assert!(value > last);
        }
    }
}
