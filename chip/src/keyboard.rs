//! The debounced keyboard model and the blocking key wait.
//!
//! Input is done with a hex keyboard that has 16 keys ranging `0-F`. The `8`, `4`, `6`, and
//! `2` keys are typically used for directional input. Three opcodes are used to detect input.
//! One skips an instruction if a specific key is pressed, while another does the same if a
//! specific key is not pressed. The third waits for a key press, and then stores it in one of
//! the data registers.
//!
//! A press only counts for [`TTL`](crate::definitions::keyboard::TTL) after it was recorded,
//! so a held key has to be delivered again by the input source to stay pressed.
use std::time::Instant;

use hashbrown::HashMap;
use parking_lot::{Condvar, Mutex};

use crate::{definitions::keyboard::TTL, KeyError};

/// Where a press ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The press released a pending key wait.
    Waiter,
    /// Nobody was waiting, the press went into the pressed set.
    Pressed,
}

#[derive(Debug, Default)]
struct WaitSlot {
    armed: bool,
    key: Option<u8>,
    cancelled: bool,
}

#[derive(Debug, Default)]
pub struct Keys {
    /// key code mapped to the moment it was last pressed
    pressed: Mutex<HashMap<u8, Instant>>,
    slot: Mutex<WaitSlot>,
    delivered: Condvar,
}

impl Keys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every given key as pressed right now.
    pub fn add(&self, keys: &[u8]) {
        let now = Instant::now();
        for key in keys {
            self.add_at(*key, now);
        }
    }

    pub(crate) fn add_at(&self, key: u8, at: Instant) {
        self.pressed.lock().insert(key, at);
    }

    /// Checks if the key is currently pressed. Every entry older than the TTL is dropped
    /// along the way, no matter which key was asked for.
    pub fn contains(&self, key: u8) -> bool {
        self.contains_at(key, Instant::now())
    }

    pub(crate) fn contains_at(&self, key: u8, now: Instant) -> bool {
        let mut pressed = self.pressed.lock();
        pressed.retain(|_, at| now.saturating_duration_since(*at) <= TTL);
        pressed.contains_key(&key)
    }

    /// All the keys that are currently pressed, sorted.
    pub fn pressed(&self) -> Vec<u8> {
        let now = Instant::now();
        let mut pressed = self.pressed.lock();
        pressed.retain(|_, at| now.saturating_duration_since(*at) <= TTL);
        let mut keys: Vec<_> = pressed.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Delivers a key press from the input source. A pending key wait takes the press,
    /// otherwise it lands in the pressed set.
    pub fn press(&self, key: u8) -> Delivery {
        {
            let mut slot = self.slot.lock();
            if slot.armed && slot.key.is_none() {
                slot.key = Some(key);
                self.delivered.notify_one();
                return Delivery::Waiter;
            }
        }
        self.add(&[key]);
        Delivery::Pressed
    }

    /// Blocks until the next key press arrives and returns it.
    ///
    /// There is no timeout, only [`cancel`](Keys::cancel) releases the wait without a key.
    pub fn wait_for_key(&self) -> Result<u8, KeyError> {
        let mut slot = self.slot.lock();
        if slot.cancelled {
            return Err(KeyError::Cancelled);
        }
        slot.armed = true;
        slot.key = None;

        while slot.key.is_none() && !slot.cancelled {
            self.delivered.wait(&mut slot);
        }
        slot.armed = false;

        slot.key.take().ok_or(KeyError::Cancelled)
    }

    /// Returns if somebody is currently blocked in [`wait_for_key`](Keys::wait_for_key).
    pub fn is_waiting(&self) -> bool {
        self.slot.lock().armed
    }

    /// Releases the current and every future key wait with an error.
    pub fn cancel(&self) {
        let mut slot = self.slot.lock();
        slot.cancelled = true;
        self.delivered.notify_all();
    }

    /// Allows key waits again after a [`cancel`](Keys::cancel).
    pub fn reset(&self) {
        self.slot.lock().cancelled = false;
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread, time::Duration};

    use super::*;

    fn stale() -> Instant {
        Instant::now()
            .checked_sub(TTL * 2)
            .expect("the clock is running long enough")
    }

    #[test]
    fn test_contains_within_ttl() {
        let keys = Keys::new();
        keys.add(&[0x4, 0xA]);
        assert!(keys.contains(0x4));
        assert!(keys.contains(0xA));
        assert!(!keys.contains(0x5));
    }

    #[test]
    fn test_contains_after_ttl() {
        let keys = Keys::new();
        keys.add(&[0x4]);
        thread::sleep(TTL + Duration::from_millis(20));
        assert!(!keys.contains(0x4));
    }

    #[test]
    fn test_stale_keys_purged_by_unrelated_lookup() {
        let keys = Keys::new();
        keys.add_at(0x1, stale());
        keys.add_at(0x2, stale());
        keys.add(&[0x3]);

        assert!(!keys.contains(0xF));
        assert_eq!(1, keys.pressed.lock().len());
        assert_eq!(vec![0x3], keys.pressed());
    }

    #[test]
    fn test_repress_refreshes() {
        let keys = Keys::new();
        keys.add_at(0x7, stale());
        keys.add(&[0x7]);
        assert!(keys.contains(0x7));
    }

    #[test]
    fn test_press_without_waiter() {
        let keys = Keys::new();
        assert_eq!(Delivery::Pressed, keys.press(0xB));
        assert!(keys.contains(0xB));
    }

    #[test]
    fn test_press_releases_waiter() {
        let keys = Arc::new(Keys::new());
        let waiter = {
            let keys = keys.clone();
            thread::spawn(move || keys.wait_for_key())
        };

        while !keys.is_waiting() {
            thread::yield_now();
        }

        assert_eq!(Delivery::Waiter, keys.press(0xC));
        assert_eq!(Ok(0xC), waiter.join().unwrap());
        // the press was consumed by the waiter
        assert!(!keys.contains(0xC));
        assert!(!keys.is_waiting());
    }

    #[test]
    fn test_cancel_releases_waiter() {
        let keys = Arc::new(Keys::new());
        let waiter = {
            let keys = keys.clone();
            thread::spawn(move || keys.wait_for_key())
        };

        while !keys.is_waiting() {
            thread::yield_now();
        }

        keys.cancel();
        assert_eq!(Err(KeyError::Cancelled), waiter.join().unwrap());
        assert_eq!(Err(KeyError::Cancelled), keys.wait_for_key());

        keys.reset();
        assert!(!keys.is_waiting());
    }
}
