use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use chip_8::emulator::input::NUM_KEYS;

struct Presses {
    at: [Option<Instant>; NUM_KEYS as usize],
    last: Option<u8>,
}

/// A thread-safe record of keypad presses.
/// Terminals do not report key releases, so a key counts as held
/// until `timeout` has passed since its last press.
/// Wrap it in an `std::sync::Arc` and you are good to go.
pub struct KeyBuffer {
    timeout: Duration,
    presses: Mutex<Presses>,
}

impl KeyBuffer {
    /// Create a new `KeyBuffer`, forgetting keypresses that are older than `timeout`.
    pub fn new(timeout: Duration) -> KeyBuffer {
        KeyBuffer {
            timeout,
            presses: Mutex::new(Presses {
                at: [None; NUM_KEYS as usize],
                last: None,
            }),
        }
    }

    /// Record a press of a keypad key.
    pub fn push(&self, key: u8) {
        if key >= NUM_KEYS {
            return;
        }
        let mut presses = self.lock();
        presses.at[key as usize] = Some(Instant::now());
        presses.last = Some(key);
    }

    /// Bit `i` is set iff key `i` was pressed recently enough.
    pub fn held(&self) -> u16 {
        let presses = self.lock();
        presses
            .at
            .iter()
            .enumerate()
            .filter(|(_, at)| self.is_fresh(**at))
            .fold(0, |mask, (key, _)| mask | 1 << key)
    }

    /// The latest pressed key, if it is still held.
    pub fn last(&self) -> Option<u8> {
        let presses = self.lock();
        presses
            .last
            .filter(|key| self.is_fresh(presses.at[*key as usize]))
    }

    fn is_fresh(&self, at: Option<Instant>) -> bool {
        at.map_or(false, |at| at.elapsed() < self.timeout)
    }

    fn lock(&self) -> MutexGuard<'_, Presses> {
        self.presses.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
