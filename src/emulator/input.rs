/// Number of keys on the hexadecimal keypad.
pub const NUM_KEYS: u8 = 16;

/// Represents an input device that is capable of providing keys in the range 0..0xF.
pub trait EmulatorInput {
    /// Bit `i` is set iff key `i` is currently held.
    fn get_keys(&self) -> u16;

    /// The most recently pressed key that is still held, if any.
    fn get_key(&self) -> Option<u8>;

    fn is_pressed(&self, key: u8) -> bool {
        key < NUM_KEYS && self.get_keys() & (1 << key) != 0
    }
}

/// An input device that never provides any input
pub struct DummyInput;

impl EmulatorInput for DummyInput {
    fn get_keys(&self) -> u16 {
        0
    }
    fn get_key(&self) -> Option<u8> {
        None
    }
}

/// A keypad whose state is set directly, for headless hosts and tests.
#[derive(Debug, Default, Clone)]
pub struct Keypad {
    keys: u16,
    last: Option<u8>,
}

impl Keypad {
    pub fn new() -> Keypad {
        Keypad::default()
    }

    /// Hold down `key`. Keys outside 0..0xF are ignored.
    pub fn press(&mut self, key: u8) {
        if key < NUM_KEYS {
            self.keys |= 1 << key;
            self.last = Some(key);
        }
    }

    pub fn release(&mut self, key: u8) {
        if key < NUM_KEYS {
            self.keys &= !(1 << key);
            if self.last == Some(key) {
                self.last = None;
            }
        }
    }
}

impl EmulatorInput for Keypad {
    fn get_keys(&self) -> u16 {
        self.keys
    }
    fn get_key(&self) -> Option<u8> {
        self.last
    }
}
