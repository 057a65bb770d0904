//! The CHIP-8 emulator as described at https://en.wikipedia.org/wiki/CHIP-8#Virtual_machine_description.

pub mod decoder;
pub mod emulator;
pub mod error;
pub mod input;
pub mod instruction;
pub mod memory;
pub mod output;
pub mod stack;

pub use self::emulator::{Emulator, RunState};
pub use self::error::{Fault, LoadError, StepError};
pub use self::input::{DummyInput, EmulatorInput, Keypad};
pub use self::output::{DummyOutput, EmulatorOutput};
