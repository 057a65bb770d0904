/*!

A CHIP-8 emulator as specified at https://en.wikipedia.org/wiki/CHIP-8.

# Crossterm Frontend

If you want to try the emulator on some programs, there is a ready-to-use implementation
you can run by using `cargo run --release --bin crossterm_frontend -- <program>`.
The keypad is mapped to the left four columns of the keyboard (`1234`, `qwer`, `asdf`, `zxcv`),
and Esc quits. Logging goes to stderr, so redirect it, e.g. `RUST_LOG=debug ... 2> chip8.log`.

For a headless run that prints the screen when done, use
`cargo run --bin no_frontend -- <program> --steps 5000`.

# Library

If you are not interested in handling input (key presses and such),
then you can use `Emulator::new()` to get an emulator to work with.

The main way of running a program is to load instructions as bytes.

```rust
use chip_8::emulator::Emulator;

let mut emulator = Emulator::new();

// Load a program at address 0x200.
let clear_display = [0x00, 0xE0];
emulator.load(&clear_display).unwrap();
emulator.step().unwrap(); // Will now clear the display
assert_eq!(emulator.program_counter(), 0x202);
```

Alternatively, you can experiment by executing instructions manually.

```rust
use chip_8::emulator::Emulator;
use chip_8::emulator::instruction::{Instruction, Reg, Const, Addr};

let mut emulator = Emulator::new();

// Execute instructions manually
emulator.execute_single(Instruction::ClearScreen).unwrap();

// Or many sequentially
emulator.execute_many(&[
    Instruction::Goto(Addr(0x250)),
    Instruction::SetRegToConst(Reg(0xA), Const(35)),
    Instruction::SetRegToReg(Reg(0xB), Reg(0xA))
]).unwrap();
assert_eq!(emulator.register(0xB), 35);
```

## Faults

Anything the machine cannot do, such as returning with an empty stack or running into
an unknown opcode, halts the emulator. The error says where it happened, and every later
step returns the same error.

```rust
use chip_8::emulator::{Emulator, Fault};

let mut emulator = Emulator::new();
emulator.load(&[0x00, 0xEE]).unwrap(); // RET with nothing to return to

let error = emulator.step().unwrap_err();
assert_eq!(error.fault, Fault::StackUnderflow);
assert_eq!(error.pc, 0x200);
assert!(emulator.is_halted());
```

## Custom input and output

To get keypresses, you must implement `EmulatorInput` and `EmulatorOutput`,
which represent somewhere to get keyboard input from and a screen respectively.
These tell the emulator how to get the currently pressed keys, and how to draw to the screen.
Take a look at `src/emulator/input.rs` and `src/emulator/output.rs` to see how to implement this, then do the following.

```ignore
use chip_8::emulator::Emulator;

let mut emulator = Emulator::with_io(MyInput::new(), MyOutput::new());
```

Timers are not ticked by the emulator. Call `Emulator::tick_timers` at 60 Hz from the host loop,
as done with crossterm in crossterm_frontend.
*/

pub mod emulator;
pub mod util;
