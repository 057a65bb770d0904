use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use structopt::StructOpt;

use chip_8::emulator::{Emulator, EmulatorOutput};

mod crossterm_io;
mod key_buffer;
mod key_manager;
mod keymap;
use crossterm_io::{CrosstermInput, CrosstermOutput};
use key_manager::KeyManager;

/// Timers count down at 60 Hz, so a frame is a sixtieth of a second.
const FRAMES_PER_SECOND: u32 = 60;

/// The program options.
#[derive(StructOpt, Debug)]
struct Opt {
    /// Instructions executed per frame
    #[structopt(short, long, default_value = "10")]
    cycles_per_frame: u32,

    /// Seed for the random number generator
    #[structopt(long)]
    seed: Option<u64>,

    /// Milliseconds a key counts as held after it was pressed
    #[structopt(long, default_value = "250")]
    key_timeout_ms: u64,

    /// The program to execute
    #[structopt(parse(from_os_str))]
    input: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Get configuration and read input file
    let opt = Opt::from_args();
    log::info!("Executing {:?} with {:?}", &opt.input, &opt);
    let program = std::fs::read(&opt.input)?;

    let key_manager = KeyManager::new(Duration::from_millis(opt.key_timeout_ms));

    // Load instructions into emulator memory
    let emulator = Emulator::with_io(CrosstermInput::new(&key_manager), CrosstermOutput::new()?);
    let mut emulator = match opt.seed {
        Some(seed) => emulator.with_seed(seed),
        None => emulator,
    };
    emulator.load(&program)?;

    // Start execution
    let frame = Duration::from_secs(1) / FRAMES_PER_SECOND;
    let outcome = 'frames: loop {
        let started = Instant::now();
        if key_manager.quit_requested() {
            break Ok(());
        }
        for _ in 0..opt.cycles_per_frame {
            if let Err(e) = emulator.step() {
                break 'frames Err(e);
            }
        }
        emulator.tick_timers();
        emulator.output_mut().refresh();
        if let Some(rest) = frame.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    };

    // Restore the terminal before reporting anything
    drop(emulator);

    if let Err(e) = outcome {
        log::error!("{}", e);
        return Err(e.into());
    }
    Ok(())
}
