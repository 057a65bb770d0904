use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use structopt::StructOpt;

use chip_8::emulator::Emulator;

/// The program options.
#[derive(StructOpt, Debug)]
struct Opt {
    /// Number of instructions to execute
    #[structopt(short, long, default_value = "1000")]
    steps: u64,

    /// Instructions executed between timer ticks
    #[structopt(short, long, default_value = "10")]
    cycles_per_frame: u64,

    /// Seed for the random number generator
    #[structopt(long)]
    seed: Option<u64>,

    /// Sleep a sixtieth of a second per frame
    #[structopt(long)]
    realtime: bool,

    /// The program to execute
    #[structopt(parse(from_os_str))]
    input: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    // Get configuration and read input file
    let opt = Opt::from_args();
    log::info!("Executing {:?} with {:?}", &opt.input, &opt);
    let program = std::fs::read(&opt.input)?;

    // Load instructions into emulator memory
    let emulator = Emulator::new();
    let mut emulator = match opt.seed {
        Some(seed) => emulator.with_seed(seed),
        None => emulator,
    };
    emulator.load(&program)?;

    // Start execution
    let cycles_per_frame = opt.cycles_per_frame.max(1);
    let mut outcome = Ok(());
    for step in 1..=opt.steps {
        if let Err(e) = emulator.step() {
            outcome = Err(e);
            break;
        }
        if step % cycles_per_frame == 0 {
            emulator.tick_timers();
            if opt.realtime {
                thread::sleep(Duration::from_secs(1) / 60);
            }
        }
    }

    print!("{}", emulator.output());
    println!(
        "pc={:#05x} i={:#05x} dt={} st={} v={:02x?}",
        emulator.program_counter(),
        emulator.index(),
        emulator.delay_timer(),
        emulator.sound_timer(),
        emulator.registers()
    );

    outcome.map_err(|e| {
        log::error!("{}", e);
        e.into()
    })
}
