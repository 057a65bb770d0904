use super::key_buffer::KeyBuffer;
use super::keymap::keymap;
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often the listener checks whether it should stop.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A struct for managing keypresses that will automatically
/// start a thread that grabs keypresses.
pub struct KeyManager {
    stop: Arc<AtomicBool>,
    quit: Arc<AtomicBool>,
    key_buffer: Arc<KeyBuffer>,
    event_listener: Option<JoinHandle<()>>,
}

impl KeyManager {
    // Start event listener thread
    pub fn new(timeout: Duration) -> KeyManager {
        let stop = Arc::new(AtomicBool::new(false));
        let quit = Arc::new(AtomicBool::new(false));
        let key_buffer = Arc::new(KeyBuffer::new(timeout));
        let event_listener = event_listener(stop.clone(), quit.clone(), key_buffer.clone());
        KeyManager {
            stop,
            quit,
            key_buffer,
            event_listener: Some(event_listener),
        }
    }

    /// Keypad keys currently held, as a bit mask
    pub fn held(&self) -> u16 {
        self.key_buffer.held()
    }

    /// The most recent keypad key if it is still held
    pub fn last(&self) -> Option<u8> {
        self.key_buffer.last()
    }

    /// Whether Esc or Ctrl-C has been pressed
    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::Relaxed)
    }
}

impl Drop for KeyManager {
    fn drop(&mut self) {
        // Tell the event listener to stop, and wait for it
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.event_listener.take() {
            if handle.join().is_err() {
                log::error!("Key listener panicked");
            }
        }
    }
}

/// Starts a thread that listens for key events and pushes them to the key buffer.
fn event_listener(
    stop: Arc<AtomicBool>,
    quit: Arc<AtomicBool>,
    key_buffer: Arc<KeyBuffer>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while !stop.load(Ordering::Relaxed) {
            match poll(POLL_INTERVAL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    log::error!("Could not poll for events: {}", e);
                    break;
                }
            }

            let event = match read() {
                Ok(event) => event,
                Err(e) => {
                    log::error!("Could not read event: {}", e);
                    break;
                }
            };
            log::debug!("Got event {:?}", event);

            // Investigate the event
            match event {
                Event::Key(KeyEvent { code, modifiers }) => {
                    let ctrl_c =
                        code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL);
                    if code == KeyCode::Esc || ctrl_c {
                        quit.store(true, Ordering::Relaxed);
                    } else if let KeyCode::Char(c) = code {
                        if let Some(key) = keymap(c) {
                            key_buffer.push(key);
                        }
                    }
                }
                _ => {}
            }
        }
    })
}
