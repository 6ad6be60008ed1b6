use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

use crate::clock::Clock;

/// Unified event type consumed by the frame loop
#[derive(Clone, Debug)]
pub enum BreathEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<BreathEvent, RecvTimeoutError>;
}

/// Production event source reading crossterm events on a background thread
pub struct CrosstermEventSource {
    rx: Receiver<BreathEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                // key release/repeat events are reported on some platforms
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    tx.send(BreathEvent::Key(key))
                }
                Ok(CtEvent::Resize(_, _)) => tx.send(BreathEvent::Resize),
                Ok(_) => Ok(()),
                Err(err) => {
                    tracing::error!(%err, "terminal event stream closed");
                    break;
                }
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<BreathEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-backed event source for headless tests
pub struct TestEventSource {
    rx: Receiver<BreathEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<BreathEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<BreathEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Drives the frame loop one event or tick at a time.
///
/// Frames are scheduled against `clock`, so a due frame is returned as a
/// Tick even while key events are still queued.
pub struct Runner<E: EventSource, C: Clock> {
    event_source: E,
    clock: C,
    frame_interval: Duration,
    next_frame: Instant,
}

impl<E: EventSource, C: Clock> Runner<E, C> {
    pub fn new(event_source: E, clock: C, frame_interval: Duration) -> Self {
        let next_frame = clock.now() + frame_interval;
        Self {
            event_source,
            clock,
            frame_interval,
            next_frame,
        }
    }

    /// Returns Tick if a frame is due, otherwise waits until the next frame
    /// for an event
    pub fn step(&mut self) -> BreathEvent {
        let now = self.clock.now();
        if now >= self.next_frame {
            // after a stall, skip the missed frames instead of replaying them
            let next = self.next_frame + self.frame_interval;
            self.next_frame = if next <= now {
                now + self.frame_interval
            } else {
                next
            };
            return BreathEvent::Tick;
        }

        let wait = self.next_frame - now;
        match self.event_source.recv_timeout(wait) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => {
                self.next_frame = self.clock.now() + self.frame_interval;
                BreathEvent::Tick
            }
            Err(RecvTimeoutError::Disconnected) => {
                // no input will arrive; keep the frame rate without spinning
                std::thread::sleep(wait);
                self.next_frame = self.clock.now() + self.frame_interval;
                BreathEvent::Tick
            }
        }
    }
}
