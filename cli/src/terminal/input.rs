use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tokio_util::sync::CancellationToken;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Cancels a token when the user presses `q` or Ctrl-C.
///
/// Puts the terminal into raw mode for as long as the handle lives.
pub struct InputHandle {
    finished: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl InputHandle {
    pub fn start(token: CancellationToken) -> anyhow::Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;

        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        let worker = thread::spawn(move || {
            while !flag.load(Ordering::Relaxed) && !token.is_cancelled() {
                match event::poll(POLL_INTERVAL) {
                    Ok(true) => {
                        if let Ok(Event::Key(key_event)) = event::read() {
                            if is_interrupt(&key_event) {
                                token.cancel();
                            }
                        }
                    }
                    Ok(false) => {}
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            finished,
            worker: Some(worker),
        })
    }
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        self.finished.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        let _ = disable_raw_mode();
    }
}

fn is_interrupt(key_event: &KeyEvent) -> bool {
    let is_q = key_event.code == KeyCode::Char('q');
    let is_ctrl_c = key_event.code == KeyCode::Char('c')
        && key_event.modifiers.contains(KeyModifiers::CONTROL);

    (is_q || is_ctrl_c) && key_event.kind == KeyEventKind::Press
}

/// Whatever is listening for a stop request during a run.
pub enum StopWatcher {
    Keyboard(InputHandle),
    Signal(tokio::task::JoinHandle<()>),
}

impl StopWatcher {
    /// Prefers the keyboard reader and falls back to Ctrl-C when there is no usable terminal.
    pub fn start(token: &CancellationToken, no_input: bool) -> Self {
        if !no_input {
            match InputHandle::start(token.clone()) {
                Ok(handle) => return Self::Keyboard(handle),
                Err(e) => debug!("keyboard input unavailable: {e:#}"),
            }
        }

        let token = token.clone();
        Self::Signal(tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        }))
    }

    pub fn hint(&self) -> &'static str {
        match self {
            Self::Keyboard(_) => "press 'q' to stop after the current target",
            Self::Signal(_) => "press Ctrl-C to stop after the current target",
        }
    }
}

impl Drop for StopWatcher {
    fn drop(&mut self) {
        if let Self::Signal(task) = self {
            task.abort();
        }
    }
}
