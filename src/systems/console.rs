//! Console input system
//!
//! Reads lines from a reader (stdin in the binary) on a worker thread and
//! forwards the mapped actions over a channel. The frame loop drains the
//! channel once per frame, so key handling never blocks a tick.

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::input::{InputAction, InputMapper};

/// Non-blocking source of tuning actions
pub struct ConsoleInput {
    receiver: Receiver<InputAction>,
    disconnected: bool,
    _worker: JoinHandle<()>,
}

impl ConsoleInput {
    /// Read actions from standard input
    pub fn stdin() -> Self {
        Self::spawn(io::BufReader::new(io::stdin()))
    }

    /// Read actions from any line-oriented reader
    pub fn spawn<R: BufRead + Send + 'static>(reader: R) -> Self {
        let (sender, receiver) = mpsc::channel();
        let worker = thread::spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        log::warn!("console input stopped: {}", e);
                        break;
                    }
                };
                for action in InputMapper::map_line(&line) {
                    if sender.send(action).is_err() {
                        // Receiver dropped; the app is shutting down
                        return;
                    }
                }
            }
            log::debug!("console input closed");
        });

        Self {
            receiver,
            disconnected: false,
            _worker: worker,
        }
    }

    /// Take every action received since the last poll
    pub fn poll(&mut self) -> Vec<InputAction> {
        let mut actions = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(action) => actions.push(action),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    break;
                }
            }
        }
        actions
    }

    /// True once the reader has ended and every action was drained
    pub fn is_closed(&self) -> bool {
        self.disconnected
    }
}
