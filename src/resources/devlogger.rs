//! Developer message log.
//!
//! [`DevLogger`] collects human-readable messages about the preload (and
//! anything else the host wants to report). Messages can be echoed to the
//! `log` facade, kept in a bounded in-memory history, and fanned out to
//! subscribers over channels.

use bevy_ecs::prelude::Resource;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::info;
use std::collections::VecDeque;

pub const DEFAULT_BUFFER_SIZE: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevLoggerConfig {
    /// Echo every message through `log::info!`.
    pub log_to_console: bool,
    /// Keep the most recent messages in memory.
    pub log_in_memory: bool,
    /// How many messages the in-memory history keeps.
    pub buffer_size: usize,
}

impl Default for DevLoggerConfig {
    fn default() -> Self {
        Self {
            log_to_console: true,
            log_in_memory: true,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

#[derive(Resource, Debug, Default)]
pub struct DevLogger {
    config: DevLoggerConfig,
    history: VecDeque<String>,
    subscribers: Vec<Sender<String>>,
}

impl DevLogger {
    pub fn new(config: DevLoggerConfig) -> Self {
        Self {
            config,
            history: VecDeque::new(),
            subscribers: Vec::new(),
        }
    }

    pub fn config(&self) -> &DevLoggerConfig {
        &self.config
    }

    pub fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.config.log_to_console {
            info!("[devlog] {}", message);
        }
        if self.config.log_in_memory && self.config.buffer_size > 0 {
            while self.history.len() >= self.config.buffer_size {
                self.history.pop_front();
            }
            self.history.push_back(message.clone());
        }
        // Drop subscribers whose receiver is gone.
        self.subscribers
            .retain(|tx| tx.send(message.clone()).is_ok());
    }

    /// Messages kept in memory, oldest first.
    pub fn recent_history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Receive every message logged from now on.
    pub fn subscribe(&mut self) -> Receiver<String> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }
}
