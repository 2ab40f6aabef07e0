//! [`Console`] implementation backed by an [`InteractionChannel`].

use std::sync::Arc;

use crate::program::{Console, ProgramError};

use super::InteractionChannel;

/// Routes a program's prints and reads through its session channel.
pub struct ChannelConsole {
    channel: Arc<InteractionChannel>,
}

impl ChannelConsole {
    pub fn new(channel: Arc<InteractionChannel>) -> Self {
        Self { channel }
    }
}

impl Console for ChannelConsole {
    fn print(&mut self, line: &str) {
        self.channel.write(line);
    }

    fn read(&mut self, prompt: &str) -> Result<String, ProgramError> {
        // The prompt must be visible before the read parks.
        if !prompt.is_empty() {
            self.channel.write(prompt);
        }
        Ok(self.channel.read_input()?)
    }
}
