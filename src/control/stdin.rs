use super::CommandSource;
use std::io::{BufRead, BufReader, Read};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

const POLL_WAIT: Duration = Duration::from_millis(1);

/// Headless command source: every character typed on stdin is one command
///
/// A helper thread blocks on the reader and forwards characters over a
/// channel, so the frame loop never blocks on the terminal.
pub struct StdinCommands {
    keys: Receiver<char>,
    open: bool,
}

impl StdinCommands {
    pub fn new() -> Self {
        Self::from_reader(std::io::stdin())
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for line in BufReader::new(reader).lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("Stopped reading commands: {}", e);
                        break;
                    }
                };
                for key in line.chars().filter(|c| !c.is_whitespace()) {
                    if tx.send(key).is_err() {
                        return;
                    }
                }
            }
            tracing::debug!("Command input closed");
        });

        Self {
            keys: rx,
            open: true,
        }
    }
}

impl Default for StdinCommands {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandSource for StdinCommands {
    fn poll(&mut self) -> Vec<char> {
        let mut keys = Vec::new();
        if !self.open {
            return keys;
        }

        match self.keys.recv_timeout(POLL_WAIT) {
            Ok(key) => keys.push(key),
            Err(RecvTimeoutError::Timeout) => return keys,
            Err(RecvTimeoutError::Disconnected) => {
                // End of input leaves the stream running without commands
                self.open = false;
                return keys;
            }
        }
        keys.extend(self.keys.try_iter());
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Instant;

    fn drain(source: &mut StdinCommands) -> Vec<char> {
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut keys = Vec::new();
        while source.open && Instant::now() < deadline {
            keys.extend(source.poll());
        }
        keys
    }

    #[test]
    fn typed_characters_arrive_in_order() {
        let mut source = StdinCommands::from_reader(Cursor::new("mf\nT q\n"));
        assert_eq!(drain(&mut source), vec!['m', 'f', 'T', 'q']);
    }

    #[test]
    fn end_of_input_keeps_source_open() {
        let mut source = StdinCommands::from_reader(Cursor::new(""));
        assert!(drain(&mut source).is_empty());
        assert!(source.is_open());
        assert!(source.poll().is_empty());
    }
}
