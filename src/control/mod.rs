mod commands;
mod params;
mod stdin;

pub use commands::Command;
pub use params::Params;
pub use stdin::StdinCommands;

/// Trait for sources of operator keystrokes
pub trait CommandSource {
    /// Collect the keys pressed since the last call
    ///
    /// Must return within a bounded wait (about a millisecond) so the
    /// frame loop stays responsive.
    fn poll(&mut self) -> Vec<char>;

    /// Whether the source is still attached; a closed preview window ends
    /// the session
    fn is_open(&self) -> bool {
        true
    }
}

/// Log the key map once at startup
pub fn log_key_map() {
    for command in Command::ALL {
        tracing::info!("  {}  {}", command.key(), command.description());
    }
}
