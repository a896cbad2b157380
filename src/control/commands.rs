/// Discrete operator commands, one per keystroke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Print,
    ToggleMirror,
    IncreaseBlur,
    DecreaseBlur,
    IncreaseDilate,
    DecreaseDilate,
    IncreaseFocus,
    DecreaseFocus,
    IncreaseTranslucent,
    DecreaseTranslucent,
    Quit,
}

impl Command {
    pub const ALL: [Command; 11] = [
        Command::Print,
        Command::ToggleMirror,
        Command::IncreaseBlur,
        Command::DecreaseBlur,
        Command::IncreaseDilate,
        Command::DecreaseDilate,
        Command::IncreaseFocus,
        Command::DecreaseFocus,
        Command::IncreaseTranslucent,
        Command::DecreaseTranslucent,
        Command::Quit,
    ];

    /// Map a keystroke to its command; unknown keys are ignored
    pub fn from_key(key: char) -> Option<Command> {
        let command = match key {
            'p' => Command::Print,
            'm' => Command::ToggleMirror,
            'b' => Command::IncreaseBlur,
            'B' => Command::DecreaseBlur,
            'd' => Command::IncreaseDilate,
            'D' => Command::DecreaseDilate,
            'f' => Command::IncreaseFocus,
            'F' => Command::DecreaseFocus,
            't' => Command::IncreaseTranslucent,
            'T' => Command::DecreaseTranslucent,
            'q' => Command::Quit,
            _ => return None,
        };
        Some(command)
    }

    pub fn key(self) -> char {
        match self {
            Command::Print => 'p',
            Command::ToggleMirror => 'm',
            Command::IncreaseBlur => 'b',
            Command::DecreaseBlur => 'B',
            Command::IncreaseDilate => 'd',
            Command::DecreaseDilate => 'D',
            Command::IncreaseFocus => 'f',
            Command::DecreaseFocus => 'F',
            Command::IncreaseTranslucent => 't',
            Command::DecreaseTranslucent => 'T',
            Command::Quit => 'q',
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Command::Print => "print current parameters",
            Command::ToggleMirror => "toggle mirror",
            Command::IncreaseBlur => "blur +2",
            Command::DecreaseBlur => "blur -2",
            Command::IncreaseDilate => "dilate +1",
            Command::DecreaseDilate => "dilate -1",
            Command::IncreaseFocus => "focus +10",
            Command::DecreaseFocus => "focus -10",
            Command::IncreaseTranslucent => "translucent size +10",
            Command::DecreaseTranslucent => "translucent size -10",
            Command::Quit => "quit",
        }
    }
}
