//! Script characters to session commands: normal (wasd) and vim-style (hjkl).

/// Command fed to a [`Session`](crate::session::Session).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    Pause,
    Start,
    Restart,
    /// Let one gravity tick pass without player input.
    Wait,
}

/// Map one script character to a command. Unknown characters map to `None`.
pub fn char_to_command(c: char) -> Option<Command> {
    match c {
        'h' | 'a' => Some(Command::MoveLeft),
        'l' | 'd' => Some(Command::MoveRight),
        'j' | 's' => Some(Command::SoftDrop),
        'k' | 'w' => Some(Command::Rotate),
        'p' => Some(Command::Pause),
        'n' => Some(Command::Start),
        'r' => Some(Command::Restart),
        '.' => Some(Command::Wait),
        _ => None,
    }
}

/// Parse a whole script, skipping whitespace and unknown characters.
pub fn parse_script(script: &str) -> Vec<Command> {
    script
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .filter_map(char_to_command)
        .collect()
}
