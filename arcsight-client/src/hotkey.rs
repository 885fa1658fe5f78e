use std::fmt;
use std::str::FromStr;

/// Overlay toggle key. Only bare keys are supported, no modifiers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Hotkey {
    Function(u8),
    Digit(u8),
    Letter(char),
}

impl Default for Hotkey {
    fn default() -> Self {
        Hotkey::Function(9)
    }
}

impl Hotkey {
    /// Win32 virtual-key code.
    pub fn vk_code(self) -> u32 {
        match self {
            Hotkey::Function(n) => 0x70 + u32::from(n) - 1,
            Hotkey::Digit(d) => 0x30 + u32::from(d),
            Hotkey::Letter(c) => c as u32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported hotkey {0:?}; expected F1-F24, a digit or a letter")]
pub struct ParseHotkeyError(pub String);

impl FromStr for Hotkey {
    type Err = ParseHotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_uppercase();
        let err = || ParseHotkeyError(s.to_string());
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_digit() => Ok(Hotkey::Digit(c as u8 - b'0')),
            (Some(c), None) if c.is_ascii_uppercase() => Ok(Hotkey::Letter(c)),
            (Some('F'), Some(_)) => match key[1..].parse::<u8>() {
                Ok(n @ 1..=24) => Ok(Hotkey::Function(n)),
                _ => Err(err()),
            },
            _ => Err(err()),
        }
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hotkey::Function(n) => write!(f, "F{n}"),
            Hotkey::Digit(d) => write!(f, "{d}"),
            Hotkey::Letter(c) => write!(f, "{c}"),
        }
    }
}
