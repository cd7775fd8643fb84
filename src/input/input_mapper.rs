//! Input mapping from raw key presses to semantic actions
//!
//! Maps single characters to live tuning actions. Unknown keys are ignored.

/// Actions triggered by the tuning keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Raise shake amplitude by one step (`+` or `=`)
    IncreaseAmplitude,
    /// Lower shake amplitude by one step (`-`)
    DecreaseAmplitude,
    /// Raise shake frequency by one step (`]`)
    IncreaseFrequency,
    /// Lower shake frequency by one step (`[`)
    DecreaseFrequency,
    /// Turn shaking on or off (`q`)
    ToggleQuake,
    /// Turn BVH debug boxes on or off (`b`)
    ToggleBvh,
    /// Exit application (`x`)
    Exit,
}

/// Maps raw key presses to semantic actions
pub struct InputMapper;

impl InputMapper {
    /// Map a single key to an action
    ///
    /// Letters match in either case. Returns `None` for unmapped keys.
    pub fn map_key(key: char) -> Option<InputAction> {
        match key.to_ascii_lowercase() {
            '+' | '=' => Some(InputAction::IncreaseAmplitude),
            '-' | '_' => Some(InputAction::DecreaseAmplitude),
            ']' => Some(InputAction::IncreaseFrequency),
            '[' => Some(InputAction::DecreaseFrequency),
            'q' => Some(InputAction::ToggleQuake),
            'b' => Some(InputAction::ToggleBvh),
            'x' => Some(InputAction::Exit),
            _ => None,
        }
    }

    /// Map every key in a line of console input, in order
    pub fn map_line(line: &str) -> Vec<InputAction> {
        line.chars().filter_map(Self::map_key).collect()
    }
}
