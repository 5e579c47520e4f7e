//! Key bindings.
//!
//! A [`Binding`] groups the keys that trigger one action together with the
//! short help shown for it. Components expose their bindings through the
//! [`KeyMap`] trait so help lines can be rendered uniformly.

use bubbletea_rs::KeyMsg;
use crossterm::event::KeyCode;

/// Keys bound to a single action, with help text.
#[derive(Debug, Clone)]
pub struct Binding {
    /// Keys that trigger the action.
    pub keys: Vec<KeyCode>,
    /// Short key label, e.g. `"←/h"`.
    pub help: String,
    /// What the action does, e.g. `"prev page"`.
    pub description: String,
    enabled: bool,
}

impl Binding {
    /// Creates an enabled binding for the given keys.
    pub fn new(keys: Vec<KeyCode>) -> Self {
        Self {
            keys,
            help: String::new(),
            description: String::new(),
            enabled: true,
        }
    }

    /// Sets the help label and description (builder pattern).
    pub fn with_help(mut self, help: impl Into<String>, description: impl Into<String>) -> Self {
        self.help = help.into();
        self.description = description.into();
        self
    }

    /// Enables or disables the binding.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns true when the binding is active.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns true when the key message triggers this binding.
    pub fn matches(&self, msg: &KeyMsg) -> bool {
        self.enabled && self.keys.contains(&msg.key)
    }

    /// Renders `"help description"`, or nothing for a disabled binding.
    pub fn help_line(&self) -> Option<String> {
        if !self.enabled || self.help.is_empty() {
            return None;
        }
        Some(format!("{} {}", self.help, self.description))
    }
}

/// A component's set of key bindings.
pub trait KeyMap {
    /// Bindings shown in the compact help line.
    fn short_help(&self) -> Vec<&Binding>;

    /// All bindings, grouped into columns.
    fn full_help(&self) -> Vec<Vec<&Binding>>;
}

/// Joins the short help of a key map into a single line.
pub fn short_help_view<K: KeyMap + ?Sized>(keymap: &K, separator: &str) -> String {
    keymap
        .short_help()
        .into_iter()
        .filter_map(Binding::help_line)
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyMsg {
        KeyMsg {
            key: code,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_binding_matches() {
        let binding = Binding::new(vec![KeyCode::Left, KeyCode::Char('h')]);
        assert!(binding.matches(&key(KeyCode::Left)));
        assert!(binding.matches(&key(KeyCode::Char('h'))));
        assert!(!binding.matches(&key(KeyCode::Right)));
    }

    #[test]
    fn test_disabled_binding_never_matches() {
        let mut binding = Binding::new(vec![KeyCode::Enter]).with_help("enter", "select");
        binding.set_enabled(false);
        assert!(!binding.matches(&key(KeyCode::Enter)));
        assert_eq!(binding.help_line(), None);
    }

    struct Pair(Binding, Binding);

    impl KeyMap for Pair {
        fn short_help(&self) -> Vec<&Binding> {
            vec![&self.0, &self.1]
        }

        fn full_help(&self) -> Vec<Vec<&Binding>> {
            vec![vec![&self.0, &self.1]]
        }
    }

    #[test]
    fn test_short_help_view() {
        let keymap = Pair(
            Binding::new(vec![KeyCode::Left]).with_help("←", "prev"),
            Binding::new(vec![KeyCode::Right]).with_help("→", "next"),
        );
        assert_eq!(short_help_view(&keymap, " • "), "← prev • → next");
    }
}
