//! Hotkey bindings for tiling actions.
//!
//! Host hotkey capture is outside the core: the host reports key combinations
//! as [`Binding`]s and the [`BindingTable`] maps them to logical [`Action`]s.
//! The table is built from defaults merged with the `keybindings` section of
//! the configuration file.
//!
//! Binding strings look like `"Option+Shift+H"`. Modifier aliases are
//! normalized (`Ctrl`, `Cmd`, `Alt`, `Opt`, `Super`, `Meta`) and the order of
//! modifiers does not matter.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::platform::Modifiers;
use crate::tiling::navigation::Direction;

/// Highest space number reachable with a default binding.
const MAX_DEFAULT_SPACE: usize = 9;

// ============================================================================
// Binding
// ============================================================================

/// A key combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binding {
    /// Held modifiers.
    pub modifiers: Modifiers,
    /// Normalized key name (e.g. `"H"`, `"Return"`, `"F12"`).
    pub key: String,
}

impl Binding {
    /// Creates a binding from a modifier set and a key name.
    #[must_use]
    pub fn new(modifiers: Modifiers, key: &str) -> Self {
        Self { modifiers, key: normalize_key(key) }
    }
}

impl FromStr for Binding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_shortcut(s.trim());
        let mut parts: Vec<&str> = normalized.split('+').map(str::trim).collect();

        let key = parts.pop().filter(|key| !key.is_empty()).ok_or_else(|| format!("Missing key in binding: {s}"))?;

        let mut modifiers = Modifiers::empty();
        for part in parts {
            let modifier = match part {
                "Command" => Modifiers::COMMAND,
                "Option" => Modifiers::OPTION,
                "Control" => Modifiers::CONTROL,
                "Shift" => Modifiers::SHIFT,
                "Fn" => Modifiers::FUNCTION,
                other => return Err(format!("Unknown modifier '{other}' in binding: {s}")),
            };
            modifiers |= modifier;
        }

        if is_modifier_name(key) {
            return Err(format!("Binding has no non-modifier key: {s}"));
        }

        Ok(Self::new(modifiers, key))
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Modifiers, &str); 5] = [
            (Modifiers::COMMAND, "Command"),
            (Modifiers::CONTROL, "Control"),
            (Modifiers::OPTION, "Option"),
            (Modifiers::SHIFT, "Shift"),
            (Modifiers::FUNCTION, "Fn"),
        ];
        for (flag, name) in NAMES {
            if self.modifiers.contains(flag) {
                write!(f, "{name}+")?;
            }
        }
        f.write_str(&self.key)
    }
}

impl Serialize for Binding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Normalizes modifier aliases in a shortcut string.
///
/// - "Ctrl" is normalized to "Control"
/// - "Cmd", "Super" and "Meta" are normalized to "Command"
/// - "Alt" and "Opt" are normalized to "Option"
/// - Key names are normalized by [`normalize_key`]
#[must_use]
pub fn normalize_shortcut(shortcut: &str) -> String {
    let mut result = String::with_capacity(shortcut.len() + 8);
    let parts: Vec<&str> = shortcut.split('+').collect();
    let last = parts.len().saturating_sub(1);

    for (index, part) in parts.iter().enumerate() {
        if index > 0 {
            result.push('+');
        }

        let normalized = match part.trim().to_lowercase().as_str() {
            "ctrl" | "control" => "Control".to_string(),
            "cmd" | "command" | "super" | "meta" => "Command".to_string(),
            "alt" | "opt" | "option" => "Option".to_string(),
            "shift" => "Shift".to_string(),
            "fn" => "Fn".to_string(),
            _ if index == last => normalize_key(part),
            _ => part.trim().to_string(),
        };

        result.push_str(&normalized);
    }

    result
}

/// Normalizes a key name: single characters are uppercased and common
/// punctuation gets its spelled-out name.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    let key = key.trim();
    let named = match key.to_lowercase().as_str() {
        "-" | "minus" => "Minus",
        "=" | "equal" => "Equal",
        "`" | "backquote" => "Backquote",
        "enter" | "return" => "Return",
        "space" => "Space",
        "tab" => "Tab",
        "esc" | "escape" => "Escape",
        _ => return key.to_uppercase(),
    };
    named.to_string()
}

fn is_modifier_name(name: &str) -> bool { matches!(name, "Command" | "Option" | "Control" | "Shift" | "Fn") }

// ============================================================================
// Action
// ============================================================================

/// A logical tiling action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Move focus.
    Focus(Direction),
    /// Move the focused window.
    Move(Direction),
    /// Grow the master area by one step.
    IncreaseMasterRatio,
    /// Shrink the master area by one step.
    DecreaseMasterRatio,
    /// Switch to the given space number.
    SwitchToSpace(usize),
    /// Migrate the focused window to the given space number.
    MoveToSpace(usize),
    /// Re-apply the layout.
    Retile,
    /// Move the focused window into the master slot.
    Promote,
}

impl Action {
    /// Returns `true` if the action can change the window order or layout.
    #[must_use]
    pub const fn affects_layout(self) -> bool {
        matches!(
            self,
            Self::Move(_) | Self::IncreaseMasterRatio | Self::DecreaseMasterRatio | Self::Retile | Self::Promote
        )
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();

        if let Some(direction) = name.strip_prefix("focus-") {
            return direction.parse().map(Self::Focus);
        }
        if let Some(number) = name.strip_prefix("switch-to-space-") {
            return parse_space(number, s).map(Self::SwitchToSpace);
        }
        if let Some(number) = name.strip_prefix("move-to-space-") {
            return parse_space(number, s).map(Self::MoveToSpace);
        }
        if let Some(direction) = name.strip_prefix("move-") {
            return direction.parse().map(Self::Move);
        }

        match name.as_str() {
            "increase-master-ratio" => Ok(Self::IncreaseMasterRatio),
            "decrease-master-ratio" => Ok(Self::DecreaseMasterRatio),
            "retile" => Ok(Self::Retile),
            "promote" => Ok(Self::Promote),
            _ => Err(format!("Unknown action: {s}")),
        }
    }
}

fn parse_space(number: &str, original: &str) -> Result<usize, String> {
    match number.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("Invalid space number in action: {original}")),
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Focus(direction) => write!(f, "focus-{direction}"),
            Self::Move(direction) => write!(f, "move-{direction}"),
            Self::IncreaseMasterRatio => f.write_str("increase-master-ratio"),
            Self::DecreaseMasterRatio => f.write_str("decrease-master-ratio"),
            Self::SwitchToSpace(n) => write!(f, "switch-to-space-{n}"),
            Self::MoveToSpace(n) => write!(f, "move-to-space-{n}"),
            Self::Retile => f.write_str("retile"),
            Self::Promote => f.write_str("promote"),
        }
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// Binding Table
// ============================================================================

/// Maps key combinations to actions.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    bindings: HashMap<Binding, Action>,
}

impl BindingTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// The built-in bindings.
    ///
    /// | Keys | Action |
    /// |---|---|
    /// | Option + H/J/K/L | focus left/down/up/right |
    /// | Option + Shift + H/J/K/L | move left/down/up/right |
    /// | Option + Minus / Equal | decrease / increase master ratio |
    /// | Option + 1-9 | switch to space |
    /// | Option + Shift + 1-9 | move focused window to space |
    /// | Option + R | retile |
    /// | Option + Return | promote |
    #[must_use]
    pub fn defaults() -> Self {
        let mut table = Self::new();
        let option = Modifiers::OPTION;
        let option_shift = Modifiers::OPTION | Modifiers::SHIFT;

        for (key, direction) in [
            ("H", Direction::Left),
            ("J", Direction::Down),
            ("K", Direction::Up),
            ("L", Direction::Right),
        ] {
            table.insert(Binding::new(option, key), Action::Focus(direction));
            table.insert(Binding::new(option_shift, key), Action::Move(direction));
        }

        table.insert(Binding::new(option, "Minus"), Action::DecreaseMasterRatio);
        table.insert(Binding::new(option, "Equal"), Action::IncreaseMasterRatio);

        for n in 1..=MAX_DEFAULT_SPACE {
            let key = n.to_string();
            table.insert(Binding::new(option, &key), Action::SwitchToSpace(n));
            table.insert(Binding::new(option_shift, &key), Action::MoveToSpace(n));
        }

        table.insert(Binding::new(option, "R"), Action::Retile);
        table.insert(Binding::new(option, "Return"), Action::Promote);
        table
    }

    /// Builds the defaults merged with string overrides.
    ///
    /// An empty action string removes the binding. Entries that fail to parse
    /// are logged and skipped.
    #[must_use]
    pub fn with_overrides<'a>(overrides: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        let mut table = Self::defaults();

        for (binding, action) in overrides {
            let binding = match binding.parse::<Binding>() {
                Ok(binding) => binding,
                Err(err) => {
                    tracing::warn!(%binding, error = %err, "skipping invalid keybinding");
                    continue;
                }
            };

            if action.trim().is_empty() {
                tracing::debug!(%binding, "keybinding removed by config");
                table.bindings.remove(&binding);
                continue;
            }

            match action.parse::<Action>() {
                Ok(action) => {
                    tracing::debug!(%binding, %action, "keybinding set by config");
                    table.insert(binding, action);
                }
                Err(err) => tracing::warn!(%binding, error = %err, "skipping invalid keybinding action"),
            }
        }

        table
    }

    /// Binds a key combination, replacing any previous action.
    pub fn insert(&mut self, binding: Binding, action: Action) { self.bindings.insert(binding, action); }

    /// Returns the action bound to a key combination.
    #[must_use]
    pub fn lookup(&self, binding: &Binding) -> Option<Action> { self.bindings.get(binding).copied() }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize { self.bindings.len() }

    /// Returns `true` if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.bindings.is_empty() }

    /// Returns all bindings sorted by their display form.
    #[must_use]
    pub fn sorted(&self) -> Vec<(Binding, Action)> {
        let mut entries: Vec<(Binding, Action)> =
            self.bindings.iter().map(|(binding, action)| (binding.clone(), *action)).collect();
        entries.sort_by_cached_key(|(binding, _)| binding.to_string());
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Normalization
    // ========================================================================

    #[test]
    fn test_normalize_shortcut_ctrl() {
        assert_eq!(normalize_shortcut("Ctrl+Shift+S"), "Control+Shift+S");
        assert_eq!(normalize_shortcut("Control+Shift+S"), "Control+Shift+S");
    }

    #[test]
    fn test_normalize_shortcut_cmd() {
        assert_eq!(normalize_shortcut("Cmd+K"), "Command+K");
        assert_eq!(normalize_shortcut("super+k"), "Command+K");
        assert_eq!(normalize_shortcut("Meta+K"), "Command+K");
    }

    #[test]
    fn test_normalize_shortcut_option() {
        assert_eq!(normalize_shortcut("Alt+K"), "Option+K");
        assert_eq!(normalize_shortcut("Opt+K"), "Option+K");
        assert_eq!(normalize_shortcut("option+k"), "Option+K");
    }

    #[test]
    fn test_normalize_shortcut_named_keys() {
        assert_eq!(normalize_shortcut("Cmd+`"), "Command+Backquote");
        assert_eq!(normalize_shortcut("Alt+-"), "Option+Minus");
        assert_eq!(normalize_shortcut("Alt+Enter"), "Option+Return");
        assert_eq!(normalize_shortcut("F12"), "F12");
    }

    // ========================================================================
    // Binding
    // ========================================================================

    #[test]
    fn test_binding_parse_order_independent() {
        let a: Binding = "Option+Shift+H".parse().unwrap();
        let b: Binding = "shift+alt+h".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.modifiers, Modifiers::OPTION | Modifiers::SHIFT);
        assert_eq!(a.key, "H");
    }

    #[test]
    fn test_binding_display_is_canonical() {
        let binding: Binding = "Shift+Ctrl+Cmd+1".parse().unwrap();
        assert_eq!(binding.to_string(), "Command+Control+Shift+1");
    }

    #[test]
    fn test_binding_parse_errors() {
        assert!("".parse::<Binding>().is_err());
        assert!("Option+".parse::<Binding>().is_err());
        assert!("Hyper+H".parse::<Binding>().is_err());
        assert!("Option+Shift".parse::<Binding>().is_err());
    }

    // ========================================================================
    // Action
    // ========================================================================

    #[test]
    fn test_action_parse() {
        assert_eq!("focus-left".parse::<Action>(), Ok(Action::Focus(Direction::Left)));
        assert_eq!("move-down".parse::<Action>(), Ok(Action::Move(Direction::Down)));
        assert_eq!("move-to-space-3".parse::<Action>(), Ok(Action::MoveToSpace(3)));
        assert_eq!("switch-to-space-12".parse::<Action>(), Ok(Action::SwitchToSpace(12)));
        assert_eq!("Retile".parse::<Action>(), Ok(Action::Retile));
        assert!("switch-to-space-0".parse::<Action>().is_err());
        assert!("focus-nowhere".parse::<Action>().is_err());
        assert!("explode".parse::<Action>().is_err());
    }

    #[test]
    fn test_action_display_parses_back() {
        for action in [
            Action::Focus(Direction::Right),
            Action::Move(Direction::Up),
            Action::IncreaseMasterRatio,
            Action::MoveToSpace(4),
            Action::Promote,
        ] {
            assert_eq!(action.to_string().parse::<Action>(), Ok(action));
        }
    }

    // ========================================================================
    // Binding Table
    // ========================================================================

    #[test]
    fn test_default_table() {
        let table = BindingTable::defaults();
        // 8 directional + 2 ratio + 18 space + retile + promote
        assert_eq!(table.len(), 30);
        assert_eq!(
            table.lookup(&"Option+L".parse().unwrap()),
            Some(Action::Focus(Direction::Right))
        );
        assert_eq!(
            table.lookup(&"Option+Shift+3".parse().unwrap()),
            Some(Action::MoveToSpace(3))
        );
        assert_eq!(table.lookup(&"Option+Return".parse().unwrap()), Some(Action::Promote));
        assert_eq!(table.lookup(&"Command+Q".parse().unwrap()), None);
    }

    #[test]
    fn test_overrides_merge_and_skip_invalid() {
        let overrides: HashMap<String, String> = [
            ("Ctrl+Alt+M", "promote"),
            ("Option+R", ""),
            ("Option+H", "focus-right"),
            ("Bogus+X", "retile"),
            ("Option+X", "not-an-action"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let table = BindingTable::with_overrides(&overrides);
        assert_eq!(table.lookup(&"Control+Option+M".parse().unwrap()), Some(Action::Promote));
        assert_eq!(table.lookup(&"Option+R".parse().unwrap()), None);
        assert_eq!(
            table.lookup(&"Option+H".parse().unwrap()),
            Some(Action::Focus(Direction::Right))
        );
        assert_eq!(table.lookup(&"Option+X".parse().unwrap()), None);
        assert_eq!(table.len(), 30);
    }

    #[test]
    fn test_sorted_is_stable() {
        let sorted = BindingTable::defaults().sorted();
        let names: Vec<String> = sorted.iter().map(|(b, _)| b.to_string()).collect();
        let mut expected = names.clone();
        expected.sort();
        assert_eq!(names, expected);
    }
}
