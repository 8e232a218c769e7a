//! Key bindings: key strings, lookup and resolution into commands

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::action::Action;
use crate::event::EventKind;

/// A bindable command, named the way it appears in the `[keys]` config table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Binding {
    ExcludeAssignment,
    ExcludeCourse,
    ToggleShowHidden,
    ToggleIncludeExpired,
    Persist,
    Quit,
}

impl Binding {
    pub const ALL: [Binding; 6] = [
        Binding::ExcludeAssignment,
        Binding::ExcludeCourse,
        Binding::ToggleShowHidden,
        Binding::ToggleIncludeExpired,
        Binding::Persist,
        Binding::Quit,
    ];

    /// Config file name
    pub fn name(self) -> &'static str {
        match self {
            Binding::ExcludeAssignment => "exclude-assignment",
            Binding::ExcludeCourse => "exclude-course",
            Binding::ToggleShowHidden => "toggle-show-hidden",
            Binding::ToggleIncludeExpired => "toggle-include-expired",
            Binding::Persist => "persist",
            Binding::Quit => "quit",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|binding| binding.name() == name)
    }

    /// Short label for the help bar
    pub fn description(self) -> &'static str {
        match self {
            Binding::ExcludeAssignment => "hide assignment",
            Binding::ExcludeCourse => "hide course",
            Binding::ToggleShowHidden => "review hidden",
            Binding::ToggleIncludeExpired => "expired",
            Binding::Persist => "save",
            Binding::Quit => "quit",
        }
    }

    pub fn command(self) -> Command {
        match self {
            Binding::ExcludeAssignment => Command::ExcludeSelectedAssignment,
            Binding::ExcludeCourse => Command::ExcludeSelectedCourse,
            Binding::ToggleShowHidden => Command::ToggleShowHidden,
            Binding::ToggleIncludeExpired => Command::ToggleIncludeExpired,
            Binding::Persist => Command::PersistConfiguration,
            Binding::Quit => Command::Quit,
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Semantic meaning of one input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ExcludeSelectedAssignment,
    ExcludeSelectedCourse,
    ToggleShowHidden,
    ToggleIncludeExpired,
    PersistConfiguration,
    Resize(u16, u16),
    Quit,
    /// Not bound; left to the renderer's own input handling
    Unrecognized,
}

impl Command {
    pub fn into_action(self) -> Option<Action> {
        match self {
            Command::ExcludeSelectedAssignment => Some(Action::ExcludeSelectedAssignment),
            Command::ExcludeSelectedCourse => Some(Action::ExcludeSelectedCourse),
            Command::ToggleShowHidden => Some(Action::ToggleShowHidden),
            Command::ToggleIncludeExpired => Some(Action::ToggleIncludeExpired),
            Command::PersistConfiguration => Some(Action::PersistConfiguration),
            Command::Resize(w, h) => Some(Action::Resize(w, h)),
            Command::Quit => Some(Action::Quit),
            Command::Unrecognized => None,
        }
    }
}

/// Key strings per binding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keybindings {
    bindings: BTreeMap<Binding, Vec<String>>,
}

impl Serialize for Keybindings {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.bindings.len()))?;
        for (binding, keys) in &self.bindings {
            map.serialize_entry(binding.name(), keys)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Keybindings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: HashMap<String, Vec<String>> = HashMap::deserialize(deserializer)?;

        let mut keybindings = Keybindings::new();
        for (name, keys) in raw {
            match Binding::from_name(&name) {
                Some(binding) => keybindings.add(binding, keys),
                None => tracing::warn!(%name, "ignoring unknown key binding"),
            }
        }
        Ok(keybindings)
    }
}

impl Keybindings {
    /// Empty set of bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in bindings. Greek alternates cover a Greek keyboard layout.
    pub fn defaults() -> Self {
        let mut keybindings = Self::new();
        let defaults: [(Binding, &[&str]); 6] = [
            (Binding::ExcludeAssignment, &["c", "ψ"]),
            (Binding::ExcludeCourse, &["x", "θ"]),
            (Binding::ToggleShowHidden, &["space"]),
            (Binding::ToggleIncludeExpired, &["e", "ε"]),
            (Binding::Persist, &["s", "σ"]),
            (Binding::Quit, &["q", "ctrl+c"]),
        ];
        for (binding, keys) in defaults {
            keybindings.add(binding, keys.iter().map(|k| k.to_string()).collect());
        }
        keybindings
    }

    pub fn add(&mut self, binding: Binding, keys: Vec<String>) {
        self.bindings.insert(binding, keys);
    }

    pub fn keys(&self, binding: Binding) -> Option<&[String]> {
        self.bindings.get(&binding).map(Vec::as_slice)
    }

    /// First key string bound to `binding`, for help text
    pub fn first_key(&self, binding: Binding) -> Option<&str> {
        self.keys(binding)?.first().map(String::as_str)
    }

    /// Merge user config onto defaults - user entries replace default ones
    ///
    /// A key the user assigns is taken away from whichever default binding
    /// held it, so the user's choice is the only match.
    pub fn merge(mut defaults: Self, user: Self) -> Self {
        let claimed: Vec<KeyEvent> = user
            .bindings
            .values()
            .flatten()
            .filter_map(|k| parse_key_string(k))
            .collect();
        for keys in defaults.bindings.values_mut() {
            keys.retain(|k| {
                parse_key_string(k)
                    .map_or(true, |parsed| !claimed.iter().any(|c| keys_match(c, &parsed)))
            });
        }
        defaults.bindings.extend(user.bindings);
        defaults
    }

    /// Binding matched by a key event, if any
    pub fn get_binding(&self, key: &KeyEvent) -> Option<Binding> {
        self.bindings
            .iter()
            .find(|(_, keys)| {
                keys.iter()
                    .filter_map(|k| parse_key_string(k))
                    .any(|parsed| keys_match(&parsed, key))
            })
            .map(|(binding, _)| *binding)
    }

    /// Map an input event to its command.
    pub fn resolve(&self, event: &EventKind) -> Command {
        match event {
            EventKind::Resize(w, h) => Command::Resize(*w, *h),
            EventKind::Key(key) if key.kind != KeyEventKind::Release => self
                .get_binding(key)
                .map(Binding::command)
                .unwrap_or(Command::Unrecognized),
            _ => Command::Unrecognized,
        }
    }
}

fn keys_match(parsed: &KeyEvent, key: &KeyEvent) -> bool {
    // Character keys compare case-insensitively; kind and state are ignored
    let codes_match = match (&parsed.code, &key.code) {
        (KeyCode::Char(a), KeyCode::Char(b)) => a.to_lowercase().eq(b.to_lowercase()),
        (a, b) => a == b,
    };
    codes_match && parsed.modifiers == key.modifiers
}

/// Parse a key string like "q", "esc", "ctrl+c" or "ψ" into a KeyEvent
pub fn parse_key_string(key_str: &str) -> Option<KeyEvent> {
    let key_str = key_str.trim().to_lowercase();

    if key_str.is_empty() {
        return None;
    }

    if key_str == "shift+tab" || key_str == "backtab" {
        return Some(press(KeyCode::BackTab, KeyModifiers::SHIFT));
    }

    // A lone "+" is a key, not a separator
    if key_str == "+" {
        return Some(press(KeyCode::Char('+'), KeyModifiers::empty()));
    }

    let parts: Vec<&str> = key_str.split('+').collect();
    let mut modifiers = KeyModifiers::empty();
    let key_part = parts.last()?.trim();

    for part in &parts[..parts.len() - 1] {
        match part.trim() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            "alt" => modifiers |= KeyModifiers::ALT,
            _ => return None,
        }
    }

    let code = match key_part {
        "esc" | "escape" => KeyCode::Esc,
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "delete" => KeyCode::Delete,
        "insert" => KeyCode::Insert,
        "space" => KeyCode::Char(' '),
        f if f.len() > 1 && f.starts_with('f') => KeyCode::F(f[1..].parse().ok()?),
        // Single character; counted in chars so non-ASCII letters work
        c if c.chars().count() == 1 => KeyCode::Char(c.chars().next()?),
        _ => return None,
    };

    Some(press(code, modifiers))
}

fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

/// Format a key string for display (e.g., "ctrl+c" -> "^C", "space" -> "Space")
pub fn format_key_for_display(key_str: &str) -> String {
    let key_str = key_str.trim().to_lowercase();

    if key_str == "shift+tab" || key_str == "backtab" {
        return "Shift+Tab".to_string();
    }

    let parts: Vec<&str> = key_str.split('+').collect();
    let mut modifiers = String::new();
    let key_part = parts.last().copied().unwrap_or(key_str.as_str());

    for part in &parts[..parts.len().saturating_sub(1)] {
        match part.trim() {
            "ctrl" | "control" => modifiers.push('^'),
            "shift" => modifiers.push_str("Shift+"),
            "alt" => modifiers.push_str("Alt+"),
            _ => {}
        }
    }

    let key_display = match key_part {
        "esc" | "escape" => "Esc".to_string(),
        "enter" | "return" => "Enter".to_string(),
        "tab" => "Tab".to_string(),
        "backspace" => "Backspace".to_string(),
        "up" => "Up".to_string(),
        "down" => "Down".to_string(),
        "left" => "Left".to_string(),
        "right" => "Right".to_string(),
        "home" => "Home".to_string(),
        "end" => "End".to_string(),
        "pageup" => "PgUp".to_string(),
        "pagedown" => "PgDn".to_string(),
        "delete" => "Del".to_string(),
        "insert" => "Ins".to_string(),
        "space" => "Space".to_string(),
        // Modified letters are shown upper case (^C), bare ones as typed
        c if c.chars().count() == 1 && !modifiers.is_empty() => c.to_uppercase(),
        other => other.to_string(),
    };

    format!("{modifiers}{key_display}")
}
