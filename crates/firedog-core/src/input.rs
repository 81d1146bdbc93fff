use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// A physical key name as reported by the host (e.g. `"ArrowLeft"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key(pub String);

impl Key {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Logical gameplay actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveForward,
    MoveBack,
    Jump,
    Sit,
    Roll,
    Fireball,
    Invisible,
}

/// The four actions whose bindings confusion is allowed to permute.
pub const MOVEMENT_ACTIONS: [Action; 4] = [
    Action::MoveForward,
    Action::MoveBack,
    Action::Jump,
    Action::Sit,
];

/// Action → key binding table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    bindings: HashMap<Action, Key>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings = [
            (Action::MoveForward, "ArrowRight"),
            (Action::MoveBack, "ArrowLeft"),
            (Action::Jump, "ArrowUp"),
            (Action::Sit, "ArrowDown"),
            (Action::Roll, "Enter"),
            (Action::Fireball, "KeyQ"),
            (Action::Invisible, "KeyE"),
        ]
        .into_iter()
        .map(|(action, key)| (action, Key::from(key)))
        .collect();
        Self { bindings }
    }
}

impl KeyBindings {
    pub fn key_for(&self, action: Action) -> Option<&Key> {
        self.bindings.get(&action)
    }

    pub fn bind(&mut self, action: Action, key: Key) {
        self.bindings.insert(action, key);
    }

    /// Keys bound to [`MOVEMENT_ACTIONS`], in that order. Unbound slots are empty keys.
    pub fn movement_keys(&self) -> [Key; 4] {
        MOVEMENT_ACTIONS.map(|action| self.bindings.get(&action).cloned().unwrap_or_else(|| Key::new("")))
    }

    /// Rebind the movement set in [`MOVEMENT_ACTIONS`] order. Other actions are untouched.
    pub fn set_movement_keys(&mut self, keys: [Key; 4]) {
        for (action, key) in MOVEMENT_ACTIONS.into_iter().zip(keys) {
            self.bindings.insert(action, key);
        }
    }

    pub fn roll_requested(&self, input: &InputSnapshot) -> bool {
        is_action_active(self, Action::Roll, input)
    }

    pub fn fireball_requested(&self, input: &InputSnapshot) -> bool {
        is_action_active(self, Action::Fireball, input)
    }

    pub fn invisible_requested(&self, input: &InputSnapshot) -> bool {
        is_action_active(self, Action::Invisible, input)
    }
}

/// The set of keys held during one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    held: HashSet<Key>,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        Self {
            held: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn press(&mut self, key: impl Into<Key>) {
        self.held.insert(key.into());
    }

    pub fn release(&mut self, key: &Key) {
        self.held.remove(key);
    }

    pub fn is_held(&self, key: &Key) -> bool {
        self.held.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

/// Whether the key currently bound to `action` is held in `input`.
pub fn is_action_active(bindings: &KeyBindings, action: Action, input: &InputSnapshot) -> bool {
    bindings
        .key_for(action)
        .is_some_and(|key| input.is_held(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_cover_every_action() {
        let bindings = KeyBindings::default();
        for action in [
            Action::MoveForward,
            Action::MoveBack,
            Action::Jump,
            Action::Sit,
            Action::Roll,
            Action::Fireball,
            Action::Invisible,
        ] {
            assert!(bindings.key_for(action).is_some(), "{action:?} unbound");
        }
    }

    #[test]
    fn action_follows_its_binding() {
        let mut bindings = KeyBindings::default();
        let input = InputSnapshot::from_keys(["ArrowUp"]);
        assert!(is_action_active(&bindings, Action::Jump, &input));

        bindings.bind(Action::Jump, Key::from("Space"));
        assert!(!is_action_active(&bindings, Action::Jump, &input));
    }

    #[test]
    fn set_movement_keys_leaves_abilities_alone() {
        let mut bindings = KeyBindings::default();
        let mut keys = bindings.movement_keys();
        keys.reverse();
        bindings.set_movement_keys(keys.clone());

        assert_eq!(bindings.movement_keys(), keys);
        assert_eq!(bindings.key_for(Action::Roll), Some(&Key::from("Enter")));
        assert_eq!(bindings.key_for(Action::Fireball), Some(&Key::from("KeyQ")));
    }

    #[test]
    fn named_predicates() {
        let bindings = KeyBindings::default();
        let input = InputSnapshot::from_keys(["Enter", "KeyQ"]);
        assert!(bindings.roll_requested(&input));
        assert!(bindings.fireball_requested(&input));
        assert!(!bindings.invisible_requested(&input));
    }
}
