use std::collections::BTreeSet;
use std::fmt;

use dataveil_config::{EntityAction, EntityConfig};

/// One phase of an entity pass. Variants are ordered by execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    Delete,
    Update,
    Insert,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Delete => "delete",
            Action::Update => "update",
            Action::Insert => "insert",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phases that apply to one entity for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSet(BTreeSet<Action>);

impl ActionSet {
    /// `Delete` follows the `delete` flag; `Update` and `Insert` need both the
    /// matching action and at least one declared column.
    pub fn for_entity(config: &EntityConfig) -> Self {
        let mut set = ActionSet::default();
        if config.delete {
            set.insert(Action::Delete);
        }
        if config.cols.as_ref().is_some_and(|cols| !cols.is_empty()) {
            match config.action {
                EntityAction::Update => set.insert(Action::Update),
                EntityAction::Insert => set.insert(Action::Insert),
                EntityAction::None => {}
            }
        }
        set
    }

    pub fn insert(&mut self, action: Action) {
        self.0.insert(action);
    }

    pub fn contains(&self, action: Action) -> bool {
        self.0.contains(&action)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Actions in execution order.
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Action::as_str).collect();
        f.write_str(&names.join(","))
    }
}
