//! Accepted representations of a timeline's state collection
//!
//! Persisted documents and in-process callers hand over the states either
//! as a keyed object (`{id: State}`), as a list of states, or as a list of
//! `[id, State]` pairs. [`StatesRepr`] accepts all three and normalizes to
//! one ordered map.

use crate::error::TimelineError;
use crate::state::State;
use actormap_model::StateId;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Normalized state collection
pub type StateMap = IndexMap<StateId, State>;

/// Any accepted form of a state collection
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StatesRepr {
    /// `{ "<id>": State, ... }`
    Keyed(IndexMap<StateId, State>),
    /// `[[ "<id>", State ], ...]`
    Pairs(Vec<(StateId, State)>),
    /// `[ State, ... ]`
    List(Vec<State>),
}

impl StatesRepr {
    /// Normalize into a map keyed by state id
    ///
    /// # Errors
    /// - `KeyMismatch` if a key disagrees with the id inside its state
    /// - `DuplicateState` if the same id appears twice
    pub fn into_map(self) -> Result<StateMap, TimelineError> {
        match self {
            Self::Keyed(map) => {
                for (key, state) in &map {
                    check_key(key, state)?;
                }
                Ok(map)
            }
            Self::Pairs(pairs) => {
                let mut map = StateMap::with_capacity(pairs.len());
                for (key, state) in pairs {
                    check_key(&key, &state)?;
                    insert_unique(&mut map, state)?;
                }
                Ok(map)
            }
            Self::List(states) => {
                let mut map = StateMap::with_capacity(states.len());
                for state in states {
                    insert_unique(&mut map, state)?;
                }
                Ok(map)
            }
        }
    }
}

fn check_key(key: &StateId, state: &State) -> Result<(), TimelineError> {
    if key == &state.id {
        Ok(())
    } else {
        Err(TimelineError::KeyMismatch {
            key: key.clone(),
            id: state.id.clone(),
        })
    }
}

fn insert_unique(map: &mut StateMap, state: State) -> Result<(), TimelineError> {
    if map.contains_key(&state.id) {
        return Err(TimelineError::DuplicateState(state.id));
    }
    map.insert(state.id.clone(), state);
    Ok(())
}

impl From<StateMap> for StatesRepr {
    fn from(value: StateMap) -> Self {
        Self::Keyed(value)
    }
}

impl From<HashMap<StateId, State>> for StatesRepr {
    fn from(value: HashMap<StateId, State>) -> Self {
        Self::Keyed(value.into_iter().collect())
    }
}

impl From<BTreeMap<StateId, State>> for StatesRepr {
    fn from(value: BTreeMap<StateId, State>) -> Self {
        Self::Keyed(value.into_iter().collect())
    }
}

impl From<Vec<State>> for StatesRepr {
    fn from(value: Vec<State>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<(StateId, State)>> for StatesRepr {
    fn from(value: Vec<(StateId, State)>) -> Self {
        Self::Pairs(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actormap_model::Graph;

    fn state(id: &str) -> State {
        let mut s = State::new(id, None, Graph::new());
        s.id = StateId::from(id);
        s
    }

    #[test]
    fn keyed_object_is_accepted() {
        let json = serde_json::json!({
            "s1": serde_json::to_value(state("s1")).unwrap(),
            "s2": serde_json::to_value(state("s2")).unwrap(),
        });
        let repr: StatesRepr = serde_json::from_value(json).unwrap();
        assert!(matches!(repr, StatesRepr::Keyed(_)));
        assert_eq!(repr.into_map().unwrap().len(), 2);
    }

    #[test]
    fn list_is_accepted() {
        let json = serde_json::to_value(vec![state("s1"), state("s2")]).unwrap();
        let repr: StatesRepr = serde_json::from_value(json).unwrap();
        assert!(matches!(repr, StatesRepr::List(_)));
        let map = repr.into_map().unwrap();
        assert!(map.contains_key(&StateId::from("s2")));
    }

    #[test]
    fn pairs_are_accepted() {
        let json = serde_json::json!([["s1", serde_json::to_value(state("s1")).unwrap()]]);
        let repr: StatesRepr = serde_json::from_value(json).unwrap();
        assert!(matches!(repr, StatesRepr::Pairs(_)));
        assert_eq!(repr.into_map().unwrap().len(), 1);
    }

    #[test]
    fn mismatched_key_is_rejected() {
        let mut map = StateMap::new();
        map.insert(StateId::from("wrong"), state("s1"));
        let result = StatesRepr::from(map).into_map();
        assert!(matches!(result, Err(TimelineError::KeyMismatch { .. })));
    }

    #[test]
    fn duplicate_in_list_is_rejected() {
        let result = StatesRepr::from(vec![state("s1"), state("s1")]).into_map();
        assert!(matches!(result, Err(TimelineError::DuplicateState(id)) if id.as_str() == "s1"));
    }

    #[test]
    fn hash_map_normalizes() {
        let mut map = HashMap::new();
        map.insert(StateId::from("s1"), state("s1"));
        assert_eq!(StatesRepr::from(map).into_map().unwrap().len(), 1);
    }
}
