//! Combo chain legality.
//!
//! Chains follow `starter -> link* -> finisher` (or `starter -> finisher`).
//! The finisher bonus itself is computed by the resolver; this module only
//! reports legality and chain length.

use crate::technique::{ComboRole, Technique, TechniqueId};

/// Chain played so far by one combatant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComboState {
    pub chain: Vec<TechniqueId>,
    /// A started chain that has not yet been finished.
    pub active: bool,
}

/// Role(s) that may legally come next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expected {
    Starter,
    LinkOrFinisher,
}

impl ComboState {
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn expected_next(&self) -> Expected {
        if self.active {
            Expected::LinkOrFinisher
        } else {
            Expected::Starter
        }
    }
}

/// Stateless chain rules.
pub struct ComboTracker;

impl ComboTracker {
    /// True if playing `technique` continues or opens a chain.
    pub fn can_extend(state: &ComboState, technique: &Technique) -> bool {
        match (state.active, technique.combo_role) {
            (false, ComboRole::Starter) => true,
            (true, ComboRole::Link | ComboRole::Finisher) => true,
            _ => false,
        }
    }

    /// State after playing `technique`.
    ///
    /// A starter always opens a fresh chain (abandoning any active one); a
    /// link or finisher extends an active chain; anything else resets.
    pub fn advance(state: &ComboState, technique: &Technique) -> ComboState {
        match (state.active, technique.combo_role) {
            (_, ComboRole::Starter) => ComboState {
                chain: vec![technique.id.clone()],
                active: true,
            },
            (true, ComboRole::Link) => {
                let mut next = state.clone();
                next.chain.push(technique.id.clone());
                next
            }
            (true, ComboRole::Finisher) => {
                let mut next = state.clone();
                next.chain.push(technique.id.clone());
                next.active = false;
                next
            }
            _ => ComboState::default(),
        }
    }

    pub fn reset(_state: &ComboState) -> ComboState {
        ComboState::default()
    }

    pub fn chain_length(state: &ComboState) -> usize {
        state.chain.len()
    }

    /// Entries that precede `technique` if it legally finishes the chain, else 0.
    pub fn finisher_chain_length(state: &ComboState, technique: &Technique) -> usize {
        if state.active && technique.combo_role == ComboRole::Finisher {
            state.chain.len()
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tech(id: &str, role: ComboRole) -> Technique {
        Technique::new(id, 10).with_role(role)
    }

    #[test]
    fn full_chain_finishes_inactive() {
        let start = tech("rising-palm", ComboRole::Starter);
        let link = tech("river-step", ComboRole::Link);
        let finish = tech("falling-star", ComboRole::Finisher);

        let s = ComboTracker::advance(&ComboState::default(), &start);
        assert!(s.active);
        let s = ComboTracker::advance(&s, &link);
        assert_eq!(ComboTracker::finisher_chain_length(&s, &finish), 2);
        let s = ComboTracker::advance(&s, &finish);

        assert!(!s.active);
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn starter_opens_a_new_chain_mid_combo() {
        let start = tech("rising-palm", ComboRole::Starter);
        let s = ComboTracker::advance(&ComboState::default(), &start);
        let s = ComboTracker::advance(&s, &tech("river-step", ComboRole::Link));
        let s = ComboTracker::advance(&s, &start);

        assert_eq!(s.chain, vec![TechniqueId::from("rising-palm")]);
        assert!(s.active);
    }

    #[test]
    fn standalone_resets_active_chain() {
        let s = ComboTracker::advance(&ComboState::default(), &tech("rising-palm", ComboRole::Starter));
        let s = ComboTracker::advance(&s, &tech("jab", ComboRole::Standalone));
        assert_eq!(s, ComboState::default());
    }

    fn role() -> impl Strategy<Value = ComboRole> {
        prop_oneof![
            Just(ComboRole::Starter),
            Just(ComboRole::Link),
            Just(ComboRole::Finisher),
            Just(ComboRole::Standalone),
        ]
    }

    proptest! {
        #[test]
        fn link_or_finisher_never_opens_a_chain(is_link in any::<bool>()) {
            let role = if is_link { ComboRole::Link } else { ComboRole::Finisher };
            let t = tech("x", role);
            let idle = ComboState::default();
            prop_assert!(!ComboTracker::can_extend(&idle, &t));
            let next = ComboTracker::advance(&idle, &t);
            prop_assert!(!next.active);
            prop_assert!(next.is_empty());
        }

        #[test]
        fn chains_stay_legal(roles in proptest::collection::vec(role(), 0..24)) {
            let mut state = ComboState::default();
            for (i, role) in roles.iter().enumerate() {
                state = ComboTracker::advance(&state, &tech(&format!("t{i}"), *role));
                let played: Vec<ComboRole> = state
                    .chain
                    .iter()
                    .map(|id| roles[id.as_str()[1..].parse::<usize>().unwrap()])
                    .collect();
                if let Some((first, rest)) = played.split_first() {
                    prop_assert_eq!(*first, ComboRole::Starter);
                    let (last, middle) = rest.split_last().map_or((None, &[][..]), |(l, m)| (Some(l), m));
                    prop_assert!(middle.iter().all(|r| *r == ComboRole::Link));
                    if let Some(last) = last {
                        prop_assert!(matches!(last, ComboRole::Link | ComboRole::Finisher));
                        prop_assert_eq!(state.active, *last != ComboRole::Finisher);
                    }
                }
            }
        }
    }
}
