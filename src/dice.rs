use rand::{
    Rng,
    SeedableRng,
    rngs::StdRng,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::fmt;

/// Number of dice in a game.
pub const DICE_COUNT: usize = 10;

pub const MIN_FACE: u8 = 1;
pub const MAX_FACE: u8 = 6;

const ID_LEN: usize = 21;
const ID_ALPHABET: &[u8; 64] =
    b"useandom-26T198340PX75pxJACKVERYMINDBUSHWOLF_GQZbfghjklqvwyzrict";

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct DieId(String);

impl DieId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Die {
    pub id: DieId,
    pub value: u8,
    pub is_held: bool,
}

impl Die {
    fn held_toggled(&self) -> Self {
        Self {
            is_held: !self.is_held,
            ..self.clone()
        }
    }
}

/// Source of die faces and die identities.
pub trait DiceSource {
    /// A face in `MIN_FACE..=MAX_FACE`.
    fn roll_value(&mut self) -> u8;

    fn next_id(&mut self) -> DieId;
}

pub struct RandomDiceSource {
    rng: StdRng,
}

impl RandomDiceSource {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomDiceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DiceSource for RandomDiceSource {
    fn roll_value(&mut self) -> u8 {
        self.rng.random_range(MIN_FACE..=MAX_FACE)
    }

    fn next_id(&mut self) -> DieId {
        let id: String = (0..ID_LEN)
            .map(|_| ID_ALPHABET[self.rng.random_range(0..ID_ALPHABET.len())] as char)
            .collect();
        DieId(id)
    }
}

/// The ten dice on the table, in display order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiceSet {
    dice: Vec<Die>,
}

impl DiceSet {
    /// Builds a set from exactly `DICE_COUNT` dice.
    pub fn from_dice(dice: Vec<Die>) -> Option<Self> {
        if dice.len() == DICE_COUNT {
            Some(Self { dice })
        } else {
            None
        }
    }

    pub fn dice(&self) -> &[Die] {
        &self.dice
    }

    pub fn get(&self, index: usize) -> Option<&Die> {
        self.dice.get(index)
    }

    pub fn len(&self) -> usize {
        self.dice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dice.is_empty()
    }

    pub fn held_count(&self) -> usize {
        self.dice.iter().filter(|d| d.is_held).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Die> {
        self.dice.iter()
    }
}

impl<'a> IntoIterator for &'a DiceSet {
    type Item = &'a Die;
    type IntoIter = std::slice::Iter<'a, Die>;

    fn into_iter(self) -> Self::IntoIter {
        self.dice.iter()
    }
}

pub fn new_die(source: &mut impl DiceSource) -> Die {
    Die {
        value: source.roll_value(),
        is_held: false,
        id: source.next_id(),
    }
}

pub fn new_dice_set(source: &mut impl DiceSource) -> DiceSet {
    let dice = (0..DICE_COUNT).map(|_| new_die(source)).collect();
    DiceSet { dice }
}

/// Re-rolls every unheld die. Held dice come back untouched.
pub fn roll(current: &DiceSet, source: &mut impl DiceSource) -> DiceSet {
    let dice = current
        .dice
        .iter()
        .map(|die| {
            if die.is_held {
                die.clone()
            } else {
                new_die(source)
            }
        })
        .collect();
    DiceSet { dice }
}

/// Flips the hold flag of the die with `id`. Unknown ids leave the set as is.
pub fn toggle_hold(current: &DiceSet, id: &DieId) -> DiceSet {
    let dice = current
        .dice
        .iter()
        .map(|die| {
            if die.id == *id {
                die.held_toggled()
            } else {
                die.clone()
            }
        })
        .collect();
    DiceSet { dice }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use crate::test_helpers::{
        ScriptedDiceSource,
        dice_set_of,
    };
    use proptest::prelude::*;

    #[test]
    fn new_dice_set__has_ten_unheld_dice_with_distinct_ids() {
        // given
        let mut source = RandomDiceSource::seeded(7);

        // when
        let set = new_dice_set(&mut source);

        // then
        assert_eq!(set.len(), DICE_COUNT);
        assert_eq!(set.held_count(), 0);
        let mut ids: Vec<_> = set.iter().map(|d| d.id.clone()).collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids.dedup();
        assert_eq!(ids.len(), DICE_COUNT);
    }

    #[test]
    fn random_source__ids_use_url_safe_alphabet() {
        // given
        let mut source = RandomDiceSource::seeded(42);

        // when
        let id = source.next_id();

        // then
        assert_eq!(id.as_str().len(), ID_LEN);
        assert!(
            id.as_str()
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        );
    }

    #[test]
    fn roll__replaces_only_unheld_dice() {
        // given
        let set = dice_set_of(&[
            (3, true),
            (5, false),
            (3, true),
            (1, false),
            (2, false),
            (6, false),
            (4, false),
            (4, false),
            (2, false),
            (1, false),
        ]);
        let mut source = ScriptedDiceSource::new(vec![6; 8]);

        // when
        let rolled = roll(&set, &mut source);

        // then
        for (before, after) in set.iter().zip(rolled.iter()) {
            if before.is_held {
                assert_eq!(before, after);
            } else {
                assert_ne!(before.id, after.id);
                assert_eq!(after.value, 6);
                assert!(!after.is_held);
            }
        }
    }

    #[test]
    fn toggle_hold__flips_only_the_matching_die() {
        // given
        let set = dice_set_of(&[(2, false); DICE_COUNT]);
        let target = set.get(4).unwrap().id.clone();

        // when
        let toggled = toggle_hold(&set, &target);

        // then
        assert!(toggled.get(4).unwrap().is_held);
        assert_eq!(toggled.held_count(), 1);
        assert_eq!(toggle_hold(&toggled, &target), set);
    }

    #[test]
    fn toggle_hold__unknown_id_is_a_no_op() {
        // given
        let set = dice_set_of(&[(2, true); DICE_COUNT]);

        // when
        let toggled = toggle_hold(&set, &DieId::new("missing"));

        // then
        assert_eq!(toggled, set);
    }

    #[test]
    fn from_dice__rejects_wrong_length() {
        let set = dice_set_of(&[(1, false); DICE_COUNT]);
        let mut dice = set.dice().to_vec();
        dice.pop();

        assert!(DiceSet::from_dice(dice).is_none());
    }

    proptest! {
        #[test]
        fn roll__preserves_held_dice_and_keeps_faces_in_range(
            seed in any::<u64>(),
            holds in proptest::collection::vec(any::<bool>(), DICE_COUNT),
        ) {
            let mut source = RandomDiceSource::seeded(seed);
            let mut set = new_dice_set(&mut source);
            let ids: Vec<DieId> = set.iter().map(|d| d.id.clone()).collect();
            for (id, hold) in ids.iter().zip(holds) {
                if hold {
                    set = toggle_hold(&set, id);
                }
            }

            let rolled = roll(&set, &mut source);

            prop_assert_eq!(rolled.len(), DICE_COUNT);
            for (before, after) in set.iter().zip(rolled.iter()) {
                prop_assert!((MIN_FACE..=MAX_FACE).contains(&after.value));
                if before.is_held {
                    prop_assert_eq!(before, after);
                } else {
                    prop_assert!(!after.is_held);
                }
            }
        }
    }
}
