//! Active-time-battle turn scheduler.
//!
//! Every living combatant owns a meter in `[0, threshold)`. Each tick adds the
//! combatant's gain (effective speed) to its meter; a combatant whose meter
//! reaches the threshold is ready.
//!
//! # Tie-break
//!
//! Combatants reaching the threshold on the same tick are ordered by:
//!
//! 1. player before enemies
//! 2. higher raw speed
//! 3. insertion order
//!
//! The others stay ready and act on the following advances without further
//! ticks.
//!
//! # Overflow
//!
//! With `carry_overflow` the cost of a turn is subtracted from the meter, so
//! the excess above the threshold carries into the next turn. Without it the
//! meter restarts from `threshold - cost`. Either way the result is clamped
//! into `[0, threshold)`.

use crate::state::CombatantId;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("no combatants are scheduled")]
    NoCombatants,

    #[error("no scheduled combatant gains meter")]
    Stalled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Slot {
    id: CombatantId,
    meter: u32,
    order: usize,
}

/// Per-combatant tick input, computed by the engine from current stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pace {
    pub id: CombatantId,
    /// Meter gained per tick.
    pub gain: u32,
    /// Unmodified dexterity, used for tie-breaks.
    pub raw_speed: u32,
    pub is_player: bool,
    /// Skips the first tick of the next advance.
    pub staggered: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Advance {
    pub actor: CombatantId,
    /// Ticks simulated to find the actor (0 if someone was already ready).
    pub ticks: u64,
}

/// One entry of the read-only lookahead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnQueueEntry {
    pub id: CombatantId,
    /// Turns before this one (0 = acts next).
    pub turns_until: usize,
    /// Ticks from now until this turn starts.
    pub ticks_until: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnScheduler {
    threshold: u32,
    carry_overflow: bool,
    slots: Vec<Slot>,
    clock: u64,
    next_order: usize,
}

impl TurnScheduler {
    pub fn new(threshold: u32, carry_overflow: bool) -> Self {
        Self {
            threshold: threshold.max(1),
            carry_overflow,
            slots: Vec::new(),
            clock: 0,
            next_order: 0,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, id: CombatantId) -> bool {
        self.slots.iter().any(|s| s.id == id)
    }

    pub fn meter(&self, id: CombatantId) -> Option<u32> {
        self.slots.iter().find(|s| s.id == id).map(|s| s.meter)
    }

    /// Meters in insertion order.
    pub fn meters(&self) -> Vec<(CombatantId, u32)> {
        self.slots.iter().map(|s| (s.id, s.meter)).collect()
    }

    /// Schedules a combatant with an empty meter. Re-adding is a no-op.
    pub fn add(&mut self, id: CombatantId) {
        if self.contains(id) {
            return;
        }
        self.slots.push(Slot {
            id,
            meter: 0,
            order: self.next_order,
        });
        self.next_order += 1;
    }

    pub fn remove(&mut self, id: CombatantId) -> bool {
        let before = self.slots.len();
        self.slots.retain(|s| s.id != id);
        before != self.slots.len()
    }

    /// Ticks until someone is ready and returns who acts.
    ///
    /// Slots without a matching [`Pace`] do not gain meter and cannot act.
    pub fn advance(&mut self, paces: &[Pace]) -> Result<Advance, SchedulerError> {
        let pace_of = |id: CombatantId| paces.iter().find(|p| p.id == id);
        if !self.slots.iter().any(|s| pace_of(s.id).is_some()) {
            return Err(SchedulerError::NoCombatants);
        }
        if self
            .slots
            .iter()
            .filter_map(|s| pace_of(s.id))
            .all(|p| p.gain == 0)
        {
            return Err(SchedulerError::Stalled);
        }

        // Minimum gain is 1, so no meter needs more than `threshold` ticks.
        let limit = self.threshold as u64 + 2;
        let mut ticks = 0u64;
        loop {
            if let Some(actor) = self.pick_ready(paces) {
                tracing::debug!(%actor, ticks, clock = self.clock, "scheduler selected actor");
                return Ok(Advance { actor, ticks });
            }
            if ticks >= limit {
                return Err(SchedulerError::Stalled);
            }

            self.clock += 1;
            for slot in self.slots.iter_mut() {
                let Some(pace) = paces.iter().find(|p| p.id == slot.id) else {
                    continue;
                };
                if pace.staggered && ticks == 0 {
                    continue;
                }
                slot.meter = slot.meter.saturating_add(pace.gain);
            }
            ticks += 1;
        }
    }

    fn pick_ready(&self, paces: &[Pace]) -> Option<CombatantId> {
        self.slots
            .iter()
            .filter(|s| s.meter >= self.threshold)
            .filter_map(|s| paces.iter().find(|p| p.id == s.id).map(|p| (s, p)))
            .min_by_key(|(slot, pace)| {
                (
                    !pace.is_player,
                    core::cmp::Reverse(pace.raw_speed),
                    slot.order,
                )
            })
            .map(|(slot, _)| slot.id)
    }

    /// Charges the actor for its turn. `cost_percent` is relative to the threshold.
    pub fn consume_turn(&mut self, id: CombatantId, cost_percent: u32) {
        let threshold = self.threshold;
        let spent = ((threshold as u64 * cost_percent as u64 + 50) / 100).min(u32::MAX as u64) as u32;
        let carry = self.carry_overflow;
        if let Some(slot) = self.slots.iter_mut().find(|s| s.id == id) {
            let next = if carry {
                slot.meter.saturating_sub(spent)
            } else {
                threshold.saturating_sub(spent)
            };
            slot.meter = next.min(threshold.saturating_sub(1));
        }
    }

    /// Simulates `n` turns on a copy, each charged `cost_percent`.
    pub fn preview_next(&self, n: usize, paces: &[Pace], cost_percent: u32) -> Vec<TurnQueueEntry> {
        let mut shadow = self.clone();
        let mut paces = paces.to_vec();
        let mut queue = Vec::with_capacity(n);
        let mut elapsed = 0u64;

        for turns_until in 0..n {
            let Ok(advance) = shadow.advance(&paces) else {
                break;
            };
            elapsed += advance.ticks;
            if advance.ticks > 0 {
                for pace in paces.iter_mut() {
                    pace.staggered = false;
                }
            }
            queue.push(TurnQueueEntry {
                id: advance.actor,
                turns_until,
                ticks_until: elapsed,
            });
            shadow.consume_turn(advance.actor, cost_percent);
        }
        queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pace(id: u8, gain: u32) -> Pace {
        Pace {
            id: CombatantId(id),
            gain,
            raw_speed: gain,
            is_player: id == 0,
            staggered: false,
        }
    }

    fn scheduler(ids: &[u8], carry: bool) -> TurnScheduler {
        let mut s = TurnScheduler::new(100, carry);
        for id in ids {
            s.add(CombatantId(*id));
        }
        s
    }

    fn count_turns(carry: bool, paces: &[Pace], turns: usize) -> Vec<usize> {
        let mut s = scheduler(&paces.iter().map(|p| p.id.0).collect::<Vec<_>>(), carry);
        let mut counts = vec![0; paces.len()];
        for _ in 0..turns {
            let next = s.advance(paces).unwrap();
            counts[next.actor.0 as usize] += 1;
            s.consume_turn(next.actor, 100);
        }
        counts
    }

    #[test]
    fn faster_combatant_acts_first() {
        let mut s = scheduler(&[0, 1], true);
        let next = s.advance(&[pace(0, 10), pace(1, 25)]).unwrap();
        assert_eq!(next, Advance { actor: CombatantId(1), ticks: 4 });
    }

    #[test]
    fn ties_prefer_player_then_speed_then_order() {
        let paces = [pace(0, 20), pace(1, 20)];
        let mut s = scheduler(&[1, 0], true);
        assert_eq!(s.advance(&paces).unwrap().actor, CombatantId(0));

        let mut paces = [pace(1, 20), pace(2, 20), pace(3, 20)];
        paces[1].raw_speed = 30;
        let mut s = scheduler(&[1, 2, 3], true);
        assert_eq!(s.advance(&paces).unwrap().actor, CombatantId(2));
        s.consume_turn(CombatantId(2), 100);
        // still ready from the same tick, insertion order decides
        assert_eq!(s.advance(&paces).unwrap(), Advance { actor: CombatantId(1), ticks: 0 });
    }

    #[test]
    fn stagger_skips_one_tick() {
        let mut s = scheduler(&[0, 1], true);
        let mut paces = [pace(0, 50), pace(1, 50)];
        paces[0].staggered = true;
        let next = s.advance(&paces).unwrap();
        assert_eq!(next.actor, CombatantId(1));
        assert_eq!(s.meter(CombatantId(0)), Some(50));
    }

    #[test]
    fn overflow_carry_is_configurable() {
        let paces = [pace(0, 30)];

        let mut carry = scheduler(&[0], true);
        carry.advance(&paces).unwrap();
        carry.consume_turn(CombatantId(0), 100);
        assert_eq!(carry.meter(CombatantId(0)), Some(20));

        let mut reset = scheduler(&[0], false);
        reset.advance(&paces).unwrap();
        reset.consume_turn(CombatantId(0), 100);
        assert_eq!(reset.meter(CombatantId(0)), Some(0));

        // light actions leave a head start
        reset.advance(&paces).unwrap();
        reset.consume_turn(CombatantId(0), 75);
        assert_eq!(reset.meter(CombatantId(0)), Some(25));
    }

    #[test]
    fn carried_overflow_gives_proportional_turns() {
        let counts = count_turns(true, &[pace(0, 12), pace(1, 30)], 700);
        // 12 : 30 over a long horizon
        assert_eq!(counts[0] + counts[1], 700);
        assert!((counts[0] as i64 - 200).abs() <= 2, "{counts:?}");
        assert!((counts[1] as i64 - 500).abs() <= 2, "{counts:?}");
    }

    #[test]
    fn reset_meters_round_up_to_whole_ticks() {
        // 12 needs 9 ticks per turn, 30 needs 4 ticks; ratio 9:4 instead of 30:12
        let counts = count_turns(false, &[pace(0, 12), pace(1, 30)], 650);
        assert_eq!(counts[0] + counts[1], 650);
        assert!((counts[0] as i64 - 200).abs() <= 2, "{counts:?}");
        assert!((counts[1] as i64 - 450).abs() <= 2, "{counts:?}");
    }

    #[test]
    fn zero_gain_is_stalled() {
        let mut s = scheduler(&[0], true);
        assert_eq!(s.advance(&[pace(0, 0)]), Err(SchedulerError::Stalled));
        assert_eq!(s.advance(&[]), Err(SchedulerError::NoCombatants));
    }

    #[test]
    fn removed_combatants_never_act() {
        let mut s = scheduler(&[0, 1], true);
        assert!(s.remove(CombatantId(1)));
        assert!(!s.remove(CombatantId(1)));
        let next = s.advance(&[pace(0, 10), pace(1, 90)]).unwrap();
        assert_eq!(next.actor, CombatantId(0));
    }

    #[test]
    fn preview_lists_upcoming_turns() {
        let s = scheduler(&[0, 1], true);
        let queue = s.preview_next(4, &[pace(0, 25), pace(1, 50)], 100);
        let order: Vec<u8> = queue.iter().map(|e| e.id.0).collect();
        assert_eq!(order, vec![1, 0, 1, 1]);
        assert_eq!(queue[0].ticks_until, 2);
        assert_eq!(queue[1].turns_until, 1);
    }

    proptest! {
        #[test]
        fn preview_never_mutates(gains in proptest::collection::vec(1u32..60, 1..5), n in 0usize..12, warmup in 0usize..5) {
            let paces: Vec<Pace> = gains.iter().enumerate().map(|(i, g)| pace(i as u8, *g)).collect();
            let ids: Vec<u8> = (0..paces.len() as u8).collect();
            let mut s = scheduler(&ids, true);
            for _ in 0..warmup {
                let next = s.advance(&paces).unwrap();
                s.consume_turn(next.actor, 100);
            }
            let before = s.clone();
            let _ = s.preview_next(n, &paces, 100);
            prop_assert_eq!(s, before);
        }

        #[test]
        fn faster_always_acts_first(slow in 1u32..50, extra in 1u32..50) {
            let fast = slow + extra;
            let mut s = scheduler(&[1, 2], true);
            let next = s.advance(&[pace(1, slow), pace(2, fast)]).unwrap();
            prop_assert_eq!(next.actor, CombatantId(2));
        }

        #[test]
        fn meters_stay_below_threshold_after_turns(gains in proptest::collection::vec(1u32..150, 1..5), turns in 1usize..40, carry in any::<bool>()) {
            let paces: Vec<Pace> = gains.iter().enumerate().map(|(i, g)| pace(i as u8 + 1, *g)).collect();
            let ids: Vec<u8> = paces.iter().map(|p| p.id.0).collect();
            let mut s = scheduler(&ids, carry);
            for _ in 0..turns {
                let next = s.advance(&paces).unwrap();
                s.consume_turn(next.actor, 100);
                prop_assert!(s.meter(next.actor).unwrap() < s.threshold());
            }
        }
    }
}
