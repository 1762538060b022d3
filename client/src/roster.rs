//! Client-local mirror of every known player.
//!
//! Events are applied as they come: there is no ordering or conflict
//! resolution, so the last update applied wins. Records that fail validation
//! are dropped whole rather than partially applied.

use log::{debug, warn};
use shared::{PlayerId, PlayerRecord};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum RosterEvent {
    /// A new id entered the roster.
    Added(PlayerId),
    /// A join arrived for an id that was already known.
    Replaced(PlayerId),
    /// A player left; carries the last record for cleanup.
    Removed(PlayerRecord),
}

#[derive(Debug, Default)]
pub struct PlayerRoster {
    players: HashMap<PlayerId, PlayerRecord>,
    local_id: Option<PlayerId>,
    connection_count: u32,
}

impl PlayerRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id updates are never applied to.
    pub fn set_local_id(&mut self, id: PlayerId) {
        self.local_id = Some(id);
    }

    pub fn local_id(&self) -> Option<PlayerId> {
        self.local_id
    }

    /// Inserts a record, or overwrites the one with the same id.
    pub fn apply_join(&mut self, record: PlayerRecord) -> Option<RosterEvent> {
        if let Err(e) = record.validate() {
            warn!("Dropping join: {}", e);
            return None;
        }

        let id = record.id;
        match self.players.insert(id, record) {
            Some(_) => Some(RosterEvent::Replaced(id)),
            None => Some(RosterEvent::Added(id)),
        }
    }

    /// Applies a late-join snapshot as a series of joins.
    pub fn apply_all(&mut self, records: Vec<PlayerRecord>) -> Vec<RosterEvent> {
        records
            .into_iter()
            .filter_map(|record| self.apply_join(record))
            .collect()
    }

    /// Overwrites a known remote player's record. Returns whether it applied.
    pub fn apply_update(&mut self, record: PlayerRecord) -> bool {
        if Some(record.id) == self.local_id {
            return false;
        }
        if let Err(e) = record.validate() {
            warn!("Dropping update: {}", e);
            return false;
        }

        match self.players.get_mut(&record.id) {
            Some(existing) => {
                *existing = record;
                true
            }
            None => {
                debug!("Update for unknown player {}", record.id);
                false
            }
        }
    }

    pub fn apply_leave(&mut self, id: PlayerId) -> Option<RosterEvent> {
        self.players.remove(&id).map(RosterEvent::Removed)
    }

    /// Display-only; never used for membership.
    pub fn apply_count(&mut self, count: u32) {
        self.connection_count = count;
    }

    pub fn get(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.players.get(&id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    /// Every known player except the local one.
    pub fn remote_players(&self) -> impl Iterator<Item = &PlayerRecord> {
        let local_id = self.local_id;
        self.players.values().filter(move |p| Some(p.id) != local_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn connection_count(&self) -> u32 {
        self.connection_count
    }

    pub fn online_display(&self) -> String {
        format!("online : {}", self.connection_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Vec3;

    fn record(id: PlayerId, x: f32) -> PlayerRecord {
        PlayerRecord::new(id, Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn test_duplicate_join_keeps_one_entry() {
        let mut roster = PlayerRoster::new();

        assert_eq!(roster.apply_join(record(1, 0.0)), Some(RosterEvent::Added(1)));
        assert_eq!(roster.apply_join(record(1, 5.0)), Some(RosterEvent::Replaced(1)));

        assert_eq!(roster.len(), 1);
        assert_eq!(roster.get(1).unwrap().pos.x, 5.0);
    }

    #[test]
    fn test_last_update_wins() {
        let mut roster = PlayerRoster::new();
        roster.apply_join(record(2, 0.0));

        let mut a = record(2, 1.0);
        a.magazine = 30;
        let mut b = record(2, 2.0);
        b.is_grounded = false;

        assert!(roster.apply_update(a));
        assert!(roster.apply_update(b.clone()));
        assert_eq!(roster.get(2), Some(&b));
    }

    #[test]
    fn test_update_for_unknown_id_ignored() {
        let mut roster = PlayerRoster::new();
        assert!(!roster.apply_update(record(9, 1.0)));
        assert!(roster.is_empty());
    }

    #[test]
    fn test_update_for_local_player_ignored() {
        let mut roster = PlayerRoster::new();
        roster.set_local_id(1);
        roster.apply_join(record(1, 0.0));

        assert!(!roster.apply_update(record(1, 3.0)));
        assert_eq!(roster.get(1).unwrap().pos.x, 0.0);
        assert_eq!(roster.remote_players().count(), 0);
    }

    #[test]
    fn test_non_finite_records_dropped() {
        let mut roster = PlayerRoster::new();
        assert_eq!(roster.apply_join(record(3, f32::INFINITY)), None);
        assert!(!roster.contains(3));

        roster.apply_join(record(3, 1.0));
        assert!(!roster.apply_update(record(3, f32::NAN)));
        assert_eq!(roster.get(3).unwrap().pos.x, 1.0);
    }

    #[test]
    fn test_leave() {
        let mut roster = PlayerRoster::new();
        roster.apply_join(record(4, 7.0));

        assert_eq!(roster.apply_leave(4), Some(RosterEvent::Removed(record(4, 7.0))));
        assert_eq!(roster.apply_leave(4), None);
        assert!(roster.is_empty());
    }

    #[test]
    fn test_apply_all_and_count() {
        let mut roster = PlayerRoster::new();
        let events = roster.apply_all(vec![record(1, 0.0), record(2, 0.0), record(1, 1.0)]);

        assert_eq!(events.len(), 3);
        assert_eq!(roster.len(), 2);

        roster.apply_count(3);
        assert_eq!(roster.connection_count(), 3);
        assert_eq!(roster.online_display(), "online : 3");
        // The counter is display-only.
        assert_eq!(roster.len(), 2);
    }
}
