// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! The remote players seated at the table.
use ahash::{AHashMap, AHashSet};

use pokerhost_core::{poker::SeatIndex, view::Occupant};

use crate::directory::Counterpart;

#[derive(Debug)]
struct Entry {
    counterpart: Counterpart,
    strikes: u32,
    evicted: bool,
}

/// Maps occupied seats to remote players.
#[derive(Debug, Default)]
pub struct Roster {
    entries: AHashMap<SeatIndex, Entry>,
    occupants: AHashMap<SeatIndex, Occupant>,
}

impl Roster {
    /// Seats a player.
    pub fn seat(&mut self, seat: SeatIndex, counterpart: Counterpart) {
        let occupant = Occupant {
            id: counterpart.id.clone(),
            name: counterpart.name.clone(),
        };

        self.occupants.insert(seat, occupant);
        self.entries.insert(
            seat,
            Entry {
                counterpart,
                strikes: 0,
                evicted: false,
            },
        );
    }

    /// Removes the player at a seat.
    pub fn remove(&mut self, seat: SeatIndex) -> Option<Counterpart> {
        self.occupants.remove(&seat);
        self.entries.remove(&seat).map(|e| e.counterpart)
    }

    /// The number of seated players.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if nobody is seated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The seat of a player.
    pub fn seat_of(&self, id: &str) -> Option<SeatIndex> {
        self.entries
            .iter()
            .find(|(_, e)| e.counterpart.id == id)
            .map(|(&seat, _)| seat)
    }

    /// The player at a seat.
    pub fn counterpart(&self, seat: SeatIndex) -> Option<&Counterpart> {
        self.entries.get(&seat).map(|e| &e.counterpart)
    }

    /// The seat occupants used to build the views.
    pub fn occupants(&self) -> &AHashMap<SeatIndex, Occupant> {
        &self.occupants
    }

    /// The name at a seat, empty if the seat is not occupied.
    pub fn name(&self, seat: SeatIndex) -> &str {
        self.occupants
            .get(&seat)
            .map(|o| o.name.as_str())
            .unwrap_or_default()
    }

    /// Adds a missed decision, returns the consecutive misses.
    pub fn strike(&mut self, seat: SeatIndex) -> u32 {
        match self.entries.get_mut(&seat) {
            Some(entry) => {
                entry.strikes += 1;
                entry.strikes
            }
            None => 0,
        }
    }

    /// Clears the missed decisions after a valid reply.
    pub fn clear_strikes(&mut self, seat: SeatIndex) {
        if let Some(entry) = self.entries.get_mut(&seat) {
            entry.strikes = 0;
        }
    }

    /// Marks a player for removal, returns its seat.
    pub fn evict(&mut self, id: &str) -> Option<SeatIndex> {
        let seat = self.seat_of(id)?;
        if let Some(entry) = self.entries.get_mut(&seat) {
            entry.evicted = true;
        }

        Some(seat)
    }

    /// Checks if the player at a seat has been evicted.
    pub fn is_evicted(&self, seat: SeatIndex) -> bool {
        self.entries.get(&seat).is_some_and(|e| e.evicted)
    }

    /// The seats to vacate at a hand boundary.
    ///
    /// These are evicted players, players with `max_missed` consecutive
    /// misses and, if the reachable players are known, players not in that
    /// list.
    pub fn departures(
        &self,
        reachable: Option<&AHashSet<&str>>,
        max_missed: u32,
    ) -> Vec<SeatIndex> {
        let mut seats = self
            .entries
            .iter()
            .filter(|(_, e)| {
                e.evicted
                    || e.strikes >= max_missed
                    || reachable.is_some_and(|ids| !ids.contains(e.counterpart.id.as_str()))
            })
            .map(|(&seat, _)| seat)
            .collect::<Vec<_>>();
        seats.sort_unstable();
        seats
    }
}
