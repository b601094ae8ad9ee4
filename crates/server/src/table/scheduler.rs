// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! Single shot table timers.
use ahash::AHashMap;
use log::debug;
use std::{fmt, time::Duration};
use tokio::{sync::mpsc, task::JoinHandle, time};

/// The purpose of a timer, at most one timer per purpose is armed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Retry starting a hand after the table had not enough players.
    TableEmpty,
    /// Start the next hand.
    NextHand,
    /// Run the next hand step.
    Step,
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timer::TableEmpty => "table-empty",
            Timer::NextHand => "next-hand",
            Timer::Step => "step",
        };

        f.write_str(s)
    }
}

/// A timer that has expired.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Fired {
    timer: Timer,
    generation: u64,
}

/// Arms timers that send a [Fired] message to the table task.
#[derive(Debug)]
pub struct Scheduler {
    armed: AHashMap<Timer, (u64, JoinHandle<()>)>,
    generation: u64,
    fired_tx: mpsc::Sender<Fired>,
}

impl Scheduler {
    /// Creates a scheduler and the receiver for the expired timers.
    pub fn new() -> (Self, mpsc::Receiver<Fired>) {
        let (fired_tx, fired_rx) = mpsc::channel(8);
        let scheduler = Self {
            armed: AHashMap::default(),
            generation: 0,
            fired_tx,
        };

        (scheduler, fired_rx)
    }

    /// Arms a timer, cancelling the armed timer with the same purpose.
    pub fn arm(&mut self, timer: Timer, delay: Duration) {
        self.cancel(timer);

        self.generation += 1;
        let generation = self.generation;
        let fired_tx = self.fired_tx.clone();
        let handle = tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = fired_tx.send(Fired { timer, generation }).await;
        });

        self.armed.insert(timer, (generation, handle));
        debug!("Armed {timer} timer in {}ms", delay.as_millis());
    }

    /// Cancels a timer, returns false if it was not armed.
    pub fn cancel(&mut self, timer: Timer) -> bool {
        match self.armed.remove(&timer) {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Cancels all timers.
    pub fn cancel_all(&mut self) {
        for (_, (_, handle)) in self.armed.drain() {
            handle.abort();
        }
    }

    /// Checks if a timer is armed.
    pub fn is_armed(&self, timer: Timer) -> bool {
        self.armed.contains_key(&timer)
    }

    /// Accepts an expired timer.
    ///
    /// Returns none for a timer that has been cancelled or re-armed after it
    /// expired.
    pub fn accept(&mut self, fired: Fired) -> Option<Timer> {
        match self.armed.get(&fired.timer) {
            Some((generation, _)) if *generation == fired.generation => {
                self.armed.remove(&fired.timer);
                Some(fired.timer)
            }
            _ => None,
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rearm_cancels_previous() {
        let (mut scheduler, mut fired_rx) = Scheduler::new();

        scheduler.arm(Timer::Step, Duration::from_millis(40));
        scheduler.arm(Timer::Step, Duration::from_millis(10));
        assert!(scheduler.is_armed(Timer::Step));

        let fired = fired_rx.recv().await.unwrap();
        assert_eq!(scheduler.accept(fired), Some(Timer::Step));
        assert!(!scheduler.is_armed(Timer::Step));

        // The first timer was aborted.
        let res = time::timeout(Duration::from_millis(100), fired_rx.recv()).await;
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn stale_timer_rejected() {
        let (mut scheduler, mut fired_rx) = Scheduler::new();

        scheduler.arm(Timer::NextHand, Duration::ZERO);
        let stale = fired_rx.recv().await.unwrap();

        // Re-armed after expiring, the old firing must be ignored.
        scheduler.arm(Timer::NextHand, Duration::from_millis(10));
        assert_eq!(scheduler.accept(stale), None);

        let fired = fired_rx.recv().await.unwrap();
        assert_eq!(scheduler.accept(fired), Some(Timer::NextHand));
        assert_eq!(scheduler.accept(fired), None);
    }

    #[tokio::test]
    async fn purposes_are_independent() {
        let (mut scheduler, mut fired_rx) = Scheduler::new();

        scheduler.arm(Timer::TableEmpty, Duration::from_millis(10));
        scheduler.arm(Timer::Step, Duration::from_millis(20));
        assert!(scheduler.cancel(Timer::TableEmpty));
        assert!(!scheduler.cancel(Timer::TableEmpty));

        let fired = fired_rx.recv().await.unwrap();
        assert_eq!(scheduler.accept(fired), Some(Timer::Step));

        scheduler.arm(Timer::Step, Duration::from_millis(10));
        scheduler.cancel_all();
        assert!(!scheduler.is_armed(Timer::Step));
        let res = time::timeout(Duration::from_millis(50), fired_rx.recv()).await;
        assert!(res.is_err());
    }
}
