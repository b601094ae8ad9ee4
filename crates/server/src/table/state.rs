// Copyright (C) 2025 Pokerhost Developers
// SPDX-License-Identifier: Apache-2.0

//! The table task that drives the hands.
//!
//! Every hand step runs to completion before the next timer is accepted: the
//! engine is mutated, the views are derived and sent, then the next step is
//! scheduled. The only suspension point inside a step is the wait for a
//! remote decision, bounded by the decision timeout and interrupted by an
//! eviction of the acting player or by shutdown.
use ahash::AHashSet;
use anyhow::Result;
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::{pin::pin, sync::Arc, time::Duration};
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinSet,
    time,
};

use pokerhost_core::{
    EngineError, TableEngine,
    engine::Seat,
    message::{ActionHistory, ActionHistoryEntry, DecisionRequest, DecisionResponse},
    poker::{Chips, SeatIndex},
    view::{GameSnapshot, StateProjector},
};

use crate::{
    decision::{DecisionChannel, DecisionError},
    directory::{Counterpart, Directory},
};

use super::{
    TableCommand, TableConfig,
    roster::Roster,
    scheduler::{Fired, Scheduler, Timer},
};

/// Plays hands with the remote players listed by a directory.
pub struct HandOrchestrator<D, C> {
    config: TableConfig,
    engine: TableEngine,
    roster: Roster,
    history: ActionHistory,
    directory: D,
    channel: Arc<C>,
    scheduler: Scheduler,
    /// Channel for receiving expired timers.
    fired_rx: mpsc::Receiver<Fired>,
    /// Channel for receiving table commands.
    commands_rx: mpsc::Receiver<TableCommand>,
    /// Channel for listening shutdown notification.
    shutdown_broadcast_rx: broadcast::Receiver<()>,
    /// Set when shutdown was received during a decision wait.
    shutdown: bool,
    /// State updates sent to non-acting players.
    broadcasts: JoinSet<()>,
    /// The state read by the table handle.
    snapshot: Arc<Mutex<GameSnapshot>>,
    /// Sender that drops when this task is done.
    _shutdown_complete_tx: mpsc::Sender<()>,
}

impl<D, C> HandOrchestrator<D, C>
where
    D: Directory,
    C: DecisionChannel,
{
    /// Creates an orchestrator with an empty table.
    pub fn new(
        config: TableConfig,
        directory: D,
        channel: Arc<C>,
        commands_rx: mpsc::Receiver<TableCommand>,
        shutdown_broadcast_rx: broadcast::Receiver<()>,
        shutdown_complete_tx: mpsc::Sender<()>,
    ) -> Self {
        let engine = match config.seed {
            Some(seed) => TableEngine::with_seed(config.seats, config.forced_bets, seed),
            None => TableEngine::new(config.seats, config.forced_bets),
        };

        let roster = Roster::default();
        let snapshot = StateProjector::new(&engine, roster.occupants()).snapshot();
        let (scheduler, fired_rx) = Scheduler::new();

        Self {
            config,
            engine,
            roster,
            history: ActionHistory::default(),
            directory,
            channel,
            scheduler,
            fired_rx,
            commands_rx,
            shutdown_broadcast_rx,
            shutdown: false,
            broadcasts: JoinSet::new(),
            snapshot: Arc::new(Mutex::new(snapshot)),
            _shutdown_complete_tx: shutdown_complete_tx,
        }
    }

    /// The shared snapshot updated after every step.
    pub fn snapshot_handle(&self) -> Arc<Mutex<GameSnapshot>> {
        self.snapshot.clone()
    }

    /// Runs the table until shutdown or until the table handle is dropped.
    pub async fn run(&mut self) -> Result<()> {
        self.scheduler.arm(Timer::NextHand, Duration::ZERO);

        let res = loop {
            if self.shutdown {
                break Ok(());
            }

            tokio::select! {
                biased;
                // Server is shutting down exit this handler.
                _ = self.shutdown_broadcast_rx.recv() => break Ok(()),
                res = self.fired_rx.recv() => match res {
                    Some(fired) => {
                        if let Some(timer) = self.scheduler.accept(fired) {
                            if let Err(e) = self.on_timer(timer).await {
                                break Err(e);
                            }
                        }
                    }
                    None => break Ok(()),
                },
                res = self.commands_rx.recv() => match res {
                    Some(cmd) => self.command(cmd),
                    None => break Ok(()),
                },
            }
        };

        self.scheduler.cancel_all();
        self.broadcasts.shutdown().await;
        res
    }

    async fn on_timer(&mut self, timer: Timer) -> Result<()> {
        match timer {
            Timer::TableEmpty | Timer::NextHand => self.start_new_hand().await,
            Timer::Step => self.step().await,
        }
    }

    fn command(&mut self, cmd: TableCommand) {
        match cmd {
            TableCommand::Evict { id, resp_tx } => {
                let seat = self.roster.evict(&id);
                match seat {
                    Some(seat) => info!("Seat {seat} {id} evicted"),
                    None => warn!("Evict {id} not seated"),
                }

                let _ = resp_tx.send(seat.is_some());
            }
        }
    }

    /// Refreshes the roster and starts a hand, or waits for players.
    async fn start_new_hand(&mut self) -> Result<()> {
        self.engine.clear_hand()?;
        self.refresh_roster().await;

        match self.engine.start_hand(None) {
            Ok(()) => {}
            Err(EngineError::InsufficientPlayers(n)) => {
                info!("Waiting for players, {n} seated with chips");
                self.publish();
                self.scheduler
                    .arm(Timer::TableEmpty, self.config.table_empty_delay);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        self.history.clear();

        info!(
            "Hand started with {} players, button {:?} blinds {:?}/{:?}",
            self.engine.seats().iter().filter(|s| s.is_in_hand()).count(),
            self.engine.button(),
            self.engine.small_blind_seat(),
            self.engine.big_blind_seat(),
        );

        self.publish();
        self.broadcast();
        self.scheduler.arm(Timer::Step, self.config.step_delay);
        Ok(())
    }

    /// Runs one hand step: an action, a round close or the showdown.
    async fn step(&mut self) -> Result<()> {
        while let Some(res) = self.broadcasts.try_join_next() {
            if let Err(e) = res {
                if e.is_panic() {
                    error!("Update task panic {e}");
                }
            }
        }

        if let Some(seat) = self.engine.player_to_act() {
            self.betting_step(seat).await?;
        } else if self.engine.phase().is_betting() {
            self.engine.end_betting_round()?;
            info!(
                "Betting round closed, {} pots {}",
                self.engine.phase(),
                self.engine.pots().iter().map(|p| p.size).sum::<Chips>()
            );
        } else if self.engine.are_betting_rounds_completed() {
            self.engine.showdown()?;
        }

        self.engine.check_chips()?;
        self.publish();
        self.broadcast();

        if self.engine.is_hand_in_progress() {
            self.scheduler.arm(Timer::Step, self.config.step_delay);
        } else {
            self.end_hand().await;
            self.scheduler
                .arm(Timer::NextHand, self.config.new_hand_delay);
        }

        Ok(())
    }

    /// Asks the seat to act for a decision and applies it or its fallback.
    async fn betting_step(&mut self, seat: SeatIndex) -> Result<()> {
        let Some(legal) = self.engine.legal_actions().cloned() else {
            return Ok(());
        };

        let res = if self.roster.is_evicted(seat) {
            Err(DecisionError::Evicted)
        } else {
            match (self.roster.counterpart(seat).cloned(), self.request(seat)) {
                (Some(to), Some(request)) => self.wait_decision(seat, to, request).await,
                _ => Err(DecisionError::NoDestination),
            }
        };

        let name = self.roster.name(seat).to_string();
        let (action, amount) = match res.map(|r| r.validate(&legal)) {
            Ok(Ok((action, amount))) => {
                self.roster.clear_strikes(seat);
                (action, amount)
            }
            Ok(Err(e)) => {
                warn!("Seat {seat} {name} invalid decision {e}, {}", legal.fallback());
                (legal.fallback(), Chips::ZERO)
            }
            Err(e) => {
                let strikes = self.roster.strike(seat);
                warn!(
                    "Seat {seat} {name} {e} ({strikes} missed), {}",
                    legal.fallback()
                );
                (legal.fallback(), Chips::ZERO)
            }
        };

        let round = self.engine.phase();
        self.engine.action_taken(action, amount)?;
        self.history.push(ActionHistoryEntry {
            round,
            seat,
            name: name.clone(),
            action,
            amount,
        });

        info!("Seat {seat} {name} {action} {amount}");
        Ok(())
    }

    /// Waits for a decision, an eviction of the seat or shutdown.
    async fn wait_decision(
        &mut self,
        seat: SeatIndex,
        to: Counterpart,
        request: DecisionRequest,
    ) -> Result<DecisionResponse, DecisionError> {
        let channel = self.channel.clone();
        let decision = time::timeout(self.config.decision_timeout, async move {
            channel.decide(&to, &request).await
        });
        let mut decision = pin!(decision);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown_broadcast_rx.recv() => {
                    self.shutdown = true;
                    return Err(DecisionError::Shutdown);
                }
                res = self.commands_rx.recv() => match res {
                    Some(cmd) => {
                        self.command(cmd);
                        if self.roster.is_evicted(seat) {
                            return Err(DecisionError::Evicted);
                        }
                    }
                    None => {
                        self.shutdown = true;
                        return Err(DecisionError::Shutdown);
                    }
                },
                res = &mut decision => {
                    return res.unwrap_or(Err(DecisionError::Timeout));
                }
            }
        }
    }

    /// Builds the request with the views of a seat.
    fn request(&self, seat: SeatIndex) -> Option<DecisionRequest> {
        let projector = StateProjector::new(&self.engine, self.roster.occupants());
        Some(DecisionRequest {
            table_state: projector.public_view(),
            player_state: projector.private_view(seat)?,
            action_history: self.history.payload(self.config.history),
        })
    }

    /// Sends the views to every seated player except the seat to act.
    fn broadcast(&mut self) {
        let projector = StateProjector::new(&self.engine, self.roster.occupants());
        let table_state = projector.public_view();
        let action_history = self.history.payload(self.config.history);
        let to_act = self.engine.player_to_act();

        for seat in self.engine.seats().iter().map(Seat::index) {
            if Some(seat) == to_act || self.roster.is_evicted(seat) {
                continue;
            }

            let (Some(to), Some(player_state)) =
                (self.roster.counterpart(seat), projector.private_view(seat))
            else {
                continue;
            };

            let request = DecisionRequest {
                table_state: table_state.clone(),
                player_state,
                action_history: action_history.clone(),
            };

            let to = to.clone();
            let channel = self.channel.clone();
            let timeout = self.config.decision_timeout;
            self.broadcasts.spawn(async move {
                match time::timeout(timeout, channel.notify(&to, &request)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => debug!("Update to {} failed {e}", to.name),
                    Err(_) => debug!("Update to {} timed out", to.name),
                }
            });
        }
    }

    /// Stores the table state for the table handle.
    fn publish(&self) {
        let snapshot = StateProjector::new(&self.engine, self.roster.occupants()).snapshot();
        *self.snapshot.lock() = snapshot;
    }

    async fn end_hand(&mut self) {
        for winner in self.engine.winners() {
            let ranking = winner
                .ranking
                .map(|r| r.label())
                .unwrap_or("uncontested");
            info!(
                "Seat {} {} won {} with {ranking}",
                winner.seat,
                self.roster.name(winner.seat),
                winner.amount
            );
        }

        // Busted players leave and can buy in again when the roster is refreshed.
        let busted = self
            .engine
            .seats()
            .iter()
            .filter(|s| s.stack().is_zero())
            .map(Seat::index)
            .collect::<Vec<_>>();
        for seat in busted {
            self.vacate(seat, "busted");
        }

        self.refresh_roster().await;
        self.publish();
    }

    /// Removes departed players and seats new players from the directory.
    ///
    /// Players removed here are seated again only at a later refresh.
    async fn refresh_roster(&mut self) {
        let reachable = match self.directory.reachable().await {
            Ok(reachable) if reachable.is_empty() => {
                warn!("Directory returned no players, keeping the roster");
                None
            }
            Ok(reachable) => Some(reachable),
            Err(e) => {
                warn!("Directory query failed {e}");
                None
            }
        };

        let departures = {
            let ids = reachable
                .as_ref()
                .map(|r| r.iter().map(|c| c.id.as_str()).collect::<AHashSet<_>>());
            self.roster
                .departures(ids.as_ref(), self.config.max_missed)
        };

        let mut removed = AHashSet::new();
        for seat in departures {
            let reason = if self.roster.is_evicted(seat) {
                "evicted"
            } else {
                "unreachable"
            };

            if let Some(c) = self.vacate(seat, reason) {
                removed.insert(c.id);
            }
        }

        let Some(reachable) = reachable else {
            return;
        };

        let mut empty_seats = self.engine.empty_seats().into_iter();
        for counterpart in reachable {
            if removed.contains(&counterpart.id) || self.roster.seat_of(&counterpart.id).is_some() {
                continue;
            }

            let Some(seat) = empty_seats.next() else {
                break;
            };

            match self.engine.sit_down(seat, self.config.buy_in) {
                Ok(()) => {
                    info!(
                        "Seat {seat} {} joined with {} chips",
                        counterpart.name, self.config.buy_in
                    );
                    self.roster.seat(seat, counterpart);
                }
                Err(e) => {
                    error!("Cannot seat {} {e}", counterpart.name);
                    break;
                }
            }
        }
    }

    /// Stands up a seat between hands.
    fn vacate(&mut self, seat: SeatIndex, reason: &str) -> Option<Counterpart> {
        match self.engine.stand_up(seat) {
            Ok(chips) => {
                let counterpart = self.roster.remove(seat);
                info!(
                    "Seat {seat} {} left with {chips} chips, {reason}",
                    counterpart.as_ref().map(|c| c.name.as_str()).unwrap_or_default()
                );
                counterpart
            }
            Err(e) => {
                error!("Cannot stand up seat {seat} {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashMap;
    use pokerhost_core::{
        engine::{Action, HandPhase},
        message::HistoryShape,
        poker::ForcedBets,
    };
    use tokio::sync::oneshot;

    #[derive(Copy, Clone, Debug)]
    enum Behavior {
        /// Checks or calls.
        Passive,
        /// Never responds.
        Silent,
        /// Responds with an unknown action.
        Garbage,
        /// Responds with an error status.
        Failing,
    }

    #[derive(Default)]
    struct ScriptedChannel {
        behaviors: Mutex<AHashMap<String, Behavior>>,
        queries: Mutex<Vec<String>>,
    }

    impl ScriptedChannel {
        fn set(&self, id: &str, behavior: Behavior) {
            self.behaviors.lock().insert(id.to_string(), behavior);
        }

        fn queries(&self, id: &str) -> usize {
            self.queries.lock().iter().filter(|q| *q == id).count()
        }
    }

    impl DecisionChannel for ScriptedChannel {
        async fn decide(
            &self,
            to: &Counterpart,
            request: &DecisionRequest,
        ) -> Result<DecisionResponse, DecisionError> {
            self.queries.lock().push(to.id.clone());
            let behavior = self
                .behaviors
                .lock()
                .get(&to.id)
                .copied()
                .unwrap_or(Behavior::Passive);

            match behavior {
                Behavior::Passive => {
                    let legal = request
                        .player_state
                        .legal_actions
                        .as_ref()
                        .ok_or_else(|| DecisionError::Malformed("no legal actions".to_string()))?;
                    let action = if legal.contains(Action::Check) {
                        Action::Check
                    } else {
                        Action::Call
                    };
                    Ok(DecisionResponse::new(action, None))
                }
                Behavior::Silent => std::future::pending().await,
                Behavior::Garbage => Ok(DecisionResponse {
                    action: "shove".to_string(),
                    bet_size: None,
                }),
                Behavior::Failing => Err(DecisionError::Status(500)),
            }
        }

        async fn notify(
            &self,
            _to: &Counterpart,
            _request: &DecisionRequest,
        ) -> Result<(), DecisionError> {
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct ScriptedDirectory {
        reachable: Arc<Mutex<Vec<Counterpart>>>,
    }

    impl ScriptedDirectory {
        fn set(&self, ids: &[&str]) {
            *self.reachable.lock() = ids
                .iter()
                .map(|id| Counterpart {
                    id: id.to_string(),
                    name: format!("name-{id}"),
                    endpoint: format!("http://127.0.0.1:9000/{id}"),
                })
                .collect();
        }
    }

    impl Directory for ScriptedDirectory {
        async fn reachable(&self) -> anyhow::Result<Vec<Counterpart>> {
            Ok(self.reachable.lock().clone())
        }
    }

    struct Harness {
        orchestrator: HandOrchestrator<ScriptedDirectory, ScriptedChannel>,
        directory: ScriptedDirectory,
        channel: Arc<ScriptedChannel>,
        commands_tx: mpsc::Sender<TableCommand>,
        _shutdown_broadcast_tx: broadcast::Sender<()>,
        _shutdown_complete_rx: mpsc::Receiver<()>,
    }

    fn harness(ids: &[&str], decision_timeout: Duration) -> Harness {
        let config = TableConfig {
            seats: 3,
            forced_bets: ForcedBets::blinds(5, 10),
            buy_in: Chips::new(100),
            decision_timeout,
            table_empty_delay: Duration::from_secs(60),
            new_hand_delay: Duration::from_secs(60),
            step_delay: Duration::from_secs(60),
            max_missed: 2,
            history: HistoryShape::Detailed,
            seed: Some(7),
        };

        let directory = ScriptedDirectory::default();
        directory.set(ids);
        let channel = Arc::new(ScriptedChannel::default());
        let (commands_tx, commands_rx) = mpsc::channel(8);
        let (shutdown_broadcast_tx, shutdown_broadcast_rx) = broadcast::channel(1);
        let (shutdown_complete_tx, shutdown_complete_rx) = mpsc::channel(1);

        let orchestrator = HandOrchestrator::new(
            config,
            directory.clone(),
            channel.clone(),
            commands_rx,
            shutdown_broadcast_rx,
            shutdown_complete_tx,
        );

        Harness {
            orchestrator,
            directory,
            channel,
            commands_tx,
            _shutdown_broadcast_tx: shutdown_broadcast_tx,
            _shutdown_complete_rx: shutdown_complete_rx,
        }
    }

    fn last_action(
        orchestrator: &HandOrchestrator<ScriptedDirectory, ScriptedChannel>,
    ) -> (SeatIndex, Action) {
        let entry = orchestrator.history.iter().last().unwrap();
        (entry.seat, entry.action)
    }

    async fn play_hand(orchestrator: &mut HandOrchestrator<ScriptedDirectory, ScriptedChannel>) {
        while orchestrator.engine.is_hand_in_progress() {
            orchestrator.step().await.unwrap();
            assert!(orchestrator.engine.chips_balanced());
        }
    }

    #[tokio::test]
    async fn start_waits_for_players() {
        let mut h = harness(&["a"], Duration::from_millis(50));

        h.orchestrator.start_new_hand().await.unwrap();
        assert_eq!(h.orchestrator.engine.phase(), HandPhase::Prehand);
        assert!(h.orchestrator.scheduler.is_armed(Timer::TableEmpty));
        assert_eq!(h.orchestrator.roster.len(), 1);

        h.directory.set(&["a", "b", "c"]);
        h.orchestrator.start_new_hand().await.unwrap();
        assert_eq!(h.orchestrator.engine.phase(), HandPhase::Preflop);
        assert!(h.orchestrator.scheduler.is_armed(Timer::Step));
        assert_eq!(h.orchestrator.roster.seat_of("c"), Some(2));

        let snapshot = h.orchestrator.snapshot_handle().lock().clone();
        assert_eq!(snapshot.players.len(), 3);
        assert_eq!(snapshot.action_on.as_deref(), Some("name-a"));
    }

    #[tokio::test]
    async fn timeout_falls_back_to_fold() {
        let mut h = harness(&["a", "b", "c"], Duration::from_millis(50));
        h.channel.set("a", Behavior::Silent);

        h.orchestrator.start_new_hand().await.unwrap();
        // Seat 0 has the button and acts first.
        assert_eq!(h.orchestrator.engine.player_to_act(), Some(0));

        h.orchestrator.step().await.unwrap();
        assert_eq!(last_action(&h.orchestrator), (0, Action::Fold));
        assert_eq!(h.orchestrator.engine.player_to_act(), Some(1));
        assert_eq!(h.orchestrator.roster.departures(None, 1), vec![0]);

        h.orchestrator.step().await.unwrap();
        assert_eq!(last_action(&h.orchestrator), (1, Action::Call));

        play_hand(&mut h.orchestrator).await;
        assert_eq!(h.channel.queries("a"), 1);
        assert!(h.orchestrator.scheduler.is_armed(Timer::NextHand));
        assert_eq!(h.orchestrator.engine.phase(), HandPhase::Posthand);
    }

    #[tokio::test]
    async fn invalid_reply_falls_back_without_strike() {
        let mut h = harness(&["a", "b", "c"], Duration::from_millis(50));
        h.channel.set("a", Behavior::Garbage);
        h.channel.set("b", Behavior::Failing);

        h.orchestrator.start_new_hand().await.unwrap();
        h.orchestrator.step().await.unwrap();
        assert_eq!(last_action(&h.orchestrator), (0, Action::Fold));

        h.orchestrator.step().await.unwrap();
        assert_eq!(last_action(&h.orchestrator), (1, Action::Fold));

        // Big blind wins uncontested.
        play_hand(&mut h.orchestrator).await;
        let winners = h.orchestrator.engine.winners();
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].seat, 2);
        assert_eq!(winners[0].ranking, None);

        assert_eq!(h.orchestrator.roster.departures(None, 1), vec![1]);
    }

    #[tokio::test]
    async fn eviction_resolves_pending_decision() {
        let mut h = harness(&["a", "b", "c"], Duration::from_secs(30));
        h.channel.set("a", Behavior::Silent);
        h.orchestrator.start_new_hand().await.unwrap();

        let commands_tx = h.commands_tx.clone();
        let evict = async move {
            let (resp_tx, resp_rx) = oneshot::channel();
            let cmd = TableCommand::Evict {
                id: "a".to_string(),
                resp_tx,
            };
            commands_tx.send(cmd).await.unwrap();
            resp_rx.await.unwrap()
        };

        let step = time::timeout(Duration::from_secs(5), h.orchestrator.step());
        let (res, evicted) = tokio::join!(step, evict);
        assert!(res.is_ok_and(|r| r.is_ok()));
        assert!(evicted);
        assert_eq!(last_action(&h.orchestrator), (0, Action::Fold));
        assert!(h.orchestrator.roster.is_evicted(0));

        play_hand(&mut h.orchestrator).await;
        assert_eq!(h.channel.queries("a"), 1);

        // Evicted at the hand end and not seated again by the same refresh.
        assert_eq!(h.orchestrator.roster.seat_of("a"), None);
        assert!(h.orchestrator.engine.seat(0).is_none());

        // Next boundary seats the player again.
        h.orchestrator.start_new_hand().await.unwrap();
        assert_eq!(h.orchestrator.roster.seat_of("a"), Some(0));
    }

    #[tokio::test]
    async fn unreachable_players_leave_at_hand_end() {
        let mut h = harness(&["a", "b", "c"], Duration::from_millis(50));
        h.orchestrator.start_new_hand().await.unwrap();

        h.directory.set(&["a", "c", "d"]);
        play_hand(&mut h.orchestrator).await;

        // The empty seat goes to the new player.
        assert_eq!(h.orchestrator.roster.seat_of("b"), None);
        assert_eq!(h.orchestrator.roster.seat_of("d"), Some(1));
        assert_eq!(h.orchestrator.engine.seat(1).map(|s| s.stack()), Some(Chips::new(100)));

        let total = h.orchestrator.engine.total_chips();
        h.orchestrator.start_new_hand().await.unwrap();
        play_hand(&mut h.orchestrator).await;
        assert_eq!(h.orchestrator.engine.total_chips(), total);
    }

    #[tokio::test]
    async fn empty_directory_keeps_roster() {
        let mut h = harness(&["a", "b", "c"], Duration::from_millis(50));
        h.orchestrator.start_new_hand().await.unwrap();

        h.directory.set(&[]);
        play_hand(&mut h.orchestrator).await;

        assert_eq!(h.orchestrator.roster.len(), 3);
        for (seat, id) in ["a", "b", "c"].into_iter().enumerate() {
            assert_eq!(h.orchestrator.roster.seat_of(id), Some(seat));
        }
        assert_eq!(h.orchestrator.engine.occupied_seats(), 3);

        let total = h.orchestrator.engine.total_chips();
        h.orchestrator.start_new_hand().await.unwrap();
        play_hand(&mut h.orchestrator).await;
        assert_eq!(h.orchestrator.engine.total_chips(), total);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let Harness {
            mut orchestrator,
            commands_tx,
            _shutdown_broadcast_tx: shutdown_broadcast_tx,
            _shutdown_complete_rx: mut shutdown_complete_rx,
            ..
        } = harness(&["a", "b"], Duration::from_millis(50));

        let snapshot = orchestrator.snapshot_handle();
        let task = tokio::spawn(async move { orchestrator.run().await });
        time::sleep(Duration::from_millis(20)).await;
        assert_eq!(snapshot.lock().game_state, HandPhase::Preflop);

        drop(shutdown_broadcast_tx);
        let res = time::timeout(Duration::from_secs(2), task).await;
        assert!(matches!(res, Ok(Ok(Ok(())))));
        assert_eq!(shutdown_complete_rx.recv().await, None);
        drop(commands_tx);
    }
}
