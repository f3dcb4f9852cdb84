//! Periodic hostile spawns
//!
//! The scheduler listens to the bus. A `TurnStarted` on a spawn turn queues a
//! spawn on the simulation clock; the first spawn turn also raises a warning
//! and delays the spawn. Queued spawns run from [`HostileSpawnScheduler::run_due`],
//! which the simulation calls from its update loop.
//!
//! Spawn turns: `first_turn`, then every `interval` turns after it.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

use crate::core::clock::SimClock;
use crate::core::config::SpawnConfig;
use crate::core::types::{EntityId, Turn};
use crate::entity::combat::Battlefield;
use crate::events::{handler, EventBus, Handler, HostileKilled, HostileSpawned, HostileWarning, HostilesCleared, TurnStarted};
use crate::spawn::provider::SpawnProvider;
use crate::spawn::task::TaskQueue;

/// Is `turn` a spawn turn under `config`?
///
/// An interval of 0 means only `first_turn` spawns.
pub fn is_spawn_turn(config: &SpawnConfig, turn: Turn) -> bool {
    let first = config.first_turn;
    turn == first || (turn > first && (turn - first).checked_rem(config.interval) == Some(0))
}

#[derive(Debug)]
struct SchedulerState {
    current_turn: Turn,
    pending: TaskQueue<Turn>,
    active: BTreeSet<EntityId>,
    spawn_attempts: u32,
    attached: bool,
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self {
            current_turn: 1,
            pending: TaskQueue::new(),
            active: BTreeSet::new(),
            spawn_attempts: 0,
            attached: false,
        }
    }
}

pub struct HostileSpawnScheduler {
    config: SpawnConfig,
    clock: SimClock,
    bus: Weak<EventBus>,
    state: RefCell<SchedulerState>,
    on_turn_started: Handler<TurnStarted>,
    on_hostile_killed: Handler<HostileKilled>,
}

impl HostileSpawnScheduler {
    /// Create a scheduler and subscribe it to `bus`
    pub fn new(config: SpawnConfig, clock: SimClock, bus: &Rc<EventBus>) -> Rc<Self> {
        let scheduler = Rc::new_cyclic(|this: &Weak<Self>| {
            let on_turn = this.clone();
            let on_kill = this.clone();
            Self {
                config,
                clock,
                bus: Rc::downgrade(bus),
                state: RefCell::new(SchedulerState::default()),
                on_turn_started: handler(move |event: &TurnStarted| {
                    if let Some(scheduler) = on_turn.upgrade() {
                        scheduler.turn_started(event.turn);
                    }
                    Ok(())
                }),
                on_hostile_killed: handler(move |event: &HostileKilled| {
                    if let Some(scheduler) = on_kill.upgrade() {
                        scheduler.hostile_killed(event.id);
                    }
                    Ok(())
                }),
            }
        });
        scheduler.attach();
        scheduler
    }

    /// Subscribe to the bus (no-op if already attached)
    pub fn attach(&self) {
        let Some(bus) = self.bus.upgrade() else {
            return;
        };
        if std::mem::replace(&mut self.state.borrow_mut().attached, true) {
            return;
        }
        bus.subscribe(&self.on_turn_started);
        bus.subscribe(&self.on_hostile_killed);
    }

    /// Unsubscribe and cancel anything pending
    pub fn detach(&self) {
        let was_attached = std::mem::replace(&mut self.state.borrow_mut().attached, false);
        if was_attached {
            if let Some(bus) = self.bus.upgrade() {
                bus.unsubscribe(&self.on_turn_started);
                bus.unsubscribe(&self.on_hostile_killed);
            }
        }
        self.cancel_pending();
    }

    pub fn is_attached(&self) -> bool {
        self.state.borrow().attached
    }

    /// Cancel queued spawns; returns how many were cancelled
    pub fn cancel_pending(&self) -> usize {
        let cancelled = self.state.borrow_mut().pending.cancel_all();
        if cancelled > 0 {
            tracing::info!(cancelled, "pending hostile spawns cancelled");
        }
        cancelled
    }

    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending.len()
    }

    pub fn spawn_attempts(&self) -> u32 {
        self.state.borrow().spawn_attempts
    }

    /// Hostiles spawned by this scheduler that are still alive
    pub fn active_hostiles(&self) -> Vec<EntityId> {
        self.state.borrow().active.iter().copied().collect()
    }

    pub fn current_turn(&self) -> Turn {
        self.state.borrow().current_turn
    }

    /// Turns whose spawn is still waiting to run
    pub fn pending_turns(&self) -> Vec<Turn> {
        self.state.borrow().pending.payloads()
    }

    /// Count a hostile placed outside the scheduler toward the active set
    pub fn track(&self, id: EntityId) -> bool {
        self.state.borrow_mut().active.insert(id)
    }

    /// Resume bookkeeping after a load: the current turn, live hostiles and
    /// spawns that were still waiting. Their warning has already been given,
    /// so they run on the next update.
    pub fn resume(
        &self,
        turn: Turn,
        hostiles: impl IntoIterator<Item = EntityId>,
        pending: impl IntoIterator<Item = Turn>,
    ) {
        let now = self.clock.now();
        let mut state = self.state.borrow_mut();
        state.current_turn = turn;
        state.active = hostiles.into_iter().collect();
        state.pending.cancel_all();
        for spawn_turn in pending {
            state.pending.schedule(spawn_turn, now);
        }
    }

    fn turn_started(&self, turn: Turn) {
        let warn = {
            let mut state = self.state.borrow_mut();
            state.current_turn = turn;
            if !is_spawn_turn(&self.config, turn) {
                return;
            }

            let warn = turn == self.config.first_turn;
            let delay = if warn {
                self.config.warning_delay()
            } else {
                std::time::Duration::ZERO
            };
            state.pending.schedule(turn, self.clock.now() + delay);
            warn
        };

        tracing::debug!(turn, warn, "hostile spawn scheduled");
        if warn {
            tracing::info!(turn, "hostiles approaching");
            if let Some(bus) = self.bus.upgrade() {
                bus.publish(&HostileWarning { turn });
            }
        }
    }

    fn hostile_killed(&self, id: EntityId) {
        let cleared = {
            let mut state = self.state.borrow_mut();
            if !state.active.remove(&id) {
                return;
            }
            state.active.is_empty().then_some(state.current_turn)
        };

        if let Some(turn) = cleared {
            tracing::info!(turn, "all hostiles cleared");
            if let Some(bus) = self.bus.upgrade() {
                bus.publish(&HostilesCleared { turn });
            }
        }
    }

    /// Execute every due spawn
    pub fn run_due(&self, field: &mut Battlefield<'_>, provider: &mut dyn SpawnProvider) -> Vec<HostileSpawned> {
        let due = self.state.borrow_mut().pending.take_due(self.clock.now());
        let mut spawned = Vec::new();

        for turn in due {
            self.state.borrow_mut().spawn_attempts += 1;

            let Some(entity) = provider.spawn_random_hostile(&*field.map, &*field.registry) else {
                tracing::warn!(turn, "no room for a hostile");
                continue;
            };
            let Some(coord) = entity.position.filter(|c| field.map.get(*c).is_some_and(|t| t.can_enter(None))) else {
                tracing::warn!(turn, position = ?entity.position, "hostile offered on an unusable tile");
                continue;
            };

            let id = field.registry.register(entity);
            field.map.set_occupant(coord, id);
            self.state.borrow_mut().active.insert(id);

            let event = HostileSpawned { id, coord, turn };
            tracing::info!(%id, %coord, turn, "hostile spawned");
            field.bus.publish(&event);
            spawned.push(event);
        }

        spawned
    }
}

impl Drop for HostileSpawnScheduler {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for HostileSpawnScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostileSpawnScheduler")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish()
    }
}
