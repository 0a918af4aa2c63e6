#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn loop tying the world, the systems and the outer collaborators together.
//!
//! Every call to [`Session::step`] pops exactly one entity from the turn
//! scheduler and fully resolves its action: the movement system or the input
//! collaborator decides what to do, the world applies the resulting commands,
//! battles are handed to the battle collaborator, and gate crossings switch
//! the current map before the actor is re-inserted.

use overworld_core::{
    BattleOutcome, Command, EntityId, Event, PlayerCommand, TerrainKind, WorldCoord,
};
use overworld_system_movement::Movement;
use overworld_system_spawning::{Config as SpawningConfig, Spawning};
use overworld_system_turns::TurnScheduler;
use overworld_world::{self as world, query, TravelError, World};
use rand::Rng;
use thiserror::Error;

/// Time the player spends waiting in place.
pub const WAIT_TIME: u64 = 15;

/// Time the player spends inside a PokeMart or PokeCenter.
pub const BUILDING_VISIT_TIME: u64 = 10;

/// Input collaborator supplying the player's commands.
pub trait CommandSource {
    /// Blocks until the player chooses the next command.
    fn next_command(&mut self, world: &World) -> PlayerCommand;

    /// Shows the trainers on the current map.
    fn present_trainer_list(&mut self, _world: &World) {}

    /// Tells the player why the previous command was refused.
    fn reject(&mut self, _reason: &str) {}
}

/// Battle collaborator deciding the outcome of every battle.
pub trait BattleResolver {
    /// Runs the battle between the player and `trainer`.
    fn resolve(&mut self, world: &World, trainer: EntityId) -> BattleOutcome;
}

/// Tunables of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Trainers placed on every newly generated map.
    pub trainers_per_map: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            trainers_per_map: 10,
        }
    }
}

/// Failures that end a session abnormally.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The starting world could not be created.
    #[error("failed to create the world")]
    Travel(#[from] TravelError),
    /// The scheduler ran dry while the player was still active.
    #[error("no entity is left to take a turn")]
    Idle,
}

/// Whether the session continues after a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// More turns remain.
    Running,
    /// The player quit or was defeated.
    Finished,
}

/// What the player decided to do with a turn.
enum PlayerAction {
    Act,
    Fly(WorldCoord),
    Quit,
}

/// Single-threaded overworld game session.
#[derive(Debug)]
pub struct Session<R, S, B> {
    world: World,
    rng: R,
    input: S,
    battles: B,
    spawning: Spawning,
    movement: Movement,
    scheduler: TurnScheduler,
    started: bool,
    finished: bool,
}

impl<R, S, B> Session<R, S, B>
where
    R: Rng,
    S: CommandSource,
    B: BattleResolver,
{
    /// Creates a session around an existing world.
    ///
    /// The current map is populated when the first step runs.
    pub fn new(world: World, config: SessionConfig, rng: R, input: S, battles: B) -> Self {
        Self {
            world,
            rng,
            input,
            battles,
            spawning: Spawning::new(SpawningConfig::new(config.trainers_per_map)),
            movement: Movement,
            scheduler: TurnScheduler::new(),
            started: false,
            finished: false,
        }
    }

    /// Generates a fresh world with the player on a road of the origin map.
    pub fn generate(
        config: SessionConfig,
        mut rng: R,
        input: S,
        battles: B,
    ) -> Result<Self, SessionError> {
        let world = World::new(&mut rng)?;
        Ok(Self::new(world, config, rng, input, battles))
    }

    /// Read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to the input collaborator.
    #[must_use]
    pub fn input(&self) -> &S {
        &self.input
    }

    /// Reports whether the session has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Runs turns until the player quits or is defeated.
    pub fn run(&mut self, out: &mut Vec<Event>) -> Result<(), SessionError> {
        while self.step(out)? == Progress::Running {}
        Ok(())
    }

    /// Resolves the turn of the next scheduled entity.
    pub fn step(&mut self, out: &mut Vec<Event>) -> Result<Progress, SessionError> {
        if self.finished {
            return Ok(Progress::Finished);
        }
        if !self.started {
            self.start(out);
        }

        let entry = self.scheduler.pop_next().ok_or(SessionError::Idle)?;
        let Some(actor) = query::entity(&self.world, entry.entity) else {
            return Ok(Progress::Running);
        };
        if actor.is_withdrawn() {
            return Ok(Progress::Running);
        }
        if actor.next_action_time != entry.next_action_time {
            self.scheduler.requeue(&actor);
            return Ok(Progress::Running);
        }

        let first_event = out.len();
        let mut commands = Vec::new();
        if actor.id == EntityId::PLAYER {
            match self.player_turn(&mut commands) {
                PlayerAction::Act => {}
                PlayerAction::Fly(destination) => self.fly(destination, out),
                PlayerAction::Quit => {
                    log::info!("player quit at time {}", actor.next_action_time);
                    self.finished = true;
                    return Ok(Progress::Finished);
                }
            }
        } else {
            self.movement
                .handle(&self.world, actor.id, &mut self.rng, &mut commands);
        }

        for command in commands {
            world::apply(&mut self.world, command, out);
        }
        let map_changed = self.resolve_events(first_event, out);

        if !map_changed {
            if let Some(snapshot) = query::entity(&self.world, actor.id) {
                self.scheduler.requeue(&snapshot);
            }
        }

        if query::player(&self.world).is_withdrawn() {
            log::info!("the player was defeated");
            self.finished = true;
            return Ok(Progress::Finished);
        }
        Ok(Progress::Running)
    }

    fn start(&mut self, out: &mut Vec<Event>) {
        self.started = true;
        let mut commands = Vec::new();
        self.spawning.populate(
            query::terrain(&self.world),
            query::occupancy_view(&self.world),
            &mut self.rng,
            &mut commands,
        );
        for command in commands {
            world::apply(&mut self.world, command, out);
        }
        self.rebuild_schedule();
    }

    fn rebuild_schedule(&mut self) {
        self.scheduler = TurnScheduler::from_entities(&query::entities(&self.world));
        log::debug!("{} entities scheduled", self.scheduler.len());
    }

    fn player_turn(&mut self, commands: &mut Vec<Command>) -> PlayerAction {
        loop {
            match self.input.next_command(&self.world) {
                PlayerCommand::Move(direction) => {
                    match self.movement.player_step(&self.world, direction, commands) {
                        Ok(()) => return PlayerAction::Act,
                        Err(reason) => self.input.reject(&reason.to_string()),
                    }
                }
                PlayerCommand::Wait => {
                    commands.push(Command::Rest {
                        entity: EntityId::PLAYER,
                        duration: WAIT_TIME,
                    });
                    return PlayerAction::Act;
                }
                PlayerCommand::Interact => {
                    let cell = query::player(&self.world).cell;
                    let inside = query::terrain(&self.world)
                        .get(cell)
                        .map_or(false, TerrainKind::is_building);
                    if inside {
                        commands.push(Command::Rest {
                            entity: EntityId::PLAYER,
                            duration: BUILDING_VISIT_TIME,
                        });
                        return PlayerAction::Act;
                    }
                    self.input.reject("there is no building here");
                }
                PlayerCommand::ListTrainers => self.input.present_trainer_list(&self.world),
                PlayerCommand::Fly { x, y } => match WorldCoord::from_relative(x, y) {
                    Some(destination) => return PlayerAction::Fly(destination),
                    None => self.input.reject("no map lies at those coordinates"),
                },
                PlayerCommand::Quit => return PlayerAction::Quit,
            }
        }
    }

    fn fly(&mut self, destination: WorldCoord, out: &mut Vec<Event>) {
        if let Err(error) = world::fly(&mut self.world, destination, &mut self.rng, out) {
            log::warn!("flight to {:?} failed: {error}", destination.relative());
            self.input.reject(&error.to_string());
        }
    }

    /// Reacts to the events produced since `first`, including ones appended
    /// while reacting. Returns whether the current map changed.
    fn resolve_events(&mut self, first: usize, out: &mut Vec<Event>) -> bool {
        let mut map_changed = false;
        let mut index = first;
        while let Some(event) = out.get(index).copied() {
            match event {
                Event::BattleRequested {
                    challenger,
                    opponent,
                } => self.battle(challenger, opponent, out),
                Event::GateReached { side } => {
                    if let Err(error) = world::travel(&mut self.world, side, &mut self.rng, out) {
                        log::warn!("could not pass the {side:?} gate: {error}");
                    }
                }
                Event::MapEntered { .. } => {
                    let mut commands = Vec::new();
                    self.spawning.handle(
                        std::slice::from_ref(&event),
                        query::terrain(&self.world),
                        query::occupancy_view(&self.world),
                        &mut self.rng,
                        &mut commands,
                    );
                    for command in commands {
                        world::apply(&mut self.world, command, out);
                    }
                    self.rebuild_schedule();
                    map_changed = true;
                }
                _ => {}
            }
            index += 1;
        }
        map_changed
    }

    fn battle(&mut self, challenger: EntityId, opponent: EntityId, out: &mut Vec<Event>) {
        let trainer = if challenger == EntityId::PLAYER {
            opponent
        } else {
            challenger
        };
        let outcome = self.battles.resolve(&self.world, trainer);
        log::info!("battle against {trainer:?}: {outcome:?}");

        let loser = match outcome {
            BattleOutcome::TrainerDefeated => trainer,
            BattleOutcome::PlayerDefeated => EntityId::PLAYER,
            BattleOutcome::Undecided => return,
        };
        world::apply(&mut self.world, Command::Withdraw { entity: loser }, out);
    }
}
