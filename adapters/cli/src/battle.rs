//! Battle collaborator for the terminal.

use overworld_core::{BattleOutcome, EntityId};
use overworld_rendering::{mover_symbol, RenderingBackend};
use overworld_system_session::BattleResolver;
use overworld_world::{query, World};

/// Announces each battle and lets the player win it.
#[derive(Debug)]
pub(crate) struct Announcer<T> {
    terminal: T,
}

impl<T> Announcer<T> {
    pub(crate) fn new(terminal: T) -> Self {
        Self { terminal }
    }
}

impl<T: RenderingBackend> BattleResolver for Announcer<T> {
    fn resolve(&mut self, world: &World, trainer: EntityId) -> BattleOutcome {
        let name = query::entity(world, trainer)
            .map_or('?', |snapshot| mover_symbol(snapshot.class));
        let lines = [
            format!("Trainer {name} wants to battle!"),
            format!("You defeated trainer {name}."),
        ];
        if let Err(error) = self.terminal.present_lines(&lines) {
            log::error!("{error:#}");
        }
        BattleOutcome::TrainerDefeated
    }
}
