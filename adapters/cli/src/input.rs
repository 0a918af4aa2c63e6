//! Line-based input collaborator reading one command per line.

use std::io::BufRead;

use anyhow::{bail, Context, Result};
use overworld_core::{Direction, PlayerCommand};
use overworld_rendering::{trainer_list, Frame, RenderingBackend};
use overworld_system_session::CommandSource;
use overworld_world::World;

const HELP: &str = "keys: 7/y 8/k 9/u 4/h 6/l 1/b 2/j 3/n move, 5 or . wait, > enter building, \
                    t trainers, f X Y fly, q quit";

/// Reads commands from `reader`, drawing the map before every prompt.
#[derive(Debug)]
pub(crate) struct LineInput<R, T> {
    reader: R,
    terminal: T,
}

impl<R, T> LineInput<R, T>
where
    R: BufRead,
    T: RenderingBackend,
{
    pub(crate) fn new(reader: R, terminal: T) -> Self {
        Self { reader, terminal }
    }

    fn show(&mut self, lines: &[String]) {
        if let Err(error) = self.terminal.present_lines(lines) {
            log::error!("{error:#}");
        }
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .context("failed to read a command")?;
        Ok((read > 0).then_some(line))
    }

    #[cfg(test)]
    pub(crate) fn into_terminal(self) -> T {
        self.terminal
    }
}

impl<R, T> CommandSource for LineInput<R, T>
where
    R: BufRead,
    T: RenderingBackend,
{
    fn next_command(&mut self, world: &World) -> PlayerCommand {
        if let Err(error) = self.terminal.present(&Frame::capture(world)) {
            log::error!("{error:#}");
            return PlayerCommand::Quit;
        }

        loop {
            let line = match self.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => return PlayerCommand::Quit,
                Err(error) => {
                    log::error!("{error:#}");
                    return PlayerCommand::Quit;
                }
            };
            match parse_command(&line) {
                Ok(command) => return command,
                Err(error) => self.show(&[error.to_string(), HELP.to_owned()]),
            }
        }
    }

    fn present_trainer_list(&mut self, world: &World) {
        let mut lines = trainer_list(world);
        if lines.is_empty() {
            lines.push(String::from("No trainers on this map."));
        }
        self.show(&lines);
    }

    fn reject(&mut self, reason: &str) {
        self.show(&[reason.to_owned()]);
    }
}

/// Decodes one line of input.
pub(crate) fn parse_command(line: &str) -> Result<PlayerCommand> {
    let line = line.trim();
    let command = match line {
        "" | "5" | "." => PlayerCommand::Wait,
        "7" | "y" => PlayerCommand::Move(Direction::NorthWest),
        "8" | "k" => PlayerCommand::Move(Direction::North),
        "9" | "u" => PlayerCommand::Move(Direction::NorthEast),
        "6" | "l" => PlayerCommand::Move(Direction::East),
        "3" | "n" => PlayerCommand::Move(Direction::SouthEast),
        "2" | "j" => PlayerCommand::Move(Direction::South),
        "1" | "b" => PlayerCommand::Move(Direction::SouthWest),
        "4" | "h" => PlayerCommand::Move(Direction::West),
        ">" => PlayerCommand::Interact,
        "t" => PlayerCommand::ListTrainers,
        "q" | "Q" => PlayerCommand::Quit,
        _ => match line.strip_prefix('f') {
            Some(rest) => parse_fly(rest)?,
            None => bail!("unknown command {line:?}"),
        },
    };
    Ok(command)
}

fn parse_fly(arguments: &str) -> Result<PlayerCommand> {
    let mut parts = arguments.split_whitespace();
    let (Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next()) else {
        bail!("fly needs two coordinates, e.g. `f -3 12`");
    };
    let x = x.parse::<i32>().with_context(|| format!("{x:?} is not a coordinate"))?;
    let y = y.parse::<i32>().with_context(|| format!("{y:?} is not a coordinate"))?;
    Ok(PlayerCommand::Fly { x, y })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use overworld_core::{CellCoord, Gates, TerrainGrid, TerrainKind};

    use super::*;
    use crate::terminal::Terminal;

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(parse_command("8\n").ok(), Some(PlayerCommand::Move(Direction::North)));
        assert_eq!(parse_command("b").ok(), Some(PlayerCommand::Move(Direction::SouthWest)));
        assert_eq!(parse_command("\n").ok(), Some(PlayerCommand::Wait));
        assert_eq!(parse_command(">").ok(), Some(PlayerCommand::Interact));
        assert_eq!(parse_command("Q").ok(), Some(PlayerCommand::Quit));
        assert_eq!(
            parse_command("f -3 12").ok(),
            Some(PlayerCommand::Fly { x: -3, y: 12 })
        );
    }

    #[test]
    fn malformed_lines_are_refused() {
        assert!(parse_command("x").is_err());
        assert!(parse_command("f 3").is_err());
        assert!(parse_command("f 3 4 5").is_err());
        assert!(parse_command("f north 4").is_err());
    }

    #[test]
    fn bad_lines_reprompt_and_end_of_input_quits() {
        let world = World::from_terrain(
            TerrainGrid::filled(TerrainKind::Clearing),
            Gates::default(),
            CellCoord::new(5, 5),
        )
        .expect("world");
        let mut input = LineInput::new(Cursor::new("zz\nl\n"), Terminal::new(Vec::new()));

        assert_eq!(
            input.next_command(&world),
            PlayerCommand::Move(Direction::East)
        );
        assert_eq!(input.next_command(&world), PlayerCommand::Quit);

        let output = String::from_utf8(input.into_terminal().into_inner()).expect("utf-8");
        assert!(output.contains("unknown command \"zz\""));
        assert!(output.contains('@'));
    }
}
