use crate::game::Game;
use crate::input::Action;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Press(Action),
    Release(Action),
    Quit,
}

/// Trait that abstracts rendering implementation.
/// The game core never draws; a backend reads the session and turns it into output.
pub trait Renderer {
    /// Initialize the renderer
    fn init(&mut self) -> io::Result<()>;

    /// Render the current game state
    fn render(&mut self, game: &Game) -> io::Result<()>;

    /// Clean up and restore terminal/display state
    fn cleanup(&mut self) -> io::Result<()>;

    /// Drain pending input without blocking
    fn poll_input(&mut self) -> io::Result<Vec<Input>>;

    /// Whether the backend reports key releases. Without them, holds lapse on a timer.
    fn reports_releases(&self) -> bool {
        false
    }
}
