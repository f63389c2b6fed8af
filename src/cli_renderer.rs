use crate::entity::ItemKind;
use crate::game::{Game, GameState};
use crate::geometry::Rect;
use crate::input::Action;
use crate::renderer::{Input, Renderer};
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, Write};
use std::ops::Range;
use std::time::{Duration, Instant};

/// Lines reserved under the playfield for the HUD
const INFO_LINES: u16 = 3;

/// Drawable for a falling item kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub glyph: &'static str,
    pub fg: Color,
    pub bg: Color,
}

pub fn sprite_for(kind: ItemKind) -> Sprite {
    match kind {
        ItemKind::Pancake => Sprite {
            glyph: "==",
            fg: Color::Black,
            bg: Color::DarkYellow,
        },
        ItemKind::Burnt => Sprite {
            glyph: "##",
            fg: Color::DarkRed,
            bg: Color::DarkGrey,
        },
        ItemKind::Butter => Sprite {
            glyph: "[]",
            fg: Color::DarkYellow,
            bg: Color::Yellow,
        },
    }
}

/// Maps logical screen pixels onto terminal cells, two characters per cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    cell_width: f32,
    cell_height: f32,
}

impl Viewport {
    pub const MAX_COLS: u16 = 32;
    pub const MAX_ROWS: u16 = 32;

    pub fn fit(screen_width: f32, screen_height: f32, term_width: u16, term_height: u16) -> Self {
        let cols = (term_width / 2).clamp(1, Self::MAX_COLS);
        let rows = term_height.saturating_sub(INFO_LINES).clamp(1, Self::MAX_ROWS);
        Self {
            cols,
            rows,
            cell_width: screen_width / cols as f32,
            cell_height: screen_height / rows as f32,
        }
    }

    /// Cells covered by `rect`, clipped to the grid. `None` when fully off-grid.
    pub fn cells_for(&self, rect: &Rect) -> Option<(Range<u16>, Range<u16>)> {
        let span = |start: f32, end: f32, cell: f32, limit: u16| -> Option<Range<u16>> {
            let first = (start / cell).floor().max(0.0);
            let last = (end / cell).ceil().min(limit as f32);
            if first >= last {
                None
            } else {
                Some(first as u16..last as u16)
            }
        };

        let cols = span(rect.left(), rect.right(), self.cell_width, self.cols)?;
        let rows = span(rect.top(), rect.bottom(), self.cell_height, self.rows)?;
        Some((cols, rows))
    }

    /// Width of the playfield in terminal characters.
    pub fn char_width(&self) -> u16 {
        self.cols * 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Paint {
    Empty,
    Paddle,
    Stack,
    Item(ItemKind),
}

/// Key bindings. Enter both starts and retries.
pub fn actions_for(code: KeyCode) -> &'static [Action] {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => &[Action::MoveLeft],
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => &[Action::MoveRight],
        KeyCode::Enter => &[Action::Confirm, Action::Retry],
        KeyCode::Char(' ') => &[Action::Confirm],
        KeyCode::Char('r') | KeyCode::Char('R') => &[Action::Retry],
        KeyCode::Esc => &[Action::Cancel],
        _ => &[],
    }
}

/// Column to start `text` at so it sits centered in `width` characters,
/// and the part of it that fits.
pub fn center_line(text: &str, width: u16) -> (u16, &str) {
    let fitted = match text.char_indices().nth(width as usize) {
        Some((end, _)) => &text[..end],
        None => text,
    };
    let len = fitted.chars().count() as u16;
    (width.saturating_sub(len) / 2, fitted)
}

fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

pub struct CliRenderer {
    last_render: Instant,
    target_frame_time: Duration,
    last_term_size: (u16, u16),
    keyboard_enhanced: bool,
    active: bool,
}

impl CliRenderer {
    pub fn new() -> Self {
        Self {
            last_render: Instant::now(),
            target_frame_time: Duration::from_millis(16),
            last_term_size: (0, 0),
            keyboard_enhanced: false,
            active: false,
        }
    }

    fn paint_rect(&self, grid: &mut [Paint], viewport: &Viewport, rect: &Rect, paint: Paint) {
        if let Some((cols, rows)) = viewport.cells_for(rect) {
            for row in rows {
                for col in cols.clone() {
                    grid[row as usize * viewport.cols as usize + col as usize] = paint;
                }
            }
        }
    }

    fn build_grid(&self, game: &Game, viewport: &Viewport) -> Vec<Paint> {
        let mut grid = vec![Paint::Empty; viewport.cols as usize * viewport.rows as usize];
        let config = &game.config;
        let paddle = &game.paddle;

        for i in 0..game.stack_count() {
            let rect = Rect::new(
                paddle.x + (paddle.width - config.item_width) / 2.0,
                paddle.y - (i + 1) as f32 * config.step_height,
                config.item_width,
                config.step_height,
            );
            self.paint_rect(&mut grid, viewport, &rect, Paint::Stack);
        }

        self.paint_rect(&mut grid, viewport, &paddle.rect(), Paint::Paddle);

        if let Some(item) = &game.item {
            self.paint_rect(&mut grid, viewport, &item.rect(), Paint::Item(item.kind));
        }

        grid
    }

    fn draw_cell(&self, paint: Paint, flashing: bool, stdout: &mut io::Stdout) -> io::Result<()> {
        match paint {
            Paint::Empty => {
                queue!(stdout, SetBackgroundColor(Color::DarkBlue), Print("  "))?;
            }
            Paint::Paddle => {
                queue!(
                    stdout,
                    SetBackgroundColor(Color::Grey),
                    SetForegroundColor(Color::White),
                    Print("__")
                )?;
            }
            Paint::Stack => {
                let sprite = sprite_for(ItemKind::Pancake);
                let bg = if flashing { Color::Yellow } else { sprite.bg };
                queue!(
                    stdout,
                    SetBackgroundColor(bg),
                    SetForegroundColor(sprite.fg),
                    Print(sprite.glyph)
                )?;
            }
            Paint::Item(kind) => {
                let sprite = sprite_for(kind);
                queue!(
                    stdout,
                    SetBackgroundColor(sprite.bg),
                    SetForegroundColor(sprite.fg),
                    Print(sprite.glyph)
                )?;
            }
        }
        Ok(())
    }

    fn print_centered(
        &self,
        stdout: &mut io::Stdout,
        viewport: &Viewport,
        row: u16,
        text: &str,
        color: Color,
    ) -> io::Result<()> {
        let (col, text) = center_line(text, viewport.char_width());
        queue!(
            stdout,
            cursor::MoveTo(col, row.min(viewport.rows.saturating_sub(1))),
            SetBackgroundColor(Color::Black),
            SetForegroundColor(color),
            Print(text),
            ResetColor
        )
    }

    fn draw_title(&self, viewport: &Viewport, stdout: &mut io::Stdout) -> io::Result<()> {
        for row in 0..viewport.rows {
            queue!(
                stdout,
                cursor::MoveTo(0, row),
                SetBackgroundColor(Color::Black),
                Print(" ".repeat(viewport.char_width() as usize)),
            )?;
        }
        queue!(stdout, ResetColor)?;

        let mid = viewport.rows / 2;
        let lines = [
            (mid.saturating_sub(4), "PANCAKE STACK", Color::White),
            (mid.saturating_sub(1), "Enter/Space: Start", Color::Yellow),
            (mid + 1, "Catch burnt -> Game Over", Color::Cyan),
            (mid + 2, "After enough stacks, butter comes!", Color::Cyan),
        ];
        for (row, text, color) in lines {
            self.print_centered(stdout, viewport, row, text, color)?;
        }
        Ok(())
    }

    fn draw_playfield(
        &self,
        game: &Game,
        viewport: &Viewport,
        stdout: &mut io::Stdout,
    ) -> io::Result<()> {
        let grid = self.build_grid(game, viewport);
        let flashing = game.flash > 0;

        for row in 0..viewport.rows {
            queue!(stdout, cursor::MoveTo(0, row))?;
            let start = row as usize * viewport.cols as usize;
            for &paint in &grid[start..start + viewport.cols as usize] {
                self.draw_cell(paint, flashing, stdout)?;
            }
            queue!(stdout, ResetColor)?;
        }

        let (banner, hint, color) = match game.state {
            GameState::GameOver => ("  GAME OVER  ", " R/Enter: Retry  Esc: Title ", Color::Red),
            GameState::Clear => ("  CLEAR!  ", " R/Enter: Play Again  Esc: Title ", Color::Green),
            GameState::Title | GameState::Playing => return Ok(()),
        };

        let mid = viewport.rows / 2;
        self.print_centered(stdout, viewport, mid.saturating_sub(1), banner, color)?;
        self.print_centered(stdout, viewport, mid + 1, hint, Color::White)?;
        Ok(())
    }

    fn draw_info(
        &self,
        game: &Game,
        viewport: &Viewport,
        stdout: &mut io::Stdout,
    ) -> io::Result<()> {
        let width = viewport.char_width() as usize;

        queue!(
            stdout,
            cursor::MoveTo(0, viewport.rows),
            ResetColor,
            terminal::Clear(ClearType::CurrentLine),
            Print(format!("STACK: {}/{}", game.stack_count(), game.config.target_stack))
        )?;

        queue!(
            stdout,
            cursor::MoveTo(0, viewport.rows + 1),
            terminal::Clear(ClearType::CurrentLine)
        )?;
        if game.state == GameState::Playing && game.butter_incoming() {
            queue!(
                stdout,
                SetForegroundColor(Color::Yellow),
                Print("BUTTER INCOMING!"),
                ResetColor
            )?;
        }

        let controls = "Arrows/A/D: move | Q: quit";
        queue!(
            stdout,
            cursor::MoveTo(0, viewport.rows + 2),
            terminal::Clear(ClearType::CurrentLine),
            Print(&controls[..controls.len().min(width.max(1))])
        )?;
        Ok(())
    }
}

impl Default for CliRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for CliRenderer {
    fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide
        )?;

        self.keyboard_enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.keyboard_enhanced {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        log::info!("Keyboard release events: {}", self.keyboard_enhanced);

        self.active = true;
        Ok(())
    }

    fn render(&mut self, game: &Game) -> io::Result<()> {
        // Frame rate limiting: skip rendering if not enough time has passed
        if self.last_render.elapsed() < self.target_frame_time {
            return Ok(());
        }

        self.last_render = Instant::now();

        let mut stdout = io::stdout();

        let term_size = terminal::size()?;
        if term_size != self.last_term_size {
            queue!(stdout, ResetColor, terminal::Clear(ClearType::All))?;
            self.last_term_size = term_size;
        }

        let viewport = Viewport::fit(
            game.config.screen_width,
            game.config.screen_height,
            term_size.0,
            term_size.1,
        );

        match game.state {
            GameState::Title => self.draw_title(&viewport, &mut stdout)?,
            _ => self.draw_playfield(game, &viewport, &mut stdout)?,
        }

        self.draw_info(game, &viewport, &mut stdout)?;

        stdout.flush()?;
        Ok(())
    }

    fn cleanup(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let mut stdout = io::stdout();
        if self.keyboard_enhanced {
            execute!(stdout, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            stdout,
            cursor::Show,
            terminal::LeaveAlternateScreen,
            ResetColor
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    fn poll_input(&mut self) -> io::Result<Vec<Input>> {
        let mut inputs = Vec::new();

        while event::poll(Duration::ZERO)? {
            let Event::Key(key) = event::read()? else {
                continue;
            };

            if key.kind != KeyEventKind::Release && is_quit(&key) {
                inputs.push(Input::Quit);
                continue;
            }

            for &action in actions_for(key.code) {
                inputs.push(match key.kind {
                    KeyEventKind::Release => Input::Release(action),
                    KeyEventKind::Press | KeyEventKind::Repeat => Input::Press(action),
                });
            }
        }

        Ok(inputs)
    }

    fn reports_releases(&self) -> bool {
        self.keyboard_enhanced
    }
}

impl Drop for CliRenderer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
