use crate::config::Config;
use crate::entity::{FallingItem, ItemKind, Paddle};
use crate::geometry::{overlaps, Rect};
use crate::input::TickInput;
use crate::spawner;
use rand::SeedableRng;
use rand_pcg::Pcg32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Title,
    Playing,
    GameOver,
    Clear,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCounters {
    pub stack_count: u32,
    pub butter_spawned: bool,
    pub frame: u64,
    pub spawn_interval: u32,
}

impl SessionCounters {
    fn fresh(config: &Config) -> Self {
        Self {
            stack_count: 0,
            butter_spawned: false,
            frame: 0,
            spawn_interval: config.initial_spawn_interval,
        }
    }
}

/// One running game: the state machine plus everything a session owns.
pub struct Game {
    pub config: Config,
    pub state: GameState,
    pub paddle: Paddle,
    pub item: Option<FallingItem>,
    pub counters: SessionCounters,
    /// Ticks left on the catch highlight
    pub flash: u32,
    rng: Pcg32,
}

impl Game {
    pub fn new(config: Config, seed: u64) -> Self {
        let paddle = Self::fresh_paddle(&config);
        let counters = SessionCounters::fresh(&config);

        Self {
            config,
            state: GameState::Title,
            paddle,
            item: None,
            counters,
            flash: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    fn fresh_paddle(config: &Config) -> Paddle {
        Paddle::centered(
            config.screen_width,
            config.screen_height,
            config.paddle_width,
            config.paddle_height,
            config.paddle_bottom_offset,
            config.paddle_speed,
        )
    }

    pub fn stack_count(&self) -> u32 {
        self.counters.stack_count
    }

    /// Target reached but the butter has not dropped yet.
    pub fn butter_incoming(&self) -> bool {
        self.counters.stack_count >= self.config.target_stack && !self.counters.butter_spawned
    }

    pub fn catch_rect(&self) -> Rect {
        self.paddle.catch_rect(self.counters.stack_count, self.config.step_height)
    }

    /// Clear the session and return to the title screen.
    pub fn reset(&mut self) {
        self.paddle = Self::fresh_paddle(&self.config);
        self.item = None;
        self.counters = SessionCounters::fresh(&self.config);
        self.flash = 0;
        self.state = GameState::Title;
    }

    /// Fresh session, straight into play.
    pub fn start(&mut self) {
        self.reset();
        self.state = GameState::Playing;
        log::info!("Session started (target stack {})", self.config.target_stack);
    }

    pub fn update(&mut self, input: &TickInput) {
        match self.state {
            GameState::Title => {
                if input.confirm {
                    self.start();
                }
            }
            GameState::GameOver | GameState::Clear => {
                if input.retry {
                    self.start();
                } else if input.cancel {
                    self.reset();
                    log::info!("Back to title");
                }
            }
            GameState::Playing => self.tick(input),
        }
    }

    fn tick(&mut self, input: &TickInput) {
        self.counters.frame += 1;
        self.flash = self.flash.saturating_sub(1);

        self.paddle.steer(input.left, input.right, self.config.screen_width);

        if self.counters.frame % u64::from(self.counters.spawn_interval.max(1)) == 0 {
            self.try_spawn();
        }

        self.advance_item();
        self.resolve_catch();

        self.counters.spawn_interval = self.config.spawn_interval(self.counters.stack_count);
    }

    /// Drop a new item unless one is already falling.
    pub fn try_spawn(&mut self) {
        if let Some(item) = spawner::try_spawn(
            &self.config,
            &mut self.counters,
            self.item.as_ref(),
            &mut self.rng,
        ) {
            self.item = Some(item);
        }
    }

    /// Move the falling item and drop it once it has left the screen.
    /// Letting the butter fall is a loss; other misses cost nothing.
    pub fn advance_item(&mut self) {
        let Some(item) = self.item.as_mut() else {
            return;
        };

        item.advance();

        if item.is_below(self.config.screen_height, self.config.offscreen_margin) {
            if item.kind == ItemKind::Butter {
                log::info!("Butter missed at stack {}", self.counters.stack_count);
                self.state = GameState::GameOver;
            }
            self.item = None;
        }
    }

    /// Resolve the falling item against the catch rectangle. The item is
    /// consumed by any catch, so it is never resolved twice.
    pub fn resolve_catch(&mut self) {
        let Some(item) = &self.item else {
            return;
        };
        if !overlaps(&item.rect(), &self.catch_rect()) {
            return;
        }

        let kind = item.kind;
        self.item = None;

        match kind {
            ItemKind::Burnt => {
                log::info!("Caught a burnt pancake at stack {}", self.counters.stack_count);
                self.state = GameState::GameOver;
            }
            ItemKind::Pancake => {
                self.counters.stack_count += 1;
                self.flash = self.config.flash_ticks;
                log::debug!("Stack is now {}", self.counters.stack_count);
            }
            ItemKind::Butter => {
                log::info!("Butter caught, stack of {} cleared", self.counters.stack_count);
                self.state = GameState::Clear;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn confirm() -> TickInput {
        TickInput {
            confirm: true,
            ..Default::default()
        }
    }

    fn playing_game(seed: u64) -> Game {
        let mut game = Game::new(Config::default(), seed);
        game.update(&confirm());
        game
    }

    /// An item of `kind` sitting on the paddle's catch rectangle.
    fn item_on_paddle(game: &Game, kind: ItemKind) -> FallingItem {
        let rect = game.catch_rect();
        FallingItem::new(
            kind,
            rect.x + 4.0,
            rect.y - 8.0,
            0.0,
            game.config.item_width,
            game.config.item_height,
        )
    }

    fn input_strategy() -> impl Strategy<Value = TickInput> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(left, right, confirm, retry, cancel)| TickInput {
                left,
                right,
                confirm,
                retry,
                cancel,
            },
        )
    }

    #[test]
    fn test_new_game_starts_on_title() {
        let game = Game::new(Config::default(), 1);
        assert_eq!(game.state, GameState::Title);
        assert_eq!(game.stack_count(), 0);
        assert!(game.item.is_none());
    }

    #[test]
    fn test_title_ignores_everything_but_confirm() {
        let mut game = Game::new(Config::default(), 1);
        let input = TickInput {
            left: true,
            retry: true,
            cancel: true,
            ..Default::default()
        };
        for _ in 0..50 {
            game.update(&input);
        }
        assert_eq!(game.state, GameState::Title);
        assert_eq!(game.counters.frame, 0);
        assert_eq!(game.paddle.x, 100.0);
    }

    #[test]
    fn test_confirm_starts_fresh_session() {
        let mut game = Game::new(Config::default(), 1);
        game.counters.stack_count = 5;
        game.paddle.x = 3.0;

        game.update(&confirm());

        assert_eq!(game.state, GameState::Playing);
        assert_eq!(game.stack_count(), 0);
        assert!(game.item.is_none());
        assert_eq!(game.paddle.x, 100.0);
        assert_eq!(game.counters.spawn_interval, 32);
    }

    #[test]
    fn test_first_spawn_on_interval() {
        let mut game = playing_game(5);
        for _ in 0..31 {
            game.update(&TickInput::default());
            assert!(game.item.is_none());
        }
        game.update(&TickInput::default());
        assert!(game.item.is_some());
    }

    #[test]
    fn test_catching_pancake_grows_stack() {
        let mut game = playing_game(1);
        game.item = Some(item_on_paddle(&game, ItemKind::Pancake));

        game.resolve_catch();

        assert_eq!(game.stack_count(), 1);
        assert!(game.item.is_none());
        assert_eq!(game.state, GameState::Playing);
        assert_eq!(game.flash, game.config.flash_ticks);
    }

    #[test]
    fn test_catch_resolves_once() {
        let mut game = playing_game(1);
        game.item = Some(item_on_paddle(&game, ItemKind::Pancake));

        game.resolve_catch();
        game.resolve_catch();

        assert_eq!(game.stack_count(), 1);
    }

    #[test]
    fn test_catching_burnt_is_game_over() {
        let mut game = playing_game(1);
        game.item = Some(item_on_paddle(&game, ItemKind::Burnt));

        game.update(&TickInput::default());

        assert_eq!(game.state, GameState::GameOver);
        assert!(game.item.is_none());
    }

    #[test]
    fn test_catching_butter_clears() {
        let mut game = playing_game(1);
        game.counters.stack_count = game.config.target_stack;
        game.counters.butter_spawned = true;
        game.item = Some(item_on_paddle(&game, ItemKind::Butter));

        game.update(&TickInput::default());

        assert_eq!(game.state, GameState::Clear);
        assert!(game.item.is_none());
    }

    #[test]
    fn test_catch_rect_reaches_over_stack() {
        let mut game = playing_game(1);
        game.counters.stack_count = 4;
        let rect = game.catch_rect();
        assert_eq!(rect.top(), game.paddle.y - 4.0 * game.config.step_height);

        // Touches the top of the stack exactly
        game.item = Some(FallingItem::new(
            ItemKind::Pancake,
            game.paddle.x,
            rect.top() - game.config.item_height,
            0.0,
            16.0,
            16.0,
        ));
        game.resolve_catch();
        assert_eq!(game.stack_count(), 5);
    }

    #[test]
    fn test_missed_pancake_has_no_penalty() {
        let mut game = playing_game(1);
        game.item = Some(FallingItem::new(ItemKind::Pancake, 0.0, 265.0, 3.0, 16.0, 16.0));

        game.update(&TickInput::default());

        assert!(game.item.is_none());
        assert_eq!(game.state, GameState::Playing);
        assert_eq!(game.stack_count(), 0);
    }

    #[test]
    fn test_missed_butter_is_game_over() {
        let mut game = playing_game(9);
        game.counters.stack_count = game.config.target_stack;
        game.counters.frame = u64::from(game.counters.spawn_interval) - 1;

        game.update(&TickInput::default());

        let butter = game.item.as_mut().unwrap();
        assert_eq!(butter.kind, ItemKind::Butter);
        assert!(game.counters.butter_spawned);
        // Keep it clear of the paddle
        butter.x = 0.0;

        for _ in 0..400 {
            if game.state != GameState::Playing {
                break;
            }
            game.update(&TickInput::default());
            if let Some(item) = &game.item {
                assert_eq!(item.kind, ItemKind::Butter);
            }
        }

        assert_eq!(game.state, GameState::GameOver);
        assert!(game.item.is_none());
    }

    #[test]
    fn test_spawn_attempt_with_item_changes_nothing() {
        let mut game = playing_game(1);
        game.counters.stack_count = game.config.target_stack;
        let item = FallingItem::new(ItemKind::Pancake, 50.0, 20.0, 2.0, 16.0, 16.0);
        game.item = Some(item.clone());
        let counters = game.counters.clone();

        game.try_spawn();

        assert_eq!(game.item, Some(item));
        assert_eq!(game.counters, counters);
    }

    #[test]
    fn test_retry_restarts_from_game_over() {
        let mut game = playing_game(1);
        game.counters.stack_count = 7;
        game.state = GameState::GameOver;

        game.update(&TickInput::default());
        assert_eq!(game.state, GameState::GameOver);
        assert_eq!(game.stack_count(), 7);

        game.update(&TickInput {
            retry: true,
            ..Default::default()
        });
        assert_eq!(game.state, GameState::Playing);
        assert_eq!(game.stack_count(), 0);
        assert!(!game.counters.butter_spawned);
    }

    #[test]
    fn test_cancel_returns_to_title_with_reset() {
        let mut game = playing_game(1);
        game.counters.stack_count = 12;
        game.counters.butter_spawned = true;
        game.state = GameState::Clear;

        game.update(&TickInput {
            cancel: true,
            ..Default::default()
        });

        assert_eq!(game.state, GameState::Title);
        assert_eq!(game.stack_count(), 0);
        assert!(!game.counters.butter_spawned);
    }

    #[test]
    fn test_retry_restarts_from_clear() {
        let mut game = playing_game(1);
        game.counters.stack_count = 12;
        game.counters.butter_spawned = true;
        game.state = GameState::Clear;

        game.update(&TickInput {
            retry: true,
            ..Default::default()
        });

        assert_eq!(game.state, GameState::Playing);
        assert_eq!(game.stack_count(), 0);
        assert!(!game.counters.butter_spawned);
        assert!(game.item.is_none());
    }

    #[test]
    fn test_cancel_returns_to_title_from_game_over() {
        let mut game = playing_game(1);
        game.counters.stack_count = 3;
        game.item = Some(FallingItem::new(ItemKind::Pancake, 10.0, 10.0, 2.0, 16.0, 16.0));
        game.state = GameState::GameOver;

        game.update(&TickInput {
            cancel: true,
            ..Default::default()
        });

        assert_eq!(game.state, GameState::Title);
        assert_eq!(game.stack_count(), 0);
        assert!(game.item.is_none());

        // Title needs a confirm to leave
        game.update(&TickInput::default());
        assert_eq!(game.state, GameState::Title);
    }

    #[test]
    fn test_retry_beats_cancel() {
        for end_state in [GameState::GameOver, GameState::Clear] {
            let mut game = playing_game(1);
            game.counters.stack_count = 5;
            game.state = end_state;

            game.update(&TickInput {
                retry: true,
                cancel: true,
                ..Default::default()
            });

            assert_eq!(game.state, GameState::Playing);
            assert_eq!(game.stack_count(), 0);
        }
    }

    #[test]
    fn test_playing_ignores_edge_inputs() {
        let mut game = playing_game(1);
        let input = TickInput {
            confirm: true,
            retry: true,
            cancel: true,
            ..Default::default()
        };
        game.update(&input);
        assert_eq!(game.state, GameState::Playing);
        assert_eq!(game.counters.frame, 1);
    }

    #[test]
    fn test_spawn_interval_tracks_stack() {
        let mut game = playing_game(1);
        game.counters.stack_count = 10;
        game.update(&TickInput::default());
        assert_eq!(game.counters.spawn_interval, 22);

        game.counters.stack_count = 30;
        game.update(&TickInput::default());
        assert_eq!(game.counters.spawn_interval, 16);
    }

    #[test]
    fn test_determinism() {
        let inputs = [
            TickInput {
                left: true,
                ..Default::default()
            },
            TickInput::default(),
            TickInput {
                right: true,
                ..Default::default()
            },
        ];

        let mut a = playing_game(4242);
        let mut b = playing_game(4242);

        for i in 0..600 {
            let input = &inputs[i % inputs.len()];
            a.update(input);
            b.update(input);
        }

        assert_eq!(a.state, b.state);
        assert_eq!(a.counters, b.counters);
        assert_eq!(a.item, b.item);
        assert_eq!(a.paddle, b.paddle);
    }

    proptest! {
        #[test]
        fn prop_session_invariants_hold(
            seed in any::<u64>(),
            inputs in prop::collection::vec(input_strategy(), 1..400),
        ) {
            let mut game = Game::new(Config::default(), seed);
            let target = game.config.target_stack;

            for input in &inputs {
                let before_state = game.state;
                let before = game.counters.clone();

                game.update(input);

                let c = &game.counters;
                prop_assert!(game.paddle.x >= 0.0);
                prop_assert!(game.paddle.x <= game.config.screen_width - game.paddle.width);
                prop_assert!(c.spawn_interval >= 16);

                if before_state == GameState::Playing {
                    prop_assert!(c.stack_count >= before.stack_count);
                    prop_assert!(c.stack_count <= before.stack_count + 1);
                    if c.butter_spawned && !before.butter_spawned {
                        prop_assert!(before.stack_count >= target);
                    }
                    if before.butter_spawned {
                        prop_assert!(c.butter_spawned);
                    }
                } else if game.state == before_state {
                    prop_assert_eq!(c, &before);
                }
            }
        }
    }
}
