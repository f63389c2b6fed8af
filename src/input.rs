#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Confirm,
    Retry,
    Cancel,
}

impl Action {
    #[cfg(test)]
    const ALL: [Action; 5] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::Confirm,
        Action::Retry,
        Action::Cancel,
    ];

    fn index(self) -> usize {
        match self {
            Action::MoveLeft => 0,
            Action::MoveRight => 1,
            Action::Confirm => 2,
            Action::Retry => 3,
            Action::Cancel => 4,
        }
    }
}

/// What the game sees for one tick: held directions and freshly pressed actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub confirm: bool,
    pub retry: bool,
    pub cancel: bool,
}

/// Without release events, a press this many ticks after the previous one
/// is a new tap rather than auto-repeat.
const TAP_GAP_TICKS: u32 = 3;

#[derive(Debug, Clone, Copy, Default)]
struct ActionState {
    /// Ticks left before a hold without a refreshing press lapses
    hold_ticks_left: u32,
    ticks_since_press: u32,
    pressed: bool,
}

/// Folds press/release events into per-tick snapshots.
///
/// Terminals that never report key releases only deliver auto-repeated presses,
/// so a held action lapses `hold_ticks` ticks after its last press. Such
/// terminals only repeat the most recent key, so pressing one direction also
/// ends a timed hold on the other.
#[derive(Debug, Clone)]
pub struct InputTracker {
    states: [ActionState; 5],
    hold_ticks: u32,
    release_events: bool,
}

impl InputTracker {
    pub fn new(hold_ticks: u32) -> Self {
        Self {
            states: [ActionState::default(); 5],
            hold_ticks: hold_ticks.max(1),
            release_events: false,
        }
    }

    /// With release reporting, holds only end on release.
    pub fn with_release_events() -> Self {
        Self {
            release_events: true,
            ..Self::new(u32::MAX)
        }
    }

    pub fn press(&mut self, action: Action) {
        let release_events = self.release_events;
        let state = &mut self.states[action.index()];

        let fresh = state.hold_ticks_left == 0
            || (!release_events && state.ticks_since_press >= TAP_GAP_TICKS);
        if fresh {
            state.pressed = true;
        }
        state.hold_ticks_left = self.hold_ticks;
        state.ticks_since_press = 0;

        if !release_events {
            match action {
                Action::MoveLeft => self.release(Action::MoveRight),
                Action::MoveRight => self.release(Action::MoveLeft),
                _ => {}
            }
        }
    }

    pub fn release(&mut self, action: Action) {
        self.states[action.index()].hold_ticks_left = 0;
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.states[action.index()].hold_ticks_left > 0
    }

    fn was_pressed(&self, action: Action) -> bool {
        self.states[action.index()].pressed
    }

    pub fn snapshot(&self) -> TickInput {
        TickInput {
            left: self.is_held(Action::MoveLeft),
            right: self.is_held(Action::MoveRight),
            confirm: self.was_pressed(Action::Confirm),
            retry: self.was_pressed(Action::Retry),
            cancel: self.was_pressed(Action::Cancel),
        }
    }

    /// Clear edges and age holds. Call once after each tick consumed a snapshot.
    pub fn end_tick(&mut self) {
        for state in &mut self.states {
            state.pressed = false;
            state.ticks_since_press = state.ticks_since_press.saturating_add(1);
            if state.hold_ticks_left != u32::MAX {
                state.hold_ticks_left = state.hold_ticks_left.saturating_sub(1);
            }
        }
    }
}
