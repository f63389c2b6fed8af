use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Pancake,
    Burnt,
    Butter,
}

/// The single item that can be falling at any time.
#[derive(Debug, Clone, PartialEq)]
pub struct FallingItem {
    pub kind: ItemKind,
    pub x: f32,
    pub y: f32,
    pub velocity: f32,
    pub width: f32,
    pub height: f32,
}

impl FallingItem {
    pub fn new(kind: ItemKind, x: f32, y: f32, velocity: f32, width: f32, height: f32) -> Self {
        Self {
            kind,
            x,
            y,
            velocity,
            width,
            height,
        }
    }

    /// Constant-velocity fall, one tick.
    pub fn advance(&mut self) {
        self.y += self.velocity;
    }

    /// Past the bottom edge by more than `margin`.
    pub fn is_below(&self, screen_height: f32, margin: f32) -> bool {
        self.y > screen_height + margin
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paddle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
}

impl Paddle {
    /// Paddle centered horizontally, resting `bottom_offset` above the bottom edge.
    pub fn centered(
        screen_width: f32,
        screen_height: f32,
        width: f32,
        height: f32,
        bottom_offset: f32,
        speed: f32,
    ) -> Self {
        Self {
            x: ((screen_width - width) / 2.0).floor(),
            y: screen_height - bottom_offset,
            width,
            height,
            speed,
        }
    }

    /// Apply one tick of movement. Both directions may be held at once;
    /// their displacements add up (and cancel).
    pub fn steer(&mut self, left: bool, right: bool, screen_width: f32) {
        if left {
            self.x -= self.speed;
        }
        if right {
            self.x += self.speed;
        }
        self.clamp(screen_width);
    }

    pub fn clamp(&mut self, screen_width: f32) {
        self.x = self.x.clamp(0.0, (screen_width - self.width).max(0.0));
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Collision box: the paddle extended upward by the height of the stack on it.
    pub fn catch_rect(&self, stack_count: u32, step_height: f32) -> Rect {
        let stack_height = stack_count as f32 * step_height;
        Rect::new(self.x, self.y - stack_height, self.width, self.height + stack_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn paddle() -> Paddle {
        Paddle::centered(256.0, 256.0, 56.0, 10.0, 28.0, 3.0)
    }

    #[test]
    fn test_paddle_starts_centered() {
        let p = paddle();
        assert_eq!(p.x, 100.0);
        assert_eq!(p.y, 228.0);
    }

    #[test]
    fn test_opposite_inputs_cancel() {
        let mut p = paddle();
        p.steer(true, true, 256.0);
        assert_eq!(p.x, 100.0);
    }

    #[test]
    fn test_item_falls_at_constant_speed() {
        let mut item = FallingItem::new(ItemKind::Pancake, 10.0, -16.0, 2.5, 16.0, 16.0);
        item.advance();
        item.advance();
        assert_eq!(item.y, -11.0);
        assert_eq!(item.velocity, 2.5);
    }

    #[test]
    fn test_item_below_screen_only_past_margin() {
        let mut item = FallingItem::new(ItemKind::Butter, 0.0, 266.0, 1.0, 16.0, 16.0);
        assert!(!item.is_below(256.0, 10.0));
        item.advance();
        assert!(item.is_below(256.0, 10.0));
    }

    proptest! {
        #[test]
        fn prop_catch_rect_grows_with_stack(stack in 0u32..200, x in 0.0f32..200.0) {
            let mut p = paddle();
            p.x = x;
            let r = p.catch_rect(stack, 16.0);

            prop_assert_eq!(r.top(), p.y - stack as f32 * 16.0);
            prop_assert_eq!(r.bottom(), p.rect().bottom());
            prop_assert_eq!(r.x, p.x);
            prop_assert_eq!(r.width, p.width);
        }

        #[test]
        fn prop_paddle_stays_on_screen(
            moves in prop::collection::vec((any::<bool>(), any::<bool>()), 1..300)
        ) {
            let mut p = paddle();
            for (left, right) in moves {
                p.steer(left, right, 256.0);
                prop_assert!(p.x >= 0.0);
                prop_assert!(p.x <= 256.0 - p.width);
            }
        }
    }
}
