use crate::config::Config;
use crate::entity::{FallingItem, ItemKind};
use crate::game::SessionCounters;
use rand::Rng;

/// Decide what to drop next.
///
/// Returns `None` without touching `counters` while an item is still falling.
/// Once the stack reaches the target the next spawn is the butter, exactly once
/// per session; every other spawn is a pancake or, with a probability that grows
/// with the stack, a burnt one.
pub fn try_spawn<R: Rng>(
    config: &Config,
    counters: &mut SessionCounters,
    current: Option<&FallingItem>,
    rng: &mut R,
) -> Option<FallingItem> {
    if current.is_some() {
        return None;
    }

    let x = rng.gen_range(0.0..=config.max_item_x());
    let y = -config.item_height;

    if counters.stack_count >= config.target_stack && !counters.butter_spawned {
        counters.butter_spawned = true;
        log::info!("Butter spawned at stack {}", counters.stack_count);
        return Some(FallingItem::new(
            ItemKind::Butter,
            x,
            y,
            config.butter_speed,
            config.item_width,
            config.item_height,
        ));
    }

    let kind = if rng.gen_bool(config.burnt_probability(counters.stack_count)) {
        ItemKind::Burnt
    } else {
        ItemKind::Pancake
    };

    log::debug!("Spawned {:?} at x={:.1}", kind, x);

    Some(FallingItem::new(
        kind,
        x,
        y,
        config.fall_speed(counters.stack_count),
        config.item_width,
        config.item_height,
    ))
}
