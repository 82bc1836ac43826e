//! Uniform random helpers over slices.
//!
//! All helpers take the generator explicitly so callers can seed it for
//! reproducible results.

use fastrand::Rng;
use std::collections::VecDeque;

/// Return up to `sample_size` distinct items of `items` in random order.
/// The input is left untouched.
pub fn random_sample<T: Clone>(rng: &mut Rng, items: &[T], sample_size: usize) -> Vec<T> {
    let size = sample_size.min(items.len());
    let mut copy = items.to_vec();
    let mut picked = Vec::with_capacity(size);
    for _ in 0..size {
        let index = rng.usize(..copy.len());
        picked.push(copy.swap_remove(index));
    }
    picked
}

/// Copy of `items` with the elements randomly re-ordered.
pub fn randomize<T: Clone>(rng: &mut Rng, items: &[T]) -> Vec<T> {
    let mut copy = items.to_vec();
    rng.shuffle(&mut copy);
    copy
}

/// The integers `0..n` in random order.
pub fn randomized_order(rng: &mut Rng, n: i64) -> Vec<i64> {
    let order = create_int_array(n, 0, 1);
    randomize(rng, &order)
}

/// One random item, or `None` for an empty slice.
pub fn random_item<T: Clone>(rng: &mut Rng, items: &[T]) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    Some(items[rng.usize(..items.len())].clone())
}

/// Pick an item that is not in the recent history, if possible.
///
/// The chosen item is pushed to the front of `recent_history`, which is then
/// trimmed to `max_history_length`. If every item was used recently, the
/// last candidate of the shuffled order is returned anyway.
pub fn random_unused_item<T: Clone + PartialEq>(
    rng: &mut Rng,
    items: &[T],
    recent_history: &mut VecDeque<T>,
    max_history_length: usize,
) -> Option<T> {
    let shuffled = randomize(rng, items);
    let last = shuffled.len().checked_sub(1)?;
    let index = shuffled[..last]
        .iter()
        .position(|item| !recent_history.contains(item))
        .unwrap_or(last);
    let item = shuffled[index].clone();

    recent_history.push_front(item.clone());
    recent_history.truncate(max_history_length);
    Some(item)
}

/// A random float in `[min, max)`.
pub fn random_in_range(rng: &mut Rng, min: f64, max: f64) -> f64 {
    min + (max - min) * rng.f64()
}

/// Monotonically increasing integers from `min` (inclusive) to `max`
/// (exclusive), `step` apart. Returns an empty vector when `step < 1` or
/// `min >= max`.
pub fn create_int_array(max: i64, min: i64, step: i64) -> Vec<i64> {
    if step < 1 || min >= max {
        return Vec::new();
    }
    (min..max).step_by(step as usize).collect()
}
