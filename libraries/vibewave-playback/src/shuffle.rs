//! Shuffle pick
//!
//! Chooses the next index uniformly among every index except the current
//! one. One draw over `len - 1` candidates, then skip past the current
//! index, so the pick never loops.

use rand::Rng;

/// Uniform random index in `0..len`, different from `current` when
/// `len > 1`.
///
/// Returns `None` for an empty context. With a single track, or with no
/// current index, any index is allowed.
pub fn pick_other_index<R: Rng + ?Sized>(
    rng: &mut R,
    len: usize,
    current: Option<usize>,
) -> Option<usize> {
    match (len, current) {
        (0, _) => None,
        (1, _) => Some(0),
        (len, Some(current)) if current < len => {
            let draw = rng.gen_range(0..len - 1);
            Some(if draw >= current { draw + 1 } else { draw })
        }
        (len, _) => Some(rng.gen_range(0..len)),
    }
}
