//! Sampling primitives. All of them are generic over the generator and take it explicitly.

use crate::rand::seq::index::sample as choose_range;
use crate::rand::Rng;

/// A uniform draw on `(0, 1]`. Used where a draw of exactly zero would select an entry that
/// carries no probability mass.
pub fn uniform_unit_open_below<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    1.0 - rng.random::<f64>()
}

/// A Bernoulli trial that tolerates `p` outside `[0, 1]` (`p <= 0` never succeeds, `p >= 1`
/// always does), unlike `Rng::random_bool`.
pub fn bernoulli<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    rng.random::<f64>() < p
}

/// Converts a real-valued expectation into an integer count without bias:
/// `floor(x) + Bernoulli(frac(x))`. Non-positive and non-finite inputs give zero.
pub fn randomized_round<R: Rng + ?Sized>(rng: &mut R, x: f64) -> usize {
    if !x.is_finite() || x <= 0.0 {
        return 0;
    }
    let whole = x.floor();
    let fraction = x - whole;
    let mut count = whole as usize;
    if bernoulli(rng, fraction) {
        count += 1;
    }
    count
}

/// Inverse transform sampling of an index from a cumulative distribution. Returns the first
/// index whose cumulative probability reaches a uniform draw on `(0, 1]`, or `None` if the table
/// never reaches the draw (a malformed table).
///
/// A point mass at index `k` (zeros before `k`, ones from `k` on) always yields `k`.
pub fn draw_from_cdf<R: Rng + ?Sized>(rng: &mut R, cdf: &[f64]) -> Option<usize> {
    let r = uniform_unit_open_below(rng);
    cdf.iter().position(|&cumulative| cumulative >= r)
}

/// Sample a random element uniformly from a container of known length.
///
/// We do not assume the container is randomly indexable, only that it can be iterated over.
pub fn sample_single_from_known_length<I, R, T>(rng: &mut R, mut iter: I) -> Option<T>
where
    R: Rng + ?Sized,
    I: ExactSizeIterator<Item = T>,
{
    let len = iter.len();
    if len == 0 {
        return None;
    }
    // Sampling a `u32` range is noticeably faster than a `usize` one.
    let index = rng.random_range(0..len as u32) as usize;
    iter.nth(index)
}

/// Sample up to `requested` elements uniformly without replacement from a container of known
/// length, preserving container order. Asking for more elements than exist returns all of them.
pub fn sample_multiple_from_known_length<I, R, T>(rng: &mut R, iter: I, requested: usize) -> Vec<T>
where
    R: Rng + ?Sized,
    I: ExactSizeIterator<Item = T>,
{
    let requested = requested.min(iter.len());
    if requested == 0 {
        return Vec::new();
    }
    let mut indexes = Vec::with_capacity(requested);
    indexes.extend(choose_range(rng, iter.len(), requested));
    indexes.sort_unstable();
    let mut index_iterator = indexes.into_iter().peekable();
    let mut selected = Vec::with_capacity(requested);

    for (idx, item) in iter.enumerate() {
        match index_iterator.peek() {
            Some(&next_idx) if next_idx == idx => {
                selected.push(item);
                index_iterator.next();
            }
            Some(_) => {}
            None => break,
        }
    }

    selected
}
