//! Incremental channel ordering
//!
//! Widths change a little from one frame to the next, so the previous order
//! is almost always still sorted. A bubble sort that stops on the first
//! clean pass costs one linear scan in the common case.

use crate::Tick;

/// One ascending bubble pass over `order`, keyed by `widths`
///
/// Only strictly greater neighbours are swapped, so channels with equal
/// widths keep their relative order. Returns whether anything moved.
pub fn bubble_pass(order: &mut [u8], widths: &[Tick]) -> bool {
    let mut swapped = false;
    for i in 1..order.len() {
        if widths[order[i - 1] as usize] > widths[order[i] as usize] {
            order.swap(i - 1, i);
            swapped = true;
        }
    }
    swapped
}

/// Bubble until a pass makes no swap
///
/// Returns the number of passes that moved something; an already sorted
/// order returns 0.
pub fn settle(order: &mut [u8], widths: &[Tick]) -> usize {
    let mut passes = 0;
    while bubble_pass(order, widths) {
        passes += 1;
    }
    passes
}
