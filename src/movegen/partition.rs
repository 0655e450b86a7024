//! Splitting a number of units across a number of cells.
//!
//! `Partitions` walks every way to write `units` as an ordered sum of `cells`
//! non-negative counts, each exactly once, without materializing the set.
//! Order: lexicographically descending, from `[units, 0, ..]` to `[.., 0, units]`.

/// Lazy iterator over count vectors of length `cells` summing to `units`.
///
/// Zero cells yields nothing; zero units over at least one cell yields the
/// single all-zero vector.
#[derive(Debug, Clone)]
pub struct Partitions {
    current: Option<Vec<usize>>,
}

/// Every way to split `units` over `cells`.
pub fn partitions(cells: usize, units: usize) -> Partitions {
    let current = (cells > 0).then(|| {
        let mut first = vec![0; cells];
        first[0] = units;
        first
    });
    Partitions { current }
}

/// Number of items `partitions(cells, units)` yields: C(units + cells - 1, cells - 1).
/// Saturates at `u64::MAX`.
pub fn partition_count(cells: usize, units: usize) -> u64 {
    if cells == 0 {
        return 0;
    }
    let n = (units + cells - 1) as u64;
    let k = (cells - 1).min(units) as u64;
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc * u128::from(n - i) / u128::from(i + 1);
        if acc > u128::from(u64::MAX) {
            return u64::MAX;
        }
    }
    acc as u64
}

/// Steps `counts` to the next composition. Returns false when exhausted.
fn advance(counts: &mut [usize]) -> bool {
    let last = counts.len() - 1;
    let tail = counts[last];
    counts[last] = 0;
    match counts[..last].iter().rposition(|&c| c > 0) {
        Some(i) => {
            counts[i] -= 1;
            counts[i + 1] = tail + 1;
            true
        }
        None => false,
    }
}

impl Iterator for Partitions {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.current.as_mut()?;
        let item = current.clone();
        if !advance(current) {
            self.current = None;
        }
        Some(item)
    }
}
