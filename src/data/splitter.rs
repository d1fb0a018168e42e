// ============================================================
// Layer 4 — Stratified Splitter
// ============================================================
// Splits labelled examples so every partition keeps the class
// proportions of the source set.
//
// One split works like this:
//   1. n_held = ceil(fraction * n)
//   2. Each class c with n_c rows gets floor(n_c * n_held / n)
//      held-out slots; the slots left over go to the classes with
//      the largest remainder (ties → lower class id). A class never
//      loses all of its rows to the held-out side.
//   3. Within each class, rows are chosen by a Fisher-Yates shuffle
//      driven by StdRng::seed_from_u64(seed).
//   4. Both outputs keep the input order.
//
// The full pipeline applies this twice with the same seed:
//   all  → (rest 90%, test 10%)
//   rest → (train 95%, validation 5%)
//
// Same seed + same input ⇒ same partitions, always.
//
// Reference: rand crate documentation (SeedableRng, SliceRandom)

use std::collections::BTreeMap;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::data::DataError;
use crate::domain::issue::{Labeled, LabeledExample};

/// The three disjoint partitions produced by `split_partitions`.
#[derive(Debug, Clone, PartialEq)]
pub struct Partitions {
    pub train:      Vec<LabeledExample>,
    pub validation: Vec<LabeledExample>,
    pub test:       Vec<LabeledExample>,
}

impl Partitions {
    pub fn total(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }
}

/// Carve off `held_fraction` of `items`, stratified by label.
///
/// # Returns
/// A tuple (remaining, held_out)
pub fn stratified_split<T: Labeled>(
    items:         Vec<T>,
    held_fraction: f64,
    seed:          u64,
) -> Result<(Vec<T>, Vec<T>), DataError> {
    if !(held_fraction > 0.0 && held_fraction < 1.0) {
        return Err(DataError::InvalidFraction(held_fraction));
    }

    let total = items.len();

    // Row indices per class, classes in ascending id order
    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, item) in items.iter().enumerate() {
        by_class.entry(item.label()).or_default().push(i);
    }

    if let Some((&class, rows)) = by_class.iter().find(|(_, rows)| rows.len() < 2) {
        return Err(DataError::InsufficientClassMembers { class, count: rows.len() });
    }

    let n_classes = by_class.len();
    let n_held    = ((held_fraction * total as f64).ceil() as usize).min(total);
    let n_rest    = total - n_held;

    if n_held < n_classes {
        return Err(DataError::SplitTooSmall { side: "held-out", size: n_held, classes: n_classes });
    }
    if n_rest < n_classes {
        return Err(DataError::SplitTooSmall { side: "remaining", size: n_rest, classes: n_classes });
    }

    let allocation = allocate(&by_class, n_held, total)?;

    // Pick the held-out rows of each class
    let mut rng      = StdRng::seed_from_u64(seed);
    let mut held_out = vec![false; total];
    for (class, rows) in &by_class {
        let mut rows = rows.clone();
        rows.shuffle(&mut rng);
        for &i in rows.iter().take(allocation[class]) {
            held_out[i] = true;
        }
    }

    let mut rest = Vec::with_capacity(n_rest);
    let mut held = Vec::with_capacity(n_held);
    for (i, item) in items.into_iter().enumerate() {
        if held_out[i] {
            held.push(item);
        } else {
            rest.push(item);
        }
    }

    Ok((rest, held))
}

/// Number of held-out rows per class (largest-remainder rounding).
///
/// Always hands out exactly `n_held` slots while leaving at least one
/// row of every class on the remaining side; fails if that is impossible.
fn allocate(
    by_class: &BTreeMap<usize, Vec<usize>>,
    n_held:   usize,
    total:    usize,
) -> Result<BTreeMap<usize, usize>, DataError> {
    let mut allocation = BTreeMap::new();
    let mut remainders = Vec::with_capacity(by_class.len());

    for (&class, rows) in by_class {
        let scaled = rows.len() * n_held;
        allocation.insert(class, scaled / total);
        remainders.push((class, scaled % total, rows.len()));
    }

    let mut leftover = n_held - allocation.values().sum::<usize>();

    // Largest remainder first; BTreeMap order already gives ascending class id
    remainders.sort_by(|a, b| b.1.cmp(&a.1));

    // Classes already at count - 1 are skipped; later rounds revisit the rest
    while leftover > 0 {
        let before = leftover;
        for &(class, _, count) in &remainders {
            if leftover == 0 {
                break;
            }
            let slot = allocation.entry(class).or_default();
            if *slot + 1 < count {
                *slot += 1;
                leftover -= 1;
            }
        }
        if leftover == before {
            return Err(DataError::SplitTooSmall {
                side:    "remaining",
                size:    total - n_held,
                classes: by_class.len(),
            });
        }
    }

    Ok(allocation)
}

/// Split the full cleaned dataset into train / validation / test.
pub fn split_partitions(
    examples:      Vec<LabeledExample>,
    test_fraction: f64,
    val_fraction:  f64,
    seed:          u64,
) -> Result<Partitions, DataError> {
    let (rest, test)        = stratified_split(examples, test_fraction, seed)?;
    let (train, validation) = stratified_split(rest, val_fraction, seed)?;

    tracing::debug!(
        "Stratified split: {} train, {} validation, {} test",
        train.len(),
        validation.len(),
        test.len()
    );

    Ok(Partitions { train, validation, test })
}
