//! Standard single-elimination seeding order and bye math.

/// Smallest power of two ≥ `n` (1 for `n` = 0).
pub fn next_power_of_two(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Number of byes a bracket for `n` racers needs.
pub fn bye_count(n: usize) -> usize {
    next_power_of_two(n) - n
}

/// Canonical seeding order for a bracket of size `p` (a power of two).
///
/// `standard_seeding(1) = [1]`. For larger `p`, each seed `s` of `standard_seeding(p / 2)` is
/// followed by its opponent `p + 1 - s`, so consecutive pairs are the round-1 matchups:
/// `standard_seeding(8) = [1, 8, 4, 5, 2, 7, 3, 6]`. Seed 1 meets seed `p` first, and seeds
/// 1 and 2 sit in opposite halves so they can only meet in the final.
pub fn standard_seeding(p: usize) -> Vec<u32> {
    debug_assert!(p.is_power_of_two(), "bracket size must be a power of two");
    if p <= 1 {
        return vec![1];
    }
    let size = p as u32;
    standard_seeding(p / 2)
        .into_iter()
        .flat_map(|seed| [seed, size + 1 - seed])
        .collect()
}
