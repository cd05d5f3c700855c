// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Property tests: ring arena slot allocation

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use std::collections::HashSet;
    use udp_probe::logging::RingArena;

    proptest! {
        /// **Property:** any `count` consecutive allocations are pairwise distinct.
        #[test]
        fn test_window_of_allocations_is_distinct(
            len_level in 0u32..8,
            count_level in 0u32..8,
            skip in 0usize..300,
        ) {
            let arena = RingArena::new(len_level, count_level).unwrap();
            let count = arena.slot_count();
            for _ in 0..skip {
                arena.get();
            }

            let indices: HashSet<usize> = (0..count).map(|_| arena.get().index()).collect();
            prop_assert_eq!(indices.len(), count);
            prop_assert_eq!(arena.sequence(), (skip + count) as u64);
        }

        /// **Property:** slot `i` is reused exactly `count` allocations later.
        #[test]
        fn test_slot_reuse_period(count_level in 0u32..6, n in 1usize..200) {
            let arena = RingArena::new(4, count_level).unwrap();
            let count = arena.slot_count();
            let indices: Vec<usize> = (0..n).map(|_| arena.get().index()).collect();

            for (seq, index) in indices.iter().enumerate() {
                prop_assert_eq!(*index, seq % count);
                prop_assert!(*index < count);
            }
        }
    }
}
