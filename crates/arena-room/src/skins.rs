//! Cosmetic skin assignment.
//!
//! Skins are shuffled once when the room is created and dealt out in that
//! order. A leaving player's skin goes to the back of the queue. When the
//! pool runs dry, new players get no skin; nothing else depends on it.

use rand::Rng;
use rand::seq::SliceRandom;

/// A shuffled queue of skin indices `0..count`.
#[derive(Debug, Clone, Default)]
pub struct SkinPool {
    // Dealt from the end.
    available: Vec<usize>,
}

impl SkinPool {
    /// Shuffles `0..count` with the given RNG.
    pub fn shuffled<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let mut available: Vec<usize> = (0..count).collect();
        available.shuffle(rng);
        Self { available }
    }

    /// Deals the next skin, if any are left.
    pub fn take(&mut self) -> Option<usize> {
        self.available.pop()
    }

    /// Returns a skin to the pool. It is dealt again only after every
    /// skin currently waiting.
    pub fn give_back(&mut self, skin: usize) {
        if !self.available.contains(&skin) {
            self.available.insert(0, skin);
        }
    }

    /// Number of skins waiting to be dealt.
    pub fn remaining(&self) -> usize {
        self.available.len()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn pool(count: usize) -> SkinPool {
        SkinPool::shuffled(count, &mut StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_take_deals_every_skin_exactly_once() {
        let mut skins = pool(6);

        let dealt: HashSet<usize> = std::iter::from_fn(|| skins.take()).collect();

        assert_eq!(dealt, (0..6).collect::<HashSet<_>>());
        assert_eq!(skins.take(), None);
    }

    #[test]
    fn test_same_seed_deals_same_order() {
        let mut a = pool(10);
        let mut b = pool(10);
        for _ in 0..10 {
            assert_eq!(a.take(), b.take());
        }
    }

    #[test]
    fn test_give_back_goes_to_end_of_queue() {
        let mut skins = pool(3);
        let first = skins.take().unwrap();

        skins.give_back(first);

        assert_eq!(skins.remaining(), 3);
        assert_ne!(skins.take(), Some(first));
        assert_ne!(skins.take(), Some(first));
        assert_eq!(skins.take(), Some(first));
    }

    #[test]
    fn test_give_back_duplicate_is_ignored() {
        let mut skins = pool(2);
        let skin = skins.take().unwrap();
        skins.give_back(skin);
        skins.give_back(skin);
        assert_eq!(skins.remaining(), 2);
    }

    #[test]
    fn test_empty_pool_deals_nothing() {
        let mut skins = pool(0);
        assert_eq!(skins.take(), None);
    }
}
