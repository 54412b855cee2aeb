//! Production random source.

use rand::Rng;

use crate::infrastructure::ports::RandomPort;

/// Thread-local RNG behind the random port.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomPort for ThreadRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        rand::thread_rng().gen_range(min..=max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolls_stay_in_range() {
        let random = ThreadRandom;
        for _ in 0..100 {
            let roll = random.gen_range(1, 20);
            assert!((1..=20).contains(&roll));
        }
    }
}
