//! 随机种子生成器

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::Error;

const SEED_MODULUS: u128 = u64::MAX as u128;

/// 种子生成模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum SeedMode {
    /// 时间 + 计数器 + 随机高位
    Random,
    /// 基础种子递增
    Fixed,
}

impl SeedMode {
    pub fn choices() -> Vec<String> {
        SeedMode::iter().map(|v| v.to_string()).collect()
    }
}

/// 每次节点执行新建一个
#[derive(Debug)]
pub struct SeedGenerator {
    mode: SeedMode,
    base_seed: u64,
    counter: u64,
    last_time: u64,
    rng: ChaCha8Rng,
}

impl SeedGenerator {
    pub fn new(mode: SeedMode, base_seed: u64) -> Self {
        let mut rng = rand::rng();
        Self::with_rng(mode, base_seed, ChaCha8Rng::from_rng(&mut rng))
    }

    pub fn with_rng(mode: SeedMode, base_seed: u64, rng: ChaCha8Rng) -> Self {
        Self {
            mode,
            base_seed,
            counter: 0,
            last_time: unix_millis().unwrap_or_default(),
            rng,
        }
    }

    /// 生成下一个种子
    pub fn generate(&mut self) -> Result<u64, Error> {
        match self.mode {
            SeedMode::Random => Ok(self.generate_at(unix_millis()?)),
            SeedMode::Fixed => Ok(self.generate_at(self.last_time)),
        }
    }

    /// 以给定的毫秒时间戳生成种子, fixed 模式忽略时间
    pub fn generate_at(&mut self, now_ms: u64) -> u64 {
        match self.mode {
            SeedMode::Random => {
                if now_ms == self.last_time {
                    self.counter += 1;
                } else {
                    self.counter = 0;
                    self.last_time = now_ms;
                }
                let seed = (now_ms as u128 + self.counter as u128) % SEED_MODULUS;
                let high = (self.rng.random::<u32>() as u64) << 32;
                seed as u64 ^ high
            }
            SeedMode::Fixed => {
                self.counter += 1;
                ((self.base_seed as u128 + self.counter as u128) % SEED_MODULUS) as u64
            }
        }
    }
}

fn unix_millis() -> Result<u64, Error> {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH)?;
    Ok(elapsed.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(mode: SeedMode, base_seed: u64) -> SeedGenerator {
        SeedGenerator::with_rng(mode, base_seed, ChaCha8Rng::seed_from_u64(7))
    }

    #[test]
    fn test_fixed_mode_increments() -> anyhow::Result<()> {
        let mut seeds = generator(SeedMode::Fixed, 100);
        assert_eq!(seeds.generate()?, 101);
        assert_eq!(seeds.generate()?, 102);
        assert_eq!(seeds.generate()?, 103);
        Ok(())
    }

    #[test]
    fn test_fixed_mode_wraps_at_modulus() {
        let mut seeds = generator(SeedMode::Fixed, u64::MAX - 1);
        // (2^64 - 2 + 1) mod (2^64 - 1) = 0
        assert_eq!(seeds.generate_at(0), 0);
        assert_eq!(seeds.generate_at(0), 1);
    }

    #[test]
    fn test_random_mode_low_bits_follow_time() {
        let mut seeds = generator(SeedMode::Random, 0);
        seeds.last_time = 0;

        let now = 1_760_000_000_000u64;
        let first = seeds.generate_at(now);
        let second = seeds.generate_at(now);
        let later = seeds.generate_at(now + 5);

        let low = |seed: u64| seed & 0xffff_ffff;
        let expect_low = |v: u64| v & 0xffff_ffff;
        assert_eq!(low(first), expect_low(now));
        // 同一毫秒内计数器递增
        assert_eq!(low(second), expect_low(now + 1));
        // 时间变化后计数器归零
        assert_eq!(low(later), expect_low(now + 5));
    }

    #[test]
    fn test_random_mode_is_reproducible_with_seeded_rng() {
        let mut a = generator(SeedMode::Random, 0);
        let mut b = generator(SeedMode::Random, 0);
        a.last_time = 0;
        b.last_time = 0;
        let xs: Vec<u64> = (0..5).map(|i| a.generate_at(1000 + i)).collect();
        let ys: Vec<u64> = (0..5).map(|i| b.generate_at(1000 + i)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_seed_mode_parse() -> anyhow::Result<()> {
        assert_eq!("random".parse::<SeedMode>()?, SeedMode::Random);
        assert_eq!("fixed".parse::<SeedMode>()?, SeedMode::Fixed);
        assert!("other".parse::<SeedMode>().is_err());
        assert_eq!(SeedMode::choices(), vec!["random", "fixed"]);
        Ok(())
    }
}
