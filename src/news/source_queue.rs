//! 新闻源轮换队列

use std::collections::{HashSet, VecDeque};

use rand::{
    seq::{IndexedRandom, SliceRandom},
    Rng,
};

/// 目录在队列中的重复次数
pub const SOURCE_REPLICAS: usize = 3;

/// 每轮请求使用的新闻源数量
pub const SOURCES_PER_ROUND: usize = 5;

/// 打乱后的新闻源队列, 单次调用内不放回地消费
///
/// 出队过的新闻源标记为已使用, 不会再次从队列中取出;
/// 队列耗尽后从目录中随机补足, 补足的部分可能包含已使用的新闻源.
#[derive(Debug, Clone)]
pub struct SourceQueue {
    catalog: Vec<&'static str>,
    queue: VecDeque<&'static str>,
    used: HashSet<&'static str>,
}

impl SourceQueue {
    pub fn new<R: Rng + ?Sized>(catalog: &[&'static str], replicas: usize, rng: &mut R) -> Self {
        let mut entries: Vec<&'static str> = catalog
            .iter()
            .copied()
            .cycle()
            .take(catalog.len() * replicas)
            .collect();
        entries.shuffle(rng);

        Self {
            catalog: catalog.to_vec(),
            queue: entries.into(),
            used: HashSet::new(),
        }
    }

    /// 取出最多 `count` 个不重复的新闻源
    pub fn next_sources<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> Vec<&'static str> {
        let mut selected = Vec::with_capacity(count);
        while selected.len() < count {
            let Some(source) = self.queue.pop_front() else {
                break;
            };
            if self.used.insert(source) {
                selected.push(source);
            }
        }

        if selected.len() < count {
            let candidates: Vec<&'static str> = self
                .catalog
                .iter()
                .copied()
                .filter(|s| !selected.contains(s))
                .collect();
            let needed = count - selected.len();
            selected.extend(candidates.choose_multiple(rng, needed).copied());
        }

        selected
    }

    #[cfg(test)]
    pub fn is_used(&self, source: &str) -> bool {
        self.used.contains(source)
    }

    /// 队列中剩余的条目数
    #[cfg(test)]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}
