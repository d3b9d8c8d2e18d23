//! 全相联的设备块缓存
//!
//! 槽位数组 + 线性扫描，容量上限 4096，不引入额外索引。每次命中、更新、插入都把
//! 全局时钟加一并写入该槽位的 `clock_accesses`。

mod error;


use std::{fmt, str::FromStr};

use log::{debug, trace};

use crate::disk::types::{Block, JBOD_BLOCK_SIZE};

pub use error::{CacheError, Result};

pub const CACHE_MIN_ENTRIES: usize = 2;
pub const CACHE_MAX_ENTRIES: usize = 4096;

/// 缓存满时的替换策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// 替换 `clock_accesses` 最大（最近一次被访问）的槽位
    #[default]
    MostRecent,
    /// 替换 `clock_accesses` 最小的槽位（真正的 LRU）
    LeastRecent,
}

impl FromStr for EvictionPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mru" => Ok(Self::MostRecent),
            "lru" => Ok(Self::LeastRecent),
            other => Err(format!("unknown eviction policy '{}'", other)),
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MostRecent => f.write_str("mru"),
            Self::LeastRecent => f.write_str("lru"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub valid: bool,
    pub disk_num: u32,
    pub block_num: u32,
    pub block: Block,
    pub clock_accesses: u64,
}

impl CacheEntry {
    fn empty() -> Self {
        Self {
            valid: false,
            disk_num: 0,
            block_num: 0,
            block: [0; JBOD_BLOCK_SIZE],
            clock_accesses: 0,
        }
    }

    fn holds(&self, disk_num: u32, block_num: u32) -> bool {
        self.valid && self.disk_num == disk_num && self.block_num == block_num
    }
}

/// 命中统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub queries: u64,
}

impl CacheStats {
    /// 命中率（百分比），尚无查询时为 `None`
    pub fn hit_rate(&self) -> Option<f64> {
        if self.queries == 0 {
            return None;
        }
        Some(100.0 * self.hits as f64 / self.queries as f64)
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "num_hits: {}, num_queries: {}", self.hits, self.queries)?;
        match self.hit_rate() {
            Some(rate) => write!(f, "Hit rate: {:5.1}%", rate),
            None => write!(f, "Hit rate: N/A"),
        }
    }
}

#[derive(Debug, Default)]
pub struct BlockCache {
    entries: Vec<CacheEntry>, // 为空表示未创建
    clock: u64,
    num_queries: u64,
    num_hits: u64,
    policy: EvictionPolicy,
}

impl BlockCache {
    /// 未创建（禁用）状态的缓存
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: EvictionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn create(&mut self, num_entries: usize) -> Result<()> {
        if self.is_enabled() {
            return Err(CacheError::AlreadyCreated);
        }
        check_capacity(num_entries)?;

        self.entries = vec![CacheEntry::empty(); num_entries];
        self.clock = 0;
        debug!(
            "block cache created with {} entries ({})",
            num_entries, self.policy
        );
        Ok(())
    }

    /// 释放所有槽位，并清零时钟和命中统计
    pub fn destroy(&mut self) -> Result<()> {
        if !self.is_enabled() {
            return Err(CacheError::Uninitialized);
        }
        self.entries = Vec::new();
        self.clock = 0;
        self.num_queries = 0;
        self.num_hits = 0;
        debug!("block cache destroyed");
        Ok(())
    }

    /// 查询 (disk, block)。命中时把块内容拷贝进 `buf` 并返回 `Ok(true)`。
    ///
    /// 只有缓存启用时才计入查询次数。
    pub fn lookup(&mut self, disk_num: u32, block_num: u32, buf: &mut Block) -> Result<bool> {
        if !self.is_enabled() {
            return Err(CacheError::Disabled);
        }
        self.num_queries += 1;

        let Some(index) = self.find(disk_num, block_num) else {
            return Ok(false);
        };
        buf.copy_from_slice(&self.entries[index].block);
        self.num_hits += 1;
        let stamp = self.tick();
        self.entries[index].clock_accesses = stamp;
        Ok(true)
    }

    /// 覆盖已缓存块的内容；不存在时什么也不做。返回是否发生了更新。
    pub fn update(&mut self, disk_num: u32, block_num: u32, data: &Block) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let Some(index) = self.find(disk_num, block_num) else {
            return false;
        };
        let stamp = self.tick();
        let entry = &mut self.entries[index];
        entry.block.copy_from_slice(data);
        entry.clock_accesses = stamp;
        true
    }

    pub fn insert(&mut self, disk_num: u32, block_num: u32, data: &Block) -> Result<()> {
        if !self.is_enabled() {
            return Err(CacheError::Disabled);
        }
        if self.find(disk_num, block_num).is_some() {
            return Err(CacheError::DuplicateKey {
                disk: disk_num,
                block: block_num,
            });
        }

        let index = match self.find_invalid() {
            Some(index) => index,
            None => {
                let victim = self.find_victim().ok_or(CacheError::Disabled)?;
                let old = &self.entries[victim];
                trace!(
                    "evicting (disk {}, block {}) from slot {}",
                    old.disk_num,
                    old.block_num,
                    victim
                );
                victim
            }
        };

        let stamp = self.tick();
        let entry = &mut self.entries[index];
        entry.valid = true;
        entry.disk_num = disk_num;
        entry.block_num = block_num;
        entry.block.copy_from_slice(data);
        entry.clock_accesses = stamp;
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        !self.entries.is_empty()
    }

    /// 把命中统计写到标准错误（诊断输出）
    pub fn print_hit_rate(&self) {
        eprintln!("{}", self.stats());
    }

    /// 调整容量：保留前 `min(new, old)` 个槽位的原样内容，其余丢弃。
    /// 时钟与统计不清零；未创建时等同于 `create`。
    pub fn resize(&mut self, new_entries: usize) -> Result<()> {
        check_capacity(new_entries)?;
        if !self.is_enabled() {
            return self.create(new_entries);
        }

        let mut entries = vec![CacheEntry::empty(); new_entries];
        let keep = new_entries.min(self.entries.len());
        entries[..keep].clone_from_slice(&self.entries[..keep]);

        debug!(
            "block cache resized from {} to {} entries",
            self.entries.len(),
            new_entries
        );
        self.entries = entries;
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// 有效槽位数
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.valid).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    #[cfg(test)]
    pub fn entry(&self, index: usize) -> Option<&CacheEntry> {
        self.entries.get(index)
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.num_hits,
            queries: self.num_queries,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn find(&self, disk_num: u32, block_num: u32) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.holds(disk_num, block_num))
    }

    fn find_invalid(&self) -> Option<usize> {
        self.entries.iter().position(|e| !e.valid)
    }

    /// 在有效槽位中按策略挑选被替换者；时钟相同时取下标最小的
    fn find_victim(&self) -> Option<usize> {
        let mut victim: Option<(usize, u64)> = None;
        for (index, entry) in self.entries.iter().enumerate().filter(|(_, e)| e.valid) {
            let better = match (victim, self.policy) {
                (None, _) => true,
                (Some((_, best)), EvictionPolicy::MostRecent) => entry.clock_accesses > best,
                (Some((_, best)), EvictionPolicy::LeastRecent) => entry.clock_accesses < best,
            };
            if better {
                victim = Some((index, entry.clock_accesses));
            }
        }
        victim.map(|(index, _)| index)
    }
}

fn check_capacity(num_entries: usize) -> Result<()> {
    if !(CACHE_MIN_ENTRIES..=CACHE_MAX_ENTRIES).contains(&num_entries) {
        return Err(CacheError::CapacityOutOfBounds(num_entries));
    }
    Ok(())
}
