use std::fmt;

/// 块缓存错误类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    Uninitialized,                          // 缓存尚未创建
    AlreadyCreated,                         // 重复创建
    Disabled,                               // 缓存未启用（未创建或容量为 0）
    CapacityOutOfBounds(usize),             // 容量不在 [2, 4096]
    DuplicateKey { disk: u32, block: u32 }, // (disk, block) 已在缓存中
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "Cache has not been created"),
            Self::AlreadyCreated => write!(f, "Cache already exists"),
            Self::Disabled => write!(f, "Cache is disabled"),
            Self::CapacityOutOfBounds(n) => write!(
                f,
                "Cache capacity {} is outside [{}, {}]",
                n,
                super::CACHE_MIN_ENTRIES,
                super::CACHE_MAX_ENTRIES
            ),
            Self::DuplicateKey { disk, block } => write!(
                f,
                "Block (disk {}, block {}) is already cached",
                disk, block
            ),
        }
    }
}

impl std::error::Error for CacheError {}

pub type Result<T> = std::result::Result<T, CacheError>;
