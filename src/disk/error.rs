use std::fmt;

/// JBOD 设备原语返回的错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JbodError {
    Unmounted,
    AlreadyMounted,
    AlreadyUnmounted,
    CacheLoadFail,
    CacheWriteFail,
    BadCmd,
    BadDiskNum,
    BadBlockNum,
    BadRead,
    BadWrite,
    WritePermissionAlreadyGranted,
    WritePermissionAlreadyRevoked,
}

impl JbodError {
    /// 设备侧的错误号（0 表示成功，不在此枚举中）
    pub fn code(self) -> i32 {
        match self {
            Self::Unmounted => 1,
            Self::AlreadyMounted => 2,
            Self::AlreadyUnmounted => 3,
            Self::CacheLoadFail => 4,
            Self::CacheWriteFail => 5,
            Self::BadCmd => 6,
            Self::BadDiskNum => 7,
            Self::BadBlockNum => 8,
            Self::BadRead => 9,
            Self::BadWrite => 10,
            Self::WritePermissionAlreadyGranted => 11,
            Self::WritePermissionAlreadyRevoked => 12,
        }
    }
}

impl fmt::Display for JbodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unmounted => write!(f, "JBOD is not mounted"),
            Self::AlreadyMounted => write!(f, "JBOD is already mounted"),
            Self::AlreadyUnmounted => write!(f, "JBOD is already unmounted"),
            Self::CacheLoadFail => write!(f, "Failed to load block cache"),
            Self::CacheWriteFail => write!(f, "Failed to write block cache"),
            Self::BadCmd => write!(f, "Invalid JBOD command"),
            Self::BadDiskNum => write!(f, "Invalid disk number"),
            Self::BadBlockNum => write!(f, "Invalid block number"),
            Self::BadRead => write!(f, "Block read failed"),
            Self::BadWrite => write!(f, "Block write failed"),
            Self::WritePermissionAlreadyGranted => write!(f, "Write permission already granted"),
            Self::WritePermissionAlreadyRevoked => write!(f, "Write permission already revoked"),
        }
    }
}

impl std::error::Error for JbodError {}
