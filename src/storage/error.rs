use std::fmt;

use crate::disk::{JbodCommand, JbodError};

/// 存储驱动错误类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    AlreadyMounted,
    AlreadyUnmounted,
    NotMounted,
    LengthTooLarge(u32),
    BadBuffer,
    OutOfRange {
        start: u32,
        len: u32,
    },
    PermissionDenied,
    /// 设备原语失败。`[start, start + transferred)` 已完成，其余部分状态不确定（不回滚）。
    Device {
        command: JbodCommand,
        source: JbodError,
        transferred: u32,
    },
}

impl DriverError {
    /// 传统的整数返回码
    pub fn code(&self) -> i32 {
        match self {
            Self::AlreadyMounted | Self::AlreadyUnmounted | Self::OutOfRange { .. } => -1,
            Self::LengthTooLarge(_) => -2,
            Self::NotMounted => -3,
            Self::BadBuffer | Self::Device { .. } => -4,
            Self::PermissionDenied => -5,
        }
    }

    /// 失败前已经完整传输的字节数
    pub fn transferred(&self) -> u32 {
        match self {
            Self::Device { transferred, .. } => *transferred,
            _ => 0,
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyMounted => write!(f, "Array is already mounted"),
            Self::AlreadyUnmounted => write!(f, "Array is not mounted, nothing to unmount"),
            Self::NotMounted => write!(f, "Array is not mounted"),
            Self::LengthTooLarge(len) => write!(
                f,
                "Transfer of {} bytes exceeds the {} byte limit",
                len,
                super::MAX_IO_SIZE
            ),
            Self::BadBuffer => write!(f, "Missing or undersized buffer"),
            Self::OutOfRange { start, len } => write!(
                f,
                "Range [{:#x}, +{}) is outside the linear address space",
                start, len
            ),
            Self::PermissionDenied => write!(f, "Write permission has not been granted"),
            Self::Device {
                command,
                source,
                transferred,
            } => write!(
                f,
                "Device {} failed after {} bytes: {} (jbod errno {})",
                command,
                transferred,
                source,
                source.code()
            ),
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Device { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DriverError>;
