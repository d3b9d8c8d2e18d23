use std::fmt;

use crate::disk::error::JbodError;

/// JBOD 设备命令码
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JbodCommand {
    Mount = 0x00,
    Unmount = 0x01,
    SeekToDisk = 0x02,
    SeekToBlock = 0x03,
    ReadBlock = 0x04,
    WriteBlock = 0x05,
    SignBlock = 0x06,
    Reserved = 0x07,
    WritePermission = 0x08,
    RevokeWritePermission = 0x09,
}

impl TryFrom<u32> for JbodCommand {
    type Error = JbodError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Ok(match code {
            0x00 => Self::Mount,
            0x01 => Self::Unmount,
            0x02 => Self::SeekToDisk,
            0x03 => Self::SeekToBlock,
            0x04 => Self::ReadBlock,
            0x05 => Self::WriteBlock,
            0x06 => Self::SignBlock,
            0x07 => Self::Reserved,
            0x08 => Self::WritePermission,
            0x09 => Self::RevokeWritePermission,
            _ => return Err(JbodError::BadCmd),
        })
    }
}

impl fmt::Display for JbodCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mount => "MOUNT",
            Self::Unmount => "UNMOUNT",
            Self::SeekToDisk => "SEEK_TO_DISK",
            Self::SeekToBlock => "SEEK_TO_BLOCK",
            Self::ReadBlock => "READ_BLOCK",
            Self::WriteBlock => "WRITE_BLOCK",
            Self::SignBlock => "SIGN_BLOCK",
            Self::Reserved => "RESERVED",
            Self::WritePermission => "WRITE_PERMISSION",
            Self::RevokeWritePermission => "REVOKE_WRITE_PERMISSION",
        };
        f.write_str(name)
    }
}

/// 编码后的单条 JBOD 操作
///
/// 布局：`[31..12] 命令 | [11..4] 块号 | [3..0] 磁盘号`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JbodOp {
    pub cmd: JbodCommand,
    pub disk_id: u8,
    pub block_id: u8,
}

impl JbodOp {
    pub fn new(cmd: JbodCommand, disk_id: u8, block_id: u8) -> Self {
        Self {
            cmd,
            disk_id: disk_id & 0x0F,
            block_id,
        }
    }

    /// 不带参数的命令（mount、read 等）
    pub fn bare(cmd: JbodCommand) -> Self {
        Self::new(cmd, 0, 0)
    }

    pub fn encode(self) -> u32 {
        ((self.cmd as u32) << 12) | ((self.block_id as u32) << 4) | self.disk_id as u32
    }

    pub fn decode(op: u32) -> Result<Self, JbodError> {
        let cmd = JbodCommand::try_from(op >> 12)?;
        Ok(Self {
            cmd,
            disk_id: (op & 0x0F) as u8,
            block_id: ((op >> 4) & 0xFF) as u8,
        })
    }
}

impl From<JbodOp> for u32 {
    fn from(op: JbodOp) -> Self {
        op.encode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_fields_into_their_bit_ranges() {
        let op = JbodOp::new(JbodCommand::SeekToBlock, 0x0A, 0xC3);
        assert_eq!(op.encode(), 0x3C3A);
        assert_eq!(JbodOp::decode(0x3C3A).unwrap(), op);
    }

    #[test]
    fn disk_id_is_masked_to_four_bits() {
        let op = JbodOp::new(JbodCommand::SeekToDisk, 0x1F, 0);
        assert_eq!(op.disk_id, 0x0F);
    }

    #[test]
    fn unknown_command_code_is_rejected() {
        assert_eq!(JbodOp::decode(0x0A << 12), Err(JbodError::BadCmd));
        assert_eq!(
            JbodOp::decode(0x07 << 12).unwrap().cmd,
            JbodCommand::Reserved
        );
    }
}
