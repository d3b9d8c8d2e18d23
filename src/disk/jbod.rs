use log::{debug, error};

use crate::disk::{
    block_device::BlockDevice,
    error::JbodError,
    op::{JbodCommand, JbodOp},
    signature::{Signature, SignatureTable},
    types::{flat_block_id, Block, JBOD_BLOCK_SIZE, JBOD_NUM_BLOCKS_PER_DISK, JBOD_NUM_DISKS},
};

/// 设备原语：执行一条编码后的 JBOD 操作
///
/// `block` 仅对 READ_BLOCK / WRITE_BLOCK 有意义，其余命令忽略。
pub trait Jbod {
    fn operation(&mut self, op: u32, block: Option<&mut Block>) -> Result<(), JbodError>;
}

const COMMAND_SLOTS: usize = JbodCommand::RevokeWritePermission as usize + 1;

/// 由若干磁盘拼成的模拟 JBOD 阵列
///
/// 维护当前选中的磁盘和块（游标），READ_BLOCK / WRITE_BLOCK 之后块游标自动后移一块。
#[derive(Debug)]
pub struct JbodArray<D: BlockDevice> {
    device: D,
    mounted: bool,
    write_permission: bool,
    current_disk: usize,
    current_block: usize,
    signatures: SignatureTable,
    counters: [u64; COMMAND_SLOTS],
}

impl<D: BlockDevice> JbodArray<D> {
    #[cfg(test)]
    pub fn new(device: D) -> Self {
        Self::with_signatures(device, SignatureTable::new())
    }

    pub fn with_signatures(device: D, signatures: SignatureTable) -> Self {
        Self {
            device,
            mounted: false,
            write_permission: false,
            current_disk: 0,
            current_block: 0,
            signatures,
            counters: [0; COMMAND_SLOTS],
        }
    }

    #[cfg(test)]
    pub fn device(&self) -> &D {
        &self.device
    }

    #[cfg(test)]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn signatures(&self) -> &SignatureTable {
        &self.signatures
    }

    pub fn signature(&self, disk: u8, block: u8) -> Option<&Signature> {
        self.signatures.get(disk, block)
    }

    /// 某条命令被执行（含失败）的次数
    pub fn count(&self, cmd: JbodCommand) -> u64 {
        self.counters[cmd as usize]
    }

    /// 游标所指块的扁平块号
    fn cursor(&self) -> Result<u64, JbodError> {
        if self.current_block >= JBOD_NUM_BLOCKS_PER_DISK {
            return Err(JbodError::BadBlockNum);
        }
        Ok(flat_block_id(self.current_disk, self.current_block))
    }

    fn execute(&mut self, op: JbodOp, block: Option<&mut Block>) -> Result<(), JbodError> {
        match op.cmd {
            JbodCommand::Mount => {
                if self.mounted {
                    return Err(JbodError::AlreadyMounted);
                }
                self.mounted = true;
            }
            JbodCommand::Unmount => {
                if !self.mounted {
                    return Err(JbodError::AlreadyUnmounted);
                }
                self.mounted = false;
            }
            _ if !self.mounted => return Err(JbodError::Unmounted),
            JbodCommand::SeekToDisk => {
                let disk = op.disk_id as usize;
                if disk >= JBOD_NUM_DISKS {
                    return Err(JbodError::BadDiskNum);
                }
                self.current_disk = disk;
            }
            JbodCommand::SeekToBlock => {
                let block = op.block_id as usize;
                if block >= JBOD_NUM_BLOCKS_PER_DISK {
                    return Err(JbodError::BadBlockNum);
                }
                self.current_block = block;
            }
            JbodCommand::ReadBlock => {
                let buf = block.ok_or(JbodError::BadRead)?;
                let id = self.cursor()?;
                self.device.read_block(id, buf).map_err(|e| {
                    error!("backing read of block {} failed: {}", id, e);
                    JbodError::BadRead
                })?;
                self.current_block += 1;
            }
            JbodCommand::WriteBlock => {
                let buf = block.ok_or(JbodError::BadWrite)?;
                let id = self.cursor()?;
                self.device.write_block(id, buf).map_err(|e| {
                    error!("backing write of block {} failed: {}", id, e);
                    JbodError::BadWrite
                })?;
                self.current_block += 1;
            }
            JbodCommand::SignBlock => {
                let id = self.cursor()?;
                let mut data = [0u8; JBOD_BLOCK_SIZE];
                self.device.read_block(id, &mut data).map_err(|e| {
                    error!("backing read of block {} for signing failed: {}", id, e);
                    JbodError::BadRead
                })?;
                self.signatures
                    .sign(self.current_disk as u8, self.current_block as u8, &data);
            }
            JbodCommand::WritePermission => {
                if self.write_permission {
                    return Err(JbodError::WritePermissionAlreadyGranted);
                }
                self.write_permission = true;
            }
            JbodCommand::RevokeWritePermission => {
                if !self.write_permission {
                    return Err(JbodError::WritePermissionAlreadyRevoked);
                }
                self.write_permission = false;
            }
            JbodCommand::Reserved => return Err(JbodError::BadCmd),
        }
        Ok(())
    }
}

impl<D: BlockDevice> Jbod for JbodArray<D> {
    fn operation(&mut self, op: u32, block: Option<&mut Block>) -> Result<(), JbodError> {
        let op = JbodOp::decode(op)?;
        self.counters[op.cmd as usize] += 1;
        let result = self.execute(op, block);
        if let Err(e) = result {
            debug!(
                "{} (disk {}, block {}) failed: {}",
                op.cmd, op.disk_id, op.block_id, e
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::mem_disk::MemDisk;

    fn run(
        jbod: &mut JbodArray<MemDisk>,
        cmd: JbodCommand,
        disk: u8,
        block: u8,
    ) -> Result<(), JbodError> {
        jbod.operation(JbodOp::new(cmd, disk, block).encode(), None)
    }

    fn mounted() -> JbodArray<MemDisk> {
        let mut jbod = JbodArray::new(MemDisk::new());
        run(&mut jbod, JbodCommand::Mount, 0, 0).unwrap();
        jbod
    }

    #[test]
    fn mount_state_machine() {
        let mut jbod = JbodArray::new(MemDisk::new());
        assert_eq!(
            run(&mut jbod, JbodCommand::SeekToDisk, 1, 0),
            Err(JbodError::Unmounted)
        );
        assert_eq!(
            run(&mut jbod, JbodCommand::Unmount, 0, 0),
            Err(JbodError::AlreadyUnmounted)
        );
        run(&mut jbod, JbodCommand::Mount, 0, 0).unwrap();
        assert_eq!(
            run(&mut jbod, JbodCommand::Mount, 0, 0),
            Err(JbodError::AlreadyMounted)
        );
        run(&mut jbod, JbodCommand::Unmount, 0, 0).unwrap();
        assert!(!jbod.is_mounted());
    }

    #[test]
    fn write_lands_on_selected_disk_and_block() {
        let mut jbod = mounted();
        run(&mut jbod, JbodCommand::SeekToDisk, 3, 0).unwrap();
        run(&mut jbod, JbodCommand::SeekToBlock, 0, 7).unwrap();
        let mut buf = [0x5Au8; JBOD_BLOCK_SIZE];
        jbod.operation(
            JbodOp::bare(JbodCommand::WriteBlock).encode(),
            Some(&mut buf),
        )
        .unwrap();

        let offset = 3 * 65536 + 7 * 256;
        assert_eq!(jbod.device().read_raw(offset, 256), &[0x5A; 256][..]);
        assert_eq!(jbod.device().read_raw(offset + 256, 1), &[0][..]);
    }

    #[test]
    fn read_advances_block_cursor() {
        let mut jbod = mounted();
        let mut buf = [1u8; JBOD_BLOCK_SIZE];
        run(&mut jbod, JbodCommand::SeekToBlock, 0, 255).unwrap();
        jbod.operation(
            JbodOp::bare(JbodCommand::WriteBlock).encode(),
            Some(&mut buf),
        )
        .unwrap();
        assert_eq!(
            jbod.operation(
                JbodOp::bare(JbodCommand::ReadBlock).encode(),
                Some(&mut buf),
            ),
            Err(JbodError::BadBlockNum)
        );
    }

    #[test]
    fn transfer_without_buffer_fails() {
        let mut jbod = mounted();
        assert_eq!(
            run(&mut jbod, JbodCommand::ReadBlock, 0, 0),
            Err(JbodError::BadRead)
        );
        assert_eq!(
            run(&mut jbod, JbodCommand::WriteBlock, 0, 0),
            Err(JbodError::BadWrite)
        );
    }

    #[test]
    fn permission_toggles_report_redundancy() {
        let mut jbod = mounted();
        assert_eq!(
            run(&mut jbod, JbodCommand::RevokeWritePermission, 0, 0),
            Err(JbodError::WritePermissionAlreadyRevoked)
        );
        run(&mut jbod, JbodCommand::WritePermission, 0, 0).unwrap();
        assert_eq!(
            run(&mut jbod, JbodCommand::WritePermission, 0, 0),
            Err(JbodError::WritePermissionAlreadyGranted)
        );
        run(&mut jbod, JbodCommand::RevokeWritePermission, 0, 0).unwrap();
    }

    #[test]
    fn sign_records_digest_for_current_block() {
        let mut jbod = mounted();
        run(&mut jbod, JbodCommand::SeekToDisk, 2, 0).unwrap();
        run(&mut jbod, JbodCommand::SeekToBlock, 0, 9).unwrap();
        run(&mut jbod, JbodCommand::SignBlock, 0, 0).unwrap();
        assert!(jbod.signature(2, 9).is_some());
        assert!(jbod.signature(2, 10).is_none());
    }

    #[test]
    fn reserved_and_unknown_commands_fail() {
        let mut jbod = mounted();
        assert_eq!(
            run(&mut jbod, JbodCommand::Reserved, 0, 0),
            Err(JbodError::BadCmd)
        );
        assert_eq!(jbod.operation(0xF000, None), Err(JbodError::BadCmd));
    }

    #[test]
    fn counters_track_commands() {
        let mut jbod = mounted();
        run(&mut jbod, JbodCommand::SeekToDisk, 1, 0).unwrap();
        run(&mut jbod, JbodCommand::SeekToDisk, 2, 0).unwrap();
        assert_eq!(jbod.count(JbodCommand::Mount), 1);
        assert_eq!(jbod.count(JbodCommand::SeekToDisk), 2);
        assert_eq!(jbod.count(JbodCommand::ReadBlock), 0);
    }
}
