use std::io::{Error, ErrorKind, Result};

use crate::disk::{
    block_device::BlockDevice,
    types::{Block, JBOD_BLOCK_SIZE, JBOD_TOTAL_SIZE},
};

/// 纯内存的块设备，测试时替代磁盘镜像文件
#[derive(Debug)]
pub struct MemDisk {
    data: Vec<u8>,
}

impl MemDisk {
    pub fn new() -> Self {
        Self {
            data: vec![0u8; JBOD_TOTAL_SIZE],
        }
    }

    /// 直接读取原始字节（绕过 JBOD 命令，用于测试校验）
    pub fn read_raw(&self, offset: usize, len: usize) -> &[u8] {
        &self.data[offset..offset + len]
    }

    fn range(&self, block_id: u64) -> Result<std::ops::Range<usize>> {
        let start = block_id as usize * JBOD_BLOCK_SIZE;
        if start + JBOD_BLOCK_SIZE > self.data.len() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("block {} out of range", block_id),
            ));
        }
        Ok(start..start + JBOD_BLOCK_SIZE)
    }
}

impl Default for MemDisk {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockDevice for MemDisk {
    fn read_block(&mut self, block_id: u64, buf: &mut Block) -> Result<()> {
        let range = self.range(block_id)?;
        buf.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn write_block(&mut self, block_id: u64, buf: &Block) -> Result<()> {
        let range = self.range(block_id)?;
        self.data[range].copy_from_slice(buf);
        Ok(())
    }
}
