use std::io::Result;

use crate::disk::types::Block;

/// 阵列底层的存储介质，按扁平块号读写 256 字节的块
pub trait BlockDevice {
    fn read_block(&mut self, block_id: u64, buf: &mut Block) -> Result<()>;
    fn write_block(&mut self, block_id: u64, buf: &Block) -> Result<()>;
}
