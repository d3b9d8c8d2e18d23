/// 磁盘阵列中的磁盘数量
pub const JBOD_NUM_DISKS: usize = 16;

/// 每块磁盘的大小：256 块 * 256 字节 = 64KB
pub const JBOD_DISK_SIZE: usize = 65536;

/// 每个块（Block）的大小：256 字节
/// 设备以“块”为最小读写单位。
pub const JBOD_BLOCK_SIZE: usize = 256;

/// 每块磁盘包含的块数
pub const JBOD_NUM_BLOCKS_PER_DISK: usize = JBOD_DISK_SIZE / JBOD_BLOCK_SIZE;

/// 线性地址空间总大小（字节）：16 * 64KB = 1MB
pub const JBOD_TOTAL_SIZE: usize = JBOD_NUM_DISKS * JBOD_DISK_SIZE;

/// 一个设备块（256 字节）
pub type Block = [u8; JBOD_BLOCK_SIZE];

/// (disk, block) 在整个阵列中的扁平块号
pub fn flat_block_id(disk: usize, block: usize) -> u64 {
    (disk * JBOD_NUM_BLOCKS_PER_DISK + block) as u64
}
