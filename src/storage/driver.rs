use log::{info, trace, warn};

use crate::{
    cache::{BlockCache, CacheError},
    disk::{
        Block, Jbod, JbodCommand, JbodOp, JBOD_BLOCK_SIZE, JBOD_DISK_SIZE, JBOD_NUM_DISKS,
        JBOD_TOTAL_SIZE,
    },
    storage::{
        error::{DriverError, Result},
        MAX_IO_SIZE,
    },
};

/// 线性地址分解后的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockAddr {
    pub disk: u32,
    pub block: u32,
    pub offset: u32,
}

impl BlockAddr {
    pub fn from_linear(addr: u32) -> Self {
        let disk_size = JBOD_DISK_SIZE as u32;
        let block_size = JBOD_BLOCK_SIZE as u32;
        Self {
            disk: addr / disk_size,
            block: (addr % disk_size) / block_size,
            offset: addr % block_size,
        }
    }

    /// 从该位置开始、不超过 `remaining` 的本块内字节数
    fn chunk_len(&self, remaining: u32) -> u32 {
        remaining.min(JBOD_BLOCK_SIZE as u32 - self.offset)
    }
}

/// 把 16 块磁盘呈现为一段 1MB 线性地址空间的存储驱动
///
/// 自己持有挂载状态和写权限；缓存启用时读路径先查缓存，写路径写穿（write-through）
/// 后同步更新缓存。
#[derive(Debug)]
pub struct StorageDriver<J: Jbod> {
    jbod: J,
    mounted: bool,
    write_permission: bool,
    cache: BlockCache,
}

impl<J: Jbod> StorageDriver<J> {
    #[cfg(test)]
    pub fn new(jbod: J) -> Self {
        Self::with_cache(jbod, BlockCache::new())
    }

    pub fn with_cache(jbod: J, cache: BlockCache) -> Self {
        Self {
            jbod,
            mounted: false,
            write_permission: false,
            cache,
        }
    }

    pub fn mount(&mut self) -> Result<()> {
        if self.mounted {
            return Err(DriverError::AlreadyMounted);
        }
        self.issue(JbodOp::bare(JbodCommand::Mount), None, 0)?;
        self.mounted = true;
        info!("array mounted");
        Ok(())
    }

    pub fn unmount(&mut self) -> Result<()> {
        if !self.mounted {
            return Err(DriverError::AlreadyUnmounted);
        }
        self.issue(JbodOp::bare(JbodCommand::Unmount), None, 0)?;
        self.mounted = false;
        info!("array unmounted");
        Ok(())
    }

    /// 重复授权不报错
    pub fn grant_write_permission(&mut self) {
        self.write_permission = true;
    }

    pub fn revoke_write_permission(&mut self) {
        self.write_permission = false;
    }

    /// 从 `start_addr` 读 `len` 字节到 `buf`，成功时返回 `len`。
    ///
    /// 中途设备失败时立即返回，已拷贝进 `buf` 的字节不回滚。
    pub fn read(&mut self, start_addr: u32, len: u32, buf: Option<&mut [u8]>) -> Result<u32> {
        if !self.mounted {
            return Err(DriverError::NotMounted);
        }
        if len > MAX_IO_SIZE {
            return Err(DriverError::LengthTooLarge(len));
        }
        let out: &mut [u8] = match buf {
            Some(buf) => buf,
            None if len == 0 => &mut [],
            None => return Err(DriverError::BadBuffer),
        };
        if out.len() < len as usize {
            return Err(DriverError::BadBuffer);
        }
        check_range(start_addr, len)?;

        let mut done = 0;
        while done < len {
            let addr = BlockAddr::from_linear(start_addr + done);
            let chunk = addr.chunk_len(len - done);
            trace!("read chunk {:?} len {}", addr, chunk);

            let mut block = [0u8; JBOD_BLOCK_SIZE];
            self.load_block(addr, &mut block, done)?;

            let (from, to) = (addr.offset as usize, (addr.offset + chunk) as usize);
            out[done as usize..(done + chunk) as usize].copy_from_slice(&block[from..to]);
            done += chunk;
        }
        Ok(len)
    }

    /// 把 `buf` 的前 `len` 字节写到 `start_addr`，成功时返回 `len`。
    ///
    /// 不足一整块的部分先读出原块再覆盖（read-modify-write）。
    pub fn write(&mut self, start_addr: u32, len: u32, buf: Option<&[u8]>) -> Result<u32> {
        if !self.mounted {
            return Err(DriverError::NotMounted);
        }
        if !self.write_permission {
            return Err(DriverError::PermissionDenied);
        }
        if len > MAX_IO_SIZE {
            return Err(DriverError::LengthTooLarge(len));
        }
        let data: &[u8] = match buf {
            Some(buf) => buf,
            None if len == 0 => &[],
            None => return Err(DriverError::BadBuffer),
        };
        if data.len() < len as usize {
            return Err(DriverError::BadBuffer);
        }
        if len == 0 {
            return Ok(0);
        }
        check_range(start_addr, len)?;

        let mut done = 0;
        while done < len {
            let addr = BlockAddr::from_linear(start_addr + done);
            let chunk = addr.chunk_len(len - done);
            trace!("write chunk {:?} len {}", addr, chunk);

            let mut block = [0u8; JBOD_BLOCK_SIZE];
            if chunk < JBOD_BLOCK_SIZE as u32 {
                self.load_block(addr, &mut block, done)?;
            }

            let (from, to) = (addr.offset as usize, (addr.offset + chunk) as usize);
            block[from..to].copy_from_slice(&data[done as usize..(done + chunk) as usize]);

            self.seek(addr, done)?;
            self.issue(
                JbodOp::bare(JbodCommand::WriteBlock),
                Some(&mut block),
                done,
            )?;
            self.remember(addr, &block);
            done += chunk;
        }
        Ok(len)
    }

    /// 让设备为 (disk, block) 计算签名
    pub fn sign_block(&mut self, disk: u8, block: u8) -> Result<()> {
        if !self.mounted {
            return Err(DriverError::NotMounted);
        }
        if disk as usize >= JBOD_NUM_DISKS {
            let start = disk as u32 * JBOD_DISK_SIZE as u32 + block as u32 * JBOD_BLOCK_SIZE as u32;
            return Err(DriverError::OutOfRange {
                start,
                len: JBOD_BLOCK_SIZE as u32,
            });
        }
        let addr = BlockAddr {
            disk: disk as u32,
            block: block as u32,
            offset: 0,
        };
        self.seek(addr, 0)?;
        self.issue(JbodOp::bare(JbodCommand::SignBlock), None, 0)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn has_write_permission(&self) -> bool {
        self.write_permission
    }

    pub fn cache(&self) -> &BlockCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut BlockCache {
        &mut self.cache
    }

    pub fn device(&self) -> &J {
        &self.jbod
    }

    #[cfg(test)]
    pub fn device_mut(&mut self) -> &mut J {
        &mut self.jbod
    }

    /// 取得整块内容：先查缓存，未命中再从设备读并放入缓存
    fn load_block(&mut self, addr: BlockAddr, block: &mut Block, done: u32) -> Result<()> {
        if let Ok(true) = self.cache.lookup(addr.disk, addr.block, block) {
            return Ok(());
        }
        self.seek(addr, done)?;
        self.issue(
            JbodOp::bare(JbodCommand::ReadBlock),
            Some(&mut *block),
            done,
        )?;
        self.remember(addr, block);
        Ok(())
    }

    fn seek(&mut self, addr: BlockAddr, done: u32) -> Result<()> {
        self.issue(
            JbodOp::new(JbodCommand::SeekToDisk, addr.disk as u8, 0),
            None,
            done,
        )?;
        self.issue(
            JbodOp::new(JbodCommand::SeekToBlock, 0, addr.block as u8),
            None,
            done,
        )
    }

    /// 缓存中保存该块最近一次读到或写入的内容
    fn remember(&mut self, addr: BlockAddr, block: &Block) {
        if self.cache.update(addr.disk, addr.block, block) {
            return;
        }
        match self.cache.insert(addr.disk, addr.block, block) {
            Ok(()) | Err(CacheError::Disabled) => {}
            Err(e) => warn!("cache insert for {:?} failed: {}", addr, e),
        }
    }

    fn issue(&mut self, op: JbodOp, block: Option<&mut Block>, done: u32) -> Result<()> {
        self.jbod.operation(op.encode(), block).map_err(|source| {
            warn!("{} failed after {} bytes: {}", op.cmd, done, source);
            DriverError::Device {
                command: op.cmd,
                source,
                transferred: done,
            }
        })
    }
}

/// `[start, start + len)` 必须落在地址空间内，且不能溢出
fn check_range(start: u32, len: u32) -> Result<()> {
    match start.checked_add(len) {
        Some(end) if end as usize <= JBOD_TOTAL_SIZE => Ok(()),
        _ => Err(DriverError::OutOfRange { start, len }),
    }
}
