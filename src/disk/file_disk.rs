use std::{
    fs::{File, OpenOptions},
    io::{Read, Result, Seek, SeekFrom, Write},
    path::Path,
    sync::mpsc::Sender,
};

use crate::{
    disk::{
        block_device::BlockDevice,
        types::{Block, JBOD_BLOCK_SIZE, JBOD_TOTAL_SIZE},
    },
    shell::BootProgress,
};

/// 以单个镜像文件（1MB）作为整个阵列的存储介质
#[derive(Debug)]
pub struct FileDisk {
    file: File,
}

impl FileDisk {
    pub fn new(path: &Path, tx: &Sender<BootProgress>) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        if file.metadata()?.len() < JBOD_TOTAL_SIZE as u64 {
            let _ = tx.send(BootProgress::Step("🪶 Allocating disk image..."));
            file.set_len(JBOD_TOTAL_SIZE as u64)?;
        }
        let _ = tx.send(BootProgress::Progress(40));

        Ok(Self { file })
    }

    fn seek_to(&mut self, block_id: u64) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(block_id * JBOD_BLOCK_SIZE as u64))?;
        Ok(())
    }
}

impl BlockDevice for FileDisk {
    fn read_block(&mut self, block_id: u64, buf: &mut Block) -> Result<()> {
        self.seek_to(block_id)?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    fn write_block(&mut self, block_id: u64, buf: &Block) -> Result<()> {
        self.seek_to(block_id)?;
        self.file.write_all(buf)?;
        Ok(())
    }
}
