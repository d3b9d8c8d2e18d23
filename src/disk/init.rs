use std::sync::mpsc::Sender;

use crate::{
    cache::BlockCache,
    config::Config,
    disk::{file_disk::FileDisk, jbod::JbodArray, signature::SignatureTable},
    shell::BootProgress,
    storage::StorageDriver,
};

/// 在后台线程中打开磁盘镜像、加载签名、建立缓存，进度通过 `tx` 回报
pub fn perform_disk_initialization(config: Config, tx: Sender<BootProgress>) {
    let _ = tx.send(BootProgress::Step("🧠 Opening disk image..."));

    let disk = match FileDisk::new(&config.disk_path, &tx) {
        Ok(d) => d,
        Err(e) => {
            let _ = tx.send(BootProgress::Finished(Err(Box::new(e))));
            return;
        }
    };

    let _ = tx.send(BootProgress::Step("🔏 Loading block signatures..."));
    let signatures = match SignatureTable::load(&SignatureTable::sidecar_path(&config.disk_path)) {
        Ok(s) => s,
        Err(e) => {
            let _ = tx.send(BootProgress::Finished(Err(Box::new(e))));
            return;
        }
    };
    let _ = tx.send(BootProgress::Progress(70));

    let mut cache = BlockCache::with_policy(config.eviction);
    if let Some(entries) = config.cache_entries {
        let _ = tx.send(BootProgress::Step("⚙️  Building block cache..."));
        if let Err(e) = cache.create(entries) {
            let _ = tx.send(BootProgress::Finished(Err(Box::new(e))));
            return;
        }
    }

    let driver = StorageDriver::with_cache(JbodArray::with_signatures(disk, signatures), cache);
    let _ = tx.send(BootProgress::Progress(100));
    let _ = tx.send(BootProgress::Finished(Ok(driver)));
}
