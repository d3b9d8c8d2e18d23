use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Error, ErrorKind, Result},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::disk::types::Block;

pub type Signature = [u8; 32];

/// SIGN_BLOCK 产生的块签名表，key 为 (disk, block)
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureTable {
    entries: BTreeMap<(u8, u8), Signature>,
}

impl SignatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign(&mut self, disk: u8, block: u8, data: &Block) -> Signature {
        let digest: Signature = Sha256::digest(data).into();
        self.entries.insert((disk, block), digest);
        digest
    }

    pub fn get(&self, disk: u8, block: u8) -> Option<&Signature> {
        self.entries.get(&(disk, block))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 镜像文件旁的签名文件路径：`<image>.sig`
    pub fn sidecar_path(image: &Path) -> PathBuf {
        let mut name = image.as_os_str().to_owned();
        name.push(".sig");
        PathBuf::from(name)
    }

    /// 加载签名文件；文件不存在时返回空表
    pub fn load(path: &Path) -> Result<Self> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(e),
        };
        bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| Error::new(ErrorKind::InvalidData, e))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        bincode::serialize_into(BufWriter::new(file), self)
            .map_err(|e| Error::new(ErrorKind::Other, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_tracks_block_contents() {
        let mut table = SignatureTable::new();
        let a = table.sign(1, 2, &[0u8; 256]);
        let b = table.sign(1, 3, &[1u8; 256]);
        assert_ne!(a, b);
        assert_eq!(table.get(1, 2), Some(&a));
        assert_eq!(table.get(2, 1), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn sidecar_round_trip() {
        let image = std::env::temp_dir().join(format!("jbod-{}.img", uuid::Uuid::new_v4()));
        let path = SignatureTable::sidecar_path(&image);
        assert!(path.to_string_lossy().ends_with(".img.sig"));
        assert!(SignatureTable::load(&path).unwrap().is_empty());

        let mut table = SignatureTable::new();
        table.sign(15, 255, &[7u8; 256]);
        table.save(&path).unwrap();
        assert_eq!(SignatureTable::load(&path).unwrap(), table);

        std::fs::remove_file(&path).unwrap();
    }
}
