pub mod block_device;
pub mod error;
pub mod file_disk;
pub mod init;
pub mod jbod;
#[cfg(test)]
pub mod mem_disk;
pub mod op;
pub mod signature;
pub mod types;

pub use error::JbodError;
pub use file_disk::FileDisk;
pub use jbod::{Jbod, JbodArray};
pub use op::{JbodCommand, JbodOp};
pub use signature::SignatureTable;
pub use types::*;
