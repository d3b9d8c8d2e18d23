mod driver;
mod error;


pub use driver::StorageDriver;
pub use error::DriverError;

/// 单次 read / write 的最大字节数
pub const MAX_IO_SIZE: u32 = 1024;
