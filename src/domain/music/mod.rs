//! Music Context - 音乐文件限界上下文
//!
//! 职责:
//! - 上传文件的格式、大小校验
//! - 音乐文件元数据与存储位置

mod aggregate;
mod errors;
mod policy;
mod value_objects;

pub use aggregate::MusicFile;
pub use errors::UploadError;
pub use policy::{extension_of, UploadPolicy, LIBRARY_EXTENSIONS, SESSION_EXTENSIONS};
pub use value_objects::{AudioFormat, MusicFileId, StorageLocation};
