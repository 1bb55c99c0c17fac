//! 上传策略
//!
//! 不变量:
//! - 校验全部在持久化之前完成
//! - 扩展名取文件名最后一个 `.` 之后的部分（小写）

use super::{AudioFormat, UploadError};

/// 会话上传允许的扩展名
pub const SESSION_EXTENSIONS: &[AudioFormat] = &[
    AudioFormat::Mp3,
    AudioFormat::Wav,
    AudioFormat::Flac,
    AudioFormat::Aac,
    AudioFormat::Ogg,
];

/// 音乐库上传允许的扩展名
pub const LIBRARY_EXTENSIONS: &[AudioFormat] = &[
    AudioFormat::Mp3,
    AudioFormat::Wav,
    AudioFormat::Flac,
    AudioFormat::Aac,
];

const MIB: u64 = 1024 * 1024;

/// 取文件名的扩展名（小写）
///
/// 没有 `.` 时返回整个文件名，随后会被格式校验拒绝
pub fn extension_of(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// 上传校验策略
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    allowed: &'static [AudioFormat],
    max_file_bytes: u64,
    /// Base64 编码后的上限，仅会话内联存储使用
    max_encoded_bytes: Option<u64>,
}

impl UploadPolicy {
    /// 会话内联存储（Base64）
    pub fn session_inline(max_file_bytes: u64, max_encoded_bytes: u64) -> Self {
        Self {
            allowed: SESSION_EXTENSIONS,
            max_file_bytes,
            max_encoded_bytes: Some(max_encoded_bytes),
        }
    }

    /// 会话文件系统存储
    pub fn session_filesystem(max_file_bytes: u64) -> Self {
        Self {
            allowed: SESSION_EXTENSIONS,
            max_file_bytes,
            max_encoded_bytes: None,
        }
    }

    /// 音乐库持久化存储
    pub fn library(max_file_bytes: u64) -> Self {
        Self {
            allowed: LIBRARY_EXTENSIONS,
            max_file_bytes,
            max_encoded_bytes: None,
        }
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    /// 校验扩展名
    pub fn check_extension(&self, filename: &str) -> Result<AudioFormat, UploadError> {
        let extension = extension_of(filename);
        AudioFormat::from_extension(&extension)
            .filter(|format| self.allowed.contains(format))
            .ok_or(UploadError::InvalidFormat { extension })
    }

    /// 校验原始文件大小
    pub fn check_size(&self, size: u64) -> Result<(), UploadError> {
        if size > self.max_file_bytes {
            return Err(UploadError::TooLarge {
                size,
                limit_bytes: self.max_file_bytes,
            });
        }
        Ok(())
    }

    /// 校验 Base64 编码后的大小
    pub fn check_encoded_size(&self, encoded_size: u64) -> Result<(), UploadError> {
        match self.max_encoded_bytes {
            Some(limit) if encoded_size > limit => Err(UploadError::EncodedTooLarge {
                encoded_size,
                file_limit_bytes: self.max_file_bytes,
            }),
            _ => Ok(()),
        }
    }

    /// 完整校验：先格式后大小
    pub fn validate(&self, filename: &str, size: u64) -> Result<AudioFormat, UploadError> {
        let format = self.check_extension(filename)?;
        self.check_size(size)?;
        Ok(format)
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::session_inline(12 * MIB, 16 * MIB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("song.MP3"), "mp3");
        assert_eq!(extension_of("a.b.flac"), "flac");
        assert_eq!(extension_of("noext"), "noext");
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let policy = UploadPolicy::default();
        for name in ["notes.txt", "movie.mp4", "noext", "archive.tar.gz"] {
            assert!(matches!(
                policy.validate(name, 10),
                Err(UploadError::InvalidFormat { .. })
            ));
        }
    }

    #[test]
    fn test_library_rejects_ogg() {
        assert!(UploadPolicy::library(12 * MIB).validate("a.ogg", 10).is_err());
        assert_eq!(
            UploadPolicy::default().validate("a.ogg", 10),
            Ok(AudioFormat::Ogg)
        );
    }

    #[test]
    fn test_size_ceiling() {
        let policy = UploadPolicy::default();
        assert!(policy.validate("a.mp3", 12 * MIB).is_ok());
        assert!(matches!(
            policy.validate("a.mp3", 12 * MIB + 1),
            Err(UploadError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_format_checked_before_size() {
        let policy = UploadPolicy::default();
        assert!(matches!(
            policy.validate("a.txt", 100 * MIB),
            Err(UploadError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_encoded_ceiling_only_for_inline() {
        assert!(UploadPolicy::default()
            .check_encoded_size(16 * MIB + 1)
            .is_err());
        assert!(UploadPolicy::session_filesystem(12 * MIB)
            .check_encoded_size(16 * MIB + 1)
            .is_ok());
    }
}
