//! WAV 解析与截断
//!
//! 只解析 RIFF 头与 fmt/data chunk，不解码采样数据

use thiserror::Error;

/// WAV 解析错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WavError {
    #[error("WAV data too short")]
    TooShort,

    #[error("Invalid WAV: {0}")]
    Invalid(&'static str),
}

/// fmt chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FmtChunk {
    pub audio_format: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

/// WAV 头信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub fmt: FmtChunk,
    /// data chunk 内容起始偏移
    pub data_start: usize,
    /// data chunk 实际可用长度
    pub data_size: usize,
}

impl WavHeader {
    /// 音频时长（秒）
    pub fn duration_secs(&self) -> f64 {
        if self.fmt.byte_rate == 0 {
            return 0.0;
        }
        self.data_size as f64 / self.fmt.byte_rate as f64
    }
}

fn read_u16(data: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([data[pos], data[pos + 1]])
}

fn read_u32(data: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

/// 解析 WAV 文件头
pub fn parse_wav_header(data: &[u8]) -> Result<WavHeader, WavError> {
    if data.len() < 44 {
        return Err(WavError::TooShort);
    }
    if &data[0..4] != b"RIFF" {
        return Err(WavError::Invalid("missing RIFF header"));
    }
    if &data[8..12] != b"WAVE" {
        return Err(WavError::Invalid("missing WAVE identifier"));
    }

    let mut pos: usize = 12;
    let mut fmt: Option<FmtChunk> = None;

    while pos.saturating_add(8) <= data.len() {
        let chunk_id = &data[pos..pos + 4];
        let chunk_size = read_u32(data, pos + 4) as usize;
        let body = pos + 8;

        match chunk_id {
            b"fmt " => {
                if chunk_size < 16 || body + 16 > data.len() {
                    return Err(WavError::Invalid("bad fmt chunk"));
                }
                fmt = Some(FmtChunk {
                    audio_format: read_u16(data, body),
                    num_channels: read_u16(data, body + 2),
                    sample_rate: read_u32(data, body + 4),
                    byte_rate: read_u32(data, body + 8),
                    block_align: read_u16(data, body + 12),
                    bits_per_sample: read_u16(data, body + 14),
                });
            }
            b"data" => {
                let fmt = fmt.ok_or(WavError::Invalid("data chunk before fmt chunk"))?;
                // 流式录音的 data 长度可能未回填，按实际长度计
                let available = data.len() - body;
                return Ok(WavHeader {
                    fmt,
                    data_start: body,
                    data_size: chunk_size.min(available),
                });
            }
            _ => {}
        }

        pos = body.saturating_add(chunk_size);
        // 对齐到偶数字节
        if chunk_size % 2 != 0 {
            pos = pos.saturating_add(1);
        }
    }

    Err(WavError::Invalid("missing data chunk"))
}

/// 截断到前 `max_secs` 秒，未超出时原样返回
pub fn clip_wav(data: &[u8], max_secs: f64) -> Result<Vec<u8>, WavError> {
    let header = parse_wav_header(data)?;
    let block_align = header.fmt.block_align.max(1) as usize;

    let limit = (header.fmt.byte_rate as f64 * max_secs) as usize;
    let limit = limit - limit % block_align;

    if header.data_size <= limit {
        return Ok(data.to_vec());
    }

    let mut out = Vec::with_capacity(header.data_start + limit);
    out.extend_from_slice(&data[..header.data_start]);
    out.extend_from_slice(&data[header.data_start..header.data_start + limit]);

    // 回填 data chunk 与 RIFF 长度
    let data_len_pos = header.data_start - 4;
    out[data_len_pos..header.data_start].copy_from_slice(&(limit as u32).to_le_bytes());
    let riff_len = (out.len() - 8) as u32;
    out[4..8].copy_from_slice(&riff_len.to_le_bytes());

    Ok(out)
}

/// 生成 16-bit PCM WAV
#[cfg(test)]
pub(crate) fn pcm16_wav(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
    let block_align = channels * 2;
    let byte_rate = sample_rate * block_align as u32;
    let data_len = (samples.len() * 2) as u32;

    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}
