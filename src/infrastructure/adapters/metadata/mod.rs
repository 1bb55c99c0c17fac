//! Metadata Adapter - 音频元数据探测

mod symphonia_probe;

pub use symphonia_probe::SymphoniaMetadataProbe;
