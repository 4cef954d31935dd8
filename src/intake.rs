use std::fmt;
use std::path::Path;

use axum::body::Bytes;
use base64::prelude::*;
use image::ImageFormat;
use log::{debug, warn};
use serde::Serialize;

use crate::metrics;

/// 单张图片的最大字节数：10 MiB
pub const MAX_IMAGE_SIZE: u64 = 10 * 1024 * 1024;

/// 无法从扩展名推断类型时使用的媒体类型
const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// 图片被拒绝的原因
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectionReason {
    #[error("Please upload an image file")]
    NotAnImage { media_type: String },
    #[error("Image size should be less than 10MB")]
    TooLarge { size: u64 },
}

/// 从磁盘读取图片时的错误
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Rejected(#[from] RejectionReason),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 一个待校验的上传文件
#[derive(Debug, Clone)]
pub struct ImageFile {
    /// 原始文件名
    pub name: Option<String>,
    /// 声明的媒体类型，例如 `image/png`
    pub media_type: String,
    pub contents: Bytes,
}

impl ImageFile {
    pub fn new(name: Option<String>, media_type: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        Self { name, media_type: media_type.into(), contents: contents.into() }
    }

    pub fn size(&self) -> u64 {
        self.contents.len() as u64
    }
}

/// `data:<媒体类型>;base64,<数据>` 形式的图片
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DataUrl(String);

impl DataUrl {
    pub fn encode(media_type: &str, bytes: &[u8]) -> Self {
        Self(format!("data:{media_type};base64,{}", BASE64_STANDARD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 去掉 `data:...,` 前缀后的 base64 数据
    pub fn payload(&self) -> &str {
        self.0.split_once(',').map(|(_, payload)| payload).unwrap_or_default()
    }

    /// 前缀中声明的媒体类型
    pub fn media_type(&self) -> &str {
        self.0
            .strip_prefix("data:")
            .and_then(|rest| rest.split([';', ',']).next())
            .unwrap_or_default()
    }

    /// 解码回原始字节
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64_STANDARD.decode(self.payload())
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 前/后两张图片中的一个槽位
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSlot {
    image: Option<DataUrl>,
}

impl ImageSlot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_present(&self) -> bool {
        self.image.is_some()
    }

    pub fn image(&self) -> Option<&DataUrl> {
        self.image.as_ref()
    }

    /// 校验并替换槽位内容，被拒绝时槽位保持不变
    pub fn accept(&mut self, file: &ImageFile) -> Result<(), RejectionReason> {
        *self = submit(file)?;
        Ok(())
    }

    /// 清空槽位，对空槽位调用无副作用
    pub fn remove(&mut self) {
        self.image = None;
    }
}

impl From<DataUrl> for ImageSlot {
    fn from(image: DataUrl) -> Self {
        Self { image: Some(image) }
    }
}

/// 按顺序检查媒体类型和大小
pub fn validate(media_type: &str, size: u64) -> Result<(), RejectionReason> {
    if !media_type.starts_with("image/") {
        return Err(RejectionReason::NotAnImage { media_type: media_type.to_string() });
    }
    if size > MAX_IMAGE_SIZE {
        return Err(RejectionReason::TooLarge { size });
    }
    Ok(())
}

/// 校验一个文件并编码为 data URL
pub fn submit(file: &ImageFile) -> Result<ImageSlot, RejectionReason> {
    if let Err(reason) = validate(&file.media_type, file.size()) {
        warn!("拒绝图片 {}: {reason}", file.name.as_deref().unwrap_or("<unnamed>"));
        metrics::inc_rejection(&reason);
        return Err(reason);
    }
    debug!("接收图片 {:?}，{} 字节", file.name, file.size());
    Ok(DataUrl::encode(&file.media_type, &file.contents).into())
}

/// 一次只处理一个文件，多余的文件会被忽略
pub fn submit_first<I>(files: I) -> Option<Result<ImageSlot, RejectionReason>>
where
    I: IntoIterator,
    I::Item: std::borrow::Borrow<ImageFile>,
{
    use std::borrow::Borrow;

    files.into_iter().next().map(|file| submit(file.borrow()))
}

/// 根据扩展名推断媒体类型
pub fn media_type_from_path(path: &Path) -> &'static str {
    ImageFormat::from_path(path).map(|format| format.to_mime_type()).unwrap_or(FALLBACK_MEDIA_TYPE)
}

/// 从磁盘读取图片，超出大小的文件不会被读入内存
pub async fn submit_path(path: impl AsRef<Path>) -> Result<ImageSlot, IntakeError> {
    let path = path.as_ref();
    let io_error = |source| IntakeError::Io { path: path.display().to_string(), source };

    let media_type = media_type_from_path(path);
    let size = tokio::fs::metadata(path).await.map_err(io_error)?.len();
    if let Err(reason) = validate(media_type, size) {
        warn!("拒绝图片 {}: {reason}", path.display());
        metrics::inc_rejection(&reason);
        return Err(reason.into());
    }

    let contents = tokio::fs::read(path).await.map_err(io_error)?;
    let name = path.file_name().map(|name| name.to_string_lossy().into_owned());
    Ok(submit(&ImageFile::new(name, media_type, contents))?)
}
