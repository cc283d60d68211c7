//! 视觉问答模块：把图片（base64 内联）和问题一起发给多模态模型。

mod client;
mod types;

pub use client::{VisionClient, VisionClientBuilder};
pub use types::{ContentPart, EncodedImage, ImageUrl, Message, MessageContent, MessageRole};
