//! ComfyUI 内部模块的 Rust 实现

pub mod folder_paths;
