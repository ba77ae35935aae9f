//! 类型定义
//! 相关节点定义: ComfyUI/comfy/comfy_types/node_typing.py

pub const NODE_INT: &str = "INT";
pub const NODE_STRING: &str = "STRING";
pub const NODE_JSON: &str = "JSON";
/// 提示词与种子的集合, 下游批处理节点使用
pub const NODE_JOB: &str = "JOB";

pub const NODE_INT_MAX: u64 = 0xffffffffffffffffu64;
