//! 飞书多维表格相关的节点
use pyo3::{
    types::{PyModule, PyModuleMethods},
    Bound, PyResult, Python,
};

use crate::core::node::NodeRegister;

pub mod bitable;
pub mod client;

mod feishu_table_reader;
pub use feishu_table_reader::{save_xml, FeishuTableReader};

/// 飞书模块
pub fn submodule(py: Python<'_>) -> PyResult<Bound<'_, PyModule>> {
    let submodule = PyModule::new(py, "feishu")?;
    submodule.add_class::<FeishuTableReader>()?;
    Ok(submodule)
}

/// Feishu node register
pub fn node_register(py: Python<'_>) -> PyResult<Vec<NodeRegister<'_>>> {
    let nodes: Vec<NodeRegister> = vec![NodeRegister(
        "FeishuTableReader",
        py.get_type::<FeishuTableReader>(),
        "Read Scene Information",
    )];
    Ok(nodes)
}
