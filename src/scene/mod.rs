//! 场景提示词相关的节点
use pyo3::{
    types::{PyModule, PyModuleMethods},
    Bound, PyResult, Python,
};

use crate::core::node::NodeRegister;

pub mod prompt_collection;
pub mod scene_xml;
pub mod seed_generator;

mod xml_scene_reader;
pub use xml_scene_reader::XmlSceneReader;

/// 场景模块
pub fn submodule(py: Python<'_>) -> PyResult<Bound<'_, PyModule>> {
    let submodule = PyModule::new(py, "scene")?;
    submodule.add_class::<XmlSceneReader>()?;
    Ok(submodule)
}

/// Scene node register
pub fn node_register(py: Python<'_>) -> PyResult<Vec<NodeRegister<'_>>> {
    let nodes: Vec<NodeRegister> = vec![NodeRegister(
        "XMLSceneReader",
        py.get_type::<XmlSceneReader>(),
        "Get Scene Prompt",
    )];
    Ok(nodes)
}
