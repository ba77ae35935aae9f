//! XML 批量场景提示词读取节点

use log::{error, info, warn};
use pyo3::{
    pyclass, pymethods,
    types::{PyAnyMethods, PyDict, PyType},
    Bound, Py, PyAny, PyResult, Python,
};

use crate::{
    core::category::CATEGORY_SCENES,
    error::Error,
    scene::{
        prompt_collection::{select_prompts, PromptSeed},
        scene_xml::parse_scenes,
        seed_generator::{SeedGenerator, SeedMode},
    },
    wrapper::{
        comfy::folder_paths::FolderPaths,
        comfyui::types::{NODE_INT, NODE_INT_MAX, NODE_JOB, NODE_STRING},
    },
};

/// 读取场景 XML, 输出提示词与种子集合
#[pyclass(subclass)]
pub struct XmlSceneReader {}

#[pymethods]
impl XmlSceneReader {
    #[new]
    fn new() -> Self {
        Self {}
    }

    #[classattr]
    #[pyo3(name = "INPUT_IS_LIST")]
    fn input_is_list() -> bool {
        false
    }

    #[classattr]
    #[pyo3(name = "RETURN_TYPES")]
    fn return_types() -> (&'static str,) {
        (NODE_JOB,)
    }

    #[classattr]
    #[pyo3(name = "RETURN_NAMES")]
    fn return_names() -> (&'static str,) {
        ("prompt_collections",)
    }

    #[classattr]
    #[pyo3(name = "CATEGORY")]
    const CATEGORY: &'static str = CATEGORY_SCENES;

    #[classattr]
    #[pyo3(name = "DESCRIPTION")]
    fn description() -> &'static str {
        "Read prompts of the scenes in range from a scene XML file and attach a seed to each prompt."
    }

    #[classattr]
    #[pyo3(name = "FUNCTION")]
    const FUNCTION: &'static str = "execute";

    #[classmethod]
    #[pyo3(name = "INPUT_TYPES")]
    fn input_types(_cls: &Bound<'_, PyType>) -> PyResult<Py<PyDict>> {
        Python::with_gil(|py| {
            let dict = PyDict::new(py);
            dict.set_item("required", {
                let required = PyDict::new(py);
                required.set_item(
                    "xml_path",
                    (NODE_STRING, {
                        let xml_path = PyDict::new(py);
                        xml_path.set_item("default", "")?;
                        xml_path.set_item("multiline", false)?;
                        xml_path.set_item("tooltip", "Relative to the ComfyUI output directory")?;
                        xml_path
                    }),
                )?;
                required.set_item(
                    "scene_start",
                    (NODE_INT, {
                        let scene_start = PyDict::new(py);
                        scene_start.set_item("default", 1)?;
                        scene_start.set_item("min", 1)?;
                        scene_start.set_item("max", 1000)?;
                        scene_start
                    }),
                )?;
                required.set_item(
                    "scene_end",
                    (NODE_INT, {
                        let scene_end = PyDict::new(py);
                        scene_end.set_item("default", 3)?;
                        scene_end.set_item("min", 1)?;
                        scene_end.set_item("max", 1000)?;
                        scene_end
                    }),
                )?;
                required.set_item(
                    "seed_mode",
                    (SeedMode::choices(), {
                        let seed_mode = PyDict::new(py);
                        seed_mode.set_item("default", SeedMode::Random.to_string())?;
                        seed_mode
                    }),
                )?;
                required.set_item(
                    "base_seed",
                    (NODE_INT, {
                        let base_seed = PyDict::new(py);
                        base_seed.set_item("default", 0)?;
                        base_seed.set_item("min", 0)?;
                        base_seed.set_item("max", NODE_INT_MAX)?;
                        base_seed
                    }),
                )?;
                required
            })?;
            Ok(dict.into())
        })
    }

    #[pyo3(name = "execute")]
    fn execute<'py>(
        &mut self,
        py: Python<'py>,
        xml_path: &str,
        scene_start: i64,
        scene_end: i64,
        seed_mode: &str,
        base_seed: u64,
    ) -> PyResult<(Bound<'py, PyAny>,)> {
        let collections = self
            .read_prompt_collections(xml_path, scene_start, scene_end, seed_mode, base_seed)
            .unwrap_or_else(|e| {
                error!("XmlSceneReader error, {e}");
                Vec::new()
            });

        let collections = pythonize::pythonize(py, &collections)?;
        Ok((collections,))
    }
}

impl XmlSceneReader {
    /// 读取指定范围的场景
    fn read_prompt_collections(
        &self,
        xml_path: &str,
        scene_start: i64,
        scene_end: i64,
        seed_mode: &str,
        base_seed: u64,
    ) -> Result<Vec<PromptSeed>, Error> {
        let seed_mode = seed_mode
            .parse::<SeedMode>()
            .map_err(|e| Error::ParseEnumString(format!("seed_mode {seed_mode:?}, {e}")))?;

        let xml_path = xml_path.trim();
        if xml_path.is_empty() {
            warn!("XmlSceneReader: xml_path is empty");
            return Ok(Vec::new());
        }

        let full_path = FolderPaths::new(None)?.resolve(xml_path);
        if !full_path.is_file() {
            return Err(Error::FileNotFound(full_path.display().to_string()));
        }

        let xml = std::fs::read_to_string(&full_path)?;
        let scenes = parse_scenes(&xml)?;
        if scenes.is_empty() {
            warn!("XmlSceneReader: no scene in {}", full_path.display());
            return Ok(Vec::new());
        }

        let mut seeds = SeedGenerator::new(seed_mode, base_seed);
        let collections = select_prompts(&scenes, scene_start, scene_end, &mut seeds)?;
        info!("XmlSceneReader: {} prompts", collections.len());
        Ok(collections)
    }
}
