//! 飞书多维表格读取节点

use std::{fs, path::Path};

use chrono::{DateTime, Local};
use log::{error, info};
use pyo3::{
    exceptions::PyRuntimeError,
    pyclass, pymethods,
    types::{PyAnyMethods, PyDict, PyType},
    Bound, Py, PyErr, PyResult, Python,
};

use crate::{
    config::{prefer_input, Settings},
    core::category::CATEGORY_SCENES,
    error::Error,
    feishu::{
        bitable::{parse_bitable_url, records_to_scenes},
        client::FeishuClient,
    },
    scene::scene_xml::render_scenes,
    wrapper::{
        comfy::folder_paths::{FolderPaths, XML_OUTPUT_FOLDER},
        comfyui::{
            types::{NODE_INT, NODE_STRING},
            PromptServer,
        },
    },
};

/// 默认读取的数据表名称
pub const DEFAULT_TABLE_NAME: &str = "分镜提示词";

/// 读取飞书多维表格并生成场景 XML
#[pyclass(subclass)]
pub struct FeishuTableReader {}

impl PromptServer for FeishuTableReader {}

#[pymethods]
impl FeishuTableReader {
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
    fn return_types() -> (&'static str, &'static str) {
        (NODE_STRING, NODE_INT)
    }

    #[classattr]
    #[pyo3(name = "RETURN_NAMES")]
    fn return_names() -> (&'static str, &'static str) {
        ("xml_file_path", "record_num")
    }

    #[classattr]
    #[pyo3(name = "CATEGORY")]
    const CATEGORY: &'static str = CATEGORY_SCENES;

    #[classattr]
    #[pyo3(name = "DESCRIPTION")]
    fn description() -> &'static str {
        "Read all records of a Feishu Bitable table and save them as a scene XML file."
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
                    "feishu_url",
                    (NODE_STRING, {
                        let feishu_url = PyDict::new(py);
                        feishu_url.set_item("default", "")?;
                        feishu_url.set_item("multiline", false)?;
                        feishu_url.set_item(
                            "tooltip",
                            "https://xxx.feishu.cn/base/<base_id>?table=<table_id>",
                        )?;
                        feishu_url
                    }),
                )?;
                required.set_item(
                    "table_name",
                    (NODE_STRING, {
                        let table_name = PyDict::new(py);
                        table_name.set_item("default", DEFAULT_TABLE_NAME)?;
                        table_name.set_item("multiline", false)?;
                        table_name
                    }),
                )?;
                required.set_item(
                    "app_id",
                    (NODE_STRING, {
                        let app_id = PyDict::new(py);
                        app_id.set_item("default", "")?;
                        app_id.set_item("tooltip", "Empty to use FEISHU_APP_ID")?;
                        app_id
                    }),
                )?;
                required.set_item(
                    "app_secret",
                    (NODE_STRING, {
                        let app_secret = PyDict::new(py);
                        app_secret.set_item("default", "")?;
                        app_secret.set_item("tooltip", "Empty to use FEISHU_APP_SECRET")?;
                        app_secret
                    }),
                )?;
                required
            })?;
            Ok(dict.into())
        })
    }

    #[pyo3(name = "execute")]
    fn execute(
        &mut self,
        py: Python,
        feishu_url: &str,
        table_name: &str,
        app_id: &str,
        app_secret: &str,
    ) -> PyResult<(String, usize)> {
        let results = self.generate_xml(feishu_url, table_name, app_id, app_secret);

        match results {
            Ok(v) => Ok(v),
            Err(e) => {
                error!("FeishuTableReader error, {e}");
                if let Err(e) = self.send_error(py, "FeishuTableReader", e.to_string()) {
                    error!("send error failed, {e}");
                    return Err(PyErr::new::<PyRuntimeError, _>(e.to_string()));
                };
                Err(PyErr::new::<PyRuntimeError, _>(format!(
                    "generate xml file failed, {e}"
                )))
            }
        }
    }
}

impl FeishuTableReader {
    /// 读取表格记录并保存 XML, 返回相对路径和记录数
    fn generate_xml(
        &self,
        feishu_url: &str,
        table_name: &str,
        app_id: &str,
        app_secret: &str,
    ) -> Result<(String, usize), Error> {
        let settings = Settings::load();
        let app_id = prefer_input(app_id, settings.feishu_app_id.as_ref())
            .ok_or_else(|| Error::MissingCredential("app_id or FEISHU_APP_ID".to_string()))?;
        let app_secret = prefer_input(app_secret, settings.feishu_app_secret.as_ref())
            .ok_or_else(|| {
                Error::MissingCredential("app_secret or FEISHU_APP_SECRET".to_string())
            })?;

        let bitable = parse_bitable_url(feishu_url)?;
        let client = FeishuClient::new(&settings.feishu_base_url)?;
        let token = client.tenant_access_token(&app_id, &app_secret)?;

        let table_name = table_name.trim();
        let table_id = if table_name.is_empty() {
            bitable.table_id.ok_or_else(|| {
                Error::InvalidParameter("table_name is empty and the url has no table".to_string())
            })?
        } else {
            client.table_id_by_name(&token, &bitable.base_id, table_name)?
        };

        let records = client.all_records(&token, &bitable.base_id, &table_id)?;
        if records.is_empty() {
            return Err(Error::EmptyTable(table_id));
        }

        let xml = render_scenes(&records_to_scenes(&records));
        let folder_paths = FolderPaths::new(None)?;
        let xml_file_path = save_xml(&folder_paths, &xml, &Local::now())?;
        info!(
            "FeishuTableReader: {} records saved to {xml_file_path}",
            records.len()
        );

        Ok((xml_file_path, records.len()))
    }
}

/// 保存 XML, 返回相对输出目录的路径
pub fn save_xml(
    folder_paths: &FolderPaths,
    xml: &str,
    now: &DateTime<Local>,
) -> Result<String, Error> {
    let dir = folder_paths.xml_output_directory();
    fs::create_dir_all(&dir)?;

    let filename = format!("scenes_{}.xml", now.format("%Y%m%d%H%M%S"));
    fs::write(dir.join(&filename), xml)?;

    let relative = Path::new(XML_OUTPUT_FOLDER).join(filename);
    relative
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidPath(relative.display().to_string()))
}
