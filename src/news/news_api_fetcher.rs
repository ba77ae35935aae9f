//! 获取新闻节点

use log::{error, info};
use pyo3::{
    exceptions::PyRuntimeError,
    pyclass, pymethods,
    types::{PyAnyMethods, PyDict, PyType},
    Bound, Py, PyErr, PyResult, Python,
};

use crate::{
    config::{prefer_input, Settings},
    core::category::CATEGORY_NEWS,
    error::Error,
    news::{
        collector::{FetchOptions, NewsCollector},
        news_api::NewsApiClient,
        types::{Category, NewsType, LANGUAGES},
    },
    wrapper::comfyui::{
        types::{NODE_INT, NODE_JSON, NODE_STRING},
        PromptServer,
    },
};

/// 获取新闻
#[pyclass(subclass)]
pub struct NewsApiFetcher {}

impl PromptServer for NewsApiFetcher {}

#[pymethods]
impl NewsApiFetcher {
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
        (NODE_JSON,)
    }

    #[classattr]
    #[pyo3(name = "RETURN_NAMES")]
    fn return_names() -> (&'static str,) {
        ("news_json",)
    }

    #[classattr]
    #[pyo3(name = "OUTPUT_IS_LIST")]
    fn output_is_list() -> (bool,) {
        (false,)
    }

    #[classattr]
    #[pyo3(name = "CATEGORY")]
    const CATEGORY: &'static str = CATEGORY_NEWS;

    #[classattr]
    #[pyo3(name = "DESCRIPTION")]
    fn description() -> &'static str {
        "Fetch unique news articles from NewsAPI with source rotation and backfill, output as a JSON array."
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
                    "category",
                    (Category::choices(), {
                        let category = PyDict::new(py);
                        category.set_item("default", Category::Random.to_string())?;
                        category
                    }),
                )?;
                required.set_item(
                    "language",
                    (LANGUAGES.to_vec(), {
                        let language = PyDict::new(py);
                        language.set_item("default", "en")?;
                        language
                    }),
                )?;
                required.set_item(
                    "news_nums",
                    (NODE_INT, {
                        let news_nums = PyDict::new(py);
                        news_nums.set_item("default", 3)?;
                        news_nums.set_item("min", 1)?;
                        news_nums.set_item("max", 100)?;
                        news_nums
                    }),
                )?;
                required.set_item(
                    "keyword",
                    (NODE_STRING, {
                        let keyword = PyDict::new(py);
                        keyword.set_item("default", "")?;
                        keyword.set_item("multiline", true)?;
                        keyword.set_item("tooltip", "Search keyword, only used by everything")?;
                        keyword
                    }),
                )?;
                required.set_item(
                    "news_type",
                    (NewsType::choices(), {
                        let news_type = PyDict::new(py);
                        news_type.set_item("default", NewsType::TopHeadlines.to_string())?;
                        news_type
                    }),
                )?;
                required.set_item(
                    "nums_per_batch",
                    (NODE_INT, {
                        let nums_per_batch = PyDict::new(py);
                        nums_per_batch.set_item("default", 10)?;
                        nums_per_batch.set_item("min", 1)?;
                        nums_per_batch.set_item("max", 100)?;
                        nums_per_batch
                    }),
                )?;
                required.set_item(
                    "max_attempts",
                    (NODE_INT, {
                        let max_attempts = PyDict::new(py);
                        max_attempts.set_item("default", 5)?;
                        max_attempts.set_item("min", 1)?;
                        max_attempts.set_item("max", 20)?;
                        max_attempts
                    }),
                )?;
                required.set_item(
                    "max_content_length",
                    (NODE_INT, {
                        let max_content_length = PyDict::new(py);
                        max_content_length.set_item("default", 500)?;
                        max_content_length.set_item("min", 50)?;
                        max_content_length.set_item("max", 5000)?;
                        max_content_length.set_item("step", 50)?;
                        max_content_length
                    }),
                )?;
                required
            })?;

            dict.set_item("optional", {
                let optional = PyDict::new(py);
                optional.set_item(
                    "api_key",
                    (NODE_STRING, {
                        let api_key = PyDict::new(py);
                        api_key.set_item("default", "")?;
                        api_key.set_item("tooltip", "NewsAPI key, empty to use NEWS_API_KEY")?;
                        api_key
                    }),
                )?;
                optional
            })?;
            Ok(dict.into())
        })
    }

    #[allow(clippy::too_many_arguments)]
    #[pyo3(name = "execute", signature = (category, language, news_nums, keyword, news_type, nums_per_batch, max_attempts, max_content_length, api_key=None))]
    fn execute(
        &mut self,
        py: Python,
        category: &str,
        language: &str,
        news_nums: usize,
        keyword: &str,
        news_type: &str,
        nums_per_batch: usize,
        max_attempts: usize,
        max_content_length: usize,
        api_key: Option<String>,
    ) -> PyResult<(String,)> {
        let results = self.fetch_news(
            category,
            language,
            news_nums,
            keyword,
            news_type,
            nums_per_batch,
            max_attempts,
            max_content_length,
            api_key.as_deref().unwrap_or_default(),
        );

        match results {
            Ok(v) => Ok((v,)),
            Err(e) => {
                error!("NewsApiFetcher error, {e}");
                if let Err(e) = self.send_error(py, "NewsApiFetcher", e.to_string()) {
                    error!("send error failed, {e}");
                    return Err(PyErr::new::<PyRuntimeError, _>(e.to_string()));
                };
                Err(PyErr::new::<PyRuntimeError, _>(e.to_string()))
            }
        }
    }
}

impl NewsApiFetcher {
    /// 构建收集参数
    #[allow(clippy::too_many_arguments)]
    fn fetch_options(
        &self,
        category: &str,
        language: &str,
        news_nums: usize,
        keyword: &str,
        news_type: &str,
        nums_per_batch: usize,
        max_attempts: usize,
        max_content_length: usize,
    ) -> Result<FetchOptions, Error> {
        let category = category
            .parse::<Category>()
            .map_err(|e| Error::ParseEnumString(format!("category {category:?}, {e}")))?;
        let news_type = news_type
            .parse::<NewsType>()
            .map_err(|e| Error::ParseEnumString(format!("news_type {news_type:?}, {e}")))?;
        if !LANGUAGES.contains(&language) {
            return Err(Error::InvalidParameter(format!("language {language:?}")));
        }
        if news_nums == 0 || max_attempts == 0 {
            return Err(Error::InvalidParameter(
                "news_nums and max_attempts must be at least 1".to_string(),
            ));
        }

        Ok(FetchOptions {
            category,
            language: language.to_string(),
            news_type,
            keyword: keyword.to_string(),
            news_nums,
            nums_per_batch: nums_per_batch.max(news_nums),
            max_attempts,
            max_content_length,
        })
    }

    /// 收集新闻并序列化为 JSON
    ///
    /// 未配置 api key 时返回空数组
    #[allow(clippy::too_many_arguments)]
    fn fetch_news(
        &self,
        category: &str,
        language: &str,
        news_nums: usize,
        keyword: &str,
        news_type: &str,
        nums_per_batch: usize,
        max_attempts: usize,
        max_content_length: usize,
        api_key: &str,
    ) -> Result<String, Error> {
        let options = self.fetch_options(
            category,
            language,
            news_nums,
            keyword,
            news_type,
            nums_per_batch,
            max_attempts,
            max_content_length,
        )?;

        let settings = Settings::load();
        let Some(api_key) = prefer_input(api_key, settings.news_api_key.as_ref()) else {
            error!("NewsApiFetcher: no api key, set the api_key input or NEWS_API_KEY");
            return Ok("[]".to_string());
        };

        let client = NewsApiClient::new(
            &settings.news_api_base_url,
            &api_key,
            settings.news_api_retries,
        )?;
        let mut collector = NewsCollector::new(client, rand::rng());
        let articles = collector.collect(&options);
        info!("NewsApiFetcher: {} articles", articles.len());

        Ok(serde_json::to_string_pretty(&articles)?)
    }
}
