//! 解析新闻内容节点

use chrono::{DateTime, Local, TimeZone};
use log::error;
use pyo3::{
    pyclass, pymethods,
    types::{PyAnyMethods, PyDict, PyType},
    Bound, Py, PyResult, Python,
};
use serde_json::{Map, Value};

use crate::{
    core::category::CATEGORY_NEWS,
    news::article::{NO_CONTENT, NO_DESCRIPTION, NO_TITLE, UNKNOWN_AUTHOR, UNKNOWN_SOURCE},
    wrapper::comfyui::types::{NODE_INT, NODE_JSON, NODE_STRING},
};

pub const UNKNOWN_TIME: &str = "Unknown time";

/// 字段解析失败原因
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ParseNewsError {
    #[error("Invalid JSON format, {0}")]
    InvalidJson(String),
    #[error("Invalid news data format")]
    InvalidFormat,
    #[error("Index out of range (0-{})", .0.saturating_sub(1))]
    IndexOutOfRange(usize),
}

/// 节点输出的九个字段
#[derive(Debug, Clone, PartialEq)]
pub struct NewsFields {
    pub source: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub author: String,
    pub publish_at: String,
    pub url: String,
    pub urltoimage: String,
    pub current_date: String,
}

type NewsTuple = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
);

type NewsNames = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
);

impl NewsFields {
    /// 解析失败时的固定输出
    pub fn empty(current_date: String) -> Self {
        Self {
            source: UNKNOWN_SOURCE.to_string(),
            title: NO_TITLE.to_string(),
            description: NO_DESCRIPTION.to_string(),
            content: NO_CONTENT.to_string(),
            author: UNKNOWN_AUTHOR.to_string(),
            publish_at: UNKNOWN_TIME.to_string(),
            url: String::new(),
            urltoimage: String::new(),
            current_date,
        }
    }

    fn into_tuple(self) -> NewsTuple {
        (
            self.source,
            self.title,
            self.description,
            self.content,
            self.author,
            self.publish_at,
            self.url,
            self.urltoimage,
            self.current_date,
        )
    }
}

/// 日期格式: MM/DD/YYYY Weekday
pub fn format_date<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%m/%d/%Y %A").to_string()
}

fn text_field(article: &Map<String, Value>, key: &str, fallback: &str) -> String {
    match article.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => fallback.to_string(),
        Some(other) => other.to_string(),
    }
}

/// 兼容字符串或 {"name": ...} 形式的来源
fn source_field(article: &Map<String, Value>) -> String {
    match article.get("source") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Object(source)) => text_field(source, "name", UNKNOWN_SOURCE),
        _ => UNKNOWN_SOURCE.to_string(),
    }
}

/// 去掉 " chars]" 之后的内容
fn clean_content(content: String) -> String {
    if content == NO_CONTENT {
        return content;
    }
    let content = match content.split_once(" chars]") {
        Some((head, _)) => format!("{head}]"),
        None => content,
    };
    content.trim().to_string()
}

/// 从新闻 JSON 数组中解析指定索引的字段
pub fn parse_news(
    news_json: &str,
    news_index: i64,
    current_date: String,
) -> Result<NewsFields, ParseNewsError> {
    let data: Value =
        serde_json::from_str(news_json).map_err(|e| ParseNewsError::InvalidJson(e.to_string()))?;
    let items = match data {
        Value::Array(items) if !items.is_empty() => items,
        _ => return Err(ParseNewsError::InvalidFormat),
    };

    let index = usize::try_from(news_index)
        .ok()
        .filter(|i| *i < items.len())
        .ok_or(ParseNewsError::IndexOutOfRange(items.len()))?;
    let Value::Object(article) = &items[index] else {
        return Err(ParseNewsError::InvalidFormat);
    };

    Ok(NewsFields {
        source: source_field(article),
        title: text_field(article, "title", NO_TITLE),
        description: text_field(article, "description", NO_DESCRIPTION),
        content: clean_content(text_field(article, "content", NO_CONTENT)),
        author: text_field(article, "author", UNKNOWN_AUTHOR),
        publish_at: text_field(article, "publishedAt", UNKNOWN_TIME),
        url: text_field(article, "url", ""),
        urltoimage: text_field(article, "urlToImage", ""),
        current_date,
    })
}

/// 解析新闻内容
#[pyclass(subclass)]
pub struct ParseNewsContent {}

#[pymethods]
impl ParseNewsContent {
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
    fn return_types() -> NewsNames {
        (
            NODE_STRING,
            NODE_STRING,
            NODE_STRING,
            NODE_STRING,
            NODE_STRING,
            NODE_STRING,
            NODE_STRING,
            NODE_STRING,
            NODE_STRING,
        )
    }

    #[classattr]
    #[pyo3(name = "RETURN_NAMES")]
    fn return_names() -> NewsNames {
        (
            "source",
            "title",
            "description",
            "content",
            "author",
            "publish_at",
            "url",
            "urltoimage",
            "current_date",
        )
    }

    #[classattr]
    #[pyo3(name = "CATEGORY")]
    const CATEGORY: &'static str = CATEGORY_NEWS;

    #[classattr]
    #[pyo3(name = "DESCRIPTION")]
    fn description() -> &'static str {
        "Pick one article from a news JSON array and split it into text fields."
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
                    "news_json",
                    (NODE_JSON, {
                        let news_json = PyDict::new(py);
                        news_json.set_item("default", "[]")?;
                        news_json
                    }),
                )?;
                required.set_item(
                    "news_index",
                    (NODE_INT, {
                        let news_index = PyDict::new(py);
                        news_index.set_item("default", 0)?;
                        news_index.set_item("min", 0)?;
                        news_index.set_item("max", 99)?;
                        news_index
                    }),
                )?;
                required
            })?;
            Ok(dict.into())
        })
    }

    #[pyo3(name = "execute")]
    fn execute(&mut self, news_json: &str, news_index: i64) -> PyResult<NewsTuple> {
        let current_date = format_date(&Local::now());
        let fields = parse_news(news_json, news_index, current_date.clone()).unwrap_or_else(|e| {
            error!("[Parse_News_Content] Error: {e}");
            NewsFields::empty(current_date)
        });
        Ok(fields.into_tuple())
    }
}
