//! 错误处理

#[allow(unused)]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // 标准库错误处理
    #[error("io error, {0}")]
    Io(std::io::Error),
    #[error("system time error, {0}")]
    SystemTimeError(#[from] std::time::SystemTimeError),
    #[error("strum error, {0}")]
    ParseEnumString(String),

    #[error("serde json error, {0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("http error, {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("url parse error, {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("xml error, {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("invalid xml, {0}")]
    InvalidXml(String),

    #[error("news api error, {0}")]
    NewsApi(String),
    #[error("feishu api error, {0}")]
    Feishu(String),
    #[error("missing credential, {0}")]
    MissingCredential(String),
    #[error("invalid url, {0}")]
    InvalidUrl(String),
    #[error("table not found, {0}")]
    TableNotFound(String),
    #[error("table has no records, {0}")]
    EmptyTable(String),

    #[error("file not found, {0}")]
    FileNotFound(String),
    #[error("invalid path, {0}")]
    InvalidPath(String),
    #[error("invalid parameter, {0}")]
    InvalidParameter(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
