//! 文件夹路径
//!
//! ComfyUI 以自身根目录作为工作目录启动, 输出目录为 `<base>/output`.

use std::path::{Path, PathBuf};

use crate::error::Error;

/// 飞书表格导出的 XML 子目录
pub const XML_OUTPUT_FOLDER: &str = "feishu_xml_output";

/// 文件夹路径配置结构体
#[derive(Debug, Clone)]
pub struct FolderPaths {
    output_directory: PathBuf,
}

impl FolderPaths {
    /// 创建新的FolderPaths实例, 未指定时使用当前工作目录
    pub fn new(base_directory: Option<&Path>) -> Result<Self, Error> {
        let base_path = match base_directory {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir()?,
        };

        Ok(Self {
            output_directory: base_path.join("output"),
        })
    }

    /// XML 文件的保存目录
    pub fn xml_output_directory(&self) -> PathBuf {
        self.output_directory.join(XML_OUTPUT_FOLDER)
    }

    /// 解析节点传入的路径
    ///
    /// 绝对路径原样返回, 相对路径基于输出目录
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.output_directory.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_paths_initialization() -> anyhow::Result<()> {
        let folder_paths = FolderPaths::new(None)?;
        let cwd = std::env::current_dir()?;
        assert_eq!(
            folder_paths.xml_output_directory(),
            cwd.join("output").join(XML_OUTPUT_FOLDER)
        );
        Ok(())
    }

    #[test]
    fn test_resolve() -> anyhow::Result<()> {
        let folder_paths = FolderPaths::new(Some(Path::new("/opt/ComfyUI")))?;
        assert_eq!(
            folder_paths.resolve("feishu_xml_output/scenes_20250101000000.xml"),
            PathBuf::from("/opt/ComfyUI/output/feishu_xml_output/scenes_20250101000000.xml")
        );
        assert_eq!(
            folder_paths.resolve("/tmp/scenes.xml"),
            PathBuf::from("/tmp/scenes.xml")
        );
        assert_eq!(
            folder_paths.xml_output_directory(),
            PathBuf::from("/opt/ComfyUI/output/feishu_xml_output")
        );
        Ok(())
    }
}
