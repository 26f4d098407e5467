//! 沙箱文件工具
//!
//! SafeFs 绑定根目录，所有路径解析后必须仍在根下（禁止 ../ 逃逸）。
//! FileOpsTool 在其上提供 read / write / list 三个操作，
//! 文件系统错误一律折叠为描述性字符串。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::Tool;

/// 沙箱文件系统：绑定根目录并校验路径不越界
#[derive(Debug, Clone)]
pub struct SafeFs {
    root: PathBuf,
}

impl SafeFs {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let root = root.canonicalize().unwrap_or(root);
        Self { root }
    }

    /// 解析已存在的路径；不存在或越界返回 Err
    fn resolve_existing(&self, path: &str) -> Result<PathBuf, String> {
        let full = self.root.join(path.trim_start_matches("./"));
        let canonical = full
            .canonicalize()
            .map_err(|_| format!("File {} not found", path))?;
        if canonical.starts_with(&self.root) {
            Ok(canonical)
        } else {
            Err(format!("Path escapes the workspace: {}", path))
        }
    }

    /// 解析写入目标：文件可以不存在，但其父目录必须存在且在根下
    fn resolve_for_write(&self, path: &str) -> Result<PathBuf, String> {
        let full = self.root.join(path.trim_start_matches("./"));
        let name = full
            .file_name()
            .ok_or_else(|| format!("Invalid file path: {}", path))?
            .to_os_string();
        let parent = full.parent().unwrap_or(&self.root);
        let parent = parent
            .canonicalize()
            .map_err(|_| format!("Directory not found for: {}", path))?;
        if !parent.starts_with(&self.root) {
            return Err(format!("Path escapes the workspace: {}", path));
        }
        Ok(parent.join(name))
    }

    pub fn read_file(&self, path: &str) -> Result<String, String> {
        let resolved = self.resolve_existing(path)?;
        std::fs::read_to_string(&resolved).map_err(|e| format!("Read failed: {}", e))
    }

    pub fn write_file(&self, path: &str, content: &str) -> Result<(), String> {
        let resolved = self.resolve_for_write(path)?;
        std::fs::write(&resolved, content).map_err(|e| format!("Write failed: {}", e))
    }

    /// 列目录：空路径或 "." 表示根；隐藏项跳过，目录带 "/" 后缀，按名排序
    pub fn list_dir(&self, path: &str) -> Result<Vec<String>, String> {
        let base = if path.is_empty() || path == "." {
            self.root.clone()
        } else {
            self.resolve_existing(path)?
        };
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&base).map_err(|e| format!("List failed: {}", e))? {
            let entry = entry.map_err(|e| e.to_string())?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            let suffix = if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                "/"
            } else {
                ""
            };
            entries.push(format!("{}{}", name, suffix));
        }
        entries.sort();
        Ok(entries)
    }
}

/// File Operations 工具：read / write / list
pub struct FileOpsTool {
    fs: SafeFs,
}

impl FileOpsTool {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            fs: SafeFs::new(root),
        }
    }
}

#[async_trait]
impl Tool for FileOpsTool {
    fn name(&self) -> &str {
        "file_ops"
    }

    fn description(&self) -> &str {
        "Read, write, or list files inside the workspace. Args: {\"operation\": \"read\"|\"write\"|\"list\", \"path\": \"...\", \"content\": \"(write only)\"}"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "operation": {
                    "type": "string",
                    "enum": ["read", "write", "list"],
                    "description": "Operation to perform"
                },
                "path": { "type": "string", "description": "File or directory path relative to the workspace" },
                "content": { "type": "string", "description": "Content to write (write operation only)" }
            },
            "required": ["operation"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let operation = args.get("operation").and_then(|v| v.as_str()).unwrap_or("");
        let path = args.get("path").and_then(|v| v.as_str()).unwrap_or("");
        tracing::debug!(operation = %operation, path = %path, "file_ops execute");

        match operation {
            "read" => match self.fs.read_file(path) {
                Ok(content) => Ok(content),
                // 未找到不是失败：作为普通答复返回，模型可据此继续
                Err(e) if e.contains("not found") => Ok(e),
                Err(e) => Err(e),
            },
            "write" => {
                let content = args.get("content").and_then(|v| v.as_str()).unwrap_or("");
                self.fs.write_file(path, content)?;
                Ok(format!("Content written to {}", path))
            }
            "list" => Ok(self.fs.list_dir(path)?.join("\n")),
            _ => Err("Invalid operation. Use 'read', 'write', or 'list'".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (tempfile::TempDir, FileOpsTool) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("note.txt"), "hello file").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let tool = FileOpsTool::new(dir.path());
        (dir, tool)
    }

    #[tokio::test]
    async fn test_read_existing_file() {
        let (_dir, tool) = fixture();
        let out = tool
            .execute(serde_json::json!({"operation": "read", "path": "note.txt"}))
            .await
            .unwrap();
        assert_eq!(out, "hello file");
    }

    #[tokio::test]
    async fn test_read_missing_file_is_a_message_not_an_error() {
        let (_dir, tool) = fixture();
        let out = tool
            .execute(serde_json::json!({"operation": "read", "path": "ghost.txt"}))
            .await
            .unwrap();
        assert!(out.contains("not found"));
    }

    #[tokio::test]
    async fn test_write_then_read_back() {
        let (_dir, tool) = fixture();
        let out = tool
            .execute(serde_json::json!({"operation": "write", "path": "new.txt", "content": "data"}))
            .await
            .unwrap();
        assert_eq!(out, "Content written to new.txt");
        let read = tool
            .execute(serde_json::json!({"operation": "read", "path": "new.txt"}))
            .await
            .unwrap();
        assert_eq!(read, "data");
    }

    #[tokio::test]
    async fn test_list_defaults_to_root() {
        let (_dir, tool) = fixture();
        let out = tool
            .execute(serde_json::json!({"operation": "list"}))
            .await
            .unwrap();
        let entries: Vec<&str> = out.lines().collect();
        assert_eq!(entries, vec!["note.txt", "sub/"]);
    }

    #[tokio::test]
    async fn test_path_escape_is_rejected() {
        let (_dir, tool) = fixture();
        let err = tool
            .execute(serde_json::json!({"operation": "write", "path": "../escape.txt", "content": "x"}))
            .await
            .unwrap_err();
        assert!(err.contains("workspace"), "got: {err}");
    }

    #[tokio::test]
    async fn test_invalid_operation() {
        let (_dir, tool) = fixture();
        let err = tool
            .execute(serde_json::json!({"operation": "delete", "path": "note.txt"}))
            .await
            .unwrap_err();
        assert!(err.contains("Invalid operation"));
    }
}
