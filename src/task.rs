use serde::{Deserialize, Serialize};
use std::path::Path;

/// A `combine-files` job as stored in a task file.
#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct CombineTask {
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl CombineTask {
    pub fn load(path: Option<&str>) -> anyhow::Result<Option<Self>> {
        if let Some(path) = path {
            let contents = std::fs::read_to_string(path)?;
            let task: CombineTask = serde_json::from_str(&contents)?;
            Ok(Some(task))
        } else {
            Ok(None)
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_fields_use_defaults() {
        let task: CombineTask = serde_json::from_str(r#"{ "output": "book.m4b" }"#).unwrap();
        assert!(task.files.is_empty());
        assert_eq!(task.output.as_deref(), Some("book.m4b"));
        assert_eq!(task.bitrate, None);
    }

    #[test]
    fn saved_task_loads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("task.json");
        let task = CombineTask {
            files: vec!["01.mp3".to_string(), "02.mp3".to_string()],
            output: Some("book.m4b".to_string()),
            bitrate: Some("64k".to_string()),
            title: None,
            author: Some("Jane Doe".to_string()),
        };

        task.save(&path).unwrap();
        let json = std::fs::read_to_string(&path).unwrap();
        assert!(!json.contains("title"));

        let loaded = CombineTask::load(path.to_str()).unwrap().unwrap();
        assert_eq!(loaded, task);
    }

    #[test]
    fn no_path_means_no_task() {
        assert!(CombineTask::load(None).unwrap().is_none());
    }
}
