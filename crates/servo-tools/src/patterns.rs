//! # 位姿库
//!
//! 命名的 6 关节位姿，分两类：
//!
//! - **内置**：固定内容，只读，不可删除，不可被自定义位姿覆盖
//! - **自定义**：操作员保存的当前位姿，可删除，可导出/导入 JSON 文件
//!
//! ## 文件格式
//!
//! UTF-8 JSON 对象，键为位姿名，值为 6 个 0-180 的整数：
//!
//! ```json
//! {
//!   "Wave": [90, 120, 60, 90, 90, 45]
//! }
//! ```
//!
//! ## 导入合并策略
//!
//! - 同名自定义位姿被覆盖（后写入者胜）
//! - 内置名称静默跳过，不报错
//! - 任何一项格式错误则整个导入失败，不合并任何内容

use servo_protocol::{Angle, JOINT_COUNT, Pose};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// 内置位姿（名称，关节 1-6 角度）
const BUILTIN_PATTERNS: [(&str, [u8; JOINT_COUNT]); 5] = [
    ("Home", [90, 90, 90, 90, 90, 90]),
    ("Rest", [90, 45, 45, 90, 90, 90]),
    ("ReachForward", [90, 60, 120, 90, 90, 45]),
    ("ReachUp", [90, 135, 45, 90, 90, 45]),
    ("Pick", [90, 60, 90, 120, 90, 90]),
];

/// 演示序列
pub const DEMO_SEQUENCE: [&str; 6] = ["Home", "ReachForward", "Pick", "ReachUp", "Rest", "Home"];

/// 位姿库错误
#[derive(Error, Debug)]
pub enum PatternError {
    /// 名称与内置位姿冲突、为空，或已存在同名自定义位姿
    #[error("Pattern name conflict for '{name}': {reason}")]
    NameConflict { name: String, reason: &'static str },

    /// 内置位姿不可删除
    #[error("Pattern '{name}' is built-in and cannot be modified")]
    ProtectedName { name: String },

    #[error("Pattern '{name}' not found")]
    NotFound { name: String },

    #[error("Pattern file I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 文件内容不是合法的位姿映射
    #[error("Invalid pattern data: {0}")]
    Parse(String),
}

/// 位姿类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Builtin,
    Custom,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::Builtin => write!(f, "built-in"),
            PatternKind::Custom => write!(f, "custom"),
        }
    }
}

/// 命名位姿
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub name: String,
    pub pose: Pose,
    pub kind: PatternKind,
}

fn builtin_pose(degrees: [u8; JOINT_COUNT]) -> Pose {
    // 内置表的值都在 0-180 内
    Pose::new(degrees.map(|d| Angle::clamped(d as i32)))
}

/// 位姿库
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternStore {
    custom: BTreeMap<String, Pose>,
}

impl PatternStore {
    /// 创建空的自定义位姿库
    pub fn new() -> Self {
        Self::default()
    }

    /// 从文件创建；文件不存在时返回空库
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PatternError> {
        let mut store = Self::new();
        if path.as_ref().exists() {
            store.import(path)?;
        }
        Ok(store)
    }

    /// 内置位姿（固定顺序）
    pub fn list_builtin() -> Vec<(&'static str, Pose)> {
        BUILTIN_PATTERNS
            .iter()
            .map(|(name, degrees)| (*name, builtin_pose(*degrees)))
            .collect()
    }

    pub fn is_builtin(name: &str) -> bool {
        BUILTIN_PATTERNS.iter().any(|(n, _)| *n == name)
    }

    /// 所有位姿：内置在前（固定顺序），自定义在后（按名称排序）
    pub fn list(&self) -> Vec<Pattern> {
        let builtin = Self::list_builtin().into_iter().map(|(name, pose)| Pattern {
            name: name.to_string(),
            pose,
            kind: PatternKind::Builtin,
        });
        let custom = self.custom.iter().map(|(name, pose)| Pattern {
            name: name.clone(),
            pose: *pose,
            kind: PatternKind::Custom,
        });
        builtin.chain(custom).collect()
    }

    /// 查找位姿：先内置，后自定义
    pub fn get(&self, name: &str) -> Option<Pose> {
        let name = name.trim();
        BUILTIN_PATTERNS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, degrees)| builtin_pose(*degrees))
            .or_else(|| self.custom.get(name).copied())
    }

    /// 自定义位姿数量
    pub fn len(&self) -> usize {
        self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.custom.is_empty()
    }

    /// 保存自定义位姿
    ///
    /// 名称先去除首尾空白。不支持覆盖：同名自定义位姿已存在时也返回 `NameConflict`。
    ///
    /// # 错误
    /// - `PatternError::NameConflict`: 名称为空、与内置位姿同名或已存在
    pub fn save(&mut self, name: &str, pose: Pose) -> Result<(), PatternError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PatternError::NameConflict {
                name: name.to_string(),
                reason: "name is empty",
            });
        }
        if Self::is_builtin(name) {
            return Err(PatternError::NameConflict {
                name: name.to_string(),
                reason: "shadows a built-in pattern",
            });
        }
        if self.custom.contains_key(name) {
            return Err(PatternError::NameConflict {
                name: name.to_string(),
                reason: "a custom pattern with this name already exists",
            });
        }
        debug!("Saved pattern '{}': {}", name, pose);
        self.custom.insert(name.to_string(), pose);
        Ok(())
    }

    /// 删除自定义位姿，返回被删除的位姿
    ///
    /// # 错误
    /// - `PatternError::ProtectedName`: 内置位姿
    /// - `PatternError::NotFound`: 不存在
    pub fn delete(&mut self, name: &str) -> Result<Pose, PatternError> {
        let name = name.trim();
        if Self::is_builtin(name) {
            return Err(PatternError::ProtectedName {
                name: name.to_string(),
            });
        }
        self.custom.remove(name).ok_or_else(|| PatternError::NotFound {
            name: name.to_string(),
        })
    }

    /// 所有自定义位姿序列化为 JSON（2 空格缩进）
    pub fn to_json(&self) -> Result<String, PatternError> {
        serde_json::to_string_pretty(&self.custom).map_err(|e| PatternError::Parse(e.to_string()))
    }

    /// 合并 JSON 内容，返回合并的条目数
    ///
    /// 先完整校验，校验通过后才合并。
    pub fn merge_json(&mut self, json: &str) -> Result<usize, PatternError> {
        let loaded: BTreeMap<String, Pose> =
            serde_json::from_str(json).map_err(|e| PatternError::Parse(e.to_string()))?;

        let mut accepted = BTreeMap::new();
        for (name, pose) in loaded {
            let name = name.trim();
            if name.is_empty() {
                warn!("Skipping pattern with empty name on import");
                continue;
            }
            if Self::is_builtin(name) {
                warn!("Skipping built-in pattern '{}' on import", name);
                continue;
            }
            // 去除首尾空白后重名，无法确定保留哪一个
            if accepted.insert(name.to_string(), pose).is_some() {
                return Err(PatternError::Parse(format!(
                    "duplicate pattern name '{}' after trimming whitespace",
                    name
                )));
            }
        }

        let merged = accepted.len();
        self.custom.extend(accepted);
        Ok(merged)
    }

    /// 导出所有自定义位姿，返回写入的条目数
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<usize, PatternError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| PatternError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Exported {} patterns to {}", self.custom.len(), path.display());
        Ok(self.custom.len())
    }

    /// 从文件导入并合并，返回合并的条目数
    pub fn import<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, PatternError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| PatternError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let merged = self.merge_json(&json)?;
        info!("Imported {} patterns from {}", merged, path.display());
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(d: [i32; 6]) -> Pose {
        Pose::from_degrees(d).unwrap()
    }

    #[test]
    fn test_builtin_content() {
        let builtin = PatternStore::list_builtin();
        let names: Vec<_> = builtin.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["Home", "Rest", "ReachForward", "ReachUp", "Pick"]);

        let store = PatternStore::new();
        assert_eq!(store.get("Home").unwrap().degrees(), [90; 6]);
        assert_eq!(store.get("Rest").unwrap().degrees(), [90, 45, 45, 90, 90, 90]);
        assert_eq!(store.get("ReachForward").unwrap().degrees(), [90, 60, 120, 90, 90, 45]);
        assert_eq!(store.get("ReachUp").unwrap().degrees(), [90, 135, 45, 90, 90, 45]);
        assert_eq!(store.get("Pick").unwrap().degrees(), [90, 60, 90, 120, 90, 90]);
    }

    #[test]
    fn test_demo_sequence_uses_builtins() {
        for name in DEMO_SEQUENCE {
            assert!(PatternStore::is_builtin(name), "{}", name);
        }
    }

    #[test]
    fn test_save_rejects_builtin_and_empty() {
        let mut store = PatternStore::new();
        assert!(matches!(
            store.save("Home", Pose::CENTER),
            Err(PatternError::NameConflict { .. })
        ));
        assert!(matches!(
            store.save("  Home ", Pose::CENTER),
            Err(PatternError::NameConflict { .. })
        ));
        assert!(matches!(
            store.save("   ", Pose::CENTER),
            Err(PatternError::NameConflict { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_trims_and_rejects_duplicate() {
        let mut store = PatternStore::new();
        store.save("  Wave ", pose([1, 2, 3, 4, 5, 6])).unwrap();
        assert_eq!(store.get("Wave"), Some(pose([1, 2, 3, 4, 5, 6])));

        let err = store.save("Wave", Pose::CENTER).unwrap_err();
        assert!(matches!(err, PatternError::NameConflict { .. }));
        assert_eq!(store.get("Wave"), Some(pose([1, 2, 3, 4, 5, 6])));
    }

    #[test]
    fn test_delete() {
        let mut store = PatternStore::new();
        assert!(matches!(
            store.delete("Home"),
            Err(PatternError::ProtectedName { .. })
        ));
        assert!(matches!(
            store.delete("Missing"),
            Err(PatternError::NotFound { .. })
        ));

        store.save("Wave", Pose::CENTER).unwrap();
        assert_eq!(store.delete("Wave").unwrap(), Pose::CENTER);
        assert!(store.get("Wave").is_none());
    }

    #[test]
    fn test_list_order() {
        let mut store = PatternStore::new();
        store.save("Zeta", Pose::CENTER).unwrap();
        store.save("Alpha", Pose::CENTER).unwrap();

        let list = store.list();
        assert_eq!(list.len(), 7);
        assert_eq!(list[0].name, "Home");
        assert_eq!(list[0].kind, PatternKind::Builtin);
        assert_eq!(list[5].name, "Alpha");
        assert_eq!(list[6].name, "Zeta");
        assert_eq!(list[6].kind, PatternKind::Custom);
    }

    #[test]
    fn test_merge_last_write_wins_and_skips_builtin() {
        let mut store = PatternStore::new();
        store.save("Wave", Pose::CENTER).unwrap();

        let merged = store
            .merge_json(r#"{"Wave": [1, 2, 3, 4, 5, 6], "Home": [0, 0, 0, 0, 0, 0]}"#)
            .unwrap();
        assert_eq!(merged, 1);
        assert_eq!(store.get("Wave"), Some(pose([1, 2, 3, 4, 5, 6])));
        assert_eq!(store.get("Home").unwrap().degrees(), [90; 6]);
    }

    #[test]
    fn test_merge_rejects_invalid_entries_atomically() {
        let cases = [
            r#"{"Good": [1, 2, 3, 4, 5, 6], "Short": [1, 2, 3, 4, 5]}"#,
            r#"{"Good": [1, 2, 3, 4, 5, 6], "High": [1, 2, 3, 4, 5, 181]}"#,
            r#"{"Good": [1, 2, 3, 4, 5, 6], "Neg": [1, 2, 3, 4, 5, -1]}"#,
            r#"{"Good": [1, 2, 3, 4, 5, 6], "Float": [1, 2, 3, 4, 5, 6.5]}"#,
            r#"{"Good": [1, 2, 3, 4, 5, 6], "Text": "nope"}"#,
            r#"[1, 2, 3]"#,
            r#"{"Good": "#,
        ];
        for json in cases {
            let mut store = PatternStore::new();
            let err = store.merge_json(json).unwrap_err();
            assert!(matches!(err, PatternError::Parse(_)), "{} -> {:?}", json, err);
            assert!(store.is_empty(), "{}", json);
        }
    }

    #[test]
    fn test_merge_rejects_names_equal_after_trimming() {
        let mut store = PatternStore::new();
        store.save("Keep", Pose::CENTER).unwrap();

        let err = store
            .merge_json(r#"{"Wave": [1, 2, 3, 4, 5, 6], " Wave ": [6, 5, 4, 3, 2, 1]}"#)
            .unwrap_err();
        assert!(matches!(err, PatternError::Parse(ref msg) if msg.contains("Wave")));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("Wave"), None);
    }

    #[test]
    fn test_merge_count_matches_stored_entries() {
        let mut store = PatternStore::new();
        let merged = store
            .merge_json(r#"{" Wave": [1, 2, 3, 4, 5, 6], "Nod": [9, 9, 9, 9, 9, 9]}"#)
            .unwrap();
        assert_eq!(merged, 2);
        assert_eq!(store.len(), merged);
        assert!(store.get("Wave").is_some());
    }

    #[test]
    fn test_to_json_is_pretty() {
        let mut store = PatternStore::new();
        store.save("Wave", pose([90, 120, 60, 90, 90, 45])).unwrap();
        let json = store.to_json().unwrap();
        assert!(json.starts_with("{\n  \"Wave\": [\n    90,"), "{}", json);
    }
}
