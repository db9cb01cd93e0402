//! Session Manager Port - 会话生命周期管理
//!
//! 定义会话管理的抽象接口与工作区布局，具体实现在 infrastructure/session 层

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Session Manager 错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Invalid session id: {0}")]
    InvalidId(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 工作区内的固定子目录骨架
///
/// temp 子树存放中间产物，static 子树存放最终产物，csv 存放上传的清单
pub const WORKSPACE_SKELETON: &[&str] = &[
    "temp",
    "temp/split",
    "temp/output",
    "static/video_dl",
    "static/audio_dl",
    "static/output",
    "csv",
];

/// 会话工作区
///
/// 不变量: 目录路径由 根目录 + 会话 ID 的纯函数拼接唯一确定，
/// 即使内存记录丢失也能定位到磁盘上的目录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    id: String,
    root: PathBuf,
}

impl Workspace {
    pub fn new(base_dir: &Path, id: impl Into<String>) -> Self {
        let id = id.into();
        let root = base_dir.join(&id);
        Self { id, root }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// 工作区根目录
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 未处理素材目录
    pub fn temp_dir(&self) -> PathBuf {
        self.root.join("temp")
    }

    /// 裁剪后待拼接的片段目录
    pub fn split_dir(&self) -> PathBuf {
        self.root.join("temp/split")
    }

    /// 中间输出目录
    pub fn temp_output_dir(&self) -> PathBuf {
        self.root.join("temp/output")
    }

    /// 最终视频产物目录
    pub fn video_dl_dir(&self) -> PathBuf {
        self.root.join("static/video_dl")
    }

    /// 最终音频产物目录
    pub fn audio_dl_dir(&self) -> PathBuf {
        self.root.join("static/audio_dl")
    }

    /// 最终混音产物目录
    pub fn output_dir(&self) -> PathBuf {
        self.root.join("static/output")
    }

    /// 上传清单暂存目录
    pub fn manifest_dir(&self) -> PathBuf {
        self.root.join("csv")
    }

    /// 瞬态子树（clear_transient 的作用范围，目录壳保留）
    pub fn transient_dirs(&self) -> Vec<PathBuf> {
        vec![self.temp_dir()]
    }

    /// 输出子树（clear_outputs 的作用范围，目录壳保留）
    pub fn output_dirs(&self) -> Vec<PathBuf> {
        vec![
            self.video_dl_dir(),
            self.audio_dl_dir(),
            self.output_dir(),
            self.temp_output_dir(),
        ]
    }

    /// 按检索顺序返回一个文件名可能出现的产物路径
    ///
    /// 只检索三个最终产物目录，顺序固定，第一个命中者胜出
    pub fn artifact_candidates(&self, filename: &str) -> Vec<PathBuf> {
        vec![
            self.video_dl_dir().join(filename),
            self.audio_dl_dir().join(filename),
            self.output_dir().join(filename),
        ]
    }
}

/// 会话记录快照（供诊断接口使用）
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

/// Session Manager Port
///
/// 并发约束: 所有方法都可能被多个请求任务与后台清扫任务同时调用；
/// 注册表锁只保护内存簿记，文件系统操作在锁外进行
#[async_trait]
pub trait SessionManagerPort: Send + Sync {
    /// 创建新会话: 分配 ID、建立目录骨架、插入注册表记录
    async fn create(&self) -> Result<Workspace, SessionError>;

    /// 解析会话: 命中则刷新最后访问时间；
    /// 未命中但磁盘上存在合法目录时惰性重建记录（lazy rehydration）
    async fn resolve(&self, id: &str) -> Result<Workspace, SessionError>;

    /// 仅刷新最后访问时间
    fn touch(&self, id: &str);

    /// 清空瞬态子树的文件内容（保留目录壳），刷新最后访问时间
    async fn clear_transient(&self, id: &str) -> Result<(), SessionError>;

    /// 清空输出子树的文件内容（保留目录壳），刷新最后访问时间
    async fn clear_outputs(&self, id: &str) -> Result<(), SessionError>;

    /// 删除会话: 移除注册表记录并递归删除整个工作区；
    /// 注册表无记录但目录存在时也要成功（孤儿清理路径）
    ///
    /// 返回是否实际发生了删除
    async fn delete(&self, id: &str) -> bool;

    /// 在锁内快照所有空闲超时的会话 ID
    fn expired_sessions(&self, idle_timeout_secs: u64) -> Vec<String>;

    /// 扫描磁盘上未被注册表跟踪的合法会话目录，
    /// 空闲超时者直接删除，返回删除数量
    async fn sweep_orphans(&self, idle_timeout_secs: u64) -> usize;

    /// 获取指定会话的记录快照
    fn get_session(&self, id: &str) -> Option<Session>;

    /// 获取所有会话 ID
    fn list_sessions(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_path_is_deterministic() {
        let base = Path::new("/data/sessions");
        let a = Workspace::new(base, "abc");
        let b = Workspace::new(base, "abc");
        assert_eq!(a.root(), b.root());
        assert_eq!(a.root(), Path::new("/data/sessions/abc"));
    }

    #[test]
    fn test_artifact_search_order() {
        let ws = Workspace::new(Path::new("/s"), "x");
        let candidates = ws.artifact_candidates("mix.wav");
        assert_eq!(candidates[0], Path::new("/s/x/static/video_dl/mix.wav"));
        assert_eq!(candidates[1], Path::new("/s/x/static/audio_dl/mix.wav"));
        assert_eq!(candidates[2], Path::new("/s/x/static/output/mix.wav"));
    }

    #[test]
    fn test_output_dirs_include_temp_output() {
        let ws = Workspace::new(Path::new("/s"), "x");
        assert!(ws.output_dirs().contains(&ws.temp_output_dir()));
        assert!(!ws.output_dirs().contains(&ws.split_dir()));
    }
}
