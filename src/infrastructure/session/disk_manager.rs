//! Disk Session Manager - 磁盘承载的会话注册表
//!
//! 内存注册表 + 每会话一棵工作区目录树。注册表由单把互斥锁保护，
//! 锁只覆盖内存簿记，所有文件系统操作都在锁外进行；
//! 进程重启后通过启动扫描重建记录，注册表丢失时按需惰性重建

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;
use tokio::fs;
use uuid::Uuid;

use crate::application::ports::{
    Session, SessionError, SessionManagerPort, Workspace, WORKSPACE_SKELETON,
};

/// 访问时间标记文件
///
/// 每次成功解析都会重写，让磁盘证据跟上注册表状态，
/// 重建时的时间戳推断因此更接近真实访问时间
const ACCESS_MARKER: &str = ".last-access";

/// 注册表记录
#[derive(Debug, Clone)]
struct SessionEntry {
    created_at: DateTime<Utc>,
    last_accessed: DateTime<Utc>,
}

/// 磁盘承载的会话管理器
pub struct DiskSessionManager {
    base_dir: PathBuf,
    sessions: Mutex<HashMap<String, SessionEntry>>,
}

/// 会话 ID 必须是标准连字符形式的 UUID（36 字符），
/// 这同时保证了它可以安全地用作目录名
pub fn is_valid_session_id(id: &str) -> bool {
    id.len() == 36 && Uuid::try_parse(id).is_ok()
}

impl DiskSessionManager {
    /// 创建管理器: 确保根目录存在并从磁盘重建既有会话
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, SessionError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| SessionError::IoError(e.to_string()))?;

        let manager = Self {
            base_dir,
            sessions: Mutex::new(HashMap::new()),
        };
        manager.load_existing_sessions().await;

        Ok(manager)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// 锁中毒时直接接管内部数据: 注册表只存时间戳，不存在半更新状态
    fn registry(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn workspace(&self, id: &str) -> Workspace {
        Workspace::new(&self.base_dir, id)
    }

    /// 启动扫描: 枚举根目录的直接子项，重建 UUID 形目录的注册表记录
    ///
    /// 单个会话的扫描失败只跳过该会话，非法命名的条目静默排除
    async fn load_existing_sessions(&self) {
        tracing::info!(base_dir = ?self.base_dir, "Loading existing sessions from disk");

        let mut entries = match fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(error = %e, "Failed to scan session base directory");
                return;
            }
        };

        let mut loaded = 0usize;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let id = entry.file_name().to_string_lossy().to_string();
            if !is_valid_session_id(&id) {
                continue;
            }
            match entry.file_type().await {
                Ok(ft) if ft.is_dir() => {}
                _ => continue,
            }

            match Self::timestamps_from_disk(&entry.path()).await {
                Ok((created_at, last_accessed)) => {
                    self.registry().insert(
                        id,
                        SessionEntry {
                            created_at,
                            last_accessed,
                        },
                    );
                    loaded += 1;
                }
                Err(e) => {
                    tracing::warn!(session_id = %id, error = %e, "Failed to load session, skipping");
                }
            }
        }

        tracing::info!(count = loaded, "Existing sessions loaded");
    }

    /// 从目录元数据推断时间戳:
    /// 创建时间取目录自身元数据，最后访问时间取树内最新修改时间
    async fn timestamps_from_disk(
        dir: &Path,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), std::io::Error> {
        let meta = fs::metadata(dir).await?;
        let created = meta.created().or_else(|_| meta.modified())?;
        let last_modified = Self::latest_modified_time(dir).await?;
        Ok((DateTime::from(created), DateTime::from(last_modified)))
    }

    /// 整棵树的最新修改时间，目录自身的修改时间是下界
    async fn latest_modified_time(dir: &Path) -> Result<SystemTime, std::io::Error> {
        let mut latest = fs::metadata(dir).await?.modified()?;

        let mut stack = vec![dir.to_path_buf()];
        while let Some(current) = stack.pop() {
            let mut entries = match fs::read_dir(&current).await {
                Ok(entries) => entries,
                // 扫描中途被并发删除时跳过该子树
                Err(_) => continue,
            };

            while let Ok(Some(entry)) = entries.next_entry().await {
                if let Ok(meta) = entry.metadata().await {
                    if let Ok(modified) = meta.modified() {
                        if modified > latest {
                            latest = modified;
                        }
                    }
                    if meta.is_dir() {
                        stack.push(entry.path());
                    }
                }
            }
        }

        Ok(latest)
    }

    /// 重写访问标记文件，失败忽略（仅是磁盘侧的最佳努力提示）
    async fn touch_marker(workspace: &Workspace) {
        let marker = workspace.root().join(ACCESS_MARKER);
        let _ = fs::write(&marker, Utc::now().to_rfc3339()).await;
    }

    /// 递归删除目录下的文件内容，保留目录壳
    ///
    /// 单个文件的删除失败只记日志并继续: 并发写入方可能正拿着文件
    async fn remove_files_under(dir: &Path, session_id: &str) {
        let mut stack = vec![dir.to_path_buf()];
        while let Some(current) = stack.pop() {
            let mut entries = match fs::read_dir(&current).await {
                Ok(entries) => entries,
                Err(e) => {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(
                            session_id = %session_id,
                            dir = ?current,
                            error = %e,
                            "Failed to list directory during clear"
                        );
                    }
                    continue;
                }
            };

            while let Ok(Some(entry)) = entries.next_entry().await {
                let path = entry.path();
                match entry.file_type().await {
                    Ok(ft) if ft.is_dir() => stack.push(path),
                    Ok(_) => {
                        if let Err(e) = fs::remove_file(&path).await {
                            tracing::warn!(
                                session_id = %session_id,
                                path = ?path,
                                error = %e,
                                "Failed to remove file during clear"
                            );
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            session_id = %session_id,
                            path = ?path,
                            error = %e,
                            "Failed to stat entry during clear"
                        );
                    }
                }
            }
        }
    }

    /// 清空指定子树并刷新最后访问时间（clear_transient/clear_outputs 共用）
    async fn clear_dirs(&self, id: &str, dirs: Vec<PathBuf>) -> Result<(), SessionError> {
        // 解析保证了惰性重建与访问时间刷新
        let _ = self.resolve(id).await?;

        for dir in dirs {
            Self::remove_files_under(&dir, id).await;
        }

        Ok(())
    }

    /// 测试辅助: 把最后访问时间回拨指定秒数
    #[cfg(test)]
    pub(crate) fn backdate(&self, id: &str, secs: i64) {
        if let Some(entry) = self.registry().get_mut(id) {
            entry.last_accessed = entry.last_accessed - Duration::seconds(secs);
        }
    }
}

#[async_trait]
impl SessionManagerPort for DiskSessionManager {
    async fn create(&self) -> Result<Workspace, SessionError> {
        // 128 位随机 ID 实际不会撞，但仍对注册表与磁盘做保守查重
        let id = loop {
            let candidate = Uuid::new_v4().to_string();
            let in_registry = self.registry().contains_key(&candidate);
            let on_disk = fs::try_exists(self.workspace(&candidate).root())
                .await
                .unwrap_or(false);
            if !in_registry && !on_disk {
                break candidate;
            }
        };

        let workspace = self.workspace(&id);

        // 目录创建幂等，重复创建尝试不报错
        for sub in WORKSPACE_SKELETON {
            fs::create_dir_all(workspace.root().join(sub))
                .await
                .map_err(|e| SessionError::IoError(e.to_string()))?;
        }

        let now = Utc::now();
        self.registry().insert(
            id.clone(),
            SessionEntry {
                created_at: now,
                last_accessed: now,
            },
        );

        tracing::info!(session_id = %id, "Session created");
        Ok(workspace)
    }

    async fn resolve(&self, id: &str) -> Result<Workspace, SessionError> {
        // 命中路径: 锁内只做时间戳刷新
        let hit = {
            let mut registry = self.registry();
            match registry.get_mut(id) {
                Some(entry) => {
                    entry.last_accessed = Utc::now();
                    true
                }
                None => false,
            }
        };

        if hit {
            let workspace = self.workspace(id);
            Self::touch_marker(&workspace).await;
            return Ok(workspace);
        }

        // 惰性重建: 注册表没有记录，但磁盘上存在合法目录
        if !is_valid_session_id(id) {
            return Err(SessionError::InvalidId(id.to_string()));
        }

        let workspace = self.workspace(id);
        if !fs::try_exists(workspace.root()).await.unwrap_or(false) {
            return Err(SessionError::NotFound(id.to_string()));
        }

        let created_at = match fs::metadata(workspace.root()).await {
            Ok(meta) => DateTime::from(meta.created().or_else(|_| meta.modified()).map_err(
                |e| SessionError::IoError(e.to_string()),
            )?),
            Err(e) => return Err(SessionError::IoError(e.to_string())),
        };

        {
            let mut registry = self.registry();
            // 与并发的同 ID 解析竞争时保留已有记录
            let entry = registry.entry(id.to_string()).or_insert(SessionEntry {
                created_at,
                last_accessed: Utc::now(),
            });
            entry.last_accessed = Utc::now();
        }

        Self::touch_marker(&workspace).await;
        tracing::info!(session_id = %id, "Rehydrated lost session");
        Ok(workspace)
    }

    fn touch(&self, id: &str) {
        if let Some(entry) = self.registry().get_mut(id) {
            entry.last_accessed = Utc::now();
        }
    }

    async fn clear_transient(&self, id: &str) -> Result<(), SessionError> {
        let dirs = self.workspace(id).transient_dirs();
        self.clear_dirs(id, dirs).await?;
        tracing::debug!(session_id = %id, "Transient subtree cleared");
        Ok(())
    }

    async fn clear_outputs(&self, id: &str) -> Result<(), SessionError> {
        let dirs = self.workspace(id).output_dirs();
        self.clear_dirs(id, dirs).await?;
        tracing::debug!(session_id = %id, "Output subtrees cleared");
        Ok(())
    }

    async fn delete(&self, id: &str) -> bool {
        // 非法 ID 不可能有记录，也绝不能拼进路径
        if !is_valid_session_id(id) {
            return false;
        }

        let had_record = self.registry().remove(id).is_some();

        let workspace = self.workspace(id);
        let removed_dir = match fs::remove_dir_all(workspace.root()).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!(session_id = %id, error = %e, "Failed to delete session directory");
                false
            }
        };

        if had_record || removed_dir {
            tracing::info!(
                session_id = %id,
                had_record = had_record,
                "Session deleted"
            );
        }

        had_record || removed_dir
    }

    fn expired_sessions(&self, idle_timeout_secs: u64) -> Vec<String> {
        let now = Utc::now();
        let timeout = Duration::seconds(idle_timeout_secs as i64);

        self.registry()
            .iter()
            .filter_map(|(id, entry)| {
                if now - entry.last_accessed > timeout {
                    Some(id.clone())
                } else {
                    None
                }
            })
            .collect()
    }

    async fn sweep_orphans(&self, idle_timeout_secs: u64) -> usize {
        let mut entries = match fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                // 本轮贡献零个候选，不让清扫循环崩掉
                tracing::error!(error = %e, "Failed to scan base directory for orphans");
                return 0;
            }
        };

        let now = Utc::now();
        let timeout = Duration::seconds(idle_timeout_secs as i64);
        let mut removed = 0usize;

        while let Ok(Some(entry)) = entries.next_entry().await {
            let id = entry.file_name().to_string_lossy().to_string();
            if !is_valid_session_id(&id) {
                continue;
            }
            match entry.file_type().await {
                Ok(ft) if ft.is_dir() => {}
                _ => continue,
            }
            if self.registry().contains_key(&id) {
                continue;
            }

            let last_modified = match Self::latest_modified_time(&entry.path()).await {
                Ok(t) => DateTime::<Utc>::from(t),
                Err(e) => {
                    tracing::warn!(session_id = %id, error = %e, "Failed to scan orphan directory");
                    continue;
                }
            };

            if now - last_modified > timeout {
                match fs::remove_dir_all(entry.path()).await {
                    Ok(()) => {
                        tracing::info!(
                            session_id = %id,
                            idle_secs = (now - last_modified).num_seconds(),
                            "Removed orphaned session directory"
                        );
                        removed += 1;
                    }
                    Err(e) => {
                        tracing::warn!(session_id = %id, error = %e, "Failed to remove orphan");
                    }
                }
            }
        }

        removed
    }

    fn get_session(&self, id: &str) -> Option<Session> {
        self.registry().get(id).map(|entry| Session {
            id: id.to_string(),
            created_at: entry.created_at,
            last_accessed: entry.last_accessed,
        })
    }

    fn list_sessions(&self) -> Vec<String> {
        self.registry().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn manager(dir: &Path) -> DiskSessionManager {
        DiskSessionManager::new(dir).await.unwrap()
    }

    #[test]
    fn test_session_id_validation() {
        assert!(is_valid_session_id(&Uuid::new_v4().to_string()));
        assert!(!is_valid_session_id("not-a-uuid"));
        assert!(!is_valid_session_id(""));
        assert!(!is_valid_session_id("../../../etc/passwd"));
        // simple 形式（无连字符）不接受
        assert!(!is_valid_session_id(&Uuid::new_v4().simple().to_string()));
    }

    #[tokio::test]
    async fn test_create_is_unique_and_builds_skeleton() {
        let temp = tempdir().unwrap();
        let manager = manager(temp.path()).await;

        let a = manager.create().await.unwrap();
        let b = manager.create().await.unwrap();
        assert_ne!(a.id(), b.id());

        for ws in [&a, &b] {
            for sub in WORKSPACE_SKELETON {
                let dir = ws.root().join(sub);
                assert!(dir.is_dir(), "missing {:?}", dir);
                // 骨架目录初始为空
                assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
            }
        }
    }

    #[tokio::test]
    async fn test_resolve_advances_last_accessed() {
        let temp = tempdir().unwrap();
        let manager = manager(temp.path()).await;

        let ws = manager.create().await.unwrap();
        let before = manager.get_session(ws.id()).unwrap().last_accessed;

        manager.backdate(ws.id(), 10);
        let resolved = manager.resolve(ws.id()).await.unwrap();
        assert_eq!(resolved.root(), ws.root());

        let after = manager.get_session(ws.id()).unwrap().last_accessed;
        assert!(after >= before);
    }

    #[tokio::test]
    async fn test_resolve_unknown_id_is_not_found() {
        let temp = tempdir().unwrap();
        let manager = manager(temp.path()).await;

        let missing = Uuid::new_v4().to_string();
        assert!(matches!(
            manager.resolve(&missing).await,
            Err(SessionError::NotFound(_))
        ));
        assert!(matches!(
            manager.resolve("bogus").await,
            Err(SessionError::InvalidId(_))
        ));
    }

    #[tokio::test]
    async fn test_lazy_rehydration_is_idempotent() {
        let temp = tempdir().unwrap();
        let manager = manager(temp.path()).await;

        let ws = manager.create().await.unwrap();
        let id = ws.id().to_string();

        // 模拟注册表记录丢失，目录仍在磁盘上
        manager.registry().remove(&id);
        assert!(manager.get_session(&id).is_none());

        let first = manager.resolve(&id).await.unwrap();
        assert_eq!(first.root(), ws.root());
        assert!(manager.get_session(&id).is_some());

        let second = manager.resolve(&id).await.unwrap();
        assert_eq!(second.root(), first.root());
        assert_eq!(manager.list_sessions().len(), 1);
    }

    #[tokio::test]
    async fn test_startup_scan_rebuilds_registry() {
        let temp = tempdir().unwrap();
        let id = {
            let manager = manager(temp.path()).await;
            let ws = manager.create().await.unwrap();
            ws.id().to_string()
        };

        // 非会话条目不会被采纳
        std::fs::create_dir(temp.path().join("not-a-session")).unwrap();
        std::fs::write(temp.path().join("stray.txt"), b"x").unwrap();

        // 重启: 新实例从磁盘重建
        let manager = manager(temp.path()).await;
        assert_eq!(manager.list_sessions(), vec![id.clone()]);
        assert!(manager.resolve(&id).await.is_ok());
    }

    #[tokio::test]
    async fn test_clear_transient_keeps_session_and_outputs() {
        let temp = tempdir().unwrap();
        let manager = manager(temp.path()).await;
        let ws = manager.create().await.unwrap();

        let transient_file = ws.temp_dir().join("raw.wav");
        let split_file = ws.split_dir().join("0.wav");
        let output_file = ws.output_dir().join("mix.wav");
        std::fs::write(&transient_file, b"t").unwrap();
        std::fs::write(&split_file, b"s").unwrap();
        std::fs::write(&output_file, b"o").unwrap();

        manager.clear_transient(ws.id()).await.unwrap();

        assert!(!transient_file.exists());
        assert!(!split_file.exists());
        assert!(output_file.exists());
        // 目录壳保留
        assert!(ws.temp_dir().is_dir());
        assert!(ws.split_dir().is_dir());
        // 会话本身未被破坏
        assert!(manager.resolve(ws.id()).await.is_ok());
    }

    #[tokio::test]
    async fn test_clear_scenario_outputs_then_transient() {
        let temp = tempdir().unwrap();
        let manager = manager(temp.path()).await;
        let ws = manager.create().await.unwrap();

        let transient_file = ws.temp_dir().join("clip.wav");
        std::fs::write(&transient_file, b"t").unwrap();

        manager.clear_outputs(ws.id()).await.unwrap();
        assert!(transient_file.exists());
        assert!(manager.resolve(ws.id()).await.is_ok());

        manager.clear_transient(ws.id()).await.unwrap();
        assert!(!transient_file.exists());
        assert!(manager.resolve(ws.id()).await.is_ok());
    }

    #[tokio::test]
    async fn test_clear_outputs_covers_all_output_dirs() {
        let temp = tempdir().unwrap();
        let manager = manager(temp.path()).await;
        let ws = manager.create().await.unwrap();

        let files = [
            ws.video_dl_dir().join("v.mp4"),
            ws.audio_dl_dir().join("a.wav"),
            ws.output_dir().join("mix.wav"),
            ws.temp_output_dir().join("scratch.wav"),
        ];
        for f in &files {
            std::fs::write(f, b"x").unwrap();
        }

        manager.clear_outputs(ws.id()).await.unwrap();
        for f in &files {
            assert!(!f.exists(), "{:?} should be gone", f);
        }
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_tree() {
        let temp = tempdir().unwrap();
        let manager = manager(temp.path()).await;
        let ws = manager.create().await.unwrap();
        let id = ws.id().to_string();

        assert!(manager.delete(&id).await);
        assert!(!ws.root().exists());
        assert!(manager.get_session(&id).is_none());
        assert!(manager.resolve(&id).await.is_err());

        // 再删一次: 无事发生
        assert!(!manager.delete(&id).await);
    }

    #[tokio::test]
    async fn test_delete_orphan_directory_without_record() {
        let temp = tempdir().unwrap();
        let manager = manager(temp.path()).await;

        let id = Uuid::new_v4().to_string();
        let orphan = temp.path().join(&id);
        std::fs::create_dir_all(orphan.join("temp")).unwrap();

        assert!(manager.delete(&id).await);
        assert!(!orphan.exists());
    }

    #[tokio::test]
    async fn test_expired_sessions_snapshot() {
        let temp = tempdir().unwrap();
        let manager = manager(temp.path()).await;

        let stale = manager.create().await.unwrap();
        let fresh = manager.create().await.unwrap();
        manager.backdate(stale.id(), 400);

        let expired = manager.expired_sessions(300);
        assert_eq!(expired, vec![stale.id().to_string()]);
        assert!(!expired.contains(&fresh.id().to_string()));
    }

    #[tokio::test]
    async fn test_sweep_orphans_removes_stale_untracked_dirs() {
        let temp = tempdir().unwrap();
        let manager = manager(temp.path()).await;

        let tracked = manager.create().await.unwrap();

        // 注册表之外凭空出现的会话形目录
        let orphan_id = Uuid::new_v4().to_string();
        let orphan = temp.path().join(&orphan_id);
        std::fs::create_dir_all(orphan.join("temp")).unwrap();
        std::fs::write(orphan.join("temp/old.wav"), b"x").unwrap();

        // 非 UUID 形目录绝不能被碰
        let foreign = temp.path().join("keep-me");
        std::fs::create_dir(&foreign).unwrap();

        // 让孤儿目录的 mtime 落到超时窗口之外
        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;

        let removed = manager.sweep_orphans(1).await;
        assert_eq!(removed, 1);
        assert!(!orphan.exists());
        assert!(tracked.root().exists());
        assert!(foreign.exists());
    }

    #[tokio::test]
    async fn test_sweep_orphans_spares_fresh_dirs() {
        let temp = tempdir().unwrap();
        let manager = manager(temp.path()).await;

        let orphan_id = Uuid::new_v4().to_string();
        std::fs::create_dir_all(temp.path().join(&orphan_id)).unwrap();

        // 刚落盘的孤儿还在窗口内
        assert_eq!(manager.sweep_orphans(300).await, 0);
        assert!(temp.path().join(&orphan_id).exists());
    }

    #[tokio::test]
    async fn test_concurrent_resolve_and_create() {
        let temp = tempdir().unwrap();
        let manager = std::sync::Arc::new(manager(temp.path()).await);
        let ws = manager.create().await.unwrap();
        let id = ws.id().to_string();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let manager = manager.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                manager.resolve(&id).await.map(|w| w.root().to_path_buf())
            }));
        }
        for _ in 0..4 {
            let manager = manager.clone();
            handles.push(tokio::spawn(async move {
                manager.create().await.map(|w| w.root().to_path_buf())
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
        // 1 个原始会话 + 4 个新建
        assert_eq!(manager.list_sessions().len(), 5);
    }
}
