//! Expiry Sweeper - 会话过期清扫任务
//!
//! 独立的后台循环: 每个轮询周期清理注册表中空闲超时的会话，
//! 每隔若干周期再做一次磁盘孤儿扫描，回收注册表与磁盘的分歧

use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::SessionManagerPort;

/// 清扫配置
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// 轮询间隔（秒）- 与过期超时无关的独立常量
    pub poll_interval_secs: u64,
    /// 空闲过期时间（秒）
    pub expire_secs: u64,
    /// 每多少个轮询周期做一次磁盘孤儿扫描
    pub orphan_scan_cycles: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            expire_secs: 300,
            orphan_scan_cycles: 12,
        }
    }
}

/// 过期清扫器
///
/// 正常运行下永不终止，单个会话的清理失败只记日志、继续下一个
pub struct ExpirySweeper {
    config: SweeperConfig,
    sessions: Arc<dyn SessionManagerPort>,
}

impl ExpirySweeper {
    pub fn new(config: SweeperConfig, sessions: Arc<dyn SessionManagerPort>) -> Self {
        Self { config, sessions }
    }

    /// 启动清扫循环（在 tokio::spawn 中运行）
    pub async fn run(self) {
        tracing::info!(
            poll_interval_secs = self.config.poll_interval_secs,
            expire_secs = self.config.expire_secs,
            orphan_scan_cycles = self.config.orphan_scan_cycles,
            "ExpirySweeper started"
        );

        let mut ticker =
            tokio::time::interval(Duration::from_secs(self.config.poll_interval_secs));
        // 第一拍立即返回，跳过
        ticker.tick().await;

        let mut cycle: u64 = 0;
        loop {
            ticker.tick().await;
            cycle += 1;
            self.run_cycle(cycle).await;
        }
    }

    /// 单个清扫周期（独立出来便于测试）
    ///
    /// 过期快照在锁内完成，删除本身在锁外逐个进行
    pub async fn run_cycle(&self, cycle: u64) {
        let expired = self.sessions.expired_sessions(self.config.expire_secs);

        for id in &expired {
            tracing::info!(session_id = %id, cycle = cycle, "Cleaning up expired session");
            if !self.sessions.delete(id).await {
                tracing::warn!(session_id = %id, "Expired session was already gone");
            }
        }

        // 粗粒度节拍: 磁盘孤儿扫描
        if cycle % self.config.orphan_scan_cycles == 0 {
            tracing::debug!(cycle = cycle, "Scanning disk for orphaned sessions");
            let removed = self.sessions.sweep_orphans(self.config.expire_secs).await;
            if removed > 0 {
                tracing::info!(count = removed, "Orphaned session directories removed");
            }

            if expired.is_empty() {
                tracing::debug!(
                    cycle = cycle,
                    active = self.sessions.list_sessions().len(),
                    "Sweeper idle"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::session::DiskSessionManager;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn sweeper_config(expire_secs: u64) -> SweeperConfig {
        SweeperConfig {
            poll_interval_secs: 1,
            expire_secs,
            orphan_scan_cycles: 2,
        }
    }

    #[tokio::test]
    async fn test_cycle_deletes_expired_sessions() {
        let temp = tempdir().unwrap();
        let manager = Arc::new(DiskSessionManager::new(temp.path()).await.unwrap());

        let stale = manager.create().await.unwrap();
        let fresh = manager.create().await.unwrap();
        manager.backdate(stale.id(), 400);

        let sweeper = ExpirySweeper::new(
            sweeper_config(300),
            manager.clone() as Arc<dyn SessionManagerPort>,
        );
        sweeper.run_cycle(1).await;

        assert!(!stale.root().exists());
        assert!(manager.resolve(stale.id()).await.is_err());
        assert!(fresh.root().exists());
        assert!(manager.resolve(fresh.id()).await.is_ok());
    }

    #[tokio::test]
    async fn test_orphan_scan_only_on_coarse_cycles() {
        let temp = tempdir().unwrap();
        let manager = Arc::new(DiskSessionManager::new(temp.path()).await.unwrap());

        let orphan_id = Uuid::new_v4().to_string();
        let orphan = temp.path().join(&orphan_id);
        std::fs::create_dir_all(&orphan).unwrap();

        tokio::time::sleep(Duration::from_millis(1500)).await;

        let sweeper = ExpirySweeper::new(
            sweeper_config(1),
            manager.clone() as Arc<dyn SessionManagerPort>,
        );

        // 细粒度周期不碰磁盘孤儿
        sweeper.run_cycle(1).await;
        assert!(orphan.exists());

        // 粗粒度周期（cycle % 2 == 0）回收它，无需任何 resolve 调用
        sweeper.run_cycle(2).await;
        assert!(!orphan.exists());
    }

    #[tokio::test]
    async fn test_expired_session_unresolvable_after_sweep() {
        let temp = tempdir().unwrap();
        let manager = Arc::new(DiskSessionManager::new(temp.path()).await.unwrap());

        let ws = manager.create().await.unwrap();
        let id = ws.id().to_string();
        manager.backdate(&id, 400);

        let sweeper = ExpirySweeper::new(
            sweeper_config(300),
            manager.clone() as Arc<dyn SessionManagerPort>,
        );
        sweeper.run_cycle(1).await;

        // 过期会话与从未创建过不可区分
        assert!(matches!(
            manager.resolve(&id).await,
            Err(crate::application::ports::SessionError::NotFound(_))
        ));
    }
}
