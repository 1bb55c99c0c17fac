//! Session GC Worker - 过期会话回收
//!
//! 定期扫描闲置超时的会话，执行与 /api/cleanup 相同的清理并删除会话

use std::sync::Arc;
use std::time::Duration;

use crate::application::commands::handlers::CleanupSessionHandler;
use crate::application::commands::CleanupSession;
use crate::application::ports::SessionStorePort;

/// GC 配置
#[derive(Debug, Clone)]
pub struct SessionGcConfig {
    /// 扫描间隔
    pub interval: Duration,
    /// 闲置超时（秒）
    pub session_expire_secs: u64,
}

impl Default for SessionGcConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            session_expire_secs: 86400,
        }
    }
}

/// Session GC Worker
pub struct SessionGcWorker {
    config: SessionGcConfig,
    session_store: Arc<dyn SessionStorePort>,
    cleanup: Arc<CleanupSessionHandler>,
}

impl SessionGcWorker {
    pub fn new(
        config: SessionGcConfig,
        session_store: Arc<dyn SessionStorePort>,
        cleanup: Arc<CleanupSessionHandler>,
    ) -> Self {
        Self {
            config,
            session_store,
            cleanup,
        }
    }

    /// 启动 Worker
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            session_expire_secs = self.config.session_expire_secs,
            "SessionGcWorker started"
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        // 第一次 tick 立即返回，跳过
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.run_once().await;
        }
    }

    /// 执行一次回收，返回被回收的会话数
    pub async fn run_once(&self) -> usize {
        let expired = self
            .session_store
            .expired_sessions(self.config.session_expire_secs);
        let mut collected = 0;

        for session_id in expired {
            let command = CleanupSession {
                session_id: session_id.clone(),
                expire: true,
            };
            match self.cleanup.handle(command).await {
                Ok(_) => collected += 1,
                Err(e) => {
                    tracing::error!(
                        session_id = %session_id,
                        error = %e,
                        "Failed to collect session"
                    );
                }
            }
        }

        if collected > 0 {
            tracing::info!(collected = collected, "Expired sessions collected");
        }
        collected
    }
}
