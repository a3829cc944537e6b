//! 键控锁管理器

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, instrument, warn};

use crate::error::{BenefitError, Result};

type LockTable = DashMap<String, Arc<Mutex<()>>>;

/// 锁配置
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// 获取锁的最长等待时间
    pub acquire_timeout: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

impl LockConfig {
    pub fn with_timeout_ms(ms: u64) -> Self {
        Self {
            acquire_timeout: Duration::from_millis(ms),
        }
    }
}

/// 键控锁管理器
///
/// 每个键对应一把异步互斥锁，空闲的键在守卫释放时回收。
pub struct LockManager {
    locks: Arc<LockTable>,
    config: LockConfig,
}

impl LockManager {
    pub fn new(config: LockConfig) -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(LockConfig::default())
    }

    /// 获取锁
    ///
    /// 在 `acquire_timeout` 内未能获取时返回 `LockConflict`。
    #[instrument(skip(self))]
    pub async fn acquire(&self, key: &str) -> Result<LockGuard> {
        let mutex = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        match tokio::time::timeout(self.config.acquire_timeout, mutex.lock_owned()).await {
            Ok(guard) => {
                debug!(key = %key, "Lock acquired");
                Ok(LockGuard {
                    key: key.to_string(),
                    guard: Some(guard),
                    locks: Arc::clone(&self.locks),
                })
            }
            Err(_) => {
                warn!(
                    key = %key,
                    timeout_ms = self.config.acquire_timeout.as_millis() as u64,
                    "Lock not acquired within timeout"
                );
                self.prune(key);
                Err(BenefitError::LockConflict {
                    resource: key.to_string(),
                })
            }
        }
    }

    /// 当前登记的键数量
    pub fn active_keys(&self) -> usize {
        self.locks.len()
    }

    fn prune(&self, key: &str) {
        prune_idle(&self.locks, key);
    }
}

/// 仅表中自身持有引用时移除，持锁或等待中的键保留
fn prune_idle(locks: &LockTable, key: &str) {
    locks.remove_if(key, |_, mutex| Arc::strong_count(mutex) == 1);
}

/// 锁守卫
///
/// Drop 时释放锁并回收空闲键。
pub struct LockGuard {
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockTable>,
}

impl LockGuard {
    /// 获取锁的 key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// 显式释放锁
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // 先释放守卫持有的 Arc，再判断是否空闲
        self.guard.take();
        prune_idle(&self.locks, &self.key);
        debug!(key = %self.key, "Lock released");
    }
}
