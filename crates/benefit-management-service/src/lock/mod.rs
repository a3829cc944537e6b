//! 进程内键控锁
//!
//! 为兑换的"检查-写入"提供按键互斥：同一键串行，不同键完全并行。
//!
//! ## 使用示例
//!
//! ```ignore
//! let lock_manager = LockManager::new(LockConfig::default());
//!
//! let guard = lock_manager.acquire("redeem:user-1:benefit-1").await?;
//! check_then_insert().await?;
//! guard.release();
//! ```
//!
//! 锁只在单个进程内生效，多实例部署需要数据库层面的互斥。

mod lock_manager;

pub use lock_manager::{LockConfig, LockGuard, LockManager};
