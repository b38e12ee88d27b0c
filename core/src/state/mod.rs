//! # 引擎状态模块
//!
//! 定义由 [`Store`](crate::store::Store) 独占持有的引擎状态聚合。
//!
//! ## 设计原则
//!
//! 1. **单一所有者**：状态只在 Store 的 apply 步骤中被修改
//! 2. **作用域访问**：读者只能通过读锁守卫访问，不能在释放后保留引用
//! 3. **可比较**：状态实现 `Clone + PartialEq`，便于验证 reducer 折叠结果

pub mod logs;
pub mod types;
pub mod web;

pub use logs::{LogBuffer, LogCheckpoint};
pub use types::{BuildInfo, EngineState, TerminalMode};
pub use web::{WebHost, WebUrl};
