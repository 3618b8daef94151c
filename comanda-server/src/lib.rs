//! Comanda Server - 餐厅订单生命周期与实时同步服务
//!
//! # 架构概述
//!
//! 本模块是订单服务的主入口，提供以下核心功能：
//!
//! - **订单存储** (`db`): redb 嵌入式存储，事务内校验状态转换
//! - **状态机** (`orders`): 集中式转换表 + 副作用编排
//! - **实时广播** (`realtime`): 生命周期事件推送到连接的客户端
//! - **打印管道** (`printing`): 结算小票异步投递到打印中继
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! comanda-server/src/
//! ├── core/      # 配置、状态、服务器
//! ├── api/       # HTTP 路由和处理器
//! ├── db/        # 订单存储 (redb)
//! ├── orders/    # 状态机、编排、营收
//! ├── realtime/  # 事件广播 + WebSocket
//! ├── printing/  # 小票打印管道
//! ├── services/  # 菜单目录边界
//! └── utils/     # 错误、日志
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod orders;
pub mod printing;
pub mod realtime;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState, build_app};
pub use db::{OrderCounts, OrderStore, StoreError};
pub use orders::{OrderService, RevenueService, TransitionRequest};
pub use realtime::Broadcaster;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env` and initialize logging
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    utils::logger::init_logger();
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ______                                 __
  / ____/___  ____ ___  ____ _____  ____/ /___ _
 / /   / __ \/ __ `__ \/ __ `/ __ \/ __  / __ `/
/ /___/ /_/ / / / / / / /_/ / / / / /_/ / /_/ /
\____/\____/_/ /_/ /_/\__,_/_/ /_/\__,_/\__,_/
    "#
    );
}
