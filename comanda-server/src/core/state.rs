//! 服务器状态

use std::sync::Arc;
use std::time::Duration;

use comanda_printer::{HttpRelayDispatcher, NoopDispatcher, ReceiptDispatcher};

use crate::core::Config;
use crate::db::OrderStore;
use crate::orders::{OrderService, RevenueService};
use crate::printing::PrintService;
use crate::realtime::Broadcaster;
use crate::services::{MenuCatalog, StaticMenu};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，克隆进每个请求处理器的成本极低。
///
/// # 服务组件
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | store | 订单存储 (唯一事实来源) |
/// | broadcaster | 生命周期事件广播 |
/// | printer | 小票打印管道 |
/// | orders | 订单生命周期编排 |
/// | revenue | 营收聚合 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 订单存储
    pub store: Arc<OrderStore>,
    /// 事件广播
    pub broadcaster: Broadcaster,
    /// 打印管道
    pub printer: PrintService,
    /// 订单编排服务
    pub orders: OrderService,
    /// 营收聚合服务
    pub revenue: RevenueService,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：工作目录结构 → 订单存储 → 广播器 → 打印管道 →
    /// 菜单快照 → 编排/营收服务。
    ///
    /// # Panics
    ///
    /// 工作目录或数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        // 0. Ensure work_dir structure exists
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        // 1. Open the order store
        let db_path = config.database_dir().join("orders.redb");
        let store = Arc::new(OrderStore::open(&db_path).expect("Failed to open order store"));

        // 2. Realtime broadcaster
        let broadcaster = Broadcaster::new();

        // 3. Print pipeline (relay when configured, otherwise no-op)
        let dispatcher: Arc<dyn ReceiptDispatcher> = match &config.printer_url {
            Some(url) => {
                let timeout = Duration::from_millis(config.print_timeout_ms);
                match HttpRelayDispatcher::new(url.clone(), timeout) {
                    Ok(relay) => Arc::new(relay),
                    Err(e) => {
                        tracing::warn!(error = %e, "Print relay misconfigured, printing disabled");
                        Arc::new(NoopDispatcher)
                    }
                }
            }
            None => Arc::new(NoopDispatcher),
        };
        let printer = PrintService::new(dispatcher);

        // 4. Menu price snapshot (external catalog boundary)
        let catalog: Arc<dyn MenuCatalog> = match &config.menu_snapshot {
            Some(path) => Arc::new(StaticMenu::from_file(path)),
            None => Arc::new(StaticMenu::empty()),
        };

        // 5. Domain services
        let orders = OrderService::new(store.clone(), broadcaster.clone(), printer.clone());
        let revenue = RevenueService::new(store.clone(), catalog);

        Self {
            config: config.clone(),
            store,
            broadcaster,
            printer,
            orders,
            revenue,
        }
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 之前调用
    ///
    /// 启动的任务：
    /// - 小票打印工作者 (ReceiptPrintWorker)
    pub fn start_background_tasks(&self) {
        self.printer.start_background_tasks();
    }
}
