use std::io::{self, BufRead};
use std::sync::Arc;

use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carpool_client::{
    AppState,
    api::model::PostType,
    carpool::{CarpoolService, Filter, PublishForm},
    config::Config,
    error::ApiError,
    host::{HostUi, LoginCodeProvider, ToastKind},
    posts::{PostList, StatusChoice, Tab},
    session::UserInfo,
    storage::FileStorage,
};

#[derive(Parser)]
#[command(name = "carpool", about = "拼车信息终端客户端")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
    All,
    NeedCar,
    NeedPeople,
    Today,
    Thisweek,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    /// 仍在寻找
    Active,
    /// 已找到
    Found,
}

#[derive(Clone, Copy, ValueEnum)]
enum TypeArg {
    NeedCar,
    NeedPeople,
}

#[derive(Subcommand)]
enum Command {
    /// 登录（登录码来自 --code 或 LOGIN_CODE 环境变量）
    Login {
        #[arg(long)]
        code: Option<String>,
        #[arg(long, default_value = "微信用户")]
        nickname: String,
        #[arg(long, default_value = "")]
        avatar: String,
    },
    /// 清除本地会话
    Logout,
    /// 浏览拼车帖子
    List {
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// 查看帖子详情
    Detail { id: String },
    /// 发布新帖子
    Publish {
        #[arg(long, value_enum, default_value_t = TypeArg::NeedCar)]
        r#type: TypeArg,
        #[arg(long)]
        content: String,
        #[arg(long)]
        wechat: String,
        #[arg(long, default_value = "")]
        departure: String,
        #[arg(long, default_value_t = 0)]
        people: i32,
        #[arg(long)]
        share_fare: bool,
    },
    /// 我的发布
    MyPosts {
        #[arg(long)]
        archived: bool,
    },
    /// 删除帖子（需确认）
    Delete { id: String },
    /// 调整剩余座位
    Seats { id: String, seats: i32 },
    /// 切换寻找状态
    Status {
        id: String,
        #[arg(value_enum)]
        status: StatusArg,
    },
}

/// 终端版宿主 UI：toast 打到标准输出，确认框读标准输入
struct TerminalHost;

#[async_trait]
impl HostUi for TerminalHost {
    fn show_toast(&self, title: &str, kind: ToastKind) {
        let marker = match kind {
            ToastKind::Success => "✓",
            ToastKind::Error => "✗",
            ToastKind::Plain => "·",
        };
        println!("{marker} {title}");
    }

    fn show_loading(&self, title: &str) {
        println!("… {title}");
    }

    fn hide_loading(&self) {}

    async fn confirm(&self, title: &str, content: &str) -> bool {
        println!("{title}: {content} [y/N]");
        let line = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line).ok();
            line
        })
        .await
        .unwrap_or_default();
        matches!(line.trim(), "y" | "Y" | "yes")
    }

    fn prompt_relogin(&self) {
        println!("登录已过期，请重新登录（carpool login）");
    }

    fn set_clipboard(&self, data: &str) {
        // 终端没有剪贴板，直接展示
        println!("微信号: {data}");
    }
}

/// 登录码从环境变量取，真实宿主里由身份服务签发
struct EnvCodeProvider;

#[async_trait]
impl LoginCodeProvider for EnvCodeProvider {
    async fn fresh_code(&self) -> Result<String, ApiError> {
        std::env::var("LOGIN_CODE")
            .map_err(|_| ApiError::LoginCode("LOGIN_CODE not set".to_string()))
    }
}

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().expect("Failed to load configuration");

    let host: Arc<dyn HostUi> = Arc::new(TerminalHost);
    let storage = Arc::new(FileStorage::open(&config.storage_path));
    let state = AppState::new(config, storage, Arc::clone(&host), Arc::new(EnvCodeProvider));

    if let Err(e) = run(cli.command, &state, &host).await {
        eprintln!("错误: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Command, state: &AppState, host: &Arc<dyn HostUi>) -> Result<(), ApiError> {
    match command {
        Command::Login {
            code,
            nickname,
            avatar,
        } => {
            let code = match code {
                Some(code) => code,
                None => EnvCodeProvider.fresh_code().await?,
            };
            let profile = UserInfo {
                nick_name: nickname,
                avatar_url: avatar,
            };
            state.auth.login(&code, &profile).await?;
            println!("登录成功: {}", profile.nick_name);
        }
        Command::Logout => {
            state.auth.logout();
            println!("已退出登录");
        }
        Command::List {
            filter,
            search,
            page,
        } => {
            let filter = match filter {
                FilterArg::All => Filter::All,
                FilterArg::NeedCar => Filter::NeedCar,
                FilterArg::NeedPeople => Filter::NeedPeople,
                FilterArg::Today => Filter::Today,
                FilterArg::Thisweek => Filter::ThisWeek,
            };
            let service = CarpoolService::new(state.api.clone(), Arc::clone(host));
            let cards = service
                .list(filter, search.as_deref(), page, state.config.page_size)
                .await;
            if cards.is_empty() {
                println!("暂无拼车信息");
            }
            for card in cards {
                println!(
                    "[{}] {} {} {}  {}  ({})",
                    card.id,
                    card.post_type.label(),
                    card.departure_date,
                    card.departure_weekday,
                    card.truncated_content,
                    card.time_ago,
                );
            }
        }
        Command::Detail { id } => {
            let service = CarpoolService::new(state.api.clone(), Arc::clone(host));
            let detail = service.detail(&id).await?;
            println!("{} {}", detail.post_type.label(), detail.departure_date);
            println!("出发时间: {}", detail.departure_time_formatted);
            println!("{}", detail.content);
            if let Some(nickname) = &detail.nickname {
                println!("发布者: {} (完成拼车 {} 次)", nickname, detail.carpool_count);
            }
            println!("发布于: {}", detail.time_ago);
            service.copy_contact(&detail.wechat);
        }
        Command::Publish {
            r#type,
            content,
            wechat,
            departure,
            people,
            share_fare,
        } => {
            require_login(state).await?;
            let service = CarpoolService::new(state.api.clone(), Arc::clone(host));
            let form = PublishForm {
                post_type: match r#type {
                    TypeArg::NeedCar => PostType::NeedCar,
                    TypeArg::NeedPeople => PostType::NeedPeople,
                },
                content,
                wechat,
                departure_time: departure,
                number_of_people: people,
                share_fare,
            };
            service.publish(form).await?;
        }
        Command::MyPosts { archived } => {
            require_login(state).await?;
            let mut list = PostList::new(state.api.clone(), Arc::clone(host), state.ui.clone());
            if archived {
                list.active_tab = Tab::Archived;
            }
            list.load().await?;
            if list.posts.is_empty() {
                println!("暂无发布");
            }
            for post in &list.posts {
                println!(
                    "[{}] {} {} {} {}",
                    post.id,
                    post.post_type.label(),
                    post.departure_date,
                    post.content,
                    post.status_text,
                );
            }
        }
        Command::Delete { id } => {
            require_login(state).await?;
            let mut list = PostList::new(state.api.clone(), Arc::clone(host), state.ui.clone());
            list.load().await?;
            list.delete_post(&id).await;
        }
        Command::Seats { id, seats } => {
            require_login(state).await?;
            let mut list = PostList::new(state.api.clone(), Arc::clone(host), state.ui.clone());
            list.load().await?;
            if let Some(handle) = list.update_seats(&id, seats) {
                // 等后台持久化跑完再退出进程
                let _ = handle.await;
            }
        }
        Command::Status { id, status } => {
            require_login(state).await?;
            let mut list = PostList::new(state.api.clone(), Arc::clone(host), state.ui.clone());
            list.load().await?;
            let choice = match status {
                StatusArg::Active => StatusChoice::Active,
                StatusArg::Found => StatusChoice::Found,
            };
            if let Some(handle) = list.update_status(&id, choice) {
                let _ = handle.await;
            }
        }
    }
    Ok(())
}

async fn require_login(state: &AppState) -> Result<(), ApiError> {
    if state.auth.ensure_valid_token().await {
        Ok(())
    } else {
        Err(ApiError::TokenMissing)
    }
}
