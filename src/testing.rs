//! 测试用的脚本化驱动与 API
//!
//! 所有假对象把调用写进同一个事件列表，用来检查跨组件的调用顺序

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::error::CdpError;

use crate::clients::ProblemApi;
use crate::config::{Config, Credentials, StepTimeouts};
use crate::error::{BrowserError, UpstreamError};
use crate::infrastructure::{DriverFactory, Locator, SiteDriver};
use crate::models::{NewProblem, Problem, Proposal, ProposalStatus};
use crate::services::session_manager::VIEWPOINT_SELECTOR;

pub type Events = Arc<Mutex<Vec<String>>>;

pub fn events() -> Events {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn snapshot(events: &Events) -> Vec<String> {
    events.lock().unwrap().clone()
}

/// 测试配置：超时都很短
pub fn test_config() -> Config {
    Config {
        site_base_url: "https://site.test".to_string(),
        api_base_url: "http://api.test".to_string(),
        credentials: Credentials::new("alice", "hunter2"),
        timeouts: StepTimeouts {
            login_step: Duration::from_millis(5),
            login_confirm: Duration::from_millis(5),
            viewpoint: Duration::from_millis(5),
            log_ready: Duration::from_millis(5),
        },
        warn_file: std::env::temp_dir()
            .join(format!("generate_problem_warn_{}.txt", std::process::id()))
            .display()
            .to_string(),
        ..Config::default()
    }
}

pub fn page_for(blob: &str) -> String {
    format!(
        "<html><script>\nvar g_gameui = null;\ng_gamelogs = {};\nvar g_archive_mode = true;\n</script></html>",
        blob
    )
}

pub fn proposal(id: i32, table_id: &str) -> Proposal {
    Proposal {
        id,
        table_id: table_id.to_string(),
        creator_id: Some(100 + id),
        remaining_tile_count: 10 + id,
        note: format!("note {}", id),
        status: ProposalStatus::Pending,
        used_at: None,
        created_at: None,
    }
}

/// 假浏览器的行为脚本
#[derive(Debug, Clone, Default)]
pub struct DriverScript {
    /// 永远不会出现的元素
    pub missing: HashSet<Locator>,
    /// 对局 ID → 选择视角后的页面内容
    pub tables: HashMap<String, String>,
    /// 这些对局页面没有视角选择按钮
    pub no_viewpoint: HashSet<String>,
    /// 等待这些元素时浏览器连接已断开
    pub broken: HashSet<Locator>,
}

impl DriverScript {
    pub fn with_table(mut self, table_id: &str, content: String) -> Self {
        self.tables.insert(table_id.to_string(), content);
        self
    }
}

pub struct FakeDriver {
    script: DriverScript,
    events: Events,
    current_table: Option<String>,
    viewpoint_selected: bool,
}

impl FakeDriver {
    pub fn new(script: DriverScript, events: Events) -> Self {
        Self {
            script,
            events,
            current_table: None,
            viewpoint_selected: false,
        }
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    fn is_viewpoint(locator: &Locator) -> bool {
        *locator == Locator::css(VIEWPOINT_SELECTOR)
    }
}

#[async_trait]
impl SiteDriver for FakeDriver {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        self.record(format!("goto {}", url));
        self.current_table = url
            .split_once("table=")
            .map(|(_, table)| table.to_string());
        self.viewpoint_selected = false;
        Ok(())
    }

    async fn wait_for(
        &mut self,
        locator: &Locator,
        _timeout: Duration,
    ) -> Result<bool, BrowserError> {
        self.record(format!("wait {}", locator));
        if self.script.broken.contains(locator) {
            return Err(BrowserError::Cdp(CdpError::NoResponse));
        }
        if self.script.missing.contains(locator) {
            return Ok(false);
        }
        if Self::is_viewpoint(locator) {
            if let Some(table) = &self.current_table {
                return Ok(!self.script.no_viewpoint.contains(table));
            }
        }
        Ok(true)
    }

    async fn type_into(&mut self, locator: &Locator, _text: &str) -> Result<(), BrowserError> {
        self.record(format!("type {}", locator));
        Ok(())
    }

    async fn click(&mut self, locator: &Locator) -> Result<(), BrowserError> {
        self.record(format!("click {}", locator));
        if Self::is_viewpoint(locator) {
            self.viewpoint_selected = true;
        }
        Ok(())
    }

    async fn content(&mut self) -> Result<String, BrowserError> {
        let content = match (&self.current_table, self.viewpoint_selected) {
            (Some(table), true) => self.script.tables.get(table).cloned(),
            _ => None,
        };
        Ok(content.unwrap_or_else(|| "<html><body></body></html>".to_string()))
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.record("close".to_string());
        Ok(())
    }

    fn abandon(&mut self) {
        self.record("abandon".to_string());
    }
}

/// 假浏览器工厂，记录获取次数
pub struct FakeFactory {
    pub script: DriverScript,
    pub events: Events,
    pub acquired: AtomicUsize,
}

impl FakeFactory {
    pub fn new(script: DriverScript, events: Events) -> Self {
        Self {
            script,
            events,
            acquired: AtomicUsize::new(0),
        }
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DriverFactory for FakeFactory {
    type Driver = FakeDriver;

    async fn acquire(&self) -> Result<FakeDriver, BrowserError> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        self.events.lock().unwrap().push("acquire".to_string());
        Ok(FakeDriver::new(self.script.clone(), self.events.clone()))
    }
}

#[derive(Default)]
struct ApiState {
    proposals: Vec<Proposal>,
    created: Vec<NewProblem>,
    create_calls: usize,
}

/// 内存中的内部 API
pub struct FakeApi {
    state: Mutex<ApiState>,
    events: Events,
    /// 第 n 次（从 1 开始）创建题目时失败
    pub fail_create_calls: HashSet<usize>,
    /// 标记这些提案时失败
    pub fail_use_ids: HashSet<i32>,
    pub fail_list: bool,
}

impl FakeApi {
    pub fn new(proposals: Vec<Proposal>, events: Events) -> Self {
        Self {
            state: Mutex::new(ApiState {
                proposals,
                ..Default::default()
            }),
            events,
            fail_create_calls: HashSet::new(),
            fail_use_ids: HashSet::new(),
            fail_list: false,
        }
    }

    pub fn created(&self) -> Vec<NewProblem> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn proposal(&self, id: i32) -> Option<Proposal> {
        self.state
            .lock()
            .unwrap()
            .proposals
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    fn bad_status(endpoint: &str, status: u16) -> UpstreamError {
        UpstreamError::BadStatus {
            endpoint: endpoint.to_string(),
            status,
            body: String::new(),
        }
    }
}

#[async_trait]
impl ProblemApi for FakeApi {
    async fn list_proposals(&self, creator_id: Option<i32>) -> Result<Vec<Proposal>, UpstreamError> {
        self.record("list".to_string());
        if self.fail_list {
            return Err(Self::bad_status("/problem-proposals", 500));
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .proposals
            .iter()
            .filter(|p| p.is_pending())
            .filter(|p| creator_id.map_or(true, |id| p.creator_id == Some(id)))
            .cloned()
            .collect())
    }

    async fn create_problem(&self, problem: &NewProblem) -> Result<Problem, UpstreamError> {
        self.record(format!("create start {}", problem.note));
        let result = {
            let mut state = self.state.lock().unwrap();
            state.create_calls += 1;
            if self.fail_create_calls.contains(&state.create_calls) {
                Err(Self::bad_status("/problems/create", 500))
            } else {
                state.created.push(problem.clone());
                Ok(Problem {
                    id: state.created.len() as i32,
                    name: None,
                    creator_id: problem.creator_id,
                    note: Some(problem.note.clone()),
                })
            }
        };
        // 让出调度，确保完成事件确实在之后发生
        tokio::task::yield_now().await;
        self.record(format!("create end {}", problem.note));
        result
    }

    async fn use_proposal(&self, proposal_id: i32) -> Result<Proposal, UpstreamError> {
        self.record(format!("use {}", proposal_id));
        if self.fail_use_ids.contains(&proposal_id) {
            return Err(Self::bad_status("/problem-proposals/use", 503));
        }
        let mut state = self.state.lock().unwrap();
        let proposal = state
            .proposals
            .iter_mut()
            .find(|p| p.id == proposal_id)
            .ok_or_else(|| Self::bad_status("/problem-proposals/use", 404))?;
        proposal.status = ProposalStatus::Used;
        Ok(proposal.clone())
    }
}
