//! 提案来源 - 业务能力层
//!
//! 只负责"取出待处理提案"，顺序以 API 返回为准

use std::sync::Arc;

use tracing::{debug, warn};

use crate::clients::ProblemApi;
use crate::error::UpstreamError;
use crate::models::Proposal;

/// 提案来源服务
pub struct ProposalSource {
    api: Arc<dyn ProblemApi>,
    creator_filter: Option<i32>,
}

impl ProposalSource {
    pub fn new(api: Arc<dyn ProblemApi>, creator_filter: Option<i32>) -> Self {
        Self {
            api,
            creator_filter,
        }
    }

    /// 获取所有待处理提案
    ///
    /// API 返回的已使用提案会被丢弃，其余保持原顺序
    pub async fn list_pending(&self) -> Result<Vec<Proposal>, UpstreamError> {
        let proposals = self.api.list_proposals(self.creator_filter).await?;
        debug!("API 返回 {} 个提案", proposals.len());

        Ok(proposals
            .into_iter()
            .filter(|p| {
                if !p.is_pending() {
                    warn!("提案 #{} 已被使用，跳过", p.id);
                }
                p.is_pending()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProposalStatus;
    use crate::testing::{events, proposal, FakeApi};

    /// 返回固定列表的 API，不做任何过滤
    struct Verbatim(Vec<Proposal>);

    #[async_trait::async_trait]
    impl ProblemApi for Verbatim {
        async fn list_proposals(&self, _creator: Option<i32>) -> Result<Vec<Proposal>, UpstreamError> {
            Ok(self.0.clone())
        }

        async fn create_problem(
            &self,
            _problem: &crate::models::NewProblem,
        ) -> Result<crate::models::Problem, UpstreamError> {
            unreachable!()
        }

        async fn use_proposal(&self, _id: i32) -> Result<Proposal, UpstreamError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn test_keeps_server_order_and_drops_used() {
        let mut used = proposal(2, "b");
        used.status = ProposalStatus::Used;
        let api = Verbatim(vec![proposal(3, "c"), used, proposal(1, "a")]);

        let source = ProposalSource::new(Arc::new(api), None);
        let ids: Vec<i32> = source
            .list_pending()
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[tokio::test]
    async fn test_creator_filter_is_forwarded() {
        let api = FakeApi::new(vec![proposal(1, "a"), proposal(2, "b")], events());
        let source = ProposalSource::new(Arc::new(api), Some(102));

        let pending = source.list_pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, 2);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_returned() {
        let mut api = FakeApi::new(vec![proposal(1, "a")], events());
        api.fail_list = true;
        let source = ProposalSource::new(Arc::new(api), None);

        let err = source.list_pending().await.unwrap_err();
        assert!(matches!(err, UpstreamError::BadStatus { status: 500, .. }));
    }
}
