use crate::domain::project::{Address, Balance, Project};
use crate::error::Result;
use async_trait::async_trait;

/// Storage port for project records plus the monotonic id counter.
///
/// No transition logic lives behind this trait; it is pure storage. Ids are
/// reserved atomically by `next_id` and never reused.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn put(&self, project: Project) -> Result<()>;
    async fn get(&self, id: u64) -> Result<Option<Project>>;
    /// Atomically reserves and returns the next project id.
    async fn next_id(&self) -> Result<u64>;
    /// Returns the id the next `next_id` call would hand out, without
    /// reserving it.
    async fn peek_next_id(&self) -> Result<u64>;
    async fn all_projects(&self) -> Result<Vec<Project>>;
}

/// The host's native value-transfer primitive.
///
/// The engine calls this exactly once per fund-moving operation, after
/// committing the terminal status; it never holds a second copy of
/// accounting truth.
#[async_trait]
pub trait TransferGateway: Send + Sync {
    async fn transfer(&self, to: Address, amount: Balance) -> Result<()>;
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;
pub type TransferGatewayBox = Box<dyn TransferGateway>;
