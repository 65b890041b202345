use crate::domain::ports::{LedgerStore, TransferGateway};
use crate::domain::project::{Address, Balance, Project};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// A thread-safe in-memory ledger for project records.
///
/// Uses `Arc<RwLock<HashMap<u64, Project>>>` for shared concurrent access
/// plus an atomic counter for monotonic id assignment. Ideal for testing or
/// replay runs where persistence is not required.
#[derive(Clone)]
pub struct InMemoryLedger {
    projects: Arc<RwLock<HashMap<u64, Project>>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryLedger {
    /// Creates a new, empty in-memory ledger. Ids start at 1.
    pub fn new() -> Self {
        Self {
            projects: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn put(&self, project: Project) -> Result<()> {
        let mut projects = self.projects.write().await;
        projects.insert(project.id, project);
        Ok(())
    }

    async fn get(&self, id: u64) -> Result<Option<Project>> {
        let projects = self.projects.read().await;
        Ok(projects.get(&id).cloned())
    }

    async fn next_id(&self) -> Result<u64> {
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn peek_next_id(&self) -> Result<u64> {
        Ok(self.next_id.load(Ordering::SeqCst))
    }

    async fn all_projects(&self) -> Result<Vec<Project>> {
        let projects = self.projects.read().await;
        let mut all: Vec<Project> = projects.values().cloned().collect();
        all.sort_by_key(|p| p.id);
        Ok(all)
    }
}

/// An in-memory transfer gateway crediting per-address balances.
///
/// Stands in for the host's native value-transfer primitive so tests and
/// replay runs can observe where escrowed funds went.
#[derive(Default, Clone)]
pub struct InMemoryGateway {
    credits: Arc<RwLock<HashMap<Address, Balance>>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total funds transferred to `address` so far.
    pub async fn balance_of(&self, address: Address) -> Balance {
        let credits = self.credits.read().await;
        credits.get(&address).copied().unwrap_or(Balance::ZERO)
    }
}

#[async_trait]
impl TransferGateway for InMemoryGateway {
    async fn transfer(&self, to: Address, amount: Balance) -> Result<()> {
        let mut credits = self.credits.write().await;
        *credits.entry(to).or_insert(Balance::ZERO) += amount;
        Ok(())
    }
}
