use crate::domain::policy::{Action, authorize};
use crate::domain::ports::{LedgerStoreBox, TransferGatewayBox};
use crate::domain::project::{
    Address, Amount, ArbitrationOutcome, Milestone, Project, ProjectStatus,
};
use crate::error::{EscrowError, Result};

/// The escrow state machine and custodian of deposited funds.
///
/// `EscrowEngine` validates and applies every transition (create, release,
/// refund request, dispute, arbitration), consulting the access policy
/// before touching the ledger. It owns the storage and gateway backends and
/// keeps each operation atomic from the caller's perspective: every call
/// either fully commits or fails with no partial effect.
///
/// Fund-moving operations commit the terminal status (custody zeroed)
/// before invoking the transfer gateway, so a reentrant call into the same
/// project observes a terminal state and is rejected.
pub struct EscrowEngine {
    ledger: LedgerStoreBox,
    gateway: TransferGatewayBox,
    admin: Address,
}

impl EscrowEngine {
    /// Creates a new engine.
    ///
    /// # Arguments
    ///
    /// * `ledger` - The store holding project records and the id counter.
    /// * `gateway` - The host's value-transfer primitive.
    /// * `admin` - The administrator identity, fixed for the engine's lifetime.
    pub fn new(ledger: LedgerStoreBox, gateway: TransferGatewayBox, admin: Address) -> Self {
        Self {
            ledger,
            gateway,
            admin,
        }
    }

    /// The configured administrator identity.
    pub fn owner(&self) -> Address {
        self.admin
    }

    /// The id the next successful `create_project` will be assigned.
    pub async fn next_project_id(&self) -> Result<u64> {
        self.ledger.peek_next_id().await
    }

    /// Looks up a project record.
    pub async fn project(&self, id: u64) -> Result<Project> {
        self.ledger.get(id).await?.ok_or(EscrowError::NotFound(id))
    }

    /// Escrows `deposit` against a new project and returns its id.
    ///
    /// The deposit must equal the milestone sum exactly; the record and the
    /// custody balance come into existence atomically. The caller becomes
    /// the project's client and cannot also be its contractor.
    pub async fn create_project(
        &self,
        caller: Address,
        contractor: Address,
        milestones: Vec<Milestone>,
        deposit: Amount,
        metadata: impl Into<String>,
    ) -> Result<u64> {
        if caller.is_zero() {
            return Err(EscrowError::InvalidInput(
                "client address must not be zero".to_string(),
            ));
        }
        if caller == contractor {
            return Err(EscrowError::Unauthorized(
                "client and contractor must be distinct identities".to_string(),
            ));
        }
        // Failed creates must not consume an id, so validate first.
        Project::validate_inputs(contractor, &milestones, deposit)?;
        let id = self.ledger.next_id().await?;
        let project = Project::new(id, caller, contractor, milestones, metadata, deposit)?;
        self.ledger.put(project).await?;
        Ok(id)
    }

    /// Releases the full budget to the contractor. Client-only; the work
    /// has been accepted.
    pub async fn release_funds(&self, caller: Address, id: u64) -> Result<()> {
        let project = self.checked(caller, Action::ReleaseFunds, id).await?;
        self.expect_status(&project, ProjectStatus::Pending)?;
        let to = project.contractor;
        self.pay_out(project, to, ProjectStatus::Released).await
    }

    /// Marks refund intent. No funds move; the contractor gets a window to
    /// dispute before custody can leave via `finalize_refund`.
    pub async fn request_refund(&self, caller: Address, id: u64) -> Result<()> {
        let mut project = self.checked(caller, Action::RequestRefund, id).await?;
        self.expect_status(&project, ProjectStatus::Pending)?;
        project.status = ProjectStatus::RefundRequested;
        self.ledger.put(project).await
    }

    /// Freezes a requested refund and escalates it to arbitration.
    /// Contractor-only.
    pub async fn dispute_refund(&self, caller: Address, id: u64) -> Result<()> {
        let mut project = self.checked(caller, Action::DisputeRefund, id).await?;
        self.expect_status(&project, ProjectStatus::RefundRequested)?;
        project.status = ProjectStatus::Disputed;
        self.ledger.put(project).await
    }

    /// Executes the administrator's ruling on a disputed refund. The engine
    /// records and executes the outcome; the merits are decided out-of-band.
    pub async fn arbitrate(
        &self,
        caller: Address,
        id: u64,
        outcome: ArbitrationOutcome,
    ) -> Result<()> {
        let project = self.checked(caller, Action::Arbitrate, id).await?;
        self.expect_status(&project, ProjectStatus::Disputed)?;
        let to = match outcome {
            ArbitrationOutcome::FavorClient => project.client,
            ArbitrationOutcome::FavorContractor => project.contractor,
        };
        self.pay_out(project, to, ProjectStatus::Closed).await
    }

    /// Confirms an uncontested refund after the arbitration window: the
    /// full budget goes back to the client. Client or administrator.
    pub async fn finalize_refund(&self, caller: Address, id: u64) -> Result<()> {
        let project = self.checked(caller, Action::FinalizeRefund, id).await?;
        self.expect_status(&project, ProjectStatus::RefundRequested)?;
        let to = project.client;
        self.pay_out(project, to, ProjectStatus::Closed).await
    }

    /// Attaches completion evidence to a pending project. Contractor-only,
    /// settable once.
    pub async fn submit_proof(&self, caller: Address, id: u64, proof: String) -> Result<()> {
        let mut project = self.checked(caller, Action::SubmitProof, id).await?;
        self.expect_status(&project, ProjectStatus::Pending)?;
        project.attach_proof(proof)?;
        self.ledger.put(project).await
    }

    /// Consumes the engine and returns the final state of all projects.
    pub async fn into_results(self) -> Result<Vec<Project>> {
        self.ledger.all_projects().await
    }

    async fn checked(&self, caller: Address, action: Action, id: u64) -> Result<Project> {
        let project = self.project(id).await?;
        if !authorize(caller, action, &project, self.admin) {
            return Err(EscrowError::Unauthorized(format!(
                "{caller} may not perform {action:?} on project {id}"
            )));
        }
        Ok(project)
    }

    fn expect_status(&self, project: &Project, expected: ProjectStatus) -> Result<()> {
        if project.status != expected {
            return Err(EscrowError::InvalidState {
                project: project.id,
                status: project.status,
            });
        }
        Ok(())
    }

    /// Empties custody and commits `status`, then moves the funds out.
    ///
    /// Commit order is the double-payout defense: the terminal record is in
    /// the ledger before the gateway runs. A gateway failure restores the
    /// prior record so the whole operation aborts as one unit.
    async fn pay_out(&self, mut project: Project, to: Address, status: ProjectStatus) -> Result<()> {
        let prior = project.clone();
        let id = project.id;
        let amount = project.take_custody();
        project.status = status;
        self.ledger.put(project).await?;

        if let Err(err) = self.gateway.transfer(to, amount).await {
            self.ledger.put(prior).await?;
            return Err(EscrowError::TransferFailed {
                project: id,
                reason: err.to_string(),
            });
        }
        Ok(())
    }
}
