use crate::domain::project::{Address, Project};

/// Actions gated by the access policy, one per engine operation that
/// requires a specific principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ReleaseFunds,
    RequestRefund,
    DisputeRefund,
    SubmitProof,
    Arbitrate,
    FinalizeRefund,
}

/// Pure authorization check: may `principal` perform `action` on `project`?
///
/// The administrator identity is injected by the engine at construction and
/// never changes. A project whose client is the zero address is an
/// uninitialized slot and authorizes nothing.
pub fn authorize(principal: Address, action: Action, project: &Project, admin: Address) -> bool {
    if project.client.is_zero() {
        return false;
    }
    match action {
        Action::ReleaseFunds | Action::RequestRefund => principal == project.client,
        Action::DisputeRefund | Action::SubmitProof => principal == project.contractor,
        Action::Arbitrate => principal == admin,
        // An uncontested refund may be confirmed by the client or the
        // administrator.
        Action::FinalizeRefund => principal == project.client || principal == admin,
    }
}
