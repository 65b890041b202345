use crate::application::engine::EscrowEngine;
use crate::domain::project::{Address, Amount, ArbitrationOutcome, Milestone};
use crate::error::{EscrowError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// The engine operation named by a replay row.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Release,
    Refund,
    Dispute,
    Arbitrate,
    Finalize,
    Proof,
}

/// One replay row: `op, caller, project, contractor, amount, outcome, memo`.
///
/// Fields not used by an operation are left empty. A `create` row carries a
/// single amount, which desugars to a one-milestone project; the engine
/// itself only knows the milestone form.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct OperationRecord {
    pub op: OperationKind,
    pub caller: Address,
    pub project: Option<u64>,
    pub contractor: Option<Address>,
    pub amount: Option<Decimal>,
    pub outcome: Option<ArbitrationOutcome>,
    pub memo: Option<String>,
}

impl OperationRecord {
    /// Dispatches this row to the engine.
    pub async fn apply(mut self, engine: &EscrowEngine) -> Result<()> {
        match self.op {
            OperationKind::Create => {
                let contractor = self
                    .contractor
                    .ok_or_else(|| EscrowError::InvalidInput("create needs a contractor".into()))?;
                let raw = self
                    .amount
                    .ok_or_else(|| EscrowError::InvalidInput("create needs an amount".into()))?;
                let amount = Amount::new(raw)?;
                let memo = self.memo.unwrap_or_default();
                let milestones = vec![Milestone::new(memo.clone(), amount, 100)?];
                engine
                    .create_project(self.caller, contractor, milestones, amount, memo)
                    .await?;
                Ok(())
            }
            OperationKind::Release => engine.release_funds(self.caller, self.project_id()?).await,
            OperationKind::Refund => engine.request_refund(self.caller, self.project_id()?).await,
            OperationKind::Dispute => engine.dispute_refund(self.caller, self.project_id()?).await,
            OperationKind::Finalize => engine.finalize_refund(self.caller, self.project_id()?).await,
            OperationKind::Arbitrate => {
                let outcome = self
                    .outcome
                    .ok_or_else(|| EscrowError::InvalidInput("arbitrate needs an outcome".into()))?;
                engine.arbitrate(self.caller, self.project_id()?, outcome).await
            }
            OperationKind::Proof => {
                let proof = self
                    .memo
                    .take()
                    .ok_or_else(|| EscrowError::InvalidInput("proof needs a memo".into()))?;
                engine.submit_proof(self.caller, self.project_id()?, proof).await
            }
        }
    }

    fn project_id(&self) -> Result<u64> {
        self.project
            .ok_or_else(|| EscrowError::InvalidInput(format!("{:?} needs a project id", self.op)))
    }
}

/// Reads escrow operations from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over
/// `Result<OperationRecord>`. It handles whitespace trimming and flexible
/// record lengths automatically.
pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    /// Creates a new `OperationReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes operations,
    /// so large replay files stream without loading fully into memory.
    pub fn operations(self) -> impl Iterator<Item = Result<OperationRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(EscrowError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const HEADER: &str = "op, caller, project, contractor, amount, outcome, memo";

    #[test]
    fn test_reader_valid_stream() {
        let data = format!(
            "{HEADER}\ncreate, 0x1, , 0x2, 100.0, , foundation\nrelease, 0x1, 1, , , , "
        );
        let reader = OperationReader::new(data.as_bytes());
        let results: Vec<Result<OperationRecord>> = reader.operations().collect();

        assert_eq!(results.len(), 2);
        let create = results[0].as_ref().unwrap();
        assert_eq!(create.op, OperationKind::Create);
        assert_eq!(create.caller, Address(1));
        assert_eq!(create.contractor, Some(Address(2)));
        assert_eq!(create.amount, Some(dec!(100.0)));
        assert_eq!(create.memo.as_deref(), Some("foundation"));

        let release = results[1].as_ref().unwrap();
        assert_eq!(release.op, OperationKind::Release);
        assert_eq!(release.project, Some(1));
        assert_eq!(release.amount, None);
    }

    #[test]
    fn test_reader_arbitrate_outcome() {
        let data = format!("{HEADER}\narbitrate, 0xad, 3, , , favor_contractor, ");
        let reader = OperationReader::new(data.as_bytes());
        let record = reader.operations().next().unwrap().unwrap();

        assert_eq!(record.op, OperationKind::Arbitrate);
        assert_eq!(record.outcome, Some(ArbitrationOutcome::FavorContractor));
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = format!("{HEADER}\nteleport, 0x1, 1, , , , ");
        let reader = OperationReader::new(data.as_bytes());
        let results: Vec<Result<OperationRecord>> = reader.operations().collect();

        assert!(results[0].is_err());
    }

    #[tokio::test]
    async fn test_apply_rejects_missing_fields() {
        use crate::infrastructure::in_memory::{InMemoryGateway, InMemoryLedger};

        let engine = EscrowEngine::new(
            Box::new(InMemoryLedger::new()),
            Box::new(InMemoryGateway::new()),
            Address(9),
        );

        let no_id = OperationRecord {
            op: OperationKind::Release,
            caller: Address(1),
            project: None,
            contractor: None,
            amount: None,
            outcome: None,
            memo: None,
        };
        assert!(matches!(
            no_id.apply(&engine).await,
            Err(EscrowError::InvalidInput(_))
        ));

        let no_contractor = OperationRecord {
            op: OperationKind::Create,
            caller: Address(1),
            project: None,
            contractor: None,
            amount: Some(dec!(1.0)),
            outcome: None,
            memo: None,
        };
        assert!(matches!(
            no_contractor.apply(&engine).await,
            Err(EscrowError::InvalidInput(_))
        ));
    }
}
