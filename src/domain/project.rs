use crate::error::EscrowError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

/// An opaque principal identity (client, contractor, or administrator).
///
/// `Address::ZERO` is the invalid/uninitialized identity; the access policy
/// authorizes nothing against it, which doubles as the "project exists"
/// check for raw ledger slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub u64);

impl Address {
    pub const ZERO: Self = Self(0);

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl FromStr for Address {
    type Err = EscrowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s.strip_prefix("0x") {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => s.parse::<u64>(),
        };
        parsed
            .map(Self)
            .map_err(|_| EscrowError::InvalidInput(format!("malformed address: {s}")))
    }
}

impl TryFrom<String> for Address {
    type Error = EscrowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

/// A validated, non-negative monetary amount.
///
/// Wraps `rust_decimal::Decimal` so negative values are rejected at the
/// boundary instead of inside the state machine.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, EscrowError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(EscrowError::InvalidInput(
                "amount must not be negative".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = EscrowError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

/// Funds held in custody, as a value object with plain arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }
}

impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named portion of the project budget with its wage share.
///
/// Milestones are recorded at creation and released in aggregate; the wage
/// share is audit metadata, not a payout split key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub description: String,
    pub amount: Amount,
    pub wage_share_percent: u8,
}

impl Milestone {
    pub fn new(
        description: impl Into<String>,
        amount: Amount,
        wage_share_percent: u8,
    ) -> Result<Self, EscrowError> {
        if wage_share_percent > 100 {
            return Err(EscrowError::InvalidInput(format!(
                "wage share must be within 0..=100, got {wage_share_percent}"
            )));
        }
        Ok(Self {
            description: description.into(),
            amount,
            wage_share_percent,
        })
    }
}

/// Project lifecycle status, surfaced to callers as an integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    Pending,
    Released,
    RefundRequested,
    Disputed,
    Closed,
}

impl ProjectStatus {
    pub fn code(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Released => 1,
            Self::RefundRequested => 2,
            Self::Disputed => 3,
            Self::Closed => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Released),
            2 => Some(Self::RefundRequested),
            3 => Some(Self::Disputed),
            4 => Some(Self::Closed),
            _ => None,
        }
    }

    /// True once custody has been emptied and no fund-moving operation
    /// may touch the project again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Released | Self::Closed)
    }
}

impl Serialize for ProjectStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for ProjectStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let code = u8::deserialize(deserializer)?;
        Self::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown status code {code}")))
    }
}

/// Administrator ruling on a disputed refund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArbitrationOutcome {
    FavorClient,
    FavorContractor,
}

/// The sole persistent entity: one escrowed engagement between a client
/// and a contractor.
///
/// `total_budget` always equals the funds still held in custody for this
/// project; it is decremented only by actual payouts and never re-assigned
/// upward. Terminal projects are retained as an immutable audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub client: Address,
    pub contractor: Address,
    pub milestones: Vec<Milestone>,
    pub total_budget: Balance,
    pub metadata: String,
    pub proof: Option<String>,
    pub status: ProjectStatus,
}

impl Project {
    /// Checks the creation inputs without building a record. The engine
    /// runs this before reserving an id so failed creates never consume one.
    pub fn validate_inputs(
        contractor: Address,
        milestones: &[Milestone],
        deposit: Amount,
    ) -> Result<(), EscrowError> {
        if contractor.is_zero() {
            return Err(EscrowError::InvalidInput(
                "contractor address must not be zero".to_string(),
            ));
        }
        if milestones.is_empty() {
            return Err(EscrowError::InvalidInput(
                "a project needs at least one milestone".to_string(),
            ));
        }
        let milestone_sum: Decimal = milestones.iter().map(|m| m.amount.value()).sum();
        if milestone_sum != deposit.value() {
            return Err(EscrowError::InvalidInput(format!(
                "deposit {} does not match milestone sum {}",
                deposit.value(),
                milestone_sum
            )));
        }
        Ok(())
    }

    /// Validates and assembles a new `Pending` project holding `deposit`
    /// in custody. The deposit must equal the milestone sum exactly.
    pub fn new(
        id: u64,
        client: Address,
        contractor: Address,
        milestones: Vec<Milestone>,
        metadata: impl Into<String>,
        deposit: Amount,
    ) -> Result<Self, EscrowError> {
        Self::validate_inputs(contractor, &milestones, deposit)?;
        Ok(Self {
            id,
            client,
            contractor,
            milestones,
            total_budget: deposit.into(),
            metadata: metadata.into(),
            proof: None,
            status: ProjectStatus::Pending,
        })
    }

    /// Empties custody, returning the amount to hand to the transfer
    /// gateway. Callers must have committed a terminal status in the same
    /// operation.
    pub fn take_custody(&mut self) -> Balance {
        std::mem::take(&mut self.total_budget)
    }

    /// Records completion evidence. Settable exactly once.
    pub fn attach_proof(&mut self, proof: String) -> Result<(), EscrowError> {
        if self.proof.is_some() {
            return Err(EscrowError::InvalidState {
                project: self.id,
                status: self.status,
            });
        }
        self.proof = Some(proof);
        Ok(())
    }
}
