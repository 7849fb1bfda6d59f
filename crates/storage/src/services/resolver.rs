use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::dto::scan::Resolution;
use crate::error::StorageError;
use crate::models::CategoryDetails;
use crate::store::CategoryStore;

pub const DEFAULT_POINTS_VALUE: i32 = 50;
pub const DEFAULT_DISPOSAL_INSTRUCTIONS: &str = "Dispose properly";
pub const DEFAULT_ENVIRONMENTAL_IMPACT: &str = "Low";
pub const DEFAULT_ICON_NAME: &str = "recycle";
pub const DEFAULT_COLOR: &str = "#34D399";

/// 1.2 kg
pub fn default_co2_impact_kg() -> Decimal {
    Decimal::new(12, 1)
}

/// What happens when a label has no matching category. Chosen once at
/// startup and applied to every lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownCategoryPolicy {
    /// Fail with [`ResolveError::UnknownCategory`]; nothing is recorded.
    #[default]
    Reject,
    /// Substitute [`default_details`] and carry on.
    UseDefault,
}

impl FromStr for UnknownCategoryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "default" | "use_default" => Ok(Self::UseDefault),
            other => Err(format!(
                "Unknown category policy '{}', expected 'reject' or 'default'",
                other
            )),
        }
    }
}

impl fmt::Display for UnknownCategoryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::UseDefault => write!(f, "default"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Unknown waste category: '{0}'")]
    UnknownCategory(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Outcome of looking a label up. Under a given policy only one of
/// `Defaulted` and `Unresolved` can ever be produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    Found(CategoryDetails),
    Defaulted(CategoryDetails),
    Unresolved(String),
}

impl ResolutionOutcome {
    pub fn into_details(self) -> Result<(CategoryDetails, Resolution), ResolveError> {
        match self {
            Self::Found(details) => Ok((details, Resolution::Found)),
            Self::Defaulted(details) => Ok((details, Resolution::Defaulted)),
            Self::Unresolved(label) => Err(ResolveError::UnknownCategory(label)),
        }
    }
}

/// The fallback record used under [`UnknownCategoryPolicy::UseDefault`]
pub fn default_details(label: &str) -> CategoryDetails {
    CategoryDetails {
        category_id: None,
        name: label.to_string(),
        description: Some(format!("Predicted as {} by AI model.", label)),
        disposal_instructions: DEFAULT_DISPOSAL_INSTRUCTIONS.to_string(),
        environmental_impact: DEFAULT_ENVIRONMENTAL_IMPACT.to_string(),
        points_value: DEFAULT_POINTS_VALUE,
        co2_impact_kg: default_co2_impact_kg(),
        icon_name: DEFAULT_ICON_NAME.to_string(),
        color: DEFAULT_COLOR.to_string(),
    }
}

pub struct CategoryResolver<'a, S: ?Sized> {
    store: &'a S,
    policy: UnknownCategoryPolicy,
}

impl<'a, S: CategoryStore + ?Sized> CategoryResolver<'a, S> {
    pub fn new(store: &'a S, policy: UnknownCategoryPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> UnknownCategoryPolicy {
        self.policy
    }

    pub async fn lookup(&self, label: &str) -> Result<ResolutionOutcome, StorageError> {
        if let Some(category) = self.store.find_category_by_name(label).await? {
            return Ok(ResolutionOutcome::Found(category.into()));
        }

        let outcome = match self.policy {
            UnknownCategoryPolicy::Reject => ResolutionOutcome::Unresolved(label.to_string()),
            UnknownCategoryPolicy::UseDefault => ResolutionOutcome::Defaulted(default_details(label)),
        };

        tracing::warn!(label, policy = %self.policy, "No waste category matches label");

        Ok(outcome)
    }

    pub async fn resolve(
        &self,
        label: &str,
    ) -> Result<(CategoryDetails, Resolution), ResolveError> {
        self.lookup(label).await?.into_details()
    }
}
