use chrono::NaiveDate;
use thiserror::Error;

use crate::modification::InvalidTransition;
use crate::ports::{RecommendationError, StoreError};

/// Rejections raised before any pricing or recommendation work happens.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("destination must not be blank")]
    BlankDestination,
    #[error("traveler count must be positive")]
    NonPositiveTravelerCount,
    #[error("traveler age must be positive")]
    NonPositiveTravelerAge,
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("budget {0} DZD is not one of the supported tiers (150000, 300000, 600000)")]
    UnsupportedBudget(i64),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum QuoteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Recommendation(#[from] RecommendationError),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ModificationError {
    #[error("modification window closed: trip starts in {hours_until_start}h, 48h notice required")]
    Ineligible { hours_until_start: i64 },
    #[error("stored contract dates are unreadable")]
    CorruptContractDates,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Recommendation(#[from] RecommendationError),
    #[error("contract store failure: {0}")]
    Store(StoreError),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
}

impl From<StoreError> for ModificationError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::CorruptDates { .. } => Self::CorruptContractDates,
            other => Self::Store(other),
        }
    }
}

impl QuoteError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(_) => {
                "Veuillez remplir tous les champs obligatoires avec des valeurs valides."
            }
            Self::Recommendation(_) => {
                "L'IA n'a pas pu générer une recommandation structurée valide. \
                 Veuillez réessayer plus tard."
            }
        }
    }
}

impl ModificationError {
    /// User-safe French message for the current terminal failure. Every
    /// variant maps to a distinct message so no failure is silently folded
    /// into another.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Ineligible { .. } => {
                "La modification n'est possible que jusqu'à 48 heures avant le début du contrat."
            }
            Self::CorruptContractDates => {
                "Les dates du contrat original sont invalides. Modification impossible."
            }
            Self::Validation(_) => {
                "Veuillez remplir tous les champs obligatoires avec des valeurs valides."
            }
            Self::Recommendation(_) => {
                "L'IA n'a pas pu générer une recommandation structurée valide. \
                 Veuillez réessayer plus tard."
            }
            Self::Store(StoreError::NotFound) => "Contrat non trouvé pour la mise à jour.",
            Self::Store(StoreError::RevisionConflict { .. }) => {
                "Le contrat a été modifié entre-temps. Veuillez recharger et réessayer."
            }
            Self::Store(_) | Self::Transition(_) => {
                "Une erreur technique est survenue. Veuillez réessayer plus tard."
            }
        }
    }
}
