//! Loan state service: checks records out and back in

use crate::{
    error::{AppError, AppResult},
    models::{CheckoutState, LoanAction, RecordId},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Apply a loan action to a record.
    ///
    /// Checking out always stamps the current instant, even when the record is
    /// already checked out. Returning always clears the marker.
    pub async fn set_loan_state(&self, id: &str, action: Option<&str>) -> AppResult<LoanAction> {
        let action: LoanAction = action.unwrap_or_default().parse()?;
        let id: RecordId = id.parse()?;

        let state = match action {
            LoanAction::Checkout => CheckoutState::checked_out_now(),
            LoanAction::Return => CheckoutState::Available,
        };

        if !self.repository.livres.set_checkout(&id, &state).await? {
            return Err(AppError::NotFound("Document non trouvé".to_string()));
        }

        tracing::info!("Record {}: {} (marker {:?})", id, action.as_str(), state.marker());
        Ok(action)
    }
}
