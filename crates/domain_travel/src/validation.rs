//! Submission checks
//!
//! Fields are checked in a fixed order and the first failure wins, so the
//! same incomplete claim always reports the same field.

use crate::claim::TravelClaim;
use crate::error::ClaimError;
use crate::rates::TransportRates;

/// Checks that a claim carries everything a reviewer needs
///
/// Order: `purpose`, `origin`, `destination`, `transportMode` (must be
/// priced by the rate table), `distanceKm` (non-negative), `travelDates`
/// (`from <= to`).
pub fn validate_for_submission(claim: &TravelClaim, rates: &TransportRates) -> Result<(), ClaimError> {
    require_text("purpose", &claim.purpose)?;
    require_text("origin", &claim.origin)?;
    require_text("destination", &claim.destination)?;

    if !rates.contains(claim.transport_mode) {
        return Err(ClaimError::MissingField("transportMode"));
    }
    if claim.distance_km.is_sign_negative() && !claim.distance_km.is_zero() {
        return Err(ClaimError::MissingField("distanceKm"));
    }
    if claim.travel_dates.validate().is_err() {
        return Err(ClaimError::MissingField("travelDates"));
    }
    Ok(())
}

/// Checks reviewer notes required by a rejection
pub fn require_admin_notes(notes: Option<&str>) -> Result<&str, ClaimError> {
    match notes.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(ClaimError::MissingField("adminNotes")),
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), ClaimError> {
    if value.trim().is_empty() {
        return Err(ClaimError::MissingField(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_notes_trimmed() {
        assert_eq!(require_admin_notes(Some("  no receipts ")).unwrap(), "no receipts");
    }

    #[test]
    fn test_blank_admin_notes_rejected() {
        assert!(matches!(
            require_admin_notes(Some("   ")),
            Err(ClaimError::MissingField("adminNotes"))
        ));
        assert!(matches!(
            require_admin_notes(None),
            Err(ClaimError::MissingField("adminNotes"))
        ));
    }
}
