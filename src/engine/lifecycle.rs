//! Delivery state machine.
//!
//! ```text
//! Pending ──assign──▶ Assigned ──pickup code──▶ InTransit ──confirmation code──▶ Delivered
//!    │                   │
//!    └──────cancel───────┴──▶ Cancelled
//! ```
//!
//! Each function validates before mutating, so a rejected transition leaves
//! the delivery untouched.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::delivery::{Delivery, DeliveryStatus};
use crate::verification::is_valid_code_format;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Assign,
    Pickup,
    Confirm,
    Cancel,
}

#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("cannot {action:?} a delivery that is {from:?}")]
    InvalidTransition { from: DeliveryStatus, action: Action },

    #[error("rider {0} is not assigned to this delivery")]
    RiderMismatch(Uuid),

    #[error("verification code must be 6 digits")]
    InvalidCodeFormat,

    #[error("invalid verification code")]
    CodeMismatch,
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::InvalidTransition { .. } => AppError::Conflict(err.to_string()),
            TransitionError::RiderMismatch(_) => AppError::Forbidden(err.to_string()),
            TransitionError::InvalidCodeFormat | TransitionError::CodeMismatch => {
                AppError::InvalidCode(err.to_string())
            }
        }
    }
}

pub fn assign(
    delivery: &mut Delivery,
    rider_id: Uuid,
    now: DateTime<Utc>,
) -> Result<(), TransitionError> {
    expect_status(delivery, DeliveryStatus::Pending, Action::Assign)?;

    delivery.status = DeliveryStatus::Assigned;
    delivery.rider_id = Some(rider_id);
    delivery.assigned_at = Some(now);
    Ok(())
}

pub fn verify_pickup(
    delivery: &mut Delivery,
    rider_id: Uuid,
    code: &str,
    now: DateTime<Utc>,
) -> Result<(), TransitionError> {
    expect_status(delivery, DeliveryStatus::Assigned, Action::Pickup)?;
    expect_rider(delivery, rider_id)?;
    check_code(code, &delivery.pickup_code)?;

    delivery.status = DeliveryStatus::InTransit;
    delivery.picked_up_at = Some(now);
    Ok(())
}

pub fn confirm_delivery(
    delivery: &mut Delivery,
    rider_id: Uuid,
    code: &str,
    now: DateTime<Utc>,
) -> Result<(), TransitionError> {
    expect_status(delivery, DeliveryStatus::InTransit, Action::Confirm)?;
    expect_rider(delivery, rider_id)?;
    check_code(code, &delivery.confirmation_code)?;

    delivery.status = DeliveryStatus::Delivered;
    delivery.delivered_at = Some(now);
    Ok(())
}

pub fn cancel(delivery: &mut Delivery, now: DateTime<Utc>) -> Result<(), TransitionError> {
    match delivery.status {
        DeliveryStatus::Pending | DeliveryStatus::Assigned => {
            delivery.status = DeliveryStatus::Cancelled;
            delivery.cancelled_at = Some(now);
            Ok(())
        }
        from => Err(TransitionError::InvalidTransition {
            from,
            action: Action::Cancel,
        }),
    }
}

fn expect_status(
    delivery: &Delivery,
    expected: DeliveryStatus,
    action: Action,
) -> Result<(), TransitionError> {
    if delivery.status == expected {
        Ok(())
    } else {
        Err(TransitionError::InvalidTransition {
            from: delivery.status,
            action,
        })
    }
}

fn expect_rider(delivery: &Delivery, rider_id: Uuid) -> Result<(), TransitionError> {
    if delivery.rider_id == Some(rider_id) {
        Ok(())
    } else {
        Err(TransitionError::RiderMismatch(rider_id))
    }
}

fn check_code(submitted: &str, expected: &str) -> Result<(), TransitionError> {
    if !is_valid_code_format(submitted) {
        return Err(TransitionError::InvalidCodeFormat);
    }
    if submitted != expected {
        return Err(TransitionError::CodeMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{assign, cancel, confirm_delivery, verify_pickup, Action, TransitionError};
    use crate::models::delivery::{Delivery, DeliveryStatus};
    use crate::models::rider::GeoPoint;

    fn pending_delivery() -> Delivery {
        Delivery {
            id: Uuid::new_v4(),
            order_reference: "order-1".to_string(),
            location_id: "downtown".to_string(),
            pickup: GeoPoint {
                lat: 52.52,
                lng: 13.405,
            },
            dropoff: GeoPoint {
                lat: 52.53,
                lng: 13.41,
            },
            delivery_fee: 15.0,
            commission_amount: 0.02,
            rider_earning: 14.98,
            status: DeliveryStatus::Pending,
            rider_id: None,
            pickup_code: "111111".to_string(),
            confirmation_code: "222222".to_string(),
            created_at: Utc::now(),
            assigned_at: None,
            picked_up_at: None,
            delivered_at: None,
            cancelled_at: None,
        }
    }

    fn assigned_delivery(rider: Uuid) -> Delivery {
        let mut delivery = pending_delivery();
        assign(&mut delivery, rider, Utc::now()).unwrap();
        delivery
    }

    #[test]
    fn happy_path_reaches_delivered() {
        let rider = Uuid::new_v4();
        let mut delivery = assigned_delivery(rider);
        assert_eq!(delivery.status, DeliveryStatus::Assigned);
        assert_eq!(delivery.rider_id, Some(rider));

        verify_pickup(&mut delivery, rider, "111111", Utc::now()).unwrap();
        assert_eq!(delivery.status, DeliveryStatus::InTransit);
        assert!(delivery.picked_up_at.is_some());

        confirm_delivery(&mut delivery, rider, "222222", Utc::now()).unwrap();
        assert_eq!(delivery.status, DeliveryStatus::Delivered);
        assert!(delivery.delivered_at.is_some());
    }

    #[test]
    fn wrong_pickup_code_keeps_assigned() {
        let rider = Uuid::new_v4();
        let mut delivery = assigned_delivery(rider);

        let err = verify_pickup(&mut delivery, rider, "999999", Utc::now()).unwrap_err();
        assert_eq!(err, TransitionError::CodeMismatch);
        assert_eq!(delivery.status, DeliveryStatus::Assigned);
        assert!(delivery.picked_up_at.is_none());
    }

    #[test]
    fn confirmation_code_does_not_unlock_pickup() {
        let rider = Uuid::new_v4();
        let mut delivery = assigned_delivery(rider);

        let err = verify_pickup(&mut delivery, rider, "222222", Utc::now()).unwrap_err();
        assert_eq!(err, TransitionError::CodeMismatch);
    }

    #[test]
    fn malformed_code_is_rejected_before_comparison() {
        let rider = Uuid::new_v4();
        let mut delivery = assigned_delivery(rider);
        delivery.pickup_code = "12a456".to_string();

        let err = verify_pickup(&mut delivery, rider, "12a456", Utc::now()).unwrap_err();
        assert_eq!(err, TransitionError::InvalidCodeFormat);
        assert_eq!(delivery.status, DeliveryStatus::Assigned);
    }

    #[test]
    fn wrong_confirmation_code_keeps_in_transit() {
        let rider = Uuid::new_v4();
        let mut delivery = assigned_delivery(rider);
        verify_pickup(&mut delivery, rider, "111111", Utc::now()).unwrap();

        let err = confirm_delivery(&mut delivery, rider, "111111", Utc::now()).unwrap_err();
        assert_eq!(err, TransitionError::CodeMismatch);
        assert_eq!(delivery.status, DeliveryStatus::InTransit);
    }

    #[test]
    fn other_rider_cannot_pick_up() {
        let mut delivery = assigned_delivery(Uuid::new_v4());
        let intruder = Uuid::new_v4();

        let err = verify_pickup(&mut delivery, intruder, "111111", Utc::now()).unwrap_err();
        assert_eq!(err, TransitionError::RiderMismatch(intruder));
    }

    #[test]
    fn cannot_skip_pickup() {
        let rider = Uuid::new_v4();
        let mut delivery = assigned_delivery(rider);

        let err = confirm_delivery(&mut delivery, rider, "222222", Utc::now()).unwrap_err();
        assert_eq!(
            err,
            TransitionError::InvalidTransition {
                from: DeliveryStatus::Assigned,
                action: Action::Confirm,
            }
        );
    }

    #[test]
    fn cannot_assign_twice() {
        let mut delivery = assigned_delivery(Uuid::new_v4());
        assert!(assign(&mut delivery, Uuid::new_v4(), Utc::now()).is_err());
    }

    #[test]
    fn cancel_only_before_pickup() {
        let mut pending = pending_delivery();
        cancel(&mut pending, Utc::now()).unwrap();
        assert_eq!(pending.status, DeliveryStatus::Cancelled);

        let rider = Uuid::new_v4();
        let mut assigned = assigned_delivery(rider);
        cancel(&mut assigned, Utc::now()).unwrap();
        assert_eq!(assigned.status, DeliveryStatus::Cancelled);

        let mut in_transit = assigned_delivery(rider);
        verify_pickup(&mut in_transit, rider, "111111", Utc::now()).unwrap();
        assert!(cancel(&mut in_transit, Utc::now()).is_err());
        assert_eq!(in_transit.status, DeliveryStatus::InTransit);

        assert!(cancel(&mut pending, Utc::now()).is_err());
    }
}
