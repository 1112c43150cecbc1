//! Billing Computation and Lifecycle Tests
//!
//! Covers the derivation invariants of the Bill aggregate:
//! - Subtotal, tax, total, and pending amount arithmetic
//! - Payment-status precedence (paid > partially_paid > overdue > unchanged)
//! - paid_date latching and recompute idempotence
//! - Line item screening leniency and the observable skip count
//! - Invoice number formatting
//!
//! # Test Organization
//!
//! - `recompute_tests` - total and tax derivation
//! - `status_tests` - status precedence and paid_date behavior
//! - `payment_tests` - payment application and mark_paid shortcut
//! - `line_item_tests` - screening leniency
//! - `proptests` - arithmetic invariants over arbitrary fee inputs

use chrono::{Duration, TimeZone, Utc};
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, PatientId, Rate};
use domain_billing::{
    format_invoice_number, screen_line_items, Bill, BillStatus, BillType, LineItemDraft,
};
use test_utils::TestBillBuilder;

/// Fixed reference instant so overdue checks are deterministic
fn reference_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 10, 0, 0).unwrap()
}

fn bill_due(days_from_now: i64) -> Bill {
    let due = reference_now().date_naive() + Duration::days(days_from_now);
    Bill::new(PatientId::new(), BillType::Consultation, due, Currency::INR)
}

// ============================================================================
// RECOMPUTE TESTS
// ============================================================================

mod recompute_tests {
    use super::*;

    /// Verifies the canonical consultation scenario: 500 fee, 18% GST
    #[test]
    fn test_consultation_bill_totals() {
        let mut bill = bill_due(30).with_doctor_fee(Money::inr(dec!(500)));
        bill.recompute_at(reference_now()).unwrap();

        assert_eq!(bill.subtotal.amount(), dec!(500), "subtotal should be 500");
        assert_eq!(bill.tax_amount.amount(), dec!(90), "18% GST of 500 is 90");
        assert_eq!(bill.total_amount.amount(), dec!(590), "total should be 590");
        assert_eq!(bill.pending_amount.amount(), dec!(590), "nothing paid yet");
        assert_eq!(bill.status, BillStatus::Pending, "new bill stays pending");
    }

    /// Verifies subtotal sums all three fee components
    #[test]
    fn test_subtotal_sums_fee_components() {
        let mut bill = bill_due(30)
            .with_doctor_fee(Money::inr(dec!(300)))
            .with_room_charge(Money::inr(dec!(1200)));
        bill.set_medicine_total(Money::inr(dec!(25)));
        bill.recompute_at(reference_now()).unwrap();

        assert_eq!(
            bill.subtotal.amount(),
            dec!(1525),
            "subtotal = doctor_fee + room_charge + medicine_total"
        );
    }

    /// Verifies tax is rounded to the currency's minor unit
    #[test]
    fn test_tax_rounded_to_minor_unit() {
        let mut bill = bill_due(30)
            .with_doctor_fee(Money::inr(dec!(333.33)))
            .with_tax_rate(Rate::from_percentage(dec!(18)));
        bill.recompute_at(reference_now()).unwrap();

        // 333.33 * 0.18 = 59.9994 -> 60.00
        assert_eq!(bill.tax_amount.amount(), dec!(60.00));
        assert_eq!(bill.total_amount.amount(), dec!(393.33));
    }

    /// Verifies discount is applied after tax
    #[test]
    fn test_discount_reduces_total() {
        let mut bill = bill_due(30)
            .with_doctor_fee(Money::inr(dec!(500)))
            .with_discount(Money::inr(dec!(90)));
        bill.recompute_at(reference_now()).unwrap();

        assert_eq!(
            bill.total_amount.amount(),
            dec!(500),
            "total = subtotal + tax - discount"
        );
        assert_eq!(bill.pending_amount.amount(), dec!(500));
    }

    /// Verifies a discount larger than subtotal + tax is rejected
    #[test]
    fn test_negative_total_rejected() {
        let mut bill = bill_due(30)
            .with_doctor_fee(Money::inr(dec!(100)))
            .with_discount(Money::inr(dec!(200)));

        assert!(
            bill.recompute_at(reference_now()).is_err(),
            "discount exceeding the taxed subtotal must fail"
        );
    }

    /// Verifies recompute is idempotent with unchanged inputs
    #[test]
    fn test_recompute_is_idempotent() {
        let now = reference_now();
        let mut bill = bill_due(30)
            .with_doctor_fee(Money::inr(dec!(500)))
            .with_room_charge(Money::inr(dec!(750)));
        bill.recompute_at(now).unwrap();
        let first = bill.clone();

        bill.recompute_at(now).unwrap();
        assert_eq!(bill.subtotal, first.subtotal);
        assert_eq!(bill.tax_amount, first.tax_amount);
        assert_eq!(bill.total_amount, first.total_amount);
        assert_eq!(bill.pending_amount, first.pending_amount);
        assert_eq!(bill.status, first.status);
        assert_eq!(bill.paid_date, first.paid_date);
    }
}

// ============================================================================
// STATUS PRECEDENCE TESTS
// ============================================================================

mod status_tests {
    use super::*;

    /// Verifies full payment wins over every other status rule
    #[test]
    fn test_settled_bill_is_paid_even_when_overdue() {
        let now = reference_now();
        let mut bill = TestBillBuilder::new().overdue().build();
        assert_eq!(bill.status, BillStatus::Overdue, "unpaid past-due bill is overdue");

        bill.apply_payment(Money::inr(dec!(590)), now).unwrap();
        assert_eq!(
            bill.status,
            BillStatus::Paid,
            "paid must take precedence over overdue"
        );
        assert_eq!(bill.pending_amount.amount(), dec!(0));
    }

    /// Verifies a partial payment beats the overdue rule
    #[test]
    fn test_partial_payment_beats_overdue() {
        let now = reference_now();
        let mut bill = bill_due(-5).with_doctor_fee(Money::inr(dec!(500)));
        bill.recompute_at(now).unwrap();

        bill.apply_payment(Money::inr(dec!(100)), now).unwrap();
        assert_eq!(
            bill.status,
            BillStatus::PartiallyPaid,
            "partially_paid must take precedence over overdue"
        );
    }

    /// Verifies a future-dated unpaid bill keeps its prior status
    #[test]
    fn test_unpaid_bill_before_due_date_stays_pending() {
        let mut bill = bill_due(30).with_doctor_fee(Money::inr(dec!(500)));
        bill.recompute_at(reference_now()).unwrap();
        assert_eq!(bill.status, BillStatus::Pending);
    }

    /// Verifies paid_date is latched on settlement and never cleared
    #[test]
    fn test_paid_date_latched() {
        let now = reference_now();
        let mut bill = bill_due(30).with_doctor_fee(Money::inr(dec!(500)));
        bill.recompute_at(now).unwrap();
        assert!(bill.paid_date.is_none(), "unsettled bill has no paid_date");

        bill.apply_payment(Money::inr(dec!(590)), now).unwrap();
        let settled_at = bill.paid_date.expect("settlement must stamp paid_date");

        let later = now + Duration::hours(2);
        bill.recompute_at(later).unwrap();
        assert_eq!(
            bill.paid_date,
            Some(settled_at),
            "recompute must never move an already-set paid_date"
        );
    }

    /// Verifies overpayment still derives Paid with a negative pending amount
    #[test]
    fn test_overpayment_is_paid() {
        let now = reference_now();
        let mut bill = bill_due(30).with_doctor_fee(Money::inr(dec!(500)));
        bill.recompute_at(now).unwrap();

        bill.apply_payment(Money::inr(dec!(600)), now).unwrap();
        assert_eq!(bill.status, BillStatus::Paid);
        assert_eq!(bill.pending_amount.amount(), dec!(-10));
    }

    /// Verifies the pending_amount <= 0 ⇔ Paid equivalence
    #[test]
    fn test_pending_zero_iff_paid() {
        let now = reference_now();
        let mut bill = bill_due(30).with_doctor_fee(Money::inr(dec!(250)));
        bill.recompute_at(now).unwrap();
        assert!(bill.pending_amount.is_positive());
        assert_ne!(bill.status, BillStatus::Paid);

        bill.apply_payment(Money::inr(dec!(295)), now).unwrap();
        assert!(!bill.pending_amount.is_positive());
        assert_eq!(bill.status, BillStatus::Paid);
    }
}

// ============================================================================
// PAYMENT TESTS
// ============================================================================

mod payment_tests {
    use super::*;

    /// A 590 total settled in a single payment
    #[test]
    fn test_full_payment_settles_bill() {
        let now = reference_now();
        let mut bill = TestBillBuilder::new().build();

        bill.apply_payment(Money::inr(dec!(590)), now).unwrap();

        assert_eq!(bill.status, BillStatus::Paid);
        assert_eq!(bill.pending_amount.amount(), dec!(0));
        assert!(bill.paid_date.is_some(), "settlement stamps paid_date");
    }

    /// Verifies payments accumulate across applications
    #[test]
    fn test_payments_accumulate() {
        let now = reference_now();
        let mut bill = bill_due(30).with_doctor_fee(Money::inr(dec!(500)));
        bill.recompute_at(now).unwrap();

        bill.apply_payment(Money::inr(dec!(200)), now).unwrap();
        assert_eq!(bill.status, BillStatus::PartiallyPaid);
        assert_eq!(bill.pending_amount.amount(), dec!(390));

        bill.apply_payment(Money::inr(dec!(390)), now).unwrap();
        assert_eq!(bill.status, BillStatus::Paid);
    }

    /// Verifies zero and negative payments are rejected
    #[test]
    fn test_non_positive_payment_rejected() {
        let now = reference_now();
        let mut bill = bill_due(30).with_doctor_fee(Money::inr(dec!(500)));
        bill.recompute_at(now).unwrap();

        assert!(bill.apply_payment(Money::inr(dec!(0)), now).is_err());
        assert!(bill.apply_payment(Money::inr(dec!(-10)), now).is_err());
    }

    /// Verifies cancellation keeps the amounts auditable and closes the
    /// bill to further payments
    #[test]
    fn test_cancelled_bill_keeps_amounts_and_rejects_payments() {
        let now = reference_now();
        let mut bill = TestBillBuilder::new().build();

        bill.cancel(now);

        assert_eq!(bill.status, BillStatus::Cancelled);
        assert_eq!(
            bill.total_amount.amount(),
            dec!(590.00),
            "cancellation leaves the amounts as they were"
        );
        assert!(
            bill.apply_payment(Money::inr(dec!(100)), now).is_err(),
            "a cancelled bill takes no further payments"
        );
    }

    /// Verifies mark_paid flips status and stamps paid_date without
    /// reconciling the amount fields (the documented shortcut path)
    #[test]
    fn test_mark_paid_does_not_touch_amounts() {
        let now = reference_now();
        let mut bill = TestBillBuilder::new().build();

        bill.mark_paid(now);

        assert_eq!(bill.status, BillStatus::Paid);
        assert_eq!(bill.paid_date, Some(now));
        assert_eq!(
            bill.pending_amount.amount(),
            dec!(590),
            "mark_paid leaves pending_amount untouched"
        );
        assert_eq!(
            bill.paid_amount.amount(),
            dec!(0),
            "mark_paid leaves paid_amount untouched"
        );
    }
}

// ============================================================================
// LINE ITEM TESTS
// ============================================================================

mod line_item_tests {
    use super::*;

    /// One medicine line and no other charges
    #[test]
    fn test_medicine_only_bill() {
        let now = reference_now();
        let mut bill = bill_due(30);
        let drafts = vec![LineItemDraft::new("Paracetamol", 10, dec!(2.50))];

        let screened = screen_line_items(bill.id, bill.currency, &drafts);
        assert_eq!(screened.accepted.len(), 1);
        assert_eq!(screened.skipped, 0);

        bill.set_medicine_total(screened.medicine_total(bill.currency));
        bill.recompute_at(now).unwrap();

        assert_eq!(bill.medicine_total.amount(), dec!(25.00));
        assert_eq!(bill.subtotal.amount(), dec!(25.00));
        assert_eq!(bill.tax_amount.amount(), dec!(4.50));
        assert_eq!(bill.total_amount.amount(), dec!(29.50));
    }

    /// Verifies a draft missing its name is dropped, not an error, and the
    /// bill is still assembled from the remaining valid items (intentional
    /// permissiveness, surfaced through the skip count)
    #[test]
    fn test_nameless_draft_skipped_bill_still_created() {
        let now = reference_now();
        let mut bill = bill_due(30);
        let drafts = vec![
            LineItemDraft {
                name: None,
                quantity: Some(3),
                unit_price: Some(dec!(4.00)),
            },
            LineItemDraft::new("Amoxicillin", 2, dec!(12.00)),
        ];

        let screened = screen_line_items(bill.id, bill.currency, &drafts);
        assert_eq!(screened.accepted.len(), 1, "valid draft survives");
        assert_eq!(screened.skipped, 1, "skip count is observable");

        bill.set_medicine_total(screened.medicine_total(bill.currency));
        bill.recompute_at(now).unwrap();
        assert_eq!(bill.medicine_total.amount(), dec!(24.00));
    }

    /// Verifies each leniency trigger skips exactly that draft
    #[test]
    fn test_each_invalid_shape_skipped() {
        let bill = bill_due(30);
        let drafts = vec![
            // missing name
            LineItemDraft {
                name: None,
                quantity: Some(1),
                unit_price: Some(dec!(1)),
            },
            // missing quantity
            LineItemDraft {
                name: Some("Cetirizine".to_string()),
                quantity: None,
                unit_price: Some(dec!(1)),
            },
            // zero quantity
            LineItemDraft::new("Cetirizine", 0, dec!(1)),
            // negative quantity
            LineItemDraft::new("Cetirizine", -2, dec!(1)),
            // missing unit price
            LineItemDraft {
                name: Some("Cetirizine".to_string()),
                quantity: Some(1),
                unit_price: None,
            },
            // negative unit price
            LineItemDraft::new("Cetirizine", 1, dec!(-1)),
            // the one valid draft
            LineItemDraft::new("Cetirizine", 1, dec!(3.50)),
        ];

        let screened = screen_line_items(bill.id, bill.currency, &drafts);
        assert_eq!(screened.accepted.len(), 1);
        assert_eq!(screened.skipped, 6);
    }
}

// ============================================================================
// INVOICE NUMBER TESTS
// ============================================================================

mod invoice_number_tests {
    use super::*;

    /// Verifies the INV-NNNNNN shape
    #[test]
    fn test_invoice_number_shape() {
        assert_eq!(format_invoice_number(1), "INV-000001");
        assert_eq!(format_invoice_number(482), "INV-000482");
    }

    /// Verifies assignment is once-only on the aggregate
    #[test]
    fn test_invoice_number_immutable_after_assignment() {
        let mut bill = bill_due(30);
        bill.assign_invoice_number(format_invoice_number(7)).unwrap();
        assert!(bill.assign_invoice_number(format_invoice_number(8)).is_err());
        assert_eq!(bill.invoice_number().unwrap(), "INV-000007");
    }
}

// ============================================================================
// PROPERTY TESTS
// ============================================================================

mod proptests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    proptest! {
        /// The derivation identities hold for arbitrary non-negative inputs
        #[test]
        fn recompute_identities_hold(
            doctor_fee in 0i64..10_000_000i64,
            room_charge in 0i64..10_000_000i64,
            medicine in 0i64..10_000_000i64,
            paid in 0i64..10_000_000i64,
            tax_pct in 0u32..40u32
        ) {
            let now = reference_now();
            let mut bill = bill_due(30)
                .with_doctor_fee(Money::from_minor(doctor_fee, Currency::INR))
                .with_room_charge(Money::from_minor(room_charge, Currency::INR))
                .with_tax_rate(Rate::from_percentage(Decimal::from(tax_pct)));
            bill.set_medicine_total(Money::from_minor(medicine, Currency::INR));
            bill.paid_amount = Money::from_minor(paid, Currency::INR);

            bill.recompute_at(now).unwrap();

            prop_assert_eq!(
                bill.subtotal.amount(),
                bill.doctor_fee.amount() + bill.room_charge.amount() + bill.medicine_total.amount()
            );
            prop_assert_eq!(
                bill.total_amount.amount(),
                bill.subtotal.amount() + bill.tax_amount.amount() - bill.discount_amount.amount()
            );
            prop_assert_eq!(
                bill.pending_amount.amount(),
                bill.total_amount.amount() - bill.paid_amount.amount()
            );
            prop_assert_eq!(
                !bill.pending_amount.is_positive(),
                bill.status == BillStatus::Paid
            );
        }

        /// Recomputing twice with unchanged inputs changes nothing
        #[test]
        fn recompute_idempotent(
            doctor_fee in 0i64..10_000_000i64,
            paid in 0i64..10_000_000i64
        ) {
            let now = reference_now();
            let mut bill = bill_due(30)
                .with_doctor_fee(Money::from_minor(doctor_fee, Currency::INR));
            bill.paid_amount = Money::from_minor(paid, Currency::INR);

            bill.recompute_at(now).unwrap();
            let first = bill.clone();
            bill.recompute_at(now).unwrap();

            prop_assert_eq!(bill.total_amount, first.total_amount);
            prop_assert_eq!(bill.pending_amount, first.pending_amount);
            prop_assert_eq!(bill.status, first.status);
            prop_assert_eq!(bill.paid_date, first.paid_date);
        }
    }
}
