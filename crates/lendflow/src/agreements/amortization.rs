//! Fixed-rate annuity math in exact decimal arithmetic.
//!
//! The schedule decomposes each equal monthly payment into its interest and
//! principal portions using the closed-form outstanding-balance formula, and
//! only rounds when a figure is about to be stored.

use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use super::domain::{Agreement, PaymentStatus, ScheduledPayment};

/// Monthly rate from an annual percentage, e.g. 12% -> 0.01.
pub fn monthly_rate(annual_percent: Decimal) -> Decimal {
    annual_percent / Decimal::from(100) / Decimal::from(12)
}

/// `(1 + rate)^periods` by repeated multiplication, staying in exact decimals.
fn compound(rate: Decimal, periods: u32) -> Decimal {
    let base = Decimal::ONE + rate;
    let mut acc = Decimal::ONE;
    for _ in 0..periods {
        acc *= base;
    }
    acc
}

/// The fixed payment that amortizes `principal` to zero over `term` monthly
/// payments at `rate` per month.
pub fn annuity_payment(rate: Decimal, term: u32, principal: Decimal) -> Decimal {
    if rate.is_zero() {
        return principal / Decimal::from(term);
    }
    let growth = compound(rate, term);
    principal * rate * growth / (growth - Decimal::ONE)
}

/// Outstanding balance after `paid_periods` full payments.
fn balance_after(rate: Decimal, paid_periods: u32, term: u32, principal: Decimal) -> Decimal {
    if rate.is_zero() {
        return principal - principal / Decimal::from(term) * Decimal::from(paid_periods);
    }
    let growth = compound(rate, paid_periods);
    let payment = annuity_payment(rate, term, principal);
    principal * growth - payment * (growth - Decimal::ONE) / rate
}

/// Interest portion of payment `period` (1-based): the balance carried into
/// the period times the monthly rate.
pub fn interest_portion(rate: Decimal, period: u32, term: u32, principal: Decimal) -> Decimal {
    balance_after(rate, period - 1, term, principal) * rate
}

/// Payment date for `period`: the disbursement date advanced by that many
/// calendar months, clamped to the destination month's last day when the
/// source day does not exist there (Jan 31 -> Feb 28/29).
pub fn payment_date(disbursement_date: NaiveDate, period: u32) -> NaiveDate {
    disbursement_date
        .checked_add_months(Months::new(period))
        .unwrap_or(NaiveDate::MAX)
}

fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Build the full schedule for an agreement, stamping each period `OVERDUE`
/// iff its payment date falls strictly before `today`.
///
/// Principal portions are derived as `payment - interest` after both are
/// rounded, so the per-period identity holds exactly in the stored figures;
/// the sum of principal portions then matches the agreement principal within
/// one cent per period.
pub fn build_schedule(
    agreement: &Agreement,
    disbursement_date: NaiveDate,
    today: NaiveDate,
) -> Vec<ScheduledPayment> {
    let rate = monthly_rate(agreement.interest_rate);
    let term = agreement.term_months;
    let principal = agreement.principal_amount;
    let payment = round_money(annuity_payment(rate, term, principal));

    (1..=term)
        .map(|period| {
            let date = payment_date(disbursement_date, period);
            let interest = round_money(interest_portion(rate, period, term, principal));
            ScheduledPayment {
                period_number: period,
                status: if date < today {
                    PaymentStatus::Overdue
                } else {
                    PaymentStatus::Future
                },
                payment_date: date,
                period_payment: payment,
                interest_payment: interest,
                principal_payment: payment - interest,
            }
        })
        .collect()
}
