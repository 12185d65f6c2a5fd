use crate::model::ticket::PaymentMethod;

/// Round to whole cents. All ticket money passes through here before it
/// is persisted or summed into reports.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub fn line_total(quantity: u32, unit_price: f64) -> f64 {
    round_cents(quantity as f64 * unit_price)
}

/// Ticket total, floored at zero when the discount exceeds the subtotal.
pub fn ticket_total(subtotal: f64, discount: f64) -> f64 {
    round_cents((subtotal - discount).max(0.0))
}

#[derive(Debug, PartialEq)]
pub struct TipBreakdown {
    pub cash: f64,
    pub card: f64,
}

/// Customer tip follows the payment method; the receptionist tip is
/// always handed over in cash.
pub fn tip_breakdown(
    payment: PaymentMethod,
    tip_customer: f64,
    tip_receptionist: f64,
) -> TipBreakdown {
    let (cash_customer, card_customer) = match payment {
        PaymentMethod::Cash | PaymentMethod::Other => (tip_customer, 0.0),
        PaymentMethod::Card => (0.0, tip_customer),
    };

    TipBreakdown {
        cash: round_cents(cash_customer + tip_receptionist),
        card: round_cents(card_customer),
    }
}

/// Split a tip across technicians in proportion to the work each did.
/// Cent-exact: the rounding remainder goes to the largest share so the
/// parts always sum back to the tip.
pub fn split_tip(tip: f64, line_totals: &[f64]) -> Vec<f64> {
    if line_totals.is_empty() {
        return Vec::new();
    }

    let tip_cents = (tip * 100.0).round() as i64;
    let weight_sum: f64 = line_totals.iter().sum();

    // No billable work recorded: split evenly instead.
    let mut shares: Vec<i64> = if weight_sum <= 0.0 {
        let each = tip_cents / line_totals.len() as i64;
        vec![each; line_totals.len()]
    } else {
        line_totals
            .iter()
            .map(|w| ((tip_cents as f64) * w / weight_sum).floor() as i64)
            .collect()
    };

    let remainder = tip_cents - shares.iter().sum::<i64>();
    if remainder != 0 {
        let largest = line_totals
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0);
        shares[largest] += remainder;
    }

    shares.into_iter().map(|c| c as f64 / 100.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_subtotal_minus_discount() {
        assert_eq!(ticket_total(85.0, 10.0), 75.0);
    }

    #[test]
    fn total_never_goes_negative() {
        assert_eq!(ticket_total(20.0, 35.0), 0.0);
    }

    #[test]
    fn cash_payment_puts_customer_tip_in_cash() {
        let t = tip_breakdown(PaymentMethod::Cash, 10.0, 5.0);
        assert_eq!(t, TipBreakdown { cash: 15.0, card: 0.0 });
    }

    #[test]
    fn card_payment_splits_customer_and_receptionist_tips() {
        let t = tip_breakdown(PaymentMethod::Card, 10.0, 5.0);
        assert_eq!(t, TipBreakdown { cash: 5.0, card: 10.0 });
    }

    // Gift certificates and the like settle outside the card terminal, so
    // their tips are handed over in cash at the register.
    #[test]
    fn other_payment_treats_customer_tip_as_cash() {
        let t = tip_breakdown(PaymentMethod::Other, 10.0, 5.0);
        assert_eq!(t, TipBreakdown { cash: 15.0, card: 0.0 });
    }

    #[test]
    fn proportional_split_sums_back_to_tip() {
        let shares = split_tip(10.0, &[30.0, 30.0, 40.0]);
        assert_eq!(shares, vec![3.0, 3.0, 4.0]);

        // 10.00 over thirds leaves a remainder cent
        let shares = split_tip(10.0, &[10.0, 10.0, 10.0]);
        let total: f64 = shares.iter().sum();
        assert!((total - 10.0).abs() < 1e-9);
        assert_eq!(shares.iter().filter(|s| **s == 3.34).count(), 1);
    }

    #[test]
    fn zero_work_splits_evenly() {
        let shares = split_tip(9.0, &[0.0, 0.0, 0.0]);
        assert_eq!(shares, vec![3.0, 3.0, 3.0]);
    }

    #[test]
    fn empty_split_is_empty() {
        assert!(split_tip(5.0, &[]).is_empty());
    }
}
