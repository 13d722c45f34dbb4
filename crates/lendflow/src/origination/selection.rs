use rust_decimal::Decimal;

use crate::contracts::{Product, ProductRequest};

/// Pick the product for a requested disbursement amount.
///
/// The policy is first-match over the catalog's declared order, not best-fit:
/// the first product whose principal window admits
/// `min_origination + disbursement` wins, and the request is pinned to that
/// product's most conservative terms (maximum term, minimum interest, minimum
/// origination fee). This is a defined contract, not an optimization target.
pub fn select_product(products: &[Product], disbursement_amount: Decimal) -> Option<ProductRequest> {
    products
        .iter()
        .find(|product| {
            let principal = product.min_origination + disbursement_amount;
            product.min_principal <= principal && principal <= product.max_principal
        })
        .map(|product| ProductRequest {
            code: product.code.clone(),
            term_months: product.max_term,
            interest_rate: product.min_interest,
            origination_amount: product.min_origination,
            disbursement_amount,
        })
}
