//! Companies, funders and the learners that reference them.

pub mod company;
pub mod funder;
pub mod learner;

pub use company::{Company, CompanyData};
pub use funder::{Funder, FunderData, FunderKind};
pub use learner::{LEARNER_ACTIVE, LEARNER_INACTIVE, Learner, PartnerRef};

/// Validate a French SIRET: exactly 14 ASCII digits.
pub fn is_valid_siret(siret: &str) -> bool {
    siret.len() == 14 && siret.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_siret_shape() {
        assert!(is_valid_siret("73282932000074"));
        assert!(!is_valid_siret("7328293200007"));
        assert!(!is_valid_siret("7328293200007A"));
        assert!(!is_valid_siret("732 829 320 00074"));
    }
}
