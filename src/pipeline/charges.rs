//! Charge calculator
//!
//! | status                        | with return          | without return        |
//! |-------------------------------|----------------------|-----------------------|
//! | Com vigência (either)         | penalty + cancel fee | penalty + non-return  |
//! | Sem vigência e instalado      | cancel fee           | non-return            |
//! | Sem vigência e não instalado  | 0                    | 0                     |

use rust_decimal::Decimal;

use crate::record::{ContractAccessoryRecord, ContractStatus};

/// The two amounts due on rescission of one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charges {
    /// Amount due when the item is returned
    pub with_return: Decimal,
    /// Amount due when the item is kept
    pub without_return: Decimal,
}

/// Decision table over status; inputs are penalty, cancellation fee and
/// non-return fee. Negative inputs cannot push a charge below zero.
pub fn charges_for(
    status: ContractStatus,
    penalty: Decimal,
    cancellation_fee: Decimal,
    non_return_fee: Decimal,
) -> Charges {
    let (with_return, without_return) = match status {
        ContractStatus::InTermInstalled | ContractStatus::InTermNotInstalled => {
            (penalty + cancellation_fee, penalty + non_return_fee)
        }
        ContractStatus::OutOfTermInstalled => (cancellation_fee, non_return_fee),
        ContractStatus::OutOfTermNotInstalled => (Decimal::ZERO, Decimal::ZERO),
    };

    Charges {
        with_return: with_return.max(Decimal::ZERO),
        without_return: without_return.max(Decimal::ZERO),
    }
}

/// Fill both charge columns on every record
pub fn apply_charges(records: &mut [ContractAccessoryRecord]) {
    for record in records.iter_mut() {
        let charges = charges_for(
            record.status_do_contrato,
            record.taxa_multa_25pct,
            record.valor_taxa_cancelamento,
            record.valor_multa_nao_devolucao,
        );
        record.valor_cobrar_com_devolucao = charges.with_return;
        record.valor_cobrar_sem_devolucao = charges.without_return;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::derive::penalty_25pct;
    use crate::record::fixtures::record;

    fn d(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn test_in_term_installed_example() {
        // Fee 1000 over 4 months: penalty 1000
        let penalty = penalty_25pct(Some(d(1000)), 4);
        assert_eq!(penalty, d(1000));

        let charges = charges_for(ContractStatus::InTermInstalled, penalty, d(200), d(150));
        assert_eq!(charges.with_return, d(1200));
        assert_eq!(charges.without_return, d(1150));
    }

    #[test]
    fn test_in_term_statuses_match() {
        let a = charges_for(ContractStatus::InTermInstalled, d(300), d(20), d(40));
        let b = charges_for(ContractStatus::InTermNotInstalled, d(300), d(20), d(40));
        assert_eq!(a, b);
    }

    #[test]
    fn test_out_of_term_installed() {
        let charges = charges_for(ContractStatus::OutOfTermInstalled, d(300), d(20), d(40));
        assert_eq!(charges.with_return, d(20));
        assert_eq!(charges.without_return, d(40));
    }

    #[test]
    fn test_out_of_term_not_installed_is_zero() {
        let charges = charges_for(ContractStatus::OutOfTermNotInstalled, d(300), d(20), d(40));
        assert_eq!(charges.with_return, Decimal::ZERO);
        assert_eq!(charges.without_return, Decimal::ZERO);
    }

    #[test]
    fn test_charges_never_negative() {
        for status in ContractStatus::ALL {
            let charges = charges_for(status, d(10), d(-50), d(-50));
            assert!(charges.with_return >= Decimal::ZERO);
            assert!(charges.without_return >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_apply_charges() {
        let mut records = vec![record("C1", "A", "T1", "S1"), record("C1", "A", "T1", "S2")];
        records[0].status_do_contrato = ContractStatus::InTermNotInstalled;
        records[0].taxa_multa_25pct = d(100);
        records[0].valor_taxa_cancelamento = d(10);
        records[0].valor_multa_nao_devolucao = d(30);
        records[1].valor_taxa_cancelamento = d(10);

        apply_charges(&mut records);

        assert_eq!(records[0].valor_cobrar_com_devolucao, d(110));
        assert_eq!(records[0].valor_cobrar_sem_devolucao, d(130));
        assert_eq!(records[1].valor_cobrar_com_devolucao, Decimal::ZERO);
    }
}
