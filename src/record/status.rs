//! Contract status at cancellation time

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::normalize_text;

/// The four canonical statuses. "Vigência" is the contract term: "com" means
/// still in term, "sem" means the term has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContractStatus {
    #[serde(rename = "Com vigência e instalado")]
    InTermInstalled,
    #[serde(rename = "Com vigência e não instalado")]
    InTermNotInstalled,
    #[serde(rename = "Sem vigência e instalado")]
    OutOfTermInstalled,
    #[serde(rename = "Sem vigência e não instalado")]
    OutOfTermNotInstalled,
}

impl ContractStatus {
    pub const ALL: [ContractStatus; 4] = [
        ContractStatus::InTermInstalled,
        ContractStatus::InTermNotInstalled,
        ContractStatus::OutOfTermInstalled,
        ContractStatus::OutOfTermNotInstalled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ContractStatus::InTermInstalled => "Com vigência e instalado",
            ContractStatus::InTermNotInstalled => "Com vigência e não instalado",
            ContractStatus::OutOfTermInstalled => "Sem vigência e instalado",
            ContractStatus::OutOfTermNotInstalled => "Sem vigência e não instalado",
        }
    }

    pub fn from_flags(in_term: bool, installed: bool) -> Self {
        match (in_term, installed) {
            (true, true) => ContractStatus::InTermInstalled,
            (true, false) => ContractStatus::InTermNotInstalled,
            (false, true) => ContractStatus::OutOfTermInstalled,
            (false, false) => ContractStatus::OutOfTermNotInstalled,
        }
    }

    /// Exact label match, ignoring case, accents and extra whitespace
    pub fn from_label(raw: &str) -> Option<Self> {
        let text = normalize_text(raw);
        ContractStatus::ALL
            .into_iter()
            .find(|status| normalize_text(status.label()) == text)
    }

    /// Classify free-form status text. "nao instalado" is checked before
    /// "instalado" since the latter is a substring of the former.
    /// Unmatched text falls to `OutOfTermNotInstalled`.
    pub fn classify_text(raw: &str) -> Self {
        let text = normalize_text(raw);
        let in_term = text.contains("com vigencia");
        let out_of_term = text.contains("sem vigencia");
        let not_installed = text.contains("nao instalado");
        let installed = !not_installed && text.contains("instalado");

        match (in_term, out_of_term) {
            (true, _) if installed => ContractStatus::InTermInstalled,
            (true, _) if not_installed => ContractStatus::InTermNotInstalled,
            (_, true) if installed => ContractStatus::OutOfTermInstalled,
            _ => ContractStatus::OutOfTermNotInstalled,
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_classify_to_themselves() {
        for status in ContractStatus::ALL {
            assert_eq!(ContractStatus::classify_text(status.label()), status);
        }
    }

    #[test]
    fn test_classify_loose_text() {
        assert_eq!(
            ContractStatus::classify_text("  COM VIGENCIA - Instalado "),
            ContractStatus::InTermInstalled
        );
        assert_eq!(
            ContractStatus::classify_text("com vigência, não instalado"),
            ContractStatus::InTermNotInstalled
        );
        assert_eq!(
            ContractStatus::classify_text("Sem Vigência e Instalado"),
            ContractStatus::OutOfTermInstalled
        );
    }

    #[test]
    fn test_unmatched_text_defaults() {
        for raw in ["", "cancelado", "instalado", "com vigencia"] {
            assert_eq!(
                ContractStatus::classify_text(raw),
                ContractStatus::OutOfTermNotInstalled,
                "{raw}"
            );
        }
    }

    #[test]
    fn test_from_flags() {
        assert_eq!(ContractStatus::from_flags(true, true), ContractStatus::InTermInstalled);
        assert_eq!(ContractStatus::from_flags(true, false), ContractStatus::InTermNotInstalled);
        assert_eq!(ContractStatus::from_flags(false, true), ContractStatus::OutOfTermInstalled);
        assert_eq!(ContractStatus::from_flags(false, false), ContractStatus::OutOfTermNotInstalled);
    }

    #[test]
    fn test_from_label() {
        for status in ContractStatus::ALL {
            assert_eq!(ContractStatus::from_label(status.label()), Some(status));
        }
        assert_eq!(
            ContractStatus::from_label("  com VIGENCIA e nao   instalado"),
            Some(ContractStatus::InTermNotInstalled)
        );
    }

    #[test]
    fn test_from_label_rejects_partial_or_misspelled() {
        for raw in ["Com vigencia e instaldo", "Sem vigência", "", "instalado"] {
            assert_eq!(ContractStatus::from_label(raw), None, "{raw}");
        }
    }
}
