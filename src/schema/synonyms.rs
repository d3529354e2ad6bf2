//! Synonym table: normalized header text -> canonical field name
//!
//! Keys must already be in `normalize_text` form. Both the "acesorio" typo
//! found in the official template and the correct spelling are listed.

pub const HEADER_SYNONYMS: &[(&str, &str)] = &[
    ("servico/acesorio", "servico_acessorio"),
    ("servico/acessorio", "servico_acessorio"),
    ("cliente", "cliente"),
    ("placa", "placa"),
    ("classe", "classe"),
    ("termo (contrato)", "termo"),
    ("termo", "termo"),
    ("inicio_vigencia", "inicio_vigencia"),
    ("inicio vigencia", "inicio_vigencia"),
    ("fim_vigencia servico/acesorio", "fim_vigencia"),
    ("fim_vigencia servico/acessorio", "fim_vigencia"),
    ("fim_vigencia", "fim_vigencia"),
    ("fim vigencia", "fim_vigencia"),
    ("numero de fatura servico/acesorio", "numero_fatura_servico"),
    ("numero de fatura servico/acessorio", "numero_fatura_servico"),
    ("valor mensalidade do servico/acesorio", "valor_mensalidade"),
    ("valor mensalidade do servico/acessorio", "valor_mensalidade"),
    ("valor mensalidade", "valor_mensalidade"),
    ("meses restantes (vigencia) do servico/acesorio", "meses_restantes"),
    ("meses restantes (vigencia) do servico/acessorio", "meses_restantes"),
    ("meses restantes", "meses_restantes"),
    ("taxa de multa servico/acesorio", "taxa_multa_25pct"),
    ("taxa de multa servico/acessorio", "taxa_multa_25pct"),
    ("valor de cancelamento do servico/acesorio", "valor_taxa_cancelamento"),
    ("valor de cancelamento do servico/acessorio", "valor_taxa_cancelamento"),
    ("status do servico/acesorio no cancelamento", "status_do_contrato"),
    ("status do servico/acessorio no cancelamento", "status_do_contrato"),
    ("status do contrato", "status_do_contrato"),
    ("valor de multa de nao devolucao do servico/acesorio", "valor_multa_nao_devolucao"),
    ("valor de multa de nao devolucao do servico/acessorio", "valor_multa_nao_devolucao"),
    ("instalado", "instalado"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::normalize_text;

    #[test]
    fn test_keys_are_normalized() {
        for (key, _) in HEADER_SYNONYMS {
            assert_eq!(normalize_text(key), *key, "synonym key not normalized: {key}");
        }
    }

    #[test]
    fn test_keys_unique() {
        let mut keys: Vec<&str> = HEADER_SYNONYMS.iter().map(|(k, _)| *k).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), HEADER_SYNONYMS.len());
    }
}
