// src/common/format.rs

use chrono::NaiveDate;

/// Aplica a máscara de CPF (11 dígitos) ou CNPJ (14 dígitos).
/// Qualquer caractere não numérico da entrada é descartado antes de formatar;
/// comprimentos que não batem com CPF nem CNPJ voltam só com os dígitos.
pub fn mask_cpf_cnpj(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        11 => format!(
            "{}.{}.{}-{}",
            &digits[0..3],
            &digits[3..6],
            &digits[6..9],
            &digits[9..11]
        ),
        14 => format!(
            "{}.{}.{}/{}-{}",
            &digits[0..2],
            &digits[2..5],
            &digits[5..8],
            &digits[8..12],
            &digits[12..14]
        ),
        _ => digits,
    }
}

/// Normaliza os campos de texto do cliente para maiúsculas, como o cadastro faz.
pub fn normalize_upper(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Interpreta uma data vinda de formulário: aceita o formato canônico
/// `YYYY-MM-DD` e a forma de exibição `DD/MM/YYYY`. Entrada malformada vira
/// `None`, nunca pânico.
pub fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .ok()
}

/// Forma canônica usada nos documentos: `YYYY-MM-DD`.
pub fn canonical_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Forma de exibição: `DD/MM/YYYY`.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mascara_cpf() {
        assert_eq!(mask_cpf_cnpj("12345678901"), "123.456.789-01");
        assert_eq!(mask_cpf_cnpj("123.456.789-01"), "123.456.789-01");
    }

    #[test]
    fn mascara_cnpj() {
        assert_eq!(mask_cpf_cnpj("12345678000195"), "12.345.678/0001-95");
    }

    #[test]
    fn comprimento_parcial_fica_so_com_digitos() {
        assert_eq!(mask_cpf_cnpj("123abc45"), "12345");
        assert_eq!(mask_cpf_cnpj(""), "");
    }

    #[test]
    fn aceita_as_duas_formas_de_data() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(parse_flexible_date("2024-03-07"), Some(d));
        assert_eq!(parse_flexible_date("07/03/2024"), Some(d));
    }

    #[test]
    fn data_malformada_vira_none() {
        assert_eq!(parse_flexible_date("31/02/2024"), None);
        assert_eq!(parse_flexible_date("amanhã"), None);
        assert_eq!(parse_flexible_date(""), None);
    }

    // Propriedade: exibir e reinterpretar devolve a mesma data canônica,
    // para todo o intervalo 1900-01-01..2100-12-31.
    #[test]
    fn round_trip_exibicao_e_canonico() {
        let mut date = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2100, 12, 31).unwrap();
        while date <= end {
            let shown = display_date(date);
            let parsed = parse_flexible_date(&shown).unwrap();
            assert_eq!(canonical_date(parsed), canonical_date(date));
            date = date.succ_opt().unwrap();
        }
    }
}
