// src/common/filter.rs
//
// O avaliador de filtros das telas de consulta: um conjunto de pares
// campo/valor combinados com AND. Duas estratégias convivem, como nas telas
// originais: filtros que viram predicados do gateway (prefixo, igualdade) e
// filtros avaliados em memória sobre o snapshot já carregado (contains,
// dia exato).

use serde_json::Value;

use crate::common::format::{canonical_date, parse_flexible_date};
use crate::store::predicate::{PREFIX_SENTINEL, text_of};
use crate::store::{Document, Predicate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Substring sem diferenciar maiúsculas (avaliado em memória).
    Contains,
    /// "Começa com", empurrado para o gateway como StartsWith.
    Prefix,
    /// Mesmo dia, após normalizar os dois lados para `YYYY-MM-DD`.
    ExactDay,
    /// Igualdade exata de texto (ids de categoria, nome de cliente).
    Exact,
}

#[derive(Debug, Clone)]
pub struct FieldFilter {
    pub field: String,
    pub mode: MatchMode,
    pub value: String,
}

/// Conjunto de filtros ativos. Valores vazios nunca entram no conjunto:
/// campo sem valor é um no-op, não um "não casa com nada".
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: Vec<FieldFilter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, field: &str, mode: MatchMode, value: &str) -> Self {
        let value = value.trim();
        if !value.is_empty() {
            self.filters.push(FieldFilter {
                field: field.to_string(),
                mode,
                value: value.to_string(),
            });
        }
        self
    }

    pub fn contains(self, field: &str, value: &str) -> Self {
        self.push(field, MatchMode::Contains, value)
    }

    pub fn prefix(self, field: &str, value: &str) -> Self {
        self.push(field, MatchMode::Prefix, value)
    }

    pub fn exact_day(self, field: &str, value: &str) -> Self {
        self.push(field, MatchMode::ExactDay, value)
    }

    pub fn exact(self, field: &str, value: &str) -> Self {
        self.push(field, MatchMode::Exact, value)
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Avalia o documento contra todos os filtros ativos (AND).
    pub fn matches(&self, body: &Value) -> bool {
        self.filters.iter().all(|f| field_matches(f, body))
    }

    /// Reduz a lista ao subconjunto que satisfaz os filtros, preservando a
    /// ordem. Conjunto vazio devolve a lista intacta.
    pub fn apply(&self, docs: Vec<Document>) -> Vec<Document> {
        if self.is_empty() {
            return docs;
        }
        docs.into_iter()
            .filter(|d| self.matches(&d.body))
            .collect()
    }

    /// Forma servidor: os filtros que o gateway sabe avaliar viram predicados.
    /// `Contains` não tem equivalente no gateway e continua no cliente.
    pub fn to_predicates(&self) -> Vec<Predicate> {
        self.filters
            .iter()
            .filter_map(|f| match f.mode {
                MatchMode::Prefix => Some(Predicate::starts_with(&f.field, f.value.clone())),
                MatchMode::Exact => Some(Predicate::eq(&f.field, f.value.clone())),
                MatchMode::ExactDay => match parse_flexible_date(&f.value) {
                    Some(date) => Some(Predicate::eq(&f.field, canonical_date(date))),
                    // Data malformada: predicado impossível, não um crash.
                    None => Some(Predicate::eq(&f.field, PREFIX_SENTINEL.to_string())),
                },
                MatchMode::Contains => None,
            })
            .collect()
    }
}

fn field_matches(filter: &FieldFilter, body: &Value) -> bool {
    let stored = body.get(&filter.field).and_then(text_of);

    match filter.mode {
        MatchMode::Contains => match stored {
            Some(s) => s.to_lowercase().contains(&filter.value.to_lowercase()),
            None => false,
        },
        MatchMode::Prefix => match stored {
            Some(s) => {
                let upper = format!("{}{}", filter.value, PREFIX_SENTINEL);
                s.as_str() >= filter.value.as_str() && s <= upper
            }
            None => false,
        },
        MatchMode::Exact => stored.as_deref() == Some(filter.value.as_str()),
        MatchMode::ExactDay => {
            // Filtro malformado ou registro sem data: excluído, nunca erro.
            let Some(wanted) = parse_flexible_date(&filter.value) else {
                return false;
            };
            let Some(found) = stored.as_deref().and_then(parse_flexible_date) else {
                return false;
            };
            wanted == found
        }
    }
}
