// src/store/predicate.rs

use serde_json::Value;

/// Sentinela alto usado para emular "começa com" via consulta de intervalo
/// (`campo >= v AND campo <= v + sentinela`), o mesmo truque do cliente
/// original contra o Firestore.
pub const PREFIX_SENTINEL: char = '\u{f8ff}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Gte,
    Lte,
    In,
    StartsWith,
}

/// Valor comparado de um predicado. Toda comparação do gateway é textual:
/// timestamps são strings RFC 3339 e datas são `YYYY-MM-DD`, ambos ordenados
/// lexicograficamente como no tempo.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateValue {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub op: Operator,
    pub value: PredicateValue,
}

impl Predicate {
    pub fn eq(field: &str, value: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            op: Operator::Eq,
            value: PredicateValue::One(value.into()),
        }
    }

    pub fn gte(field: &str, value: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            op: Operator::Gte,
            value: PredicateValue::One(value.into()),
        }
    }

    pub fn lte(field: &str, value: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            op: Operator::Lte,
            value: PredicateValue::One(value.into()),
        }
    }

    pub fn is_in(field: &str, values: Vec<String>) -> Self {
        Self {
            field: field.to_string(),
            op: Operator::In,
            value: PredicateValue::Many(values),
        }
    }

    pub fn starts_with(field: &str, value: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            op: Operator::StartsWith,
            value: PredicateValue::One(value.into()),
        }
    }

    /// Avalia o predicado contra o corpo de um documento (backend em memória).
    /// Campo ausente ou não comparável nunca casa.
    pub fn matches(&self, body: &Value) -> bool {
        let Some(actual) = body.get(&self.field).and_then(text_of) else {
            return false;
        };

        match (&self.op, &self.value) {
            (Operator::Eq, PredicateValue::One(v)) => actual == *v,
            (Operator::Gte, PredicateValue::One(v)) => actual >= *v,
            (Operator::Lte, PredicateValue::One(v)) => actual <= *v,
            (Operator::In, PredicateValue::Many(vs)) => vs.contains(&actual),
            (Operator::StartsWith, PredicateValue::One(v)) => {
                let upper = format!("{}{}", v, PREFIX_SENTINEL);
                actual.as_str() >= v.as_str() && actual <= upper
            }
            _ => false,
        }
    }
}

/// Representação textual do campo para comparação. Strings valem por si,
/// números e booleanos pela sua forma impressa; null e estruturas não comparam.
pub(crate) fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
