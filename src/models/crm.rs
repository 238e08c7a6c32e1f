// src/models/crm.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::strip_id;
use crate::store::Document;

// --- Cliente ---
// Os campos de texto são gravados em maiúsculas; o cpfCnpj mantém a máscara.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(skip_deserializing, default)]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub cpf_cnpj: String,
}

impl Client {
    pub fn from_document(doc: &Document) -> Result<Self, AppError> {
        let mut client: Client = serde_json::from_value(doc.body.clone())?;
        client.id = doc.id;
        Ok(client)
    }

    pub fn to_body(&self) -> Result<Value, AppError> {
        Ok(strip_id(serde_json::to_value(self)?))
    }
}

// --- Serviço prestado ---
// Serviço faturado amarrado a um cliente: guarda o id e o snapshot do nome,
// a data canônica (YYYY-MM-DD) e o valor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    #[serde(skip_deserializing, default)]
    pub id: Uuid,
    pub client_id: Uuid,
    pub client_name: String,
    pub value: Decimal,
    pub date: NaiveDate,
    pub observations: String,
}

impl ServiceRecord {
    pub fn from_document(doc: &Document) -> Result<Self, AppError> {
        let mut service: ServiceRecord = serde_json::from_value(doc.body.clone())?;
        service.id = doc.id;
        Ok(service)
    }

    pub fn to_body(&self) -> Result<Value, AppError> {
        Ok(strip_id(serde_json::to_value(self)?))
    }
}

/// Histórico filtrado mais o total somado dos valores exibidos.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHistory {
    pub services: Vec<ServiceRecord>,
    pub total: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn servico_serializa_data_canonica() {
        let s = ServiceRecord {
            id: Uuid::nil(),
            client_id: Uuid::nil(),
            client_name: "JOÃO".into(),
            value: Decimal::from(150),
            date: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
            observations: String::new(),
        };
        let body = s.to_body().unwrap();
        assert_eq!(body["date"], "2024-03-07");
        assert_eq!(body["clientName"], "JOÃO");
    }

    #[test]
    fn cliente_round_trip_pelo_documento() {
        let doc = Document {
            id: Uuid::new_v4(),
            body: json!({
                "name": "MARIA",
                "email": "MARIA@EXEMPLO.COM",
                "phone": "11 99999-0000",
                "address": "RUA A, 1",
                "cpfCnpj": "123.456.789-01",
            }),
        };
        let client = Client::from_document(&doc).unwrap();
        assert_eq!(client.id, doc.id);
        assert_eq!(client.cpf_cnpj, "123.456.789-01");
    }
}
