// src/services/crm_service.rs

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::common::filter::FilterSet;
use crate::common::format::{mask_cpf_cnpj, normalize_upper, parse_flexible_date};
use crate::models::audit::ServiceLog;
use crate::models::auth::Actor;
use crate::models::crm::{Client, ServiceHistory, ServiceRecord};
use crate::services::audit::AuditTrail;
use crate::store::{DocumentStore, Predicate, collections};

/// Dados crus de um formulário de cliente; a normalização (maiúsculas e
/// máscara de CPF/CNPJ) acontece aqui dentro, na hora de gravar.
#[derive(Debug, Clone, Default)]
pub struct ClientInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub cpf_cnpj: String,
}

/// Filtros da consulta de clientes: prefixo por campo, no servidor.
#[derive(Debug, Clone, Default)]
pub struct ClientFilters {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub cpf_cnpj: Option<String>,
}

/// Filtros do histórico de serviços, avaliados sobre o snapshot.
#[derive(Debug, Clone, Default)]
pub struct ServiceFilters {
    pub client: Option<String>,
    pub date: Option<String>,
    pub observations: Option<String>,
}

#[derive(Clone)]
pub struct CrmService {
    store: Arc<dyn DocumentStore>,
    audit: AuditTrail,
}

impl CrmService {
    pub fn new(store: Arc<dyn DocumentStore>, audit: AuditTrail) -> Self {
        Self { store, audit }
    }

    // ---
    // Clientes
    // ---

    pub async fn create_client(&self, input: ClientInput) -> Result<Client, AppError> {
        let mut client = normalize_client(input)?;
        client.id = self
            .store
            .insert(collections::CLIENTS, client.to_body()?)
            .await?;
        Ok(client)
    }

    /// Consulta com prefixo por campo. Os campos de texto são pesquisados em
    /// maiúsculas, como foram gravados; o cpfCnpj mantém a máscara digitada.
    pub async fn list_clients(&self, filters: &ClientFilters) -> Result<Vec<Client>, AppError> {
        let mut set = FilterSet::new();
        if let Some(name) = &filters.name {
            set = set.prefix("name", &normalize_upper(name));
        }
        if let Some(email) = &filters.email {
            set = set.prefix("email", &normalize_upper(email));
        }
        if let Some(phone) = &filters.phone {
            set = set.prefix("phone", &normalize_upper(phone));
        }
        if let Some(address) = &filters.address {
            set = set.prefix("address", &normalize_upper(address));
        }
        if let Some(cpf_cnpj) = &filters.cpf_cnpj {
            set = set.prefix("cpfCnpj", cpf_cnpj.trim());
        }

        self.store
            .get_all(collections::CLIENTS, &set.to_predicates())
            .await?
            .iter()
            .map(Client::from_document)
            .collect()
    }

    pub async fn update_client(&self, id: Uuid, input: ClientInput) -> Result<Client, AppError> {
        self.store
            .get_by_id(collections::CLIENTS, id)
            .await?
            .ok_or(AppError::ClientNotFound)?;

        let mut client = normalize_client(input)?;
        client.id = id;
        self.store
            .update_by_id(collections::CLIENTS, id, client.to_body()?)
            .await?;
        Ok(client)
    }

    // O cliente original não escreve log de auditoria para clientes.
    pub async fn delete_client(&self, id: Uuid) -> Result<(), AppError> {
        self.store
            .delete_by_id(collections::CLIENTS, id)
            .await
            .map_err(|e| match e {
                AppError::DocumentNotFound(_) => AppError::ClientNotFound,
                other => other,
            })
    }

    // ---
    // Serviços
    // ---

    pub async fn create_service(
        &self,
        client_id: Uuid,
        value: Decimal,
        date: &str,
        observations: &str,
    ) -> Result<ServiceRecord, AppError> {
        let client_doc = self
            .store
            .get_by_id(collections::CLIENTS, client_id)
            .await?
            .ok_or(AppError::ClientNotFound)?;
        let client = Client::from_document(&client_doc)?;
        let date = parse_flexible_date(date).ok_or(AppError::InvalidDate)?;

        let mut service = ServiceRecord {
            id: Uuid::nil(),
            client_id,
            client_name: client.name,
            value,
            date,
            observations: observations.trim().to_string(),
        };
        service.id = self
            .store
            .insert(collections::SERVICES, service.to_body()?)
            .await?;
        Ok(service)
    }

    /// Histórico filtrado (cliente exato, dia exato, observações por
    /// substring) mais o total somado do que ficou visível.
    pub async fn service_history(
        &self,
        filters: &ServiceFilters,
    ) -> Result<ServiceHistory, AppError> {
        let set = FilterSet::new()
            .exact("clientName", filters.client.as_deref().unwrap_or(""))
            .exact_day("date", filters.date.as_deref().unwrap_or(""))
            .contains("observations", filters.observations.as_deref().unwrap_or(""));

        let docs = self.store.get_all(collections::SERVICES, &[]).await?;
        let services = set
            .apply(docs)
            .iter()
            .map(ServiceRecord::from_document)
            .collect::<Result<Vec<_>, _>>()?;
        let total = services.iter().map(|s| s.value).sum();

        Ok(ServiceHistory { services, total })
    }

    pub async fn delete_service(&self, actor: &Actor, id: Uuid) -> Result<(), AppError> {
        self.store
            .get_by_id(collections::SERVICES, id)
            .await?
            .ok_or(AppError::ServiceNotFound)?;

        self.store.delete_by_id(collections::SERVICES, id).await?;
        self.audit.record_service_delete(actor, id).await;
        Ok(())
    }

    pub async fn list_service_logs(&self) -> Result<Vec<ServiceLog>, AppError> {
        self.store
            .get_all(
                collections::SERVICE_LOGS,
                &[Predicate::eq("action", "delete")],
            )
            .await?
            .iter()
            .map(ServiceLog::from_document)
            .collect()
    }
}

fn normalize_client(input: ClientInput) -> Result<Client, AppError> {
    let name = normalize_upper(&input.name);
    if name.is_empty() {
        return Err(AppError::EmptyName);
    }
    Ok(Client {
        id: Uuid::nil(),
        name,
        email: normalize_upper(&input.email),
        phone: normalize_upper(&input.phone),
        address: normalize_upper(&input.address),
        cpf_cnpj: mask_cpf_cnpj(&input.cpf_cnpj),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::SessionUser;
    use crate::store::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, CrmService) {
        let store = Arc::new(MemoryStore::new());
        let dyn_store = store.clone() as Arc<dyn DocumentStore>;
        (
            store.clone(),
            CrmService::new(dyn_store.clone(), AuditTrail::new(dyn_store)),
        )
    }

    fn actor() -> Actor {
        Actor::User(SessionUser {
            id: Uuid::new_v4(),
            email: "admin@exemplo.com".into(),
        })
    }

    fn joao() -> ClientInput {
        ClientInput {
            name: "João da Silva".into(),
            email: "joao@exemplo.com".into(),
            phone: "11 98888-0000".into(),
            address: "rua das flores, 10".into(),
            cpf_cnpj: "12345678901".into(),
        }
    }

    #[tokio::test]
    async fn cadastro_normaliza_maiusculas_e_mascara_o_documento() {
        let (_store, svc) = setup();
        let client = svc.create_client(joao()).await.unwrap();
        assert_eq!(client.name, "JOÃO DA SILVA");
        assert_eq!(client.email, "JOAO@EXEMPLO.COM");
        assert_eq!(client.cpf_cnpj, "123.456.789-01");
    }

    #[tokio::test]
    async fn consulta_por_prefixo_ignora_caixa_da_entrada() {
        let (_store, svc) = setup();
        svc.create_client(joao()).await.unwrap();
        svc.create_client(ClientInput {
            name: "Maria".into(),
            ..Default::default()
        })
        .await
        .unwrap();

        let filters = ClientFilters {
            name: Some("joã".into()),
            ..Default::default()
        };
        let found = svc.list_clients(&filters).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "JOÃO DA SILVA");
    }

    #[tokio::test]
    async fn servico_exige_cliente_existente() {
        let (store, svc) = setup();
        let err = svc
            .create_service(Uuid::new_v4(), Decimal::from(100), "2024-03-07", "")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ClientNotFound));
        assert_eq!(store.count(collections::SERVICES), 0);
    }

    #[tokio::test]
    async fn historico_filtra_e_soma_o_total() {
        let (_store, svc) = setup();
        let client = svc.create_client(joao()).await.unwrap();
        svc.create_service(client.id, Decimal::from(100), "2024-03-07", "troca de óleo")
            .await
            .unwrap();
        svc.create_service(client.id, Decimal::from(50), "2024-03-08", "revisão")
            .await
            .unwrap();

        let filters = ServiceFilters {
            // Forma de exibição deve bater com a data canônica gravada.
            date: Some("07/03/2024".into()),
            ..Default::default()
        };
        let history = svc.service_history(&filters).await.unwrap();
        assert_eq!(history.services.len(), 1);
        assert_eq!(history.total, Decimal::from(100));

        let all = svc.service_history(&ServiceFilters::default()).await.unwrap();
        assert_eq!(all.services.len(), 2);
        assert_eq!(all.total, Decimal::from(150));
    }

    #[tokio::test]
    async fn excluir_servico_gera_log_de_auditoria() {
        let (store, svc) = setup();
        let client = svc.create_client(joao()).await.unwrap();
        let service = svc
            .create_service(client.id, Decimal::from(100), "2024-03-07", "")
            .await
            .unwrap();

        svc.delete_service(&actor(), service.id).await.unwrap();

        assert_eq!(store.count(collections::SERVICES), 0);
        let logs = svc.list_service_logs().await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].service_id, service.id);
        assert_eq!(logs[0].user, "admin@exemplo.com");
    }

    #[tokio::test]
    async fn excluir_servico_inexistente_nao_gera_log() {
        let (store, svc) = setup();
        let err = svc
            .delete_service(&actor(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ServiceNotFound));
        assert_eq!(store.count(collections::SERVICE_LOGS), 0);
    }

    #[tokio::test]
    async fn falha_no_log_nao_derruba_a_exclusao_do_servico() {
        use crate::store::memory::AuditFailStore;

        let inner = Arc::new(MemoryStore::new());
        let store: Arc<dyn DocumentStore> = Arc::new(AuditFailStore::new(inner.clone()));
        let svc = CrmService::new(store.clone(), AuditTrail::new(store));

        let client = svc.create_client(joao()).await.unwrap();
        let service = svc
            .create_service(client.id, Decimal::from(100), "2024-03-07", "")
            .await
            .unwrap();

        svc.delete_service(&actor(), service.id).await.unwrap();

        assert_eq!(inner.count(collections::SERVICES), 0);
        assert_eq!(inner.count(collections::SERVICE_LOGS), 0);
    }

    #[tokio::test]
    async fn atualizacao_renormaliza_os_campos() {
        let (_store, svc) = setup();
        let client = svc.create_client(joao()).await.unwrap();

        let updated = svc
            .update_client(
                client.id,
                ClientInput {
                    name: "joão de souza".into(),
                    cpf_cnpj: "12345678000195".into(),
                    ..joao()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "JOÃO DE SOUZA");
        assert_eq!(updated.cpf_cnpj, "12.345.678/0001-95");
    }

    #[tokio::test]
    async fn data_de_servico_malformada_e_rejeitada() {
        let (_store, svc) = setup();
        let client = svc.create_client(joao()).await.unwrap();
        let err = svc
            .create_service(client.id, Decimal::from(10), "31/02/2024", "")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidDate));
    }
}
