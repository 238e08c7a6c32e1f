//src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;

mod common;
mod config;
mod handlers;
mod middleware;
mod models;
mod services;
mod store;

use crate::config::AppState;
use crate::middleware::auth::{auth_guard, session_probe};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas de autenticação
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    // A sonda de sessão anexa o usuário quando há token, sem bloquear:
    // as telas de estoque e CRM funcionam sem login, mas registram o
    // ator nos logs quando ele existe.
    let inventory_routes = Router::new()
        .route(
            "/items",
            post(handlers::inventory::create_item).get(handlers::inventory::get_all_items),
        )
        .route(
            "/items/{id}",
            axum::routing::put(handlers::inventory::update_item)
                .delete(handlers::inventory::delete_item),
        )
        .route(
            "/categories",
            post(handlers::inventory::create_category)
                .get(handlers::inventory::get_all_categories),
        )
        .route(
            "/categories/{id}",
            axum::routing::put(handlers::inventory::rename_category)
                .delete(handlers::inventory::delete_category),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            session_probe,
        ));

    let movement_routes = Router::new()
        .route(
            "/",
            post(handlers::movements::add_movement).get(handlers::movements::get_movements),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            session_probe,
        ));

    let crm_routes = Router::new()
        .route(
            "/clients",
            post(handlers::crm::create_client).get(handlers::crm::get_all_clients),
        )
        .route(
            "/clients/{id}",
            axum::routing::put(handlers::crm::update_client)
                .delete(handlers::crm::delete_client),
        )
        .route("/services", post(handlers::crm::create_service))
        .route("/services/history", get(handlers::crm::get_service_history))
        .route(
            "/services/{id}",
            axum::routing::delete(handlers::crm::delete_service),
        )
        .route("/service-logs", get(handlers::crm::get_service_logs))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            session_probe,
        ));

    // Contas secundárias exigem sessão de administrador.
    let user_routes = Router::new()
        .route(
            "/",
            post(handlers::users::create_secondary_user)
                .get(handlers::users::get_secondary_users),
        )
        .route(
            "/{id}",
            axum::routing::delete(handlers::users::delete_secondary_user),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/inventory", inventory_routes)
        .nest("/api/movements", movement_routes)
        .nest("/api/crm", crm_routes)
        .nest("/api/users", user_routes)
        .with_state(app_state);

    let addr = AppState::bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
