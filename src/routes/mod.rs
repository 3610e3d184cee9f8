pub mod categorias;
pub mod debug;
pub mod eventos;
pub mod puntos;
pub mod rutas;
pub mod usuarios;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Points of interest
        .route("/puntos", get(puntos::list_puntos).post(puntos::create_punto))
        .route("/puntos/tipos", get(puntos::list_puntos_by_tipos))
        .route("/puntos/tipo/{tipo}", get(puntos::list_puntos_by_tipo))
        .route("/puntos/nombre/{nombre}", get(puntos::search_puntos_by_nombre))
        .route(
            "/puntos/{id}",
            get(puntos::get_punto)
                .patch(puntos::update_punto)
                .delete(puntos::delete_punto),
        )
        // Point categories
        .route(
            "/categorias",
            get(categorias::list_categorias).post(categorias::create_categoria),
        )
        // Users
        .route(
            "/usuarios",
            get(usuarios::list_usuarios).post(usuarios::create_usuario),
        )
        .route("/usuarios/login", post(usuarios::login))
        .route(
            "/usuarios/nombre/{nombre_usuario}",
            get(usuarios::search_usuarios_by_nombre),
        )
        .route(
            "/usuarios/{id}",
            get(usuarios::get_usuario)
                .patch(usuarios::update_usuario)
                .delete(usuarios::delete_usuario),
        )
        .route("/usuarios/{id}/contrasena", put(usuarios::change_password))
        // Events
        .route("/eventos", get(eventos::list_eventos).post(eventos::create_evento))
        .route("/eventos/tipo/{tipo}", get(eventos::list_eventos_by_tipo))
        .route("/eventos/nombre/{nombre}", get(eventos::search_eventos_by_nombre))
        .route("/eventos/fecha/{fecha}", get(eventos::list_eventos_by_fecha))
        .route(
            "/eventos/{id}",
            get(eventos::get_evento)
                .patch(eventos::update_evento)
                .delete(eventos::delete_evento),
        )
        // Routes
        .route("/rutas", get(rutas::list_rutas).post(rutas::create_ruta))
        .route("/rutas/nombre/{nombre}", get(rutas::search_rutas_by_nombre))
        .route(
            "/rutas/{id}",
            get(rutas::get_ruta)
                .patch(rutas::update_ruta)
                .delete(rutas::delete_ruta),
        )
        .route(
            "/rutas/{id}/puntos",
            get(rutas::list_puntos_de_ruta).post(rutas::add_punto),
        )
        .route(
            "/rutas/{id}/puntos/{punto_id}",
            axum::routing::delete(rutas::remove_punto),
        )
        .route("/rutas/{id}/duracion", post(rutas::recompute_duracion))
        .route("/debug/health", get(debug::health_check))
        .with_state(state)
}
