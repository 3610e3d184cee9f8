use axum::http::StatusCode;
use serde_json::json;

mod common;

// These requests are all rejected before the handler touches the pool, so
// they run without a database.

#[tokio::test]
async fn test_create_punto_missing_fields() {
    let app = common::lazy_app();

    let (status, body) = common::send(
        &app,
        "POST",
        "/puntos",
        Some(json!({"nombre": "Basílica del Pilar", "latitud": 0.0})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Faltan campos obligatorios");
    assert_eq!(body["detalles"], json!(["tipo", "longitud"]));
}

#[tokio::test]
async fn test_create_punto_out_of_range() {
    let app = common::lazy_app();

    let (status, body) = common::send(
        &app,
        "POST",
        "/puntos",
        Some(json!({
            "nombre": "Polo",
            "tipo": "otro",
            "latitud": 91.0,
            "longitud": 0.0
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_patch_punto_without_fields() {
    let app = common::lazy_app();

    let (status, body) = common::send(&app, "PATCH", "/puntos/1", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No se proporcionó ningún campo para actualizar");

    // Unknown keys are not updatable fields
    let (status, _) =
        common::send(&app, "PATCH", "/puntos/1", Some(json!({"id": 7, "color": "rojo"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // null means absent
    let (status, _) = common::send(&app, "PATCH", "/puntos/1", Some(json!({"nombre": null}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_punto_rejects_invalid_coordinates() {
    let app = common::lazy_app();

    let (status, _) =
        common::send(&app, "PATCH", "/puntos/1", Some(json!({"longitud": -181.0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_puntos_tipos_requires_query() {
    let app = common::lazy_app();

    let (status, body) = common::send(&app, "GET", "/puntos/tipos", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detalles"], json!(["tipos"]));

    let (status, _) = common::send(&app, "GET", "/puntos/tipos?tipos=,,", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_categoria_rejects_unsafe_label() {
    let app = common::lazy_app();

    let (status, _) = common::send(
        &app,
        "POST",
        "/categorias",
        Some(json!({"nombre": "bar'; DROP TABLE usuarios; --"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = common::send(&app, "POST", "/categorias", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detalles"], json!(["nombre"]));
}

#[tokio::test]
async fn test_create_categoria_rejects_label_over_enum_byte_limit() {
    let app = common::lazy_app();

    // 40 characters but 80 bytes, more than an enum label can hold
    let (status, body) = common::send(
        &app,
        "POST",
        "/categorias",
        Some(json!({"nombre": "á".repeat(40)})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("bytes"));
}

#[tokio::test]
async fn test_create_usuario_validation() {
    let app = common::lazy_app();

    let (status, body) = common::send(
        &app,
        "POST",
        "/usuarios",
        Some(json!({"nombre_usuario": "ana", "email": "ana@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detalles"], json!(["nombre", "apellido", "contrasena"]));

    let (status, _) = common::send(
        &app,
        "POST",
        "/usuarios",
        Some(json!({
            "nombre_usuario": "ana",
            "nombre": "Ana",
            "apellido": "López",
            "email": "ana.example.com",
            "contraseña": "secreto123"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = common::send(
        &app,
        "POST",
        "/usuarios",
        Some(json!({
            "nombre_usuario": "ana",
            "nombre": "Ana",
            "apellido": "López",
            "email": "ana@example.com",
            "contrasena": "corta"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_usuario_without_fields() {
    let app = common::lazy_app();

    let (status, _) = common::send(&app, "PATCH", "/usuarios/1", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The password cannot be changed through PATCH
    let (status, _) =
        common::send(&app, "PATCH", "/usuarios/1", Some(json!({"contrasena": "otra1234"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_missing_fields() {
    let app = common::lazy_app();

    let (status, body) = common::send(
        &app,
        "POST",
        "/usuarios/login",
        Some(json!({"email": "ana@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detalles"], json!(["contrasena"]));
}

#[tokio::test]
async fn test_eventos_by_invalid_fecha() {
    let app = common::lazy_app();

    for fecha in ["2024-13-01", "ayer", "01-05-2024"] {
        let (status, _) = common::send(&app, "GET", &format!("/eventos/fecha/{}", fecha), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "fecha {}", fecha);
    }
}

#[tokio::test]
async fn test_create_evento_rejects_inverted_dates() {
    let app = common::lazy_app();

    let (status, body) = common::send(
        &app,
        "POST",
        "/eventos",
        Some(json!({
            "nombre": "Fiestas del Pilar",
            "tipo": "fiesta",
            "fecha_ini": "2024-10-12",
            "fecha_fin": "2024-10-05"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("fecha_fin"));
}

#[tokio::test]
async fn test_patch_evento_without_fields() {
    let app = common::lazy_app();

    // Rejected before the event is looked up, so a missing id is still a 400
    let (status, body) = common::send(&app, "PATCH", "/eventos/9999", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No se proporcionó ningún campo para actualizar");

    let (status, _) = common::send(&app, "PATCH", "/eventos/9999", Some(json!({"nombre": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_ruta_validation() {
    let app = common::lazy_app();

    let (status, body) = common::send(&app, "POST", "/rutas", Some(json!({"puntos": [1]}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detalles"], json!(["nombre"]));

    let (status, _) = common::send(
        &app,
        "POST",
        "/rutas",
        Some(json!({"nombre": "Ruta", "puntos": [1, 2, 1]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_punto_to_ruta_validation() {
    let app = common::lazy_app();

    let (status, body) = common::send(&app, "POST", "/rutas/1/puntos", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detalles"], json!(["punto_id"]));

    let (status, _) = common::send(
        &app,
        "POST",
        "/rutas/1/puntos",
        Some(json!({"punto_id": 3, "orden": -1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_ruta_duration_is_not_editable() {
    let app = common::lazy_app();

    let (status, _) = common::send(&app, "PATCH", "/rutas/1", Some(json!({"duracion": 5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
