use actix_web::{delete, error::PathError, get, post, put, web, HttpRequest, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::errors::Error;
use crate::middleware::AuthUser;
use crate::models::dto::{CreateTodoRequest, MessageResponse, TodoListResponse, TodoResponse, UpdateTodoRequest};
use crate::services::todo_service::{TodoPatch, TodoService};

/// POST /api/todos - Créer un todo
#[post("")]
pub async fn create_todo(
    auth_user: AuthUser,
    body: web::Json<CreateTodoRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, Error> {
    let todo = TodoService::create(db.get_ref(), auth_user.user_id, &body.text).await?;

    Ok(HttpResponse::Created().json(TodoResponse {
        message: "Todo created successfully".to_string(),
        todo,
    }))
}

/// GET /api/todos - Todos de l'utilisateur, plus récents d'abord
#[get("")]
pub async fn list_todos(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> Result<HttpResponse, Error> {
    let todos = TodoService::list_by_owner(db.get_ref(), auth_user.user_id).await?;

    Ok(HttpResponse::Ok().json(TodoListResponse {
        message: "Todos fetched successfully".to_string(),
        todos,
    }))
}

/// GET /api/todos/{id}
#[get("/{id}")]
pub async fn get_todo(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, Error> {
    let todo = TodoService::find(db.get_ref(), path.into_inner(), auth_user.user_id).await?;

    Ok(HttpResponse::Ok().json(TodoResponse {
        message: "Todo fetched successfully".to_string(),
        todo,
    }))
}

/// PUT /api/todos/{id} - Modifier le texte et/ou le statut
#[put("/{id}")]
pub async fn update_todo(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UpdateTodoRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, Error> {
    let body = body.into_inner();
    let patch = TodoPatch {
        text: body.text,
        completed: body.completed,
    };

    let todo = TodoService::update(db.get_ref(), path.into_inner(), auth_user.user_id, patch).await?;

    Ok(HttpResponse::Ok().json(TodoResponse {
        message: "Todo updated successfully".to_string(),
        todo,
    }))
}

/// DELETE /api/todos/{id}
#[delete("/{id}")]
pub async fn delete_todo(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, Error> {
    TodoService::delete(db.get_ref(), path.into_inner(), auth_user.user_id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Todo deleted successfully")))
}

// Un id non numérique est traité comme un todo inexistant
fn invalid_todo_id(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!("Rejected todo id: {err}");
    Error::NotFound { resource: "Todo" }.into()
}

pub fn todos_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/todos")
            .app_data(web::PathConfig::default().error_handler(invalid_todo_id))
            .service(create_todo)
            .service(list_todos)
            .service(get_todo)
            .service(update_todo)
            .service(delete_todo),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{self, test_app_state};
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    macro_rules! init_app {
        ($state:expr) => {
            test::init_service(App::new().configure(|cfg| $state.configure(cfg)).configure(todos_routes)).await
        };
    }

    fn bearer(token: &str) -> (&'static str, String) {
        ("Authorization", format!("Bearer {token}"))
    }

    #[actix_web::test]
    async fn test_todo_lifecycle() {
        let (state, _) = test_app_state().await;
        let user = test_utils::create_user(&state.db, "alice", "a@x.com", "secret1").await;
        let token = state.tokens.issue_access_token(user.id).unwrap();
        let app = init_app!(state);

        // Création : texte nettoyé, non complété
        let req = test::TestRequest::post()
            .uri("/todos")
            .insert_header(bearer(&token))
            .set_json(json!({ "text": "  buy milk  " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Todo created successfully");
        assert_eq!(body["todo"]["text"], "buy milk");
        assert_eq!(body["todo"]["completed"], false);
        assert_eq!(body["todo"]["userId"], user.id);
        let id = body["todo"]["id"].as_i64().unwrap();

        // Modification partielle : ligne complète renvoyée
        let req = test::TestRequest::put()
            .uri(&format!("/todos/{id}"))
            .insert_header(bearer(&token))
            .set_json(json!({ "completed": true }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["todo"]["completed"], true);
        assert_eq!(body["todo"]["text"], "buy milk");

        let req = test::TestRequest::get()
            .uri(&format!("/todos/{id}"))
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::delete()
            .uri(&format!("/todos/{id}"))
            .insert_header(bearer(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Todo deleted successfully");

        let req = test::TestRequest::get()
            .uri("/todos")
            .insert_header(bearer(&token))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["todos"], json!([]));
    }

    #[actix_web::test]
    async fn test_list_is_newest_first() {
        let (state, _) = test_app_state().await;
        let user = test_utils::create_user(&state.db, "alice", "a@x.com", "secret1").await;
        let token = state.tokens.issue_access_token(user.id).unwrap();
        let app = init_app!(state);

        for text in ["first", "second", "third"] {
            let req = test::TestRequest::post()
                .uri("/todos")
                .insert_header(bearer(&token))
                .set_json(json!({ "text": text }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get()
            .uri("/todos")
            .insert_header(bearer(&token))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        let texts: Vec<&str> = body["todos"]
            .as_array()
            .unwrap()
            .iter()
            .map(|todo| todo["text"].as_str().unwrap())
            .collect();
        assert_eq!(texts, vec!["third", "second", "first"]);
    }

    #[actix_web::test]
    async fn test_other_owner_todo_is_not_found() {
        let (state, _) = test_app_state().await;
        let alice = test_utils::create_user(&state.db, "alice", "a@x.com", "secret1").await;
        let bob = test_utils::create_user(&state.db, "bob", "b@x.com", "secret1").await;
        let alice_todo = TodoService::create(&state.db, alice.id, "private").await.unwrap();
        let bob_token = state.tokens.issue_access_token(bob.id).unwrap();
        let app = init_app!(state);

        let req = test::TestRequest::put()
            .uri(&format!("/todos/{}", alice_todo.id))
            .insert_header(bearer(&bob_token))
            .set_json(json!({ "text": "hacked" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Todo not found");

        let req = test::TestRequest::delete()
            .uri(&format!("/todos/{}", alice_todo.id))
            .insert_header(bearer(&bob_token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        // Liste de bob : vide
        let req = test::TestRequest::get()
            .uri("/todos")
            .insert_header(bearer(&bob_token))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["todos"], json!([]));
    }

    #[actix_web::test]
    async fn test_non_numeric_id_is_json_not_found() {
        let (state, _) = test_app_state().await;
        let user = test_utils::create_user(&state.db, "alice", "a@x.com", "secret1").await;
        let token = state.tokens.issue_access_token(user.id).unwrap();
        let app = init_app!(state);

        for req in [
            test::TestRequest::delete().uri("/todos/abc"),
            test::TestRequest::get().uri("/todos/abc"),
            test::TestRequest::put().uri("/todos/abc").set_json(json!({ "completed": true })),
        ] {
            let resp = test::call_service(&app, req.insert_header(bearer(&token)).to_request()).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body, json!({ "message": "Todo not found" }));
        }
    }

    #[actix_web::test]
    async fn test_invalid_text() {
        let (state, _) = test_app_state().await;
        let user = test_utils::create_user(&state.db, "alice", "a@x.com", "secret1").await;
        let token = state.tokens.issue_access_token(user.id).unwrap();
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/todos")
            .insert_header(bearer(&token))
            .set_json(json!({ "text": "   " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Todo text is required");

        let req = test::TestRequest::post()
            .uri("/todos")
            .insert_header(bearer(&token))
            .set_json(json!({ "text": "x".repeat(256) }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_requires_valid_token() {
        let (state, _) = test_app_state().await;
        let app = init_app!(state);

        let req = test::TestRequest::get().uri("/todos").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Access token required");

        let req = test::TestRequest::get()
            .uri("/todos")
            .insert_header(bearer("garbage"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Invalid or expired token");
    }
}
