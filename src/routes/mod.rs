pub mod auth;
pub mod health;
pub mod todos;
pub mod user;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(user::user_routes)
            .configure(todos::todos_routes),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_app_state;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    /// Parcours complet : inscription, connexion, todo, isolation entre utilisateurs
    #[actix_web::test]
    async fn test_signup_signin_todo_scenario() {
        let (state, _) = test_app_state().await;
        let app = test::init_service(App::new().configure(|cfg| state.configure(cfg)).configure(configure_routes)).await;

        let mut access_tokens = Vec::new();
        for (username, email) in [("alice", "a@x.com"), ("bob", "b@x.com")] {
            let req = test::TestRequest::post()
                .uri("/api/auth/signup")
                .set_json(json!({
                    "username": username,
                    "email": email,
                    "password": "secret1",
                    "confirmPassword": "secret1"
                }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

            let req = test::TestRequest::post()
                .uri("/api/auth/signin")
                .set_json(json!({ "email": email, "password": "secret1" }))
                .to_request();
            let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
            access_tokens.push(body["accessToken"].as_str().unwrap().to_string());
        }
        let (alice, bob) = (&access_tokens[0], &access_tokens[1]);

        let req = test::TestRequest::post()
            .uri("/api/todos")
            .insert_header(("Authorization", format!("Bearer {alice}")))
            .set_json(json!({ "text": "buy milk" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let todo_id = body["todo"]["id"].as_i64().unwrap();

        let req = test::TestRequest::get()
            .uri("/api/todos")
            .insert_header(("Authorization", format!("Bearer {alice}")))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["todos"].as_array().unwrap().len(), 1);
        assert_eq!(body["todos"][0]["text"], "buy milk");

        let req = test::TestRequest::get()
            .uri(&format!("/api/todos/{todo_id}"))
            .insert_header(("Authorization", format!("Bearer {bob}")))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/api/health").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}
