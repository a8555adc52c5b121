use sea_orm::*;

use crate::errors::Error;
use crate::models::todos;

pub struct TodoService;

/// Champs modifiables d'un todo (le propriétaire ne change jamais)
#[derive(Debug, Clone, Default)]
pub struct TodoPatch {
    pub text: Option<String>,
    pub completed: Option<bool>,
}

impl TodoService {
    /// Crée un todo non complété pour son propriétaire
    pub async fn create(db: &DatabaseConnection, owner_id: i32, text: &str) -> Result<todos::Model, Error> {
        let text = normalize_text(text)?;

        let todo = todos::ActiveModel {
            text: Set(text),
            completed: Set(false),
            user_id: Set(owner_id),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::debug!(user_id = owner_id, todo_id = todo.id, "Todo created");
        Ok(todo)
    }

    /// Todos d'un utilisateur, du plus récent au plus ancien
    pub async fn list_by_owner(db: &DatabaseConnection, owner_id: i32) -> Result<Vec<todos::Model>, DbErr> {
        todos::Entity::find()
            .filter(todos::Column::UserId.eq(owner_id))
            .order_by_desc(todos::Column::CreatedAt)
            .order_by_desc(todos::Column::Id)
            .all(db)
            .await
    }

    /// Un todo appartenant à un autre utilisateur est traité comme inexistant
    pub async fn find(db: &DatabaseConnection, id: i32, owner_id: i32) -> Result<todos::Model, Error> {
        todos::Entity::find_by_id(id)
            .filter(todos::Column::UserId.eq(owner_id))
            .one(db)
            .await?
            .ok_or(Error::NotFound { resource: "Todo" })
    }

    /// Applique le patch et retourne la ligne complète à jour
    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        owner_id: i32,
        patch: TodoPatch,
    ) -> Result<todos::Model, Error> {
        let todo = Self::find(db, id, owner_id).await?;

        let mut active_model: todos::ActiveModel = todo.into();
        if let Some(text) = patch.text {
            active_model.text = Set(normalize_text(&text)?);
        }
        if let Some(completed) = patch.completed {
            active_model.completed = Set(completed);
        }

        Ok(active_model.update(db).await?)
    }

    pub async fn delete(db: &DatabaseConnection, id: i32, owner_id: i32) -> Result<(), Error> {
        let todo = Self::find(db, id, owner_id).await?;
        todo.delete(db).await?;

        tracing::debug!(user_id = owner_id, todo_id = id, "Todo deleted");
        Ok(())
    }
}

fn normalize_text(text: &str) -> Result<String, Error> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyText);
    }
    if trimmed.chars().count() > todos::MAX_TEXT_LENGTH {
        return Err(Error::validation(format!(
            "Todo text must be at most {} characters",
            todos::MAX_TEXT_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}
