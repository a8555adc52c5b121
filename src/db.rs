// connexion BD

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityName, EntityTrait, Schema};

use crate::config::DatabaseConfig;
use crate::models::{todos, users};

pub async fn establish_connection(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .sqlx_logging(false);

    Database::connect(options).await
}

/// Crée les tables manquantes à partir des entités (users avant todos pour la FK)
pub async fn sync_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table_if_missing(db, users::Entity).await?;
    create_table_if_missing(db, todos::Entity).await?;
    Ok(())
}

async fn create_table_if_missing<E>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let table = entity.table_name().to_string();
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();

    db.execute(backend.build(&statement)).await?;
    tracing::debug!(table = %table, "Table ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;
    use sea_orm::{ActiveModelTrait, ColumnTrait, ModelTrait, QueryFilter, Set};

    #[actix_web::test]
    async fn test_sync_schema_is_idempotent() {
        let db = test_utils::test_db().await;
        // Deuxième appel : les tables existent déjà
        sync_schema(&db).await.unwrap();
    }

    #[actix_web::test]
    async fn test_deleting_user_cascades_to_todos() {
        let db = test_utils::test_db().await;
        let user = test_utils::create_user(&db, "alice", "a@x.com", "secret1").await;
        let user_id = user.id;

        todos::ActiveModel {
            text: Set("buy milk".to_string()),
            completed: Set(false),
            user_id: Set(user.id),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        user.delete(&db).await.unwrap();

        let remaining = todos::Entity::find()
            .filter(todos::Column::UserId.eq(user_id))
            .all(&db)
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }
}
