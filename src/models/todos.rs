// ============================================================================
// MODÈLE : TODOS
// ============================================================================
//
// Colonnes de la table todos:
//   - id (INTEGER, PRIMARY KEY, autoincrement)
//   - text (VARCHAR(255), NOT NULL) - jamais vide après trim
//   - completed (BOOLEAN, NOT NULL)
//   - user_id (INTEGER, NOT NULL, FK vers users, ON DELETE CASCADE)
//   - created_at / updated_at (TIMESTAMPTZ, NOT NULL)
//
// Points d'attention:
//   - user_id n'est jamais modifié après la création
//   - Le JSON expose userId / createdAt / updatedAt (camelCase)
//
// ============================================================================

use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const MAX_TEXT_LENGTH: usize = 255;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "todos")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub text: String,

    pub completed: bool,

    pub user_id: i32,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now();
        if insert {
            self.created_at = Set(now);
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}
