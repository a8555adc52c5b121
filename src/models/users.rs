// ============================================================================
// MODÈLE : USERS
// ============================================================================
//
// Colonnes de la table users:
//   - id (INTEGER, PRIMARY KEY, autoincrement)
//   - username (VARCHAR, NOT NULL)
//   - email (VARCHAR, UNIQUE, NOT NULL)
//   - password_hash (VARCHAR, NOT NULL) - PHC: $pbkdf2-sha256$i=...,l=32$salt$hash
//   - is_active (BOOLEAN, NOT NULL)
//   - last_login (TIMESTAMPTZ, NULL)
//   - reset_token (VARCHAR, NULL) - 64 caractères hex
//   - reset_token_expiry (TIMESTAMPTZ, NULL) - création + 1 heure
//   - created_at / updated_at (TIMESTAMPTZ, NOT NULL)
//
// Points d'attention:
//   - Un seul token de reset par utilisateur (une nouvelle demande écrase l'ancien)
//   - Le token est remis à NULL après utilisation
//   - password_hash et les champs de reset ne sont jamais sérialisés
//   - ON DELETE CASCADE vers todos
//
// ============================================================================

use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub username: String,

    #[sea_orm(unique)]
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub is_active: bool,

    pub last_login: Option<DateTimeUtc>,

    #[serde(skip_serializing)]
    pub reset_token: Option<String>,

    #[serde(skip_serializing)]
    pub reset_token_expiry: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::todos::Entity")]
    Todos,
}

impl Related<super::todos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Todos.def()
    }
}

impl Model {
    /// Le token de reset est utilisable seulement s'il n'a pas expiré
    pub fn has_live_reset_token(&self, now: DateTimeUtc) -> bool {
        self.reset_token.is_some() && self.reset_token_expiry.is_some_and(|expiry| expiry > now)
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
