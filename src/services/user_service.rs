use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;

use crate::errors::Error;
use crate::models::users;

pub struct UserService;

/// Données nécessaires à la création d'un compte (mot de passe déjà hashé)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Modification partielle d'un utilisateur : None = champ inchangé.
/// Pour les colonnes nullables, Some(None) remet la valeur à NULL.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
    pub last_login: Option<Option<DateTime<Utc>>>,
    pub reset_token: Option<Option<String>>,
    pub reset_token_expiry: Option<Option<DateTime<Utc>>>,
}

impl UserService {
    pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(db).await
    }

    pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await
    }

    /// Comme find_by_email, mais ignore les comptes désactivés
    pub async fn find_active_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .filter(users::Column::IsActive.eq(true))
            .one(db)
            .await
    }

    /// Cherche l'utilisateur qui détient ce token de reset (expiré ou non)
    pub async fn find_by_reset_token(db: &DatabaseConnection, token: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::ResetToken.eq(token))
            .one(db)
            .await
    }

    /// Crée un utilisateur actif. Un email déjà présent donne DuplicateEmail,
    /// y compris quand c'est la contrainte UNIQUE qui rejette l'insertion.
    pub async fn create(db: &DatabaseConnection, new_user: NewUser) -> Result<users::Model, Error> {
        if Self::find_by_email(db, &new_user.email).await?.is_some() {
            return Err(Error::DuplicateEmail);
        }

        let user = users::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            is_active: Set(true),
            last_login: Set(None),
            reset_token: Set(None),
            reset_token_expiry: Set(None),
            ..Default::default()
        };

        let user = user.insert(db).await.map_err(insert_error)?;
        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    /// Consomme un token de reset en une seule requête : nouveau mot de passe,
    /// token et expiration remis à NULL, seulement si le token est encore valide.
    /// Retourne false si le token a déjà été utilisé, remplacé ou a expiré.
    pub async fn redeem_reset_token(
        db: &DatabaseConnection,
        id: i32,
        token: &str,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(users::Column::ResetToken, Expr::value(Option::<String>::None))
            .col_expr(users::Column::ResetTokenExpiry, Expr::value(Option::<DateTime<Utc>>::None))
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(id))
            .filter(users::Column::ResetToken.eq(token))
            .filter(users::Column::ResetTokenExpiry.gt(now))
            .exec(db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Applique un patch partiel et retourne la ligne à jour
    pub async fn update(db: &DatabaseConnection, id: i32, patch: UserPatch) -> Result<users::Model, Error> {
        let user = Self::find_by_id(db, id)
            .await?
            .ok_or(Error::NotFound { resource: "User" })?;

        let mut active_model: users::ActiveModel = user.into();
        if let Some(password_hash) = patch.password_hash {
            active_model.password_hash = Set(password_hash);
        }
        if let Some(is_active) = patch.is_active {
            active_model.is_active = Set(is_active);
        }
        if let Some(last_login) = patch.last_login {
            active_model.last_login = Set(last_login);
        }
        if let Some(reset_token) = patch.reset_token {
            active_model.reset_token = Set(reset_token);
        }
        if let Some(reset_token_expiry) = patch.reset_token_expiry {
            active_model.reset_token_expiry = Set(reset_token_expiry);
        }

        Ok(active_model.update(db).await?)
    }
}

/// Une violation de la contrainte UNIQUE (inscriptions concurrentes) = email déjà pris
fn insert_error(e: DbErr) -> Error {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::DuplicateEmail,
        _ => Error::Database(e),
    }
}
