// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque entité correspond à une table gérée avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - dto : Corps des requêtes / réponses JSON
//   - users : Utilisateurs (mot de passe hashé + token de reset)
//   - todos : Todos, un seul propriétaire par todo
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Les tables peuvent être créées au démarrage depuis les entités (db::sync_schema)
//
// ============================================================================

pub mod health;
pub mod dto;
pub mod users;
pub mod todos;
