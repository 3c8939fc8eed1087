// ===========================================================================
// Gestion centralisée des erreurs cryptographiques
//
// Tous les modules utilisent ce type au lieu de panic!/assert!/unwrap().
// Les messages ne nomment jamais une branche ni l'indice d'un chunk :
// l'appelant ne voit que "succès" ou "échec".
// ===========================================================================

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CryptoError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    // --- Erreurs de paramètres d'entrée ---
    /// Le message m est >= n (hors domaine plaintext Paillier)
    #[error("Le message doit être dans [0, n)")]
    MessageOutOfRange,

    /// Le chiffré c est >= n² (erreur de déchiffrement)
    #[error("Le chiffré doit être dans [0, n²)")]
    CiphertextOutOfRange,

    /// La taille demandée est inférieure au minimum
    #[error("Taille de clé {requested} bits invalide, minimum requis : {minimum} bits")]
    KeySizeTooSmall { requested: u64, minimum: u64 },

    #[error("Entrée invalide : {0}")]
    InvalidInput(String),

    // --- Erreurs mathématiques internes ---
    /// L'inverse modulaire n'existe pas (gcd != 1)
    #[error("Impossible de calculer l'inverse modulaire (gcd != 1)")]
    NoModularInverse,

    /// Conversion BigInt -> BigUint échouée (résultat négatif — invariant interne)
    #[error("Conversion interne BigInt -> BigUint : résultat négatif inattendu")]
    NegativeConversion,

    /// Génération de clés abandonnée après épuisement des tentatives
    #[error("Génération de clés échouée après {attempts} tentatives")]
    KeyGenExhausted { attempts: u32 },

    // --- Erreurs de conteneur ---
    /// Conteneur mal formé : champ manquant, corrompu ou incohérent
    #[error("Conteneur invalide : {0}")]
    Serialization(String),

    /// Parsing hexadécimal invalide dans un champ du conteneur
    #[error("Parsing hexadécimal invalide")]
    HexParseError,

    /// Champ hex trop long : vecteur DoS potentiel (conversion BigUint coûteuse)
    #[error("Champ hexadécimal trop long : {actual} caractères (maximum autorisé : {maximum})")]
    HexFieldTooLong { actual: usize, maximum: usize },

    // --- Erreurs de décodage ---
    /// Un chunk déchiffré ne tient pas dans la largeur attendue.
    /// Récupérable : le chunk est remplacé par des zéros.
    #[error("Chunk de {actual} octets pour une largeur de {expected} octets")]
    ChunkDecode { expected: usize, actual: usize },

    /// Le classifieur a rendu deux réponses différentes pour la même clé
    #[error("Incohérence interne du classifieur de clés")]
    ClassifierInconsistency,

    /// Échec générique : aucun détail n'est exposé à l'appelant
    #[error("Opération échouée")]
    OperationFailed,
}

impl From<serde_json::Error> for CryptoError {
    fn from(e: serde_json::Error) -> Self {
        CryptoError::Serialization(e.to_string())
    }
}
