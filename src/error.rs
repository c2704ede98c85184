use thiserror::Error;

/// Faults raised while the engine resolves an action.
///
/// These are not player mistakes (those come back as a rejected outcome);
/// they mean the entity world is missing something it should have.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("the player entity is missing from the world")]
    PlayerMissing,

    #[error("entity {entity} has no {component} component")]
    MissingComponent {
        component: &'static str,
        entity: u32,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
