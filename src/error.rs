use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Table overflow in identifier hash (size = {size})")]
    TableOverflow { size: usize },

    #[error(
        "Ran out of space for ids ({keyspace} bytes); increase --avg-id-len or max_ids (currently {max_ids}){}",
        last_entry(.last)
    )]
    KeySpaceExhausted {
        keyspace: usize,
        max_ids: usize,
        last: Option<String>,
    },

    #[error("Maximum number of ids ({max_ids}) reached{}", last_entry(.last))]
    TooManyIds { max_ids: usize, last: Option<String> },
}

fn last_entry(last: &Option<String>) -> String {
    match last {
        Some(key) => format!("; last entry processed was {key}"),
        None => String::new(),
    }
}

impl IndexError {
    /// Capacity errors end the whole run; they cannot be fixed without a new
    /// configuration.
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            Self::TableOverflow { .. } | Self::KeySpaceExhausted { .. } | Self::TooManyIds { .. }
        )
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::KeySpaceExhausted { .. } => 2,
            Self::TooManyIds { .. } => 3,
            Self::Io(_) | Self::InvalidConfig(_) | Self::TableOverflow { .. } => 1,
        }
    }
}
