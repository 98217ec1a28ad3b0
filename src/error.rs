pub type ShatterResult<T> = Result<T, ShatterError>;

#[derive(thiserror::Error, Debug)]
pub enum ShatterError {
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("shader composition error: {0}")]
    Shader(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Asset(#[from] anyhow::Error),
}

impl ShatterError {
    pub fn invalid_mesh(msg: impl Into<String>) -> Self {
        Self::InvalidMesh(msg.into())
    }

    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub fn shader(msg: impl Into<String>) -> Self {
        Self::Shader(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
