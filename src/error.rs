#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("http {status}: {body}")]
    Status { status: u16, body: String },
    #[error("bad response shape: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("graphql errors: {0}")]
    GraphQl(String),
    #[error("response carried no data")]
    MissingData,
    #[error("bad response shape: {0}")]
    Shape(String),
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Client(_) => "client",
            Self::Network(_) => "network",
            Self::Status { .. } => "status",
            Self::Decode(_) => "decode",
            Self::GraphQl(_) => "graphql",
            Self::MissingData => "missing_data",
            Self::Shape(_) => "shape",
        }
    }

    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }
}
