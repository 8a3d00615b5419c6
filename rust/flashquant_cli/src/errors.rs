#[derive(Debug)]
pub enum CliError {
    Config {
        source: String,
    },
    ParseError {
        msg: String,
    },
    Io {
        source: String,
        path: Option<String>,
    },
    Processing {
        source: String,
    },
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Config { source } => write!(f, "Error interpreting the config: {}", source),
            CliError::ParseError { msg } => write!(f, "Error parsing config: {}", msg),
            CliError::Io { source, path } => {
                if let Some(path) = path {
                    write!(f, "Error reading file {}: {}", path, source)
                } else {
                    write!(f, "Error reading file: {}", source)
                }
            }
            CliError::Processing { source } => write!(f, "Error processing peaks: {}", source),
        }
    }
}

impl From<flashquant::FlashQuantError> for CliError {
    fn from(e: flashquant::FlashQuantError) -> Self {
        CliError::Processing {
            source: e.to_string(),
        }
    }
}

impl From<flashquant::InputError> for CliError {
    fn from(e: flashquant::InputError) -> Self {
        CliError::Processing {
            source: e.to_string(),
        }
    }
}

impl From<flashquant::DataProcessingError> for CliError {
    fn from(e: flashquant::DataProcessingError) -> Self {
        CliError::Processing {
            source: e.to_string(),
        }
    }
}

impl From<flashquant::ReportError> for CliError {
    fn from(e: flashquant::ReportError) -> Self {
        CliError::Processing {
            source: e.to_string(),
        }
    }
}
