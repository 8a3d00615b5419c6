use std::path::PathBuf;

#[derive(Debug)]
pub enum DataProcessingError {
    IndexOutOfBounds(usize),
}

impl std::fmt::Display for DataProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfBounds(idx) => write!(f, "Peak index {} is out of bounds", idx),
        }
    }
}

/// Which collection a dangling input reference was pointing into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    SpectraFile,
    ProteinGroup,
    Identification,
    IndexedPeak,
    Feature,
}

#[derive(Debug)]
pub enum InputError {
    FileReading {
        source: std::io::Error,
        context: &'static str,
        path: PathBuf,
    },
    Parsing {
        msg: String,
        context: &'static str,
    },
    DanglingReference {
        kind: ReferenceKind,
        index: usize,
        context: String,
    },
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileReading {
                source,
                context,
                path,
            } => write!(f, "{} ({}): {}", context, path.display(), source),
            Self::Parsing { msg, context } => write!(f, "{}: {}", context, msg),
            Self::DanglingReference {
                kind,
                index,
                context,
            } => write!(
                f,
                "Reference to missing {:?} #{} in {}",
                kind, index, context
            ),
        }
    }
}

#[derive(Debug)]
pub enum ReportError {
    Io {
        source: std::io::Error,
        path: Option<PathBuf>,
    },
    Csv(csv::Error),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { source, path } => match path {
                Some(path) => write!(f, "Error writing report {}: {}", path.display(), source),
                None => write!(f, "Error writing report: {}", source),
            },
            Self::Csv(e) => write!(f, "Error writing report row: {}", e),
        }
    }
}

impl From<csv::Error> for ReportError {
    fn from(x: csv::Error) -> Self {
        Self::Csv(x)
    }
}

#[derive(Debug)]
pub enum FlashQuantError {
    DataProcessing(DataProcessingError),
    Input(InputError),
    Report(ReportError),
}

impl std::fmt::Display for FlashQuantError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataProcessing(e) => write!(f, "{}", e),
            Self::Input(e) => write!(f, "{}", e),
            Self::Report(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for FlashQuantError {}

pub type Result<T> = std::result::Result<T, FlashQuantError>;

impl From<DataProcessingError> for FlashQuantError {
    fn from(x: DataProcessingError) -> Self {
        Self::DataProcessing(x)
    }
}

impl From<InputError> for FlashQuantError {
    fn from(x: InputError) -> Self {
        Self::Input(x)
    }
}

impl From<ReportError> for FlashQuantError {
    fn from(x: ReportError) -> Self {
        Self::Report(x)
    }
}

impl From<csv::Error> for FlashQuantError {
    fn from(x: csv::Error) -> Self {
        Self::Report(ReportError::Csv(x))
    }
}
