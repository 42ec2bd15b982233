use std::{fmt, str::FromStr};

use rustc_hash::FxHashSet;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("queueing limit must be > 0")]
    ZeroLimit,
    #[error("missing queueing limit")]
    MissingLimit,
    #[error("invalid queueing limit: {0}")]
    InvalidLimit(String),
    #[error("unexpected configuration token: {0}")]
    UnexpectedToken(String),
    #[error("explicit queue list is empty")]
    EmptyQueueList,
    #[error("queue {0} is listed more than once")]
    DuplicateQueue(String),
}

/// Configuration of an enqueue controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnqueueOptions {
    /// The admission limit, in packets, shared by both logical queues.
    pub(crate) limit: usize,
    /// Queues to bind to, in classical-then-scalable order. When `None`, the queues
    /// are discovered from the topology.
    pub(crate) queues: Option<Vec<String>>,
}

impl EnqueueOptions {
    pub fn new(limit: usize) -> Self {
        Self { limit, queues: None }
    }

    /// Binds to the given queues instead of discovering them.
    pub fn with_queues<I, S>(mut self, queues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.queues = Some(queues.into_iter().map(Into::into).collect());
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn queues(&self) -> Option<&[String]> {
        self.queues.as_deref()
    }

    /// Checks the options without touching the topology.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_limit(self.limit)?;

        if let Some(ref queues) = self.queues {
            if queues.is_empty() {
                return Err(ConfigError::EmptyQueueList);
            }

            let mut seen = FxHashSet::default();
            for queue in queues {
                if !seen.insert(queue.as_str()) {
                    return Err(ConfigError::DuplicateQueue(queue.clone()));
                }
            }
        }

        Ok(())
    }
}

#[inline]
pub(crate) fn validate_limit(limit: usize) -> Result<(), ConfigError> {
    if limit == 0 {
        Err(ConfigError::ZeroLimit)
    } else {
        Ok(())
    }
}

/// Parses the keyword form `[LIMIT] <limit> [QUEUES <name>...]`. Commas are treated as
/// whitespace.
impl FromStr for EnqueueOptions {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace(',', " ");
        let mut tokens = normalized.split_whitespace().peekable();

        if tokens.peek().is_some_and(|t| t.eq_ignore_ascii_case("LIMIT")) {
            tokens.next();
        }

        let raw = tokens.next().ok_or(ConfigError::MissingLimit)?;
        let limit = raw.parse::<usize>().map_err(|_| ConfigError::InvalidLimit(raw.to_string()))?;
        let mut options = Self::new(limit);

        match tokens.next() {
            None => {}
            Some(keyword) if keyword.eq_ignore_ascii_case("QUEUES") => {
                options = options.with_queues(tokens);
            }
            Some(other) => return Err(ConfigError::UnexpectedToken(other.to_string())),
        }

        options.validate()?;
        Ok(options)
    }
}

impl fmt::Display for EnqueueOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LIMIT {}", self.limit)?;
        if let Some(ref queues) = self.queues {
            write!(f, ", QUEUES")?;
            for queue in queues {
                write!(f, " {queue}")?;
            }
        }
        Ok(())
    }
}
