use super::error::QueryError;

/// What a view renders for one query: still loading, data, or the failure.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    Loading,
    Success(T),
    Error(QueryError),
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&QueryError> {
        match self {
            QueryState::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryState<U> {
        match self {
            QueryState::Loading => QueryState::Loading,
            QueryState::Success(data) => QueryState::Success(f(data)),
            QueryState::Error(err) => QueryState::Error(err),
        }
    }

    pub fn into_result(self) -> Option<Result<T, QueryError>> {
        match self {
            QueryState::Loading => None,
            QueryState::Success(data) => Some(Ok(data)),
            QueryState::Error(err) => Some(Err(err)),
        }
    }
}

impl<T> From<Result<T, QueryError>> for QueryState<T> {
    fn from(result: Result<T, QueryError>) -> Self {
        match result {
            Ok(data) => QueryState::Success(data),
            Err(err) => QueryState::Error(err),
        }
    }
}
