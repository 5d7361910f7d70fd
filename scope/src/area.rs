use std::fmt;
use std::str::FromStr;

/// Declared execution context of the running request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AreaCode {
    Global,
    Crontab,
    Graphql,
    WebapiRest,
    WebapiSoap,
    Adminhtml,
    Frontend,
    Other(String),
}

impl AreaCode {
    pub fn as_str(&self) -> &str {
        match self {
            AreaCode::Global => "global",
            AreaCode::Crontab => "crontab",
            AreaCode::Graphql => "graphql",
            AreaCode::WebapiRest => "webapi_rest",
            AreaCode::WebapiSoap => "webapi_soap",
            AreaCode::Adminhtml => "adminhtml",
            AreaCode::Frontend => "frontend",
            AreaCode::Other(code) => code,
        }
    }

    /// Areas with no ambient store or website. Scope only comes from a pin here.
    pub fn is_scopeless(&self) -> bool {
        matches!(
            self,
            AreaCode::Global
                | AreaCode::Crontab
                | AreaCode::Graphql
                | AreaCode::WebapiRest
                | AreaCode::WebapiSoap
        )
    }
}

impl FromStr for AreaCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "global" => AreaCode::Global,
            "crontab" => AreaCode::Crontab,
            "graphql" => AreaCode::Graphql,
            "webapi_rest" => AreaCode::WebapiRest,
            "webapi_soap" => AreaCode::WebapiSoap,
            "adminhtml" => AreaCode::Adminhtml,
            "frontend" => AreaCode::Frontend,
            other => AreaCode::Other(other.to_string()),
        })
    }
}

impl fmt::Display for AreaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
