//! Company-name to instrument resolution.

use serde::Serialize;
use tracing::{info, warn};

use crate::data_source::{MarketDataSource, SearchRequest, SourceError};
use crate::{Instrument, InstrumentKind, InstrumentRef};

/// Result of one search.
///
/// `NoMatch` means the collaborator returned nothing at all; `Matches` may
/// still be empty when a kind filter removed every hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    NoMatch,
    Matches(Vec<Instrument>),
}

impl ResolveOutcome {
    pub fn into_matches(self) -> Option<Vec<Instrument>> {
        match self {
            Self::NoMatch => None,
            Self::Matches(instruments) => Some(instruments),
        }
    }
}

/// Searches `query` and keeps only instruments of `kind`, when given.
pub async fn find_instruments<S>(
    source: &S,
    query: &str,
    kind: Option<InstrumentKind>,
) -> Result<ResolveOutcome, SourceError>
where
    S: MarketDataSource + ?Sized,
{
    let batch = source.find_instrument(SearchRequest::new(query)?).await?;
    if batch.results.is_empty() {
        return Ok(ResolveOutcome::NoMatch);
    }

    let matches = match kind {
        Some(kind) => batch
            .results
            .into_iter()
            .filter(|instrument| instrument.kind == kind)
            .collect(),
        None => batch.results,
    };
    Ok(ResolveOutcome::Matches(matches))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolveReport {
    pub resolved: Vec<InstrumentRef>,
    pub unmatched: Vec<String>,
}

/// Resolves every name; names without any search result are logged and skipped.
///
/// Other source failures stop the run.
pub async fn resolve_names<S>(
    source: &S,
    names: &[String],
    kind: Option<InstrumentKind>,
) -> Result<ResolveReport, SourceError>
where
    S: MarketDataSource + ?Sized,
{
    let mut report = ResolveReport::default();
    for name in names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }

        match find_instruments(source, name, kind).await?.into_matches() {
            None => {
                warn!(query = name, "no instrument matched; skipping");
                report.unmatched.push(name.to_owned());
            }
            Some(instruments) => {
                info!(query = name, matches = instruments.len(), "resolved instruments");
                report
                    .resolved
                    .extend(instruments.iter().map(Instrument::to_ref));
            }
        }
    }
    Ok(report)
}
